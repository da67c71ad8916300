use clap::Args;
use rust_decimal::Decimal;
use serde_json::{json, Value};

use farm_analytics_core::costs::aggregate::{self, AggregateInput};
use farm_analytics_core::costs::variance::{self as cost_variance, CostVarianceInput};
use farm_analytics_core::variance::variance;
use farm_analytics_core::UnitMode;

use crate::input;

/// Arguments for cost variance
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct VarianceArgs {
    /// Actual figure, for a single comparison without an input file
    #[arg(long)]
    pub actual: Option<Decimal>,

    /// Reference figure (budget, 3-year average or market average)
    #[arg(long)]
    pub reference: Option<Decimal>,

    /// Present variances in this unit (overrides the input file)
    #[arg(long)]
    pub unit: Option<UnitMode>,

    /// Path to JSON input file with costs, budget and 3-year average
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for cost aggregation
#[derive(Args)]
pub struct AggregateArgs {
    /// Path to JSON input file with area, yield and the cost breakdown
    #[arg(long)]
    pub input: Option<String>,

    /// Present costs in this unit (overrides the input file)
    #[arg(long)]
    pub unit: Option<UnitMode>,

    /// Replace a parent category with its sub-categories
    #[arg(long)]
    pub drill_down: Option<String>,

    /// Hide variable (input) cost rows
    #[arg(long)]
    pub hide_variable: bool,

    /// Hide operation cost rows
    #[arg(long)]
    pub hide_operations: bool,
}

pub fn run_variance(args: VarianceArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if let (Some(actual), Some(reference)) = (args.actual, args.reference) {
        let v = variance(actual, reference);
        return Ok(json!({
            "result": {
                "delta": v.delta,
                "percent": v.percent,
                "direction": v.direction(),
            }
        }));
    }

    let mut request: CostVarianceInput = input::request(args.input.as_deref())?
        .ok_or("--input file is required for cost variance (or pass --actual and --reference)")?;
    if let Some(unit) = args.unit {
        request.unit = unit;
    }

    let result = cost_variance::analyze_cost_variance(&request)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_aggregate(args: AggregateArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: AggregateInput =
        input::request(args.input.as_deref())?.ok_or("--input file is required for cost aggregation")?;

    if let Some(unit) = args.unit {
        request.unit = unit;
    }
    if args.drill_down.is_some() {
        request.options.drill_down = args.drill_down;
    }
    if args.hide_variable {
        request.options.show_variable = false;
    }
    if args.hide_operations {
        request.options.show_operations = false;
    }

    let result = aggregate::aggregate_costs(&request)?;
    Ok(serde_json::to_value(result)?)
}
