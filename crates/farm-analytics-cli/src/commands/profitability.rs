use clap::Args;
use serde_json::Value;

use farm_analytics_core::profitability::{self, ProfitabilityInput};

use crate::input;

/// Arguments for break-even and profitability
#[derive(Args)]
pub struct ProfitabilityArgs {
    /// Path to JSON input file with crop financials and optional scenarios
    #[arg(long)]
    pub input: Option<String>,

    /// Use variable costs only for break-even and margins
    #[arg(long)]
    pub exclude_operations: bool,
}

pub fn run_profitability(args: ProfitabilityArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: ProfitabilityInput =
        input::request(args.input.as_deref())?.ok_or("--input file is required for profitability")?;
    if args.exclude_operations {
        request.include_operations = false;
    }

    let result = profitability::analyze_profitability(&request)?;
    Ok(serde_json::to_value(result)?)
}
