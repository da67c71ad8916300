use clap::Args;
use serde_json::Value;

use farm_analytics_core::analysis::{self, AnalysisInput};
use farm_analytics_core::budgets::{Budget, InMemoryBudgetStore};
use farm_analytics_core::crop_defaults::CropDefaults;
use farm_analytics_core::UnitMode;

use crate::input;

const BUNDLED_CROP_DEFAULTS: &str = include_str!("../../../../config/crop_defaults.yaml");

/// Arguments for a full crop analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input file with the crop record
    #[arg(long)]
    pub input: Option<String>,

    /// JSON file with a list of saved budgets
    #[arg(long)]
    pub budgets: Option<String>,

    /// YAML or JSON file with per-crop default yield and price
    #[arg(long)]
    pub crop_defaults: Option<String>,

    /// Present costs and variances in this unit (overrides the input file)
    #[arg(long)]
    pub unit: Option<UnitMode>,

    /// Replace a parent category with its sub-categories
    #[arg(long)]
    pub drill_down: Option<String>,

    /// Use variable costs only for break-even and margins
    #[arg(long)]
    pub exclude_operations: bool,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mut request: AnalysisInput =
        input::request(args.input.as_deref())?.ok_or("--input file is required for crop analysis")?;
    if let Some(unit) = args.unit {
        request.unit = unit;
    }
    if args.drill_down.is_some() {
        request.options.drill_down = args.drill_down;
    }
    if args.exclude_operations {
        request.include_operations = false;
    }

    let store = match args.budgets {
        Some(ref path) => {
            let budgets: Vec<Budget> = input::file::read_json(path)?;
            tracing::debug!(path = %path, count = budgets.len(), "loaded budgets");
            InMemoryBudgetStore::with_budgets(budgets)?
        }
        None => InMemoryBudgetStore::new(),
    };

    let defaults = load_crop_defaults(args.crop_defaults.as_deref())?;

    let result = analysis::analyze_crop(&request, &store, &defaults)?;
    Ok(serde_json::to_value(result)?)
}

fn load_crop_defaults(path: Option<&str>) -> Result<CropDefaults, Box<dyn std::error::Error>> {
    match path {
        Some(p) => input::file::read_document(p),
        None => Ok(serde_yaml::from_str(BUNDLED_CROP_DEFAULTS)?),
    }
}
