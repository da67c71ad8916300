use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use farm_analytics_core::units::{self, ConversionInput};
use farm_analytics_core::UnitMode;

use crate::input;

/// Arguments for a unit conversion
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct ConvertArgs {
    /// Figure to convert
    #[arg(long)]
    pub value: Option<Decimal>,

    /// Unit of the figure (per_hectare, per_tonne, total)
    #[arg(long)]
    pub from: Option<UnitMode>,

    /// Target unit (per_hectare, per_tonne, total)
    #[arg(long)]
    pub to: Option<UnitMode>,

    /// Farm area in hectares
    #[arg(long)]
    pub area: Option<Decimal>,

    /// Yield in tonnes per hectare (only needed for per-tonne figures)
    #[arg(long, alias = "yield")]
    pub yield_per_ha: Option<Decimal>,

    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_convert(args: ConvertArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: ConversionInput = match input::request(args.input.as_deref())? {
        Some(r) => r,
        None => {
            let from = args.from.ok_or("--from is required (or provide --input)")?;
            let to = args.to.ok_or("--to is required (or provide --input)")?;
            // Yield only matters when a per-tonne figure is involved.
            let yield_per_ha = match args.yield_per_ha {
                Some(y) => y,
                None if from == UnitMode::PerTonne || to == UnitMode::PerTonne => {
                    return Err("--yield-per-ha is required for per-tonne figures (or provide --input)".into())
                }
                None => Decimal::ZERO,
            };
            ConversionInput {
                value: args.value.ok_or("--value is required (or provide --input)")?,
                from,
                to,
                area: args.area.ok_or("--area is required (or provide --input)")?,
                yield_per_ha,
            }
        }
    };

    let result = units::convert_value(&request)?;
    Ok(serde_json::to_value(result)?)
}
