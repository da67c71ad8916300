use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::FarmAnalyticsError;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Field area in hectares.
pub type Hectares = Decimal;

/// Crop yield in tonnes per hectare.
pub type TonnesPerHectare = Decimal;

/// Crop quantities in tonnes.
pub type Tonnes = Decimal;

/// Percentages on a 0–100 scale (50 = half). Never as decimal rates.
pub type Percentage = Decimal;

/// The unit a monetary figure is expressed in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitMode {
    #[default]
    PerHectare,
    PerTonne,
    Total,
}

impl UnitMode {
    pub const ALL: [UnitMode; 3] = [UnitMode::PerHectare, UnitMode::PerTonne, UnitMode::Total];

    /// Short suffix for display layers, e.g. "/ha".
    pub fn suffix(&self) -> &'static str {
        match self {
            UnitMode::PerHectare => "/ha",
            UnitMode::PerTonne => "/t",
            UnitMode::Total => "",
        }
    }
}

impl fmt::Display for UnitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            UnitMode::PerHectare => "per_hectare",
            UnitMode::PerTonne => "per_tonne",
            UnitMode::Total => "total",
        };
        f.write_str(s)
    }
}

impl FromStr for UnitMode {
    type Err = FarmAnalyticsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "per_hectare" | "per_ha" | "ha" => Ok(UnitMode::PerHectare),
            "per_tonne" | "per_t" | "t" => Ok(UnitMode::PerTonne),
            "total" => Ok(UnitMode::Total),
            other => Err(FarmAnalyticsError::InvalidInput {
                field: "unit".to_string(),
                reason: format!(
                    "unknown unit '{}' (expected per_hectare, per_tonne or total)",
                    other
                ),
            }),
        }
    }
}

/// A monetary figure tagged with the unit it is expressed in.
///
/// `value` is `None` when the figure is undefined in that unit (per-tonne
/// with zero yield). Callers render it as "N/A", never as zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitValue {
    pub value: Option<Money>,
    pub unit: UnitMode,
}

impl UnitValue {
    pub fn defined(value: Money, unit: UnitMode) -> Self {
        UnitValue {
            value: Some(value),
            unit,
        }
    }

    pub fn undefined(unit: UnitMode) -> Self {
        UnitValue { value: None, unit }
    }

    pub fn is_defined(&self) -> bool {
        self.value.is_some()
    }
}

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}
