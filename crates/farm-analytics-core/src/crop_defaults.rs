use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::costs::{CostBreakdown, ReferenceCosts};
use crate::error::FarmAnalyticsError;
use crate::financials::CropFinancials;
use crate::types::{Hectares, Money, Percentage, TonnesPerHectare};
use crate::FarmAnalyticsResult;

/// Default yield and price for a crop type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropProfile {
    pub yield_per_ha: TonnesPerHectare,
    pub price_per_tonne: Money,
}

/// Per-crop defaults, supplied as data rather than compiled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropDefaults {
    /// Used for any crop type without its own entry
    pub fallback: CropProfile,
    #[serde(default)]
    pub crops: BTreeMap<String, CropProfile>,
}

impl CropDefaults {
    /// Case-insensitive lookup, falling back to `fallback`.
    pub fn profile_for(&self, crop_type: &str) -> &CropProfile {
        let wanted = crop_type.trim();
        self.crops
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case(wanted))
            .map(|(_, profile)| profile)
            .unwrap_or(&self.fallback)
    }

    pub fn has_profile(&self, crop_type: &str) -> bool {
        let wanted = crop_type.trim();
        self.crops.keys().any(|name| name.eq_ignore_ascii_case(wanted))
    }

    /// Reject negative yields or prices anywhere in the table.
    pub fn validate(&self) -> FarmAnalyticsResult<()> {
        let all = std::iter::once(("fallback", &self.fallback))
            .chain(self.crops.iter().map(|(k, v)| (k.as_str(), v)));
        for (name, p) in all {
            if p.yield_per_ha < dec!(0) || p.price_per_tonne < dec!(0) {
                return Err(FarmAnalyticsError::Configuration(format!(
                    "crop defaults for '{}' contain a negative yield or price",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// A crop as supplied by a data source, with yield and price optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropRecord {
    pub crop_type: String,
    pub area: Hectares,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_per_ha: Option<TonnesPerHectare>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub achieved_price: Option<Money>,
    #[serde(default)]
    pub percent_sold: Percentage,
    pub costs: CostBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<ReferenceCosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_year_average: Option<ReferenceCosts>,
}

impl CropRecord {
    /// Fill missing yield / price from `defaults`. Explicit values win.
    pub fn resolve(&self, defaults: &CropDefaults) -> CropFinancials {
        let profile = defaults.profile_for(&self.crop_type);
        CropFinancials {
            area: self.area,
            yield_per_ha: self.yield_per_ha.unwrap_or(profile.yield_per_ha),
            achieved_price: self.achieved_price.unwrap_or(profile.price_per_tonne),
            percent_sold: self.percent_sold,
            costs: self.costs.clone(),
            budget: self.budget.clone(),
            three_year_average: self.three_year_average.clone(),
        }
    }
}
