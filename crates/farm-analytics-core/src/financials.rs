use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::costs::{CostBreakdown, ReferenceCosts};
use crate::error::FarmAnalyticsError;
use crate::types::{Hectares, Money, Percentage, TonnesPerHectare};
use crate::units::FarmBasis;
use crate::FarmAnalyticsResult;

/// Everything needed to cost and value one crop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropFinancials {
    /// Cropped area in hectares (> 0)
    pub area: Hectares,
    /// Yield in tonnes per hectare (>= 0)
    pub yield_per_ha: TonnesPerHectare,
    /// Achieved or contracted price per tonne (>= 0)
    pub achieved_price: Money,
    /// Share of production already sold, 0–100
    pub percent_sold: Percentage,
    pub costs: CostBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<ReferenceCosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_year_average: Option<ReferenceCosts>,
}

impl CropFinancials {
    /// Area, yield, price and sale-percentage checks. These are caller bugs,
    /// so they fail fast.
    pub fn validate_terms(&self) -> FarmAnalyticsResult<()> {
        validate_sale_terms(self.area, self.yield_per_ha, self.achieved_price, self.percent_sold)
    }

    /// Terms plus the cost breakdown's shape rules.
    pub fn validate(&self) -> FarmAnalyticsResult<()> {
        self.validate_terms()?;
        self.costs.validate()
    }

    pub fn basis(&self) -> FarmAnalyticsResult<FarmBasis> {
        FarmBasis::new(self.area, self.yield_per_ha)
    }
}

pub(crate) fn validate_sale_terms(
    area: Hectares,
    yield_per_ha: TonnesPerHectare,
    achieved_price: Money,
    percent_sold: Percentage,
) -> FarmAnalyticsResult<()> {
    if area <= dec!(0) {
        return Err(FarmAnalyticsError::InvalidArea(area));
    }
    if yield_per_ha < dec!(0) {
        return Err(FarmAnalyticsError::InvalidInput {
            field: "yield_per_ha".to_string(),
            reason: "Yield cannot be negative".to_string(),
        });
    }
    if achieved_price < dec!(0) {
        return Err(FarmAnalyticsError::InvalidInput {
            field: "achieved_price".to_string(),
            reason: "Achieved price cannot be negative".to_string(),
        });
    }
    if percent_sold < dec!(0) || percent_sold > dec!(100) {
        return Err(FarmAnalyticsError::InvalidPercentage {
            field: "percent_sold".to_string(),
            value: percent_sold,
        });
    }
    Ok(())
}
