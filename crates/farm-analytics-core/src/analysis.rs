use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

use crate::budgets::{active_budget_for, BudgetStore};
use crate::costs::variance::{category_variances, unmatched_categories, CostVarianceReport};
use crate::costs::{aggregate, AggregateOptions, AggregatedCosts};
use crate::crop_defaults::{CropDefaults, CropRecord};
use crate::profitability::{evaluate, profitability_warnings, ProfitabilityResult};
use crate::types::{with_metadata, ComputationOutput, Hectares, Money, Percentage, TonnesPerHectare, UnitMode, UnitValue};
use crate::FarmAnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub crop: CropRecord,
    #[serde(default)]
    pub unit: UnitMode,
    #[serde(default = "default_true")]
    pub include_operations: bool,
    #[serde(default)]
    pub options: AggregateOptions,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueSource {
    Record,
    CropDefaults,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", rename_all = "snake_case")]
pub enum BudgetSource {
    Record,
    Store { id: String, name: String, season: i32 },
    None,
}

/// The sale terms the analysis actually ran with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedTerms {
    pub area: Hectares,
    pub yield_per_ha: TonnesPerHectare,
    pub yield_source: ValueSource,
    pub achieved_price: Money,
    pub price_source: ValueSource,
    pub percent_sold: Percentage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropAnalysis {
    pub crop_type: String,
    pub unit: UnitMode,
    pub terms: ResolvedTerms,
    pub budget_source: BudgetSource,
    pub costs: AggregatedCosts,
    pub variances: CostVarianceReport,
    pub profitability: ProfitabilityResult,
    /// Total cost (per the operations toggle) in the requested unit
    pub total_cost: UnitValue,
}

// ---------------------------------------------------------------------------
// Analysis
// ---------------------------------------------------------------------------

/// Full cost, variance and profitability picture for one crop.
///
/// Missing yield / price come from `defaults`; a missing budget comes from
/// the store's active budget for the crop type.
pub fn analyze_crop(
    input: &AnalysisInput,
    store: &dyn BudgetStore,
    defaults: &CropDefaults,
) -> FarmAnalyticsResult<ComputationOutput<CropAnalysis>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let record = &input.crop;

    defaults.validate()?;
    let mut financials = record.resolve(defaults);

    let source_of = |explicit: bool| {
        if explicit {
            ValueSource::Record
        } else {
            ValueSource::CropDefaults
        }
    };
    let terms = ResolvedTerms {
        area: financials.area,
        yield_per_ha: financials.yield_per_ha,
        yield_source: source_of(record.yield_per_ha.is_some()),
        achieved_price: financials.achieved_price,
        price_source: source_of(record.achieved_price.is_some()),
        percent_sold: financials.percent_sold,
    };
    if (terms.yield_source == ValueSource::CropDefaults || terms.price_source == ValueSource::CropDefaults)
        && !defaults.has_profile(&record.crop_type)
    {
        warnings.push(format!(
            "No crop defaults for '{}'; fallback yield/price used",
            record.crop_type
        ));
    }

    let budget_source = if financials.budget.is_some() {
        BudgetSource::Record
    } else if let Some(b) = active_budget_for(store, &record.crop_type) {
        debug!(budget = %b.id, crop = %record.crop_type, "using stored budget");
        financials.budget = Some(b.costs);
        BudgetSource::Store {
            id: b.id,
            name: b.name,
            season: b.season,
        }
    } else {
        warnings.push(format!(
            "No budget for '{}'; budget variances omitted",
            record.crop_type
        ));
        BudgetSource::None
    };

    financials.validate()?;
    let basis = financials.basis()?;

    let costs = aggregate(&financials.costs, input.unit, &basis, &input.options)?;
    let variances = category_variances(
        &financials.costs,
        financials.budget.as_ref(),
        financials.three_year_average.as_ref(),
        input.unit,
        &basis,
    )?;
    let profitability = evaluate(&costs, &financials, input.include_operations)?;
    let total_cost = basis.present(profitability.total_cost_per_ha, input.unit)?;

    if let Some(budget) = &financials.budget {
        warnings.extend(unmatched_categories(&financials.costs, budget, "budget"));
    }
    if input.unit == UnitMode::PerTonne && !total_cost.is_defined() {
        warnings.push("Yield is zero; per-tonne figures are N/A".to_string());
    }
    warnings.extend(profitability_warnings(&profitability, financials.percent_sold));

    info!(
        crop = %record.crop_type,
        unit = %input.unit,
        warnings = warnings.len(),
        "crop analysis complete"
    );

    let output = CropAnalysis {
        crop_type: record.crop_type.clone(),
        unit: input.unit,
        terms,
        budget_source,
        costs,
        variances,
        profitability,
        total_cost,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Crop cost aggregation, budget / 3-year variance and break-even profitability",
        &serde_json::json!({
            "crop_type": record.crop_type,
            "unit": input.unit,
            "include_operations": input.include_operations,
            "drill_down": input.options.drill_down,
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
