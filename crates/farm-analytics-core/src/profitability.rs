use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, warn};

use crate::costs::{aggregate, AggregateOptions, AggregatedCosts};
use crate::error::FarmAnalyticsError;
use crate::financials::CropFinancials;
use crate::types::{with_metadata, ComputationOutput, Hectares, Money, Percentage, Tonnes, TonnesPerHectare, UnitMode};
use crate::FarmAnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Break-even, margins and realized / potential profit for one crop.
///
/// `None` means undefined (zero yield or zero price), never zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfitabilityResult {
    pub include_operations: bool,
    pub variable_cost_per_ha: Money,
    pub operations_cost_per_ha: Money,
    /// variable + operations when operations are included, else variable
    pub total_cost_per_ha: Money,
    /// variable cost / yield
    pub input_cost_per_tonne: Option<Money>,
    /// total_cost_per_ha / yield
    pub break_even_price_per_tonne: Option<Money>,
    /// total_cost_per_ha / price: the yield at which revenue covers cost
    pub break_even_yield_per_ha: Option<TonnesPerHectare>,
    pub achieved_price: Money,
    /// price - input cost per tonne (variable costs only, always)
    pub gross_margin_per_tonne: Option<Money>,
    /// price - break-even price
    pub net_margin_per_tonne: Option<Money>,
    /// gross margin / price * 100
    pub gross_margin_pct: Option<Percentage>,
    /// net margin / price * 100
    pub net_margin_pct: Option<Percentage>,
    pub production_total: Tonnes,
    pub quantity_sold: Tonnes,
    pub quantity_remaining: Tonnes,
    /// price * quantity sold
    pub revenue: Money,
    /// total_cost_per_ha * area * percent_sold / 100
    pub cost_of_sold_portion: Money,
    /// revenue - cost of sold portion
    pub profit_loss: Money,
    /// quantity remaining * price
    pub potential_value_remaining: Money,
    /// revenue + potential value remaining
    pub total_potential_value: Money,
    /// total_cost_per_ha * area
    pub total_cost: Money,
    /// total potential value - total cost
    pub projected_profit: Money,
}

/// Raw figures the calculation runs on, all per hectare or per tonne.
#[derive(Debug, Clone, Copy)]
struct ProfitabilityBasis {
    variable_per_ha: Money,
    operations_per_ha: Money,
    area: Hectares,
    yield_per_ha: TonnesPerHectare,
    price: Money,
    percent_sold: Percentage,
}

// ---------------------------------------------------------------------------
// Evaluate
// ---------------------------------------------------------------------------

/// Combine aggregated costs with the crop's sale terms.
///
/// Only the canonical per-hectare totals of `aggregated` are used, so the
/// display unit it was built in does not matter.
pub fn evaluate(
    aggregated: &AggregatedCosts,
    financials: &CropFinancials,
    include_operations: bool,
) -> FarmAnalyticsResult<ProfitabilityResult> {
    financials.validate_terms()?;

    let result = compute(
        ProfitabilityBasis {
            variable_per_ha: aggregated.total_variable_per_ha,
            operations_per_ha: aggregated.total_operations_per_ha,
            area: financials.area,
            yield_per_ha: financials.yield_per_ha,
            price: financials.achieved_price,
            percent_sold: financials.percent_sold,
        },
        include_operations,
    );

    if result.break_even_price_per_tonne.is_none() {
        warn!(area = %financials.area, "zero yield: break-even and margins are undefined");
    }
    debug!(
        include_operations,
        total_cost_per_ha = %result.total_cost_per_ha,
        profit_loss = %result.profit_loss,
        "evaluated profitability"
    );

    Ok(result)
}

fn compute(b: ProfitabilityBasis, include_operations: bool) -> ProfitabilityResult {
    let total_cost_per_ha = if include_operations {
        b.variable_per_ha + b.operations_per_ha
    } else {
        b.variable_per_ha
    };

    let per_tonne = |per_ha: Money| -> Option<Money> {
        if b.yield_per_ha.is_zero() {
            None
        } else {
            Some(per_ha / b.yield_per_ha)
        }
    };
    let ratio_to_price = |v: Money| -> Option<Decimal> {
        if b.price.is_zero() {
            None
        } else {
            Some(v / b.price)
        }
    };

    let input_cost_per_tonne = per_tonne(b.variable_per_ha);
    let break_even_price_per_tonne = per_tonne(total_cost_per_ha);

    let gross_margin_per_tonne = input_cost_per_tonne.map(|c| b.price - c);
    let net_margin_per_tonne = break_even_price_per_tonne.map(|c| b.price - c);

    let sold_fraction = b.percent_sold / Decimal::ONE_HUNDRED;
    let production_total = b.area * b.yield_per_ha;
    let quantity_sold = production_total * sold_fraction;
    let quantity_remaining = production_total - quantity_sold;

    let revenue = b.price * quantity_sold;
    let cost_of_sold_portion = total_cost_per_ha * b.area * sold_fraction;
    let potential_value_remaining = quantity_remaining * b.price;
    let total_potential_value = revenue + potential_value_remaining;
    let total_cost = total_cost_per_ha * b.area;

    ProfitabilityResult {
        include_operations,
        variable_cost_per_ha: b.variable_per_ha,
        operations_cost_per_ha: b.operations_per_ha,
        total_cost_per_ha,
        input_cost_per_tonne,
        break_even_price_per_tonne,
        break_even_yield_per_ha: ratio_to_price(total_cost_per_ha),
        achieved_price: b.price,
        gross_margin_per_tonne,
        net_margin_per_tonne,
        gross_margin_pct: gross_margin_per_tonne
            .and_then(ratio_to_price)
            .map(|r| r * Decimal::ONE_HUNDRED),
        net_margin_pct: net_margin_per_tonne
            .and_then(ratio_to_price)
            .map(|r| r * Decimal::ONE_HUNDRED),
        production_total,
        quantity_sold,
        quantity_remaining,
        revenue,
        cost_of_sold_portion,
        profit_loss: revenue - cost_of_sold_portion,
        potential_value_remaining,
        total_potential_value,
        total_cost,
        projected_profit: total_potential_value - total_cost,
    }
}

// ---------------------------------------------------------------------------
// What-if scenarios
// ---------------------------------------------------------------------------

/// Percentage changes (0–100 scale, e.g. -10 = 10% lower) applied to the
/// base crop.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityScenario {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_change_pct: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yield_change_pct: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable_cost_change_pct: Option<Percentage>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operations_cost_change_pct: Option<Percentage>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub achieved_price: Money,
    pub yield_per_ha: TonnesPerHectare,
    pub total_cost_per_ha: Money,
    pub break_even_price_per_tonne: Option<Money>,
    pub net_margin_per_tonne: Option<Money>,
    pub profit_loss: Money,
    pub projected_profit: Money,
}

fn run_scenario(
    base: ProfitabilityBasis,
    scenario: &ProfitabilityScenario,
    include_operations: bool,
) -> FarmAnalyticsResult<ScenarioResult> {
    let adjusted = ProfitabilityBasis {
        variable_per_ha: apply_pct_change(base.variable_per_ha, scenario.variable_cost_change_pct),
        operations_per_ha: apply_pct_change(base.operations_per_ha, scenario.operations_cost_change_pct),
        yield_per_ha: apply_pct_change(base.yield_per_ha, scenario.yield_change_pct),
        price: apply_pct_change(base.price, scenario.price_change_pct),
        ..base
    };

    if adjusted.yield_per_ha < dec!(0) || adjusted.price < dec!(0) {
        return Err(FarmAnalyticsError::InvalidInput {
            field: format!("scenarios.{}", scenario.name),
            reason: "Scenario drives yield or price below zero".to_string(),
        });
    }
    if adjusted.variable_per_ha < dec!(0) || adjusted.operations_per_ha < dec!(0) {
        return Err(FarmAnalyticsError::InvalidInput {
            field: format!("scenarios.{}", scenario.name),
            reason: "Scenario drives variable or operation costs below zero".to_string(),
        });
    }

    let r = compute(adjusted, include_operations);
    Ok(ScenarioResult {
        name: scenario.name.clone(),
        achieved_price: adjusted.price,
        yield_per_ha: adjusted.yield_per_ha,
        total_cost_per_ha: r.total_cost_per_ha,
        break_even_price_per_tonne: r.break_even_price_per_tonne,
        net_margin_per_tonne: r.net_margin_per_tonne,
        profit_loss: r.profit_loss,
        projected_profit: r.projected_profit,
    })
}

/// e.g. base=200, change=Some(10) => 220
fn apply_pct_change(base: Decimal, change_pct: Option<Percentage>) -> Decimal {
    match change_pct {
        Some(pct) => base * (Decimal::ONE + pct / Decimal::ONE_HUNDRED),
        None => base,
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityInput {
    pub financials: CropFinancials,
    #[serde(default = "default_true")]
    pub include_operations: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scenarios: Option<Vec<ProfitabilityScenario>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitabilityOutput {
    #[serde(flatten)]
    pub profitability: ProfitabilityResult,
    pub scenario_results: Vec<ScenarioResult>,
}

pub fn analyze_profitability(
    input: &ProfitabilityInput,
) -> FarmAnalyticsResult<ComputationOutput<ProfitabilityOutput>> {
    let start = Instant::now();
    let f = &input.financials;
    f.validate()?;

    let basis = f.basis()?;
    let aggregated = aggregate(&f.costs, UnitMode::PerHectare, &basis, &AggregateOptions::default())?;
    let profitability = evaluate(&aggregated, f, input.include_operations)?;

    let warnings = profitability_warnings(&profitability, f.percent_sold);

    let scenario_base = ProfitabilityBasis {
        variable_per_ha: aggregated.total_variable_per_ha,
        operations_per_ha: aggregated.total_operations_per_ha,
        area: f.area,
        yield_per_ha: f.yield_per_ha,
        price: f.achieved_price,
        percent_sold: f.percent_sold,
    };
    let scenario_results = match &input.scenarios {
        Some(scenarios) => scenarios
            .iter()
            .map(|s| run_scenario(scenario_base, s, input.include_operations))
            .collect::<FarmAnalyticsResult<Vec<ScenarioResult>>>()?,
        None => Vec::new(),
    };

    let output = ProfitabilityOutput {
        profitability,
        scenario_results,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Break-even and margin analysis over the sold fraction of production",
        &serde_json::json!({
            "area": f.area.to_string(),
            "yield_per_ha": f.yield_per_ha.to_string(),
            "achieved_price": f.achieved_price.to_string(),
            "percent_sold": f.percent_sold.to_string(),
            "include_operations": input.include_operations,
        }),
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn profitability_warnings(r: &ProfitabilityResult, percent_sold: Percentage) -> Vec<String> {
    let mut warnings = Vec::new();
    if r.break_even_price_per_tonne.is_none() {
        warnings.push("Yield is zero; break-even price and margins are N/A".to_string());
    }
    if r.achieved_price.is_zero() {
        warnings.push("Achieved price is zero; margin ratios and break-even yield are N/A".to_string());
    }
    if let Some(net) = r.net_margin_per_tonne {
        if net < dec!(0) {
            warnings.push(format!(
                "Achieved price is below break-even by {} per tonne",
                net.abs()
            ));
        }
    }
    if percent_sold.is_zero() {
        warnings.push("Nothing sold yet; realized profit/loss is zero".to_string());
    }
    warnings
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
