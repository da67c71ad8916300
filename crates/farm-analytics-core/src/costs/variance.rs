use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::costs::breakdown::{CostBreakdown, CostGroup, ReferenceCosts};
use crate::types::{with_metadata, ComputationOutput, Hectares, Money, Percentage, TonnesPerHectare, UnitMode, UnitValue};
use crate::units::FarmBasis;
use crate::variance::{variance, VarianceDirection};
use crate::FarmAnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A variance whose money delta is tagged with the output unit.
///
/// Computed on per-hectare figures and converted afterwards, so `percent`
/// is the same in every unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitVariance {
    pub reference: UnitValue,
    pub delta: UnitValue,
    pub percent: Percentage,
    pub direction: VarianceDirection,
}

impl UnitVariance {
    pub fn compute(
        actual_per_ha: Money,
        reference_per_ha: Money,
        unit: UnitMode,
        basis: &FarmBasis,
    ) -> FarmAnalyticsResult<Self> {
        let v = variance(actual_per_ha, reference_per_ha);
        Ok(UnitVariance {
            reference: basis.present(reference_per_ha, unit)?,
            delta: basis.present(v.delta, unit)?,
            percent: v.percent,
            direction: v.direction(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVariance {
    pub name: String,
    pub group: CostGroup,
    pub actual: UnitValue,
    /// None when there is no budget or it lacks this category
    pub vs_budget: Option<UnitVariance>,
    /// None when there is no 3-year average or it lacks this category
    pub vs_three_year_average: Option<UnitVariance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupVariance {
    pub group: CostGroup,
    pub actual: UnitValue,
    pub vs_budget: Option<UnitVariance>,
    pub vs_three_year_average: Option<UnitVariance>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostVarianceReport {
    pub unit: UnitMode,
    pub categories: Vec<CategoryVariance>,
    pub groups: Vec<GroupVariance>,
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

/// Budget and 3-year-average variances for every top-level category and for
/// each group total.
pub fn category_variances(
    breakdown: &CostBreakdown,
    budget: Option<&ReferenceCosts>,
    three_year_average: Option<&ReferenceCosts>,
    unit: UnitMode,
    basis: &FarmBasis,
) -> FarmAnalyticsResult<CostVarianceReport> {
    breakdown.validate()?;

    let compare = |actual: Money, reference: Option<Money>| -> FarmAnalyticsResult<Option<UnitVariance>> {
        reference
            .map(|r| UnitVariance::compute(actual, r, unit, basis))
            .transpose()
    };

    let mut categories = Vec::new();
    let mut groups = Vec::new();

    for group in CostGroup::ALL {
        for entry in breakdown.entries(group) {
            categories.push(CategoryVariance {
                name: entry.name.clone(),
                group,
                actual: basis.present(entry.current, unit)?,
                vs_budget: compare(entry.current, budget.and_then(|b| b.get(group, &entry.name)))?,
                vs_three_year_average: compare(
                    entry.current,
                    three_year_average.and_then(|a| a.get(group, &entry.name)),
                )?,
            });
        }

        let actual_total = breakdown.total_per_ha(group);
        groups.push(GroupVariance {
            group,
            actual: basis.present(actual_total, unit)?,
            vs_budget: compare(actual_total, budget.map(|b| b.total(group)))?,
            vs_three_year_average: compare(actual_total, three_year_average.map(|a| a.total(group)))?,
        });
    }

    Ok(CostVarianceReport {
        unit,
        categories,
        groups,
    })
}

/// Reference categories with no matching actual entry, and vice versa.
pub fn unmatched_categories(
    breakdown: &CostBreakdown,
    reference: &ReferenceCosts,
    label: &str,
) -> Vec<String> {
    let mut notes = Vec::new();
    for group in CostGroup::ALL {
        for name in reference.values(group).keys() {
            if breakdown.find(group, name).is_none() {
                notes.push(format!("{} category '{}' has no actual cost entry", label, name));
            }
        }
        for entry in breakdown.entries(group) {
            if reference.get(group, &entry.name).is_none() {
                notes.push(format!("'{}' is missing from the {}", entry.name, label));
            }
        }
    }
    notes
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CostVarianceInput {
    pub area: Hectares,
    pub yield_per_ha: TonnesPerHectare,
    #[serde(default)]
    pub unit: UnitMode,
    pub costs: CostBreakdown,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<ReferenceCosts>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub three_year_average: Option<ReferenceCosts>,
}

pub fn analyze_cost_variance(
    input: &CostVarianceInput,
) -> FarmAnalyticsResult<ComputationOutput<CostVarianceReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let basis = FarmBasis::new(input.area, input.yield_per_ha)?;
    let report = category_variances(
        &input.costs,
        input.budget.as_ref(),
        input.three_year_average.as_ref(),
        input.unit,
        &basis,
    )?;

    match &input.budget {
        Some(b) => warnings.extend(unmatched_categories(&input.costs, b, "budget")),
        None => warnings.push("No budget supplied; budget variances omitted".to_string()),
    }
    if let Some(avg) = &input.three_year_average {
        warnings.extend(unmatched_categories(&input.costs, avg, "3-year average"));
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Cost variance vs budget and 3-year average (per-hectare basis)",
        &serde_json::json!({
            "unit": input.unit,
            "area": input.area.to_string(),
            "yield_per_ha": input.yield_per_ha.to_string(),
            "has_budget": input.budget.is_some(),
            "has_three_year_average": input.three_year_average.is_some(),
        }),
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::costs::breakdown::CostEntry;
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn breakdown() -> CostBreakdown {
        CostBreakdown {
            variable: vec![CostEntry::new("seed", dec!(90)), CostEntry::new("fertiliser", dec!(180))],
            operations: vec![CostEntry::new("harvesting", dec!(100))],
        }
    }

    fn budget() -> ReferenceCosts {
        ReferenceCosts {
            variable: BTreeMap::from([("seed".to_string(), dec!(80)), ("fertiliser".to_string(), dec!(200))]),
            operations: BTreeMap::from([("harvesting".to_string(), dec!(0))]),
        }
    }

    fn basis() -> FarmBasis {
        FarmBasis::new(dec!(50), dec!(10)).unwrap()
    }

    #[test]
    fn test_category_variance_vs_budget() {
        let r = category_variances(&breakdown(), Some(&budget()), None, UnitMode::PerHectare, &basis()).unwrap();
        let seed = &r.categories[0];
        let vs = seed.vs_budget.unwrap();
        assert_eq!(vs.delta.value, Some(dec!(10)));
        assert_eq!(vs.percent, dec!(12.5));
        assert_eq!(vs.direction, VarianceDirection::Over);
        assert!(seed.vs_three_year_average.is_none());
    }

    #[test]
    fn test_zero_budget_line_is_zero_percent() {
        let r = category_variances(&breakdown(), Some(&budget()), None, UnitMode::PerHectare, &basis()).unwrap();
        let harvesting = r.categories.iter().find(|c| c.name == "harvesting").unwrap();
        assert_eq!(harvesting.vs_budget.unwrap().percent, dec!(0));
    }

    #[test]
    fn test_percent_is_unit_invariant() {
        let per_ha = category_variances(&breakdown(), Some(&budget()), None, UnitMode::PerHectare, &basis()).unwrap();
        let total = category_variances(&breakdown(), Some(&budget()), None, UnitMode::Total, &basis()).unwrap();
        for (a, b) in per_ha.categories.iter().zip(total.categories.iter()) {
            assert_eq!(a.vs_budget.map(|v| v.percent), b.vs_budget.map(|v| v.percent));
        }
        // seed delta: 10/ha * 50 ha
        assert_eq!(total.categories[0].vs_budget.unwrap().delta.value, Some(dec!(500)));
    }

    #[test]
    fn test_group_totals() {
        let r = category_variances(&breakdown(), Some(&budget()), None, UnitMode::PerHectare, &basis()).unwrap();
        let variable = &r.groups[0];
        assert_eq!(variable.group, CostGroup::Variable);
        // 270 actual vs 280 budget
        let vs = variable.vs_budget.unwrap();
        assert_eq!(vs.delta.value, Some(dec!(-10)));
        assert_eq!(vs.direction, VarianceDirection::Under);
    }

    #[test]
    fn test_envelope_flags_missing_budget_categories() {
        let mut b = budget();
        b.variable.insert("chemicals".to_string(), dec!(120));
        let input = CostVarianceInput {
            area: dec!(50),
            yield_per_ha: dec!(10),
            unit: UnitMode::PerHectare,
            costs: breakdown(),
            budget: Some(b),
            three_year_average: None,
        };
        let out = analyze_cost_variance(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("'chemicals' has no actual")));
    }
}
