use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::debug;

use crate::benchmark::{position, BenchmarkPosition};
use crate::costs::breakdown::{CostBreakdown, CostEntry, CostGroup};
use crate::error::FarmAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Hectares, Money, TonnesPerHectare, UnitMode, UnitValue};
use crate::units::FarmBasis;
use crate::FarmAnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Which groups are shown and which category (if any) is drilled into.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AggregateOptions {
    pub show_variable: bool,
    pub show_operations: bool,
    /// Replace this parent category's row with its sub-category rows
    pub drill_down: Option<String>,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        AggregateOptions {
            show_variable: true,
            show_operations: true,
            drill_down: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RowKind {
    Category,
    SubCategory { parent: String },
    /// Computed group total, not present in the input
    SyntheticTotal,
}

/// Benchmark range expressed in the output unit, with its position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkView {
    pub min: UnitValue,
    pub max: UnitValue,
    pub average: UnitValue,
    pub position: BenchmarkPosition,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostRow {
    pub name: String,
    pub group: CostGroup,
    pub kind: RowKind,
    /// Canonical per-hectare figure the row was derived from
    pub per_hectare: Money,
    pub value: UnitValue,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<BenchmarkView>,
    pub has_sub_categories: bool,
}

impl CostRow {
    pub fn is_synthetic(&self) -> bool {
        self.kind == RowKind::SyntheticTotal
    }
}

/// Cost rows in display order plus group totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedCosts {
    pub unit: UnitMode,
    pub rows: Vec<CostRow>,
    pub total_variable: UnitValue,
    pub total_operations: UnitValue,
    /// Canonical totals; downstream calculations combine these only
    pub total_variable_per_ha: Money,
    pub total_operations_per_ha: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub drilled_into: Option<String>,
}

impl AggregatedCosts {
    pub fn row(&self, name: &str) -> Option<&CostRow> {
        self.rows.iter().find(|r| r.name == name)
    }

    pub fn row_names(&self) -> Vec<&str> {
        self.rows.iter().map(|r| r.name.as_str()).collect()
    }
}

// ---------------------------------------------------------------------------
// Aggregation
// ---------------------------------------------------------------------------

/// Convert every entry to `unit`, total each group, and lay out display rows.
///
/// Each visible group gets a synthetic total row immediately after its anchor
/// category ("chemicals" / "harvesting"), or at the end of the group when the
/// anchor is absent. Hidden groups produce no rows but are still totalled.
/// Totals always sum top-level entries, whatever is drilled into.
pub fn aggregate(
    breakdown: &CostBreakdown,
    unit: UnitMode,
    basis: &FarmBasis,
    options: &AggregateOptions,
) -> FarmAnalyticsResult<AggregatedCosts> {
    breakdown.validate()?;

    if let Some(target) = &options.drill_down {
        if breakdown.locate(target).is_none() {
            return Err(unknown_category(target));
        }
    }

    let total_variable_per_ha = breakdown.total_per_ha(CostGroup::Variable);
    let total_operations_per_ha = breakdown.total_per_ha(CostGroup::Operations);

    let mut rows = Vec::new();
    for group in CostGroup::ALL {
        let visible = match group {
            CostGroup::Variable => options.show_variable,
            CostGroup::Operations => options.show_operations,
        };
        if !visible {
            continue;
        }
        let total_per_ha = match group {
            CostGroup::Variable => total_variable_per_ha,
            CostGroup::Operations => total_operations_per_ha,
        };
        rows.extend(group_rows(
            breakdown.entries(group),
            group,
            total_per_ha,
            unit,
            basis,
            options.drill_down.as_deref(),
        )?);
    }

    debug!(
        %unit,
        rows = rows.len(),
        variable_per_ha = %total_variable_per_ha,
        operations_per_ha = %total_operations_per_ha,
        "aggregated cost breakdown"
    );

    Ok(AggregatedCosts {
        unit,
        rows,
        total_variable: basis.present(total_variable_per_ha, unit)?,
        total_operations: basis.present(total_operations_per_ha, unit)?,
        total_variable_per_ha,
        total_operations_per_ha,
        drilled_into: options.drill_down.clone(),
    })
}

fn group_rows(
    entries: &[CostEntry],
    group: CostGroup,
    total_per_ha: Money,
    unit: UnitMode,
    basis: &FarmBasis,
    drill_down: Option<&str>,
) -> FarmAnalyticsResult<Vec<CostRow>> {
    let mut rows = Vec::with_capacity(entries.len() + 1);
    let mut total_inserted = false;

    for entry in entries {
        if drill_down == Some(entry.name.as_str()) && entry.has_sub_categories() {
            rows.extend(sub_category_rows(entry, group, unit, basis)?);
        } else {
            rows.push(entry_row(entry, group, RowKind::Category, unit, basis)?);
        }

        if entry.name == group.total_anchor() {
            rows.push(total_row(group, total_per_ha, unit, basis)?);
            total_inserted = true;
        }
    }

    if !total_inserted {
        rows.push(total_row(group, total_per_ha, unit, basis)?);
    }
    Ok(rows)
}

/// Rows for a parent category's children, each converted and benchmarked on
/// its own. Stateless: the caller owns which category is drilled into.
pub fn drill_down(
    breakdown: &CostBreakdown,
    category: &str,
    unit: UnitMode,
    basis: &FarmBasis,
) -> FarmAnalyticsResult<Vec<CostRow>> {
    breakdown.validate()?;
    let (group, entry) = breakdown
        .locate(category)
        .ok_or_else(|| unknown_category(category))?;
    sub_category_rows(entry, group, unit, basis)
}

fn sub_category_rows(
    parent: &CostEntry,
    group: CostGroup,
    unit: UnitMode,
    basis: &FarmBasis,
) -> FarmAnalyticsResult<Vec<CostRow>> {
    parent
        .sub_categories
        .iter()
        .map(|child| {
            entry_row(
                child,
                group,
                RowKind::SubCategory {
                    parent: parent.name.clone(),
                },
                unit,
                basis,
            )
        })
        .collect()
}

fn entry_row(
    entry: &CostEntry,
    group: CostGroup,
    kind: RowKind,
    unit: UnitMode,
    basis: &FarmBasis,
) -> FarmAnalyticsResult<CostRow> {
    let benchmark = match &entry.benchmark {
        Some(b) => Some(BenchmarkView {
            min: basis.present(b.min, unit)?,
            max: basis.present(b.max, unit)?,
            average: basis.present(b.average, unit)?,
            position: position(&b.with_current(entry.current)),
        }),
        None => None,
    };

    Ok(CostRow {
        name: entry.name.clone(),
        group,
        kind,
        per_hectare: entry.current,
        value: basis.present(entry.current, unit)?,
        benchmark,
        has_sub_categories: entry.has_sub_categories(),
    })
}

fn total_row(
    group: CostGroup,
    total_per_ha: Money,
    unit: UnitMode,
    basis: &FarmBasis,
) -> FarmAnalyticsResult<CostRow> {
    Ok(CostRow {
        name: group.total_label().to_string(),
        group,
        kind: RowKind::SyntheticTotal,
        per_hectare: total_per_ha,
        value: basis.present(total_per_ha, unit)?,
        benchmark: None,
        has_sub_categories: false,
    })
}

fn unknown_category(name: &str) -> FarmAnalyticsError {
    FarmAnalyticsError::InvalidInput {
        field: "drill_down".to_string(),
        reason: format!("unknown cost category '{}'", name),
    }
}

// ---------------------------------------------------------------------------
// Envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateInput {
    pub area: Hectares,
    pub yield_per_ha: TonnesPerHectare,
    #[serde(default)]
    pub unit: UnitMode,
    pub costs: CostBreakdown,
    #[serde(default)]
    pub options: AggregateOptions,
}

pub fn aggregate_costs(input: &AggregateInput) -> FarmAnalyticsResult<ComputationOutput<AggregatedCosts>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let basis = FarmBasis::new(input.area, input.yield_per_ha)?;
    let result = aggregate(&input.costs, input.unit, &basis, &input.options)?;

    if input.unit == UnitMode::PerTonne && basis.yield_per_ha().is_zero() {
        warnings.push("Yield is zero; per-tonne cost figures are N/A".to_string());
    }
    if let Some(target) = &input.options.drill_down {
        if let Some((_, entry)) = input.costs.locate(target) {
            if !entry.has_sub_categories() {
                warnings.push(format!("'{}' has no sub-categories; nothing to drill into", target));
            }
        }
    }
    for (name, parent, children) in input.costs.inconsistent_parents() {
        warnings.push(format!(
            "'{}' sub-categories sum to {} but the category reports {} per ha",
            name, children, parent
        ));
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Cost aggregation with synthetic group totals",
        &serde_json::json!({
            "unit": input.unit,
            "area": input.area.to_string(),
            "yield_per_ha": input.yield_per_ha.to_string(),
            "show_variable": input.options.show_variable,
            "show_operations": input.options.show_operations,
            "drill_down": input.options.drill_down,
        }),
        warnings,
        elapsed,
        result,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn sample_breakdown() -> CostBreakdown {
        CostBreakdown {
            variable: vec![
                CostEntry::new("seed", dec!(80)).with_benchmark(dec!(60), dec!(100), dec!(75)),
                CostEntry::new("fertiliser", dec!(200)).with_benchmark(dec!(150), dec!(250), dec!(210)),
                CostEntry::new("chemicals", dec!(120))
                    .with_benchmark(dec!(90), dec!(150), dec!(110))
                    .with_sub_categories(vec![
                        CostEntry::new("herbicide", dec!(50)).with_benchmark(dec!(30), dec!(70), dec!(45)),
                        CostEntry::new("fungicide", dec!(70)).with_benchmark(dec!(50), dec!(90), dec!(65)),
                    ]),
            ],
            operations: vec![
                CostEntry::new("cultivation", dec!(60)),
                CostEntry::new("harvesting", dec!(70)),
                CostEntry::new("other", dec!(20)),
            ],
        }
    }

    fn basis() -> FarmBasis {
        FarmBasis::new(dec!(100), dec!(8)).unwrap()
    }

    #[test]
    fn test_synthetic_rows_follow_anchors() {
        let out = aggregate(&sample_breakdown(), UnitMode::PerHectare, &basis(), &AggregateOptions::default()).unwrap();
        assert_eq!(
            out.row_names(),
            vec![
                "seed",
                "fertiliser",
                "chemicals",
                "Total Input Costs",
                "cultivation",
                "harvesting",
                "Total Operation Costs",
                "other",
            ]
        );
        assert_eq!(out.row("Total Input Costs").unwrap().value.value, Some(dec!(400)));
        assert_eq!(out.row("Total Operation Costs").unwrap().value.value, Some(dec!(150)));
    }

    #[test]
    fn test_totals_appended_without_anchor() {
        let b = CostBreakdown {
            variable: vec![CostEntry::new("seed", dec!(80))],
            operations: vec![CostEntry::new("drilling", dec!(30))],
        };
        let out = aggregate(&b, UnitMode::PerHectare, &basis(), &AggregateOptions::default()).unwrap();
        assert_eq!(
            out.row_names(),
            vec!["seed", "Total Input Costs", "drilling", "Total Operation Costs"]
        );
    }

    #[test]
    fn test_hidden_group_has_no_rows_but_keeps_total() {
        let options = AggregateOptions {
            show_variable: true,
            show_operations: false,
            drill_down: None,
        };
        let out = aggregate(&sample_breakdown(), UnitMode::PerHectare, &basis(), &options).unwrap();
        assert!(out.rows.iter().all(|r| r.group == CostGroup::Variable));
        assert!(out.row("Total Operation Costs").is_none());
        assert_eq!(out.total_operations.value, Some(dec!(150)));
    }

    #[test]
    fn test_sum_law_in_total_unit() {
        let out = aggregate(&sample_breakdown(), UnitMode::Total, &basis(), &AggregateOptions::default()).unwrap();
        let summed: Decimal = out
            .rows
            .iter()
            .filter(|r| r.group == CostGroup::Variable && r.kind == RowKind::Category)
            .filter_map(|r| r.value.value)
            .sum();
        assert_eq!(out.total_variable.value, Some(summed));
        assert_eq!(summed, dec!(40000));
    }

    #[test]
    fn test_drill_down_replaces_parent_and_keeps_total_after_children() {
        let options = AggregateOptions {
            drill_down: Some("chemicals".to_string()),
            ..AggregateOptions::default()
        };
        let out = aggregate(&sample_breakdown(), UnitMode::PerHectare, &basis(), &options).unwrap();
        let names = out.row_names();
        assert_eq!(&names[..5], &["seed", "fertiliser", "herbicide", "fungicide", "Total Input Costs"]);
        assert_eq!(
            out.row("herbicide").unwrap().kind,
            RowKind::SubCategory {
                parent: "chemicals".to_string()
            }
        );
        assert_eq!(out.total_variable_per_ha, dec!(400));
        assert_eq!(out.drilled_into.as_deref(), Some("chemicals"));
    }

    #[test]
    fn test_drill_down_children_are_benchmarked_independently() {
        let rows = drill_down(&sample_breakdown(), "chemicals", UnitMode::PerTonne, &basis()).unwrap();
        assert_eq!(rows.len(), 2);
        let herbicide = &rows[0];
        // 50 / 8 t/ha
        assert_eq!(herbicide.value.value, Some(dec!(6.25)));
        let bench = herbicide.benchmark.as_ref().unwrap();
        // (50 - 30) / (70 - 30) = 50%
        assert_eq!(bench.position.current_pct, dec!(50));
        assert_eq!(bench.min.value, Some(dec!(3.75)));
    }

    #[test]
    fn test_drill_down_unknown_category() {
        let err = drill_down(&sample_breakdown(), "irrigation", UnitMode::PerHectare, &basis()).unwrap_err();
        assert!(err.to_string().contains("irrigation"));
    }

    #[test]
    fn test_drill_down_without_children_is_empty() {
        let rows = drill_down(&sample_breakdown(), "seed", UnitMode::PerHectare, &basis()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_zero_yield_per_tonne_rows_undefined() {
        let b = FarmBasis::new(dec!(100), dec!(0)).unwrap();
        let out = aggregate(&sample_breakdown(), UnitMode::PerTonne, &b, &AggregateOptions::default()).unwrap();
        assert!(out.rows.iter().all(|r| r.value.value.is_none()));
        assert_eq!(out.total_variable.value, None);
        // canonical totals are still available
        assert_eq!(out.total_variable_per_ha, dec!(400));
    }

    #[test]
    fn test_aggregate_costs_envelope_warns_on_leaf_drill_down() {
        let input = AggregateInput {
            area: dec!(100),
            yield_per_ha: dec!(8),
            unit: UnitMode::PerHectare,
            costs: sample_breakdown(),
            options: AggregateOptions {
                drill_down: Some("seed".to_string()),
                ..AggregateOptions::default()
            },
        };
        let out = aggregate_costs(&input).unwrap();
        assert!(out.warnings.iter().any(|w| w.contains("no sub-categories")));
        assert_eq!(out.result.row("seed").unwrap().kind, RowKind::Category);
    }
}
