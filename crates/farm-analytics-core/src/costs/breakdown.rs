use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::benchmark::MarketBenchmark;
use crate::error::FarmAnalyticsError;
use crate::types::Money;
use crate::FarmAnalyticsResult;

// ---------------------------------------------------------------------------
// Groups
// ---------------------------------------------------------------------------

/// The two independently-visible cost groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CostGroup {
    /// Verified, benchmarked input costs (seed, fertiliser, chemicals, ...)
    Variable,
    /// Field-operation costs (cultivation, drilling, harvesting, ...)
    Operations,
}

impl CostGroup {
    pub const ALL: [CostGroup; 2] = [CostGroup::Variable, CostGroup::Operations];

    /// Label of the synthetic total row for this group.
    pub fn total_label(&self) -> &'static str {
        match self {
            CostGroup::Variable => "Total Input Costs",
            CostGroup::Operations => "Total Operation Costs",
        }
    }

    /// Category the synthetic total row is inserted after, when present.
    pub fn total_anchor(&self) -> &'static str {
        match self {
            CostGroup::Variable => "chemicals",
            CostGroup::Operations => "harvesting",
        }
    }
}

// ---------------------------------------------------------------------------
// Entries
// ---------------------------------------------------------------------------

/// A named cost category with its current per-hectare figure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostEntry {
    /// Category name, e.g. "seed", "fertiliser", "cultivation"
    pub name: String,
    /// Current cost per hectare
    pub current: Money,
    /// Market range for this category (variable inputs only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub benchmark: Option<MarketBenchmark>,
    /// Nested categories, e.g. chemicals -> herbicide / fungicide
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_categories: Vec<CostEntry>,
}

impl CostEntry {
    pub fn new(name: impl Into<String>, current: Money) -> Self {
        CostEntry {
            name: name.into(),
            current,
            benchmark: None,
            sub_categories: Vec::new(),
        }
    }

    pub fn with_benchmark(mut self, min: Money, max: Money, average: Money) -> Self {
        self.benchmark = Some(MarketBenchmark { min, max, average });
        self
    }

    pub fn with_sub_categories(mut self, children: Vec<CostEntry>) -> Self {
        self.sub_categories = children;
        self
    }

    pub fn has_sub_categories(&self) -> bool {
        !self.sub_categories.is_empty()
    }

    /// Sum of the children's current figures.
    pub fn sub_category_total(&self) -> Money {
        self.sub_categories.iter().map(|c| c.current).sum()
    }

    fn validate(&self, path: &str) -> FarmAnalyticsResult<()> {
        if self.name.trim().is_empty() {
            return Err(FarmAnalyticsError::InvalidInput {
                field: path.to_string(),
                reason: "Cost category name cannot be empty".to_string(),
            });
        }
        if let Some(b) = &self.benchmark {
            b.with_current(self.current).validate(path)?;
        }
        check_unique(&self.sub_categories, path)?;
        for child in &self.sub_categories {
            child.validate(&format!("{}.{}", path, child.name))?;
        }
        Ok(())
    }
}

fn check_unique(entries: &[CostEntry], field: &str) -> FarmAnalyticsResult<()> {
    let mut seen = HashSet::new();
    for e in entries {
        if !seen.insert(e.name.as_str()) {
            return Err(FarmAnalyticsError::InvalidInput {
                field: field.to_string(),
                reason: format!("duplicate cost category '{}'", e.name),
            });
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Breakdown
// ---------------------------------------------------------------------------

/// Ordered per-hectare costs for one crop, split into variable inputs and
/// field operations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CostBreakdown {
    #[serde(default)]
    pub variable: Vec<CostEntry>,
    #[serde(default)]
    pub operations: Vec<CostEntry>,
}

impl CostBreakdown {
    pub fn entries(&self, group: CostGroup) -> &[CostEntry] {
        match group {
            CostGroup::Variable => &self.variable,
            CostGroup::Operations => &self.operations,
        }
    }

    pub fn find(&self, group: CostGroup, name: &str) -> Option<&CostEntry> {
        self.entries(group).iter().find(|e| e.name == name)
    }

    /// Locate a top-level category in either group.
    pub fn locate(&self, name: &str) -> Option<(CostGroup, &CostEntry)> {
        CostGroup::ALL
            .iter()
            .find_map(|g| self.find(*g, name).map(|e| (*g, e)))
    }

    /// Sum of the group's top-level per-hectare figures.
    pub fn total_per_ha(&self, group: CostGroup) -> Money {
        self.entries(group).iter().map(|e| e.current).sum()
    }

    /// Enforce unique names per group and the shape rules for each group.
    /// Operation entries carry a scalar only: no benchmark, no children.
    pub fn validate(&self) -> FarmAnalyticsResult<()> {
        check_unique(&self.variable, "costs.variable")?;
        check_unique(&self.operations, "costs.operations")?;

        for e in &self.variable {
            e.validate(&format!("costs.variable.{}", e.name))?;
        }
        for e in &self.operations {
            let path = format!("costs.operations.{}", e.name);
            if e.benchmark.is_some() {
                return Err(FarmAnalyticsError::InvalidInput {
                    field: path,
                    reason: "Operation costs do not carry a market benchmark".to_string(),
                });
            }
            if e.has_sub_categories() {
                return Err(FarmAnalyticsError::InvalidInput {
                    field: path,
                    reason: "Operation costs do not have sub-categories".to_string(),
                });
            }
            e.validate(&path)?;
        }
        Ok(())
    }

    /// Parents whose children do not add up to the parent figure.
    pub fn inconsistent_parents(&self) -> Vec<(&str, Money, Money)> {
        self.variable
            .iter()
            .filter(|e| e.has_sub_categories() && e.sub_category_total() != e.current)
            .map(|e| (e.name.as_str(), e.current, e.sub_category_total()))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Reference sets
// ---------------------------------------------------------------------------

/// Per-hectare reference figures keyed by category: a budget, or a trailing
/// 3-year average.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCosts {
    #[serde(default)]
    pub variable: BTreeMap<String, Money>,
    #[serde(default)]
    pub operations: BTreeMap<String, Money>,
}

impl ReferenceCosts {
    pub fn values(&self, group: CostGroup) -> &BTreeMap<String, Money> {
        match group {
            CostGroup::Variable => &self.variable,
            CostGroup::Operations => &self.operations,
        }
    }

    pub fn get(&self, group: CostGroup, name: &str) -> Option<Money> {
        self.values(group).get(name).copied()
    }

    pub fn total(&self, group: CostGroup) -> Money {
        self.values(group).values().copied().sum::<Decimal>()
    }

    pub fn is_empty(&self) -> bool {
        self.variable.is_empty() && self.operations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_duplicate_category_rejected() {
        let b = CostBreakdown {
            variable: vec![CostEntry::new("seed", dec!(80)), CostEntry::new("seed", dec!(10))],
            operations: vec![],
        };
        let err = b.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_same_name_allowed_across_groups() {
        let b = CostBreakdown {
            variable: vec![CostEntry::new("other", dec!(5))],
            operations: vec![CostEntry::new("other", dec!(7))],
        };
        assert!(b.validate().is_ok());
    }

    #[test]
    fn test_operation_benchmark_rejected() {
        let b = CostBreakdown {
            variable: vec![],
            operations: vec![CostEntry::new("cultivation", dec!(60)).with_benchmark(dec!(40), dec!(80), dec!(60))],
        };
        assert!(b.validate().is_err());
    }

    #[test]
    fn test_invalid_nested_benchmark_rejected() {
        let b = CostBreakdown {
            variable: vec![CostEntry::new("chemicals", dec!(100)).with_sub_categories(vec![
                CostEntry::new("herbicide", dec!(60)).with_benchmark(dec!(50), dec!(40), dec!(45)),
            ])],
            operations: vec![],
        };
        let err = b.validate().unwrap_err();
        assert!(err.to_string().contains("costs.variable.chemicals.herbicide"));
    }

    #[test]
    fn test_inconsistent_parents_reported() {
        let b = CostBreakdown {
            variable: vec![CostEntry::new("chemicals", dec!(100)).with_sub_categories(vec![
                CostEntry::new("herbicide", dec!(60)),
                CostEntry::new("fungicide", dec!(30)),
            ])],
            operations: vec![],
        };
        assert_eq!(b.inconsistent_parents(), vec![("chemicals", dec!(100), dec!(90))]);
    }

    #[test]
    fn test_locate_searches_both_groups() {
        let b = CostBreakdown {
            variable: vec![CostEntry::new("seed", dec!(80))],
            operations: vec![CostEntry::new("harvesting", dec!(90))],
        };
        assert_eq!(b.locate("harvesting").map(|(g, _)| g), Some(CostGroup::Operations));
        assert!(b.locate("drying").is_none());
    }
}
