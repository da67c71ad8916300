use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::costs::ReferenceCosts;
use crate::error::FarmAnalyticsError;
use crate::FarmAnalyticsResult;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BudgetStatus {
    #[default]
    Active,
    Inactive,
}

impl BudgetStatus {
    pub fn toggled(self) -> Self {
        match self {
            BudgetStatus::Active => BudgetStatus::Inactive,
            BudgetStatus::Inactive => BudgetStatus::Active,
        }
    }
}

/// A per-hectare cost budget for one crop and season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: String,
    pub name: String,
    /// Crop type the budget applies to, e.g. "winter wheat"
    pub crop_type: String,
    /// Harvest year
    pub season: i32,
    #[serde(default)]
    pub status: BudgetStatus,
    pub costs: ReferenceCosts,
    pub created_on: NaiveDate,
}

/// Budget persistence, injected into whichever layer needs it. The
/// calculation engine itself never touches storage.
pub trait BudgetStore {
    fn list(&self) -> Vec<Budget>;

    /// Insert, or replace the budget with the same id.
    fn save(&mut self, budget: Budget) -> FarmAnalyticsResult<()>;

    /// Flip active/inactive and return the new status.
    fn toggle_status(&mut self, id: &str) -> FarmAnalyticsResult<BudgetStatus>;
}

/// Process-local store. Nothing outlives the process.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBudgetStore {
    budgets: Vec<Budget>,
}

impl InMemoryBudgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store, validating each budget as if it were saved.
    pub fn with_budgets(budgets: Vec<Budget>) -> FarmAnalyticsResult<Self> {
        let mut store = Self::new();
        for b in budgets {
            store.save(b)?;
        }
        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }
}

impl BudgetStore for InMemoryBudgetStore {
    fn list(&self) -> Vec<Budget> {
        self.budgets.clone()
    }

    fn save(&mut self, budget: Budget) -> FarmAnalyticsResult<()> {
        if budget.id.trim().is_empty() {
            return Err(FarmAnalyticsError::InvalidInput {
                field: "budget.id".to_string(),
                reason: "Budget id cannot be empty".to_string(),
            });
        }
        if budget.name.trim().is_empty() {
            return Err(FarmAnalyticsError::InvalidInput {
                field: "budget.name".to_string(),
                reason: "Budget name cannot be empty".to_string(),
            });
        }

        match self.budgets.iter_mut().find(|b| b.id == budget.id) {
            Some(existing) => {
                debug!(id = %budget.id, "replacing budget");
                *existing = budget;
            }
            None => {
                debug!(id = %budget.id, "adding budget");
                self.budgets.push(budget);
            }
        }
        Ok(())
    }

    fn toggle_status(&mut self, id: &str) -> FarmAnalyticsResult<BudgetStatus> {
        let budget = self
            .budgets
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| FarmAnalyticsError::NotFound {
                entity: "Budget".to_string(),
                id: id.to_string(),
            })?;
        budget.status = budget.status.toggled();
        Ok(budget.status)
    }
}

/// The active budget for a crop type; the latest season wins, then the most
/// recently created. Crop types match case-insensitively.
pub fn active_budget_for(store: &dyn BudgetStore, crop_type: &str) -> Option<Budget> {
    store
        .list()
        .into_iter()
        .filter(|b| b.status == BudgetStatus::Active && b.crop_type.eq_ignore_ascii_case(crop_type))
        .max_by_key(|b| (b.season, b.created_on))
}
