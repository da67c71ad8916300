//! Cost data model, aggregation into display rows, and per-category variance.

pub mod aggregate;
pub mod breakdown;
pub mod variance;

pub use aggregate::{aggregate, drill_down, AggregateOptions, AggregatedCosts, CostRow, RowKind};
pub use breakdown::{CostBreakdown, CostEntry, CostGroup, ReferenceCosts};
