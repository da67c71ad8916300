pub mod error;
pub mod types;
pub mod units;
pub mod variance;

#[cfg(feature = "benchmark")]
pub mod benchmark;

#[cfg(feature = "costs")]
pub mod costs;

#[cfg(feature = "costs")]
pub mod financials;

#[cfg(feature = "profitability")]
pub mod profitability;

#[cfg(feature = "budgets")]
pub mod budgets;

#[cfg(feature = "crop_defaults")]
pub mod crop_defaults;

#[cfg(feature = "analysis")]
pub mod analysis;

pub use error::FarmAnalyticsError;
pub use types::*;

/// Standard result type for all farm-analytics operations
pub type FarmAnalyticsResult<T> = Result<T, FarmAnalyticsError>;
