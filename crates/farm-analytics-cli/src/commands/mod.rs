pub mod analysis;
pub mod benchmark;
pub mod costs;
pub mod profitability;
pub mod units;
