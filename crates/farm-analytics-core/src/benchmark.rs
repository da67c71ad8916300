use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FarmAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Money, Percentage};
use crate::variance::{variance, VarianceResult};
use crate::FarmAnalyticsResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Market range for a cost category, without the farm's own figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketBenchmark {
    pub min: Money,
    pub max: Money,
    pub average: Money,
}

impl MarketBenchmark {
    pub fn with_current(&self, current: Money) -> BenchmarkRange {
        BenchmarkRange {
            min: self.min,
            max: self.max,
            average: self.average,
            current,
        }
    }
}

/// Market range plus the farm's current figure. `current` may sit outside
/// `[min, max]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkRange {
    pub min: Money,
    pub max: Money,
    pub average: Money,
    pub current: Money,
}

impl BenchmarkRange {
    /// Check `min <= average <= max`. `current` is deliberately unchecked.
    pub fn validate(&self, field: &str) -> FarmAnalyticsResult<()> {
        if self.min > self.max {
            return Err(FarmAnalyticsError::InvalidInput {
                field: field.to_string(),
                reason: format!("benchmark min ({}) exceeds max ({})", self.min, self.max),
            });
        }
        if self.average < self.min || self.average > self.max {
            return Err(FarmAnalyticsError::InvalidInput {
                field: field.to_string(),
                reason: format!(
                    "benchmark average ({}) lies outside [{}, {}]",
                    self.average, self.min, self.max
                ),
            });
        }
        Ok(())
    }

    pub fn is_degenerate(&self) -> bool {
        self.max == self.min
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MarketPosition {
    AboveAverage,
    /// At or below the market average.
    BelowAverage,
}

/// Where the average and current figures fall within the range, as
/// percentages of `max - min`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkPosition {
    pub average_pct: Percentage,
    /// Unclamped: below 0 or above 100 when current is outside the range.
    pub current_pct: Percentage,
    pub classification: MarketPosition,
}

// ---------------------------------------------------------------------------
// Position
// ---------------------------------------------------------------------------

/// Normalized position of the average and current figures within the range.
///
/// A degenerate range (`max == min`) places both at the 50% midpoint.
pub fn position(range: &BenchmarkRange) -> BenchmarkPosition {
    let span = range.max - range.min;
    let (average_pct, current_pct) = if span.is_zero() {
        (dec!(50), dec!(50))
    } else {
        (
            (range.average - range.min) / span * Decimal::ONE_HUNDRED,
            (range.current - range.min) / span * Decimal::ONE_HUNDRED,
        )
    };

    BenchmarkPosition {
        average_pct,
        current_pct,
        classification: classify(range),
    }
}

pub fn classify(range: &BenchmarkRange) -> MarketPosition {
    if range.current > range.average {
        MarketPosition::AboveAverage
    } else {
        MarketPosition::BelowAverage
    }
}

// ---------------------------------------------------------------------------
// Envelope: evaluate a set of named ranges
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NamedBenchmark {
    pub name: String,
    pub range: BenchmarkRange,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkInput {
    pub benchmarks: Vec<NamedBenchmark>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkEvaluation {
    pub name: String,
    pub range: BenchmarkRange,
    pub position: BenchmarkPosition,
    /// current vs market average
    pub vs_average: VarianceResult,
    pub outside_range: bool,
}

pub fn evaluate_benchmarks(
    input: &BenchmarkInput,
) -> FarmAnalyticsResult<ComputationOutput<Vec<BenchmarkEvaluation>>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.benchmarks.is_empty() {
        return Err(FarmAnalyticsError::InvalidInput {
            field: "benchmarks".to_string(),
            reason: "At least one benchmark range is required".to_string(),
        });
    }

    let mut evaluations = Vec::with_capacity(input.benchmarks.len());
    for b in &input.benchmarks {
        b.range.validate(&b.name)?;
        if b.range.is_degenerate() {
            warnings.push(format!(
                "'{}': benchmark range is degenerate (min == max); positions set to midpoint",
                b.name
            ));
        }
        let outside_range = b.range.current < b.range.min || b.range.current > b.range.max;
        if outside_range {
            warnings.push(format!("'{}': current figure lies outside the market range", b.name));
        }
        evaluations.push(BenchmarkEvaluation {
            name: b.name.clone(),
            range: b.range,
            position: position(&b.range),
            vs_average: variance(b.range.current, b.range.average),
            outside_range,
        });
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Market benchmark range positioning",
        &serde_json::json!({ "benchmarks": input.benchmarks.len() }),
        warnings,
        elapsed,
        evaluations,
    ))
}
