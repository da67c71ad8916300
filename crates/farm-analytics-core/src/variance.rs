use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Money, Percentage};

/// Signed difference between an actual figure and a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VarianceResult {
    /// actual - reference
    pub delta: Money,
    /// delta / reference * 100; zero when the reference is zero
    pub percent: Percentage,
}

/// Which side of the reference an actual figure landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarianceDirection {
    Over,
    Under,
    OnTarget,
}

impl VarianceResult {
    pub fn direction(&self) -> VarianceDirection {
        if self.delta > Decimal::ZERO {
            VarianceDirection::Over
        } else if self.delta < Decimal::ZERO {
            VarianceDirection::Under
        } else {
            VarianceDirection::OnTarget
        }
    }
}

/// Compare `actual` against `reference`.
///
/// The reference can be a budget, a 3-year average, or a market average;
/// the calculation does not care which. A zero reference ("no budget")
/// yields 0% rather than an error. Positive percentages mean the actual
/// exceeded the reference.
pub fn variance(actual: Money, reference: Money) -> VarianceResult {
    let delta = actual - reference;
    let percent = if reference.is_zero() {
        Decimal::ZERO
    } else {
        delta / reference * Decimal::ONE_HUNDRED
    };
    VarianceResult { delta, percent }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_overrun_is_positive() {
        let v = variance(dec!(110), dec!(100));
        assert_eq!(v.delta, dec!(10));
        assert_eq!(v.percent, dec!(10));
        assert_eq!(v.direction(), VarianceDirection::Over);
    }

    #[test]
    fn test_underrun_is_negative() {
        let v = variance(dec!(75), dec!(100));
        assert_eq!(v.delta, dec!(-25));
        assert_eq!(v.percent, dec!(-25));
        assert_eq!(v.direction(), VarianceDirection::Under);
    }

    #[test]
    fn test_zero_reference_is_zero_percent() {
        for actual in [dec!(0), dec!(1), dec!(-40), dec!(99999)] {
            let v = variance(actual, dec!(0));
            assert_eq!(v.percent, dec!(0));
            assert_eq!(v.delta, actual);
        }
    }

    #[test]
    fn test_on_target() {
        assert_eq!(variance(dec!(42), dec!(42)).direction(), VarianceDirection::OnTarget);
    }
}
