use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::FarmAnalyticsError;
use crate::types::{with_metadata, ComputationOutput, Hectares, Money, TonnesPerHectare, UnitMode, UnitValue};
use crate::FarmAnalyticsResult;

// ---------------------------------------------------------------------------
// Farm basis
// ---------------------------------------------------------------------------

/// The physical basis every unit conversion is made against: field area and
/// yield. Constructing one validates both, so conversions never see a
/// non-positive area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FarmBasis {
    area: Hectares,
    yield_per_ha: TonnesPerHectare,
}

impl FarmBasis {
    pub fn new(area: Hectares, yield_per_ha: TonnesPerHectare) -> FarmAnalyticsResult<Self> {
        if area <= dec!(0) {
            return Err(FarmAnalyticsError::InvalidArea(area));
        }
        if yield_per_ha < dec!(0) {
            return Err(FarmAnalyticsError::InvalidInput {
                field: "yield_per_ha".to_string(),
                reason: "Yield cannot be negative".to_string(),
            });
        }
        Ok(FarmBasis { area, yield_per_ha })
    }

    pub fn area(&self) -> Hectares {
        self.area
    }

    pub fn yield_per_ha(&self) -> TonnesPerHectare {
        self.yield_per_ha
    }

    /// Total production in tonnes.
    pub fn production(&self) -> Decimal {
        self.area * self.yield_per_ha
    }

    /// Convert `value` from one unit to another.
    ///
    /// Every pair goes through per-hectare. Identity conversions return the
    /// input untouched.
    pub fn convert(&self, value: Money, from: UnitMode, to: UnitMode) -> FarmAnalyticsResult<Money> {
        if from == to {
            return Ok(value);
        }
        let per_ha = self.to_per_hectare(value, from);
        self.from_per_hectare(per_ha, to)
    }

    /// Like [`convert`](Self::convert) but maps `DivisionUndefined` to
    /// `None`, so a missing yield degrades one figure instead of failing the
    /// whole computation. Any other error still propagates.
    pub fn convert_or_undefined(
        &self,
        value: Money,
        from: UnitMode,
        to: UnitMode,
    ) -> FarmAnalyticsResult<Option<Money>> {
        match self.convert(value, from, to) {
            Ok(v) => Ok(Some(v)),
            Err(FarmAnalyticsError::DivisionUndefined { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Express a canonical per-hectare figure in `unit` as a tagged value.
    pub fn present(&self, per_ha: Money, unit: UnitMode) -> FarmAnalyticsResult<UnitValue> {
        Ok(UnitValue {
            value: self.convert_or_undefined(per_ha, UnitMode::PerHectare, unit)?,
            unit,
        })
    }

    fn to_per_hectare(&self, value: Money, from: UnitMode) -> Money {
        match from {
            UnitMode::PerHectare => value,
            UnitMode::PerTonne => value * self.yield_per_ha,
            UnitMode::Total => value / self.area,
        }
    }

    fn from_per_hectare(&self, per_ha: Money, to: UnitMode) -> FarmAnalyticsResult<Money> {
        match to {
            UnitMode::PerHectare => Ok(per_ha),
            UnitMode::Total => Ok(per_ha * self.area),
            UnitMode::PerTonne => {
                if self.yield_per_ha.is_zero() {
                    Err(FarmAnalyticsError::DivisionUndefined {
                        context: "per-tonne conversion with zero yield".to_string(),
                    })
                } else {
                    Ok(per_ha / self.yield_per_ha)
                }
            }
        }
    }
}

/// Convert a value between per-hectare, per-tonne and total representations.
///
/// Identity conversions short-circuit before any validation, so
/// `convert(v, X, X, ..)` is always `Ok(v)`.
pub fn convert(
    value: Money,
    from: UnitMode,
    to: UnitMode,
    area: Hectares,
    yield_per_ha: TonnesPerHectare,
) -> FarmAnalyticsResult<Money> {
    if from == to {
        return Ok(value);
    }
    FarmBasis::new(area, yield_per_ha)?.convert(value, from, to)
}

// ---------------------------------------------------------------------------
// Envelope: convert a single figure into every unit
// ---------------------------------------------------------------------------

/// Input for a single unit conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionInput {
    pub value: Money,
    pub from: UnitMode,
    pub to: UnitMode,
    pub area: Hectares,
    pub yield_per_ha: TonnesPerHectare,
}

/// The converted figure plus the same figure in every unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionOutput {
    pub converted: UnitValue,
    pub per_hectare: UnitValue,
    pub per_tonne: UnitValue,
    pub total: UnitValue,
}

pub fn convert_value(input: &ConversionInput) -> FarmAnalyticsResult<ComputationOutput<ConversionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let basis = FarmBasis::new(input.area, input.yield_per_ha)?;

    if input.from == UnitMode::PerTonne && basis.yield_per_ha().is_zero() {
        warnings.push("Source value is per tonne but yield is zero; every other unit collapses to 0".to_string());
    }

    let in_unit = |unit: UnitMode| -> FarmAnalyticsResult<UnitValue> {
        Ok(UnitValue {
            value: basis.convert_or_undefined(input.value, input.from, unit)?,
            unit,
        })
    };

    let output = ConversionOutput {
        converted: in_unit(input.to)?,
        per_hectare: in_unit(UnitMode::PerHectare)?,
        per_tonne: in_unit(UnitMode::PerTonne)?,
        total: in_unit(UnitMode::Total)?,
    };

    if !output.per_tonne.is_defined() {
        warnings.push("Yield is zero; per-tonne figures are N/A".to_string());
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Unit conversion via canonical per-hectare basis",
        &serde_json::json!({
            "from": input.from,
            "to": input.to,
            "area": input.area.to_string(),
            "yield_per_ha": input.yield_per_ha.to_string(),
        }),
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn basis() -> FarmBasis {
        FarmBasis::new(dec!(100), dec!(8)).unwrap()
    }

    fn approx(a: Decimal, b: Decimal) -> bool {
        (a - b).abs() < dec!(0.0000001)
    }

    #[test]
    fn test_identity_is_noop_for_every_unit() {
        for unit in UnitMode::ALL {
            assert_eq!(convert(dec!(123.45), unit, unit, dec!(100), dec!(8)).unwrap(), dec!(123.45));
        }
    }

    #[test]
    fn test_identity_skips_validation() {
        // Even an invalid basis is irrelevant when no conversion happens.
        assert_eq!(
            convert(dec!(10), UnitMode::Total, UnitMode::Total, dec!(0), dec!(0)).unwrap(),
            dec!(10)
        );
    }

    #[test]
    fn test_per_hectare_to_total() {
        assert_eq!(basis().convert(dec!(400), UnitMode::PerHectare, UnitMode::Total).unwrap(), dec!(40000));
    }

    #[test]
    fn test_per_hectare_to_per_tonne() {
        assert_eq!(basis().convert(dec!(400), UnitMode::PerHectare, UnitMode::PerTonne).unwrap(), dec!(50));
    }

    #[test]
    fn test_total_to_per_tonne_composes() {
        // 40000 / 100 ha = 400 /ha, / 8 t/ha = 50 /t
        assert_eq!(basis().convert(dec!(40000), UnitMode::Total, UnitMode::PerTonne).unwrap(), dec!(50));
    }

    #[test]
    fn test_per_tonne_to_total() {
        // 50 /t * 8 t/ha * 100 ha
        assert_eq!(basis().convert(dec!(50), UnitMode::PerTonne, UnitMode::Total).unwrap(), dec!(40000));
    }

    #[test]
    fn test_zero_yield_per_tonne_is_division_undefined() {
        let b = FarmBasis::new(dec!(100), dec!(0)).unwrap();
        let err = b.convert(dec!(400), UnitMode::PerHectare, UnitMode::PerTonne).unwrap_err();
        assert!(matches!(err, FarmAnalyticsError::DivisionUndefined { .. }));
        assert_eq!(
            b.convert_or_undefined(dec!(400), UnitMode::PerHectare, UnitMode::PerTonne).unwrap(),
            None
        );
    }

    #[test]
    fn test_invalid_area_fails() {
        let err = convert(dec!(1), UnitMode::Total, UnitMode::PerHectare, dec!(0), dec!(8)).unwrap_err();
        assert!(matches!(err, FarmAnalyticsError::InvalidArea(_)));
        assert!(FarmBasis::new(dec!(-5), dec!(8)).is_err());
    }

    #[test]
    fn test_negative_yield_rejected() {
        assert!(matches!(
            FarmBasis::new(dec!(10), dec!(-1)),
            Err(FarmAnalyticsError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_round_trip_per_hectare_total() {
        let b = FarmBasis::new(dec!(37.5), dec!(7.3)).unwrap();
        for v in [dec!(0), dec!(1), dec!(412.37), dec!(-55.5)] {
            let total = b.convert(v, UnitMode::PerHectare, UnitMode::Total).unwrap();
            let back = b.convert(total, UnitMode::Total, UnitMode::PerHectare).unwrap();
            assert!(approx(back, v), "{} -> {} -> {}", v, total, back);
        }
    }

    #[test]
    fn test_round_trip_through_per_tonne() {
        let b = FarmBasis::new(dec!(12), dec!(3)).unwrap();
        let per_t = b.convert(dec!(100), UnitMode::PerHectare, UnitMode::PerTonne).unwrap();
        let back = b.convert(per_t, UnitMode::PerTonne, UnitMode::PerHectare).unwrap();
        assert!(approx(back, dec!(100)));
    }

    #[test]
    fn test_convert_value_envelope_marks_per_tonne_undefined() {
        let input = ConversionInput {
            value: dec!(400),
            from: UnitMode::PerHectare,
            to: UnitMode::PerTonne,
            area: dec!(100),
            yield_per_ha: dec!(0),
        };
        let out = convert_value(&input).unwrap();
        assert_eq!(out.result.converted.value, None);
        assert_eq!(out.result.total.value, Some(dec!(40000)));
        assert!(out.warnings.iter().any(|w| w.contains("N/A")));
    }
}
