//! # Unit Conversion
//!
//! Pure conversion between Carton, Roll and Unit for one item.
//!
//! ```text
//!   1 Carton ──► rolls_per_carton Rolls ──► × units_per_roll Units
//!       │                                        ▲
//!       └──────── units_per_carton Units ────────┘
//!                 (= rolls_per_carton × units_per_roll when rolls exist)
//! ```

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{Item, UnitKind};
use crate::validation::ValidationResult;
use crate::MAX_PACK_SIZE;

/// Units in one carton, or `None` when the item does not define it.
///
/// Derived from the roll structure when both ratios are positive,
/// otherwise the independently configured value. A product that does not
/// fit an `i64` counts as undefined.
pub fn units_per_carton(item: &Item) -> Option<i64> {
    if item.rolls_per_carton > 0 && item.units_per_roll > 0 {
        return item.rolls_per_carton.checked_mul(item.units_per_roll);
    }
    (item.units_per_carton > 0).then_some(item.units_per_carton)
}

/// `a × b` for stock counts of `item`, failing instead of wrapping.
pub(crate) fn checked_count(item: &Item, a: i64, b: i64) -> CoreResult<i64> {
    a.checked_mul(b).ok_or_else(|| beyond_range(item))
}

pub(crate) fn beyond_range(item: &Item) -> CoreError {
    CoreError::configuration(&item.name, "stock exceeds the countable range")
}

/// Like [`units_per_carton`] but fails when the ratio is required.
pub fn require_units_per_carton(item: &Item) -> CoreResult<i64> {
    units_per_carton(item)
        .ok_or_else(|| CoreError::configuration(&item.name, "units per carton is not defined"))
}

/// True when cartons split into rolls that split into units.
#[inline]
pub fn has_roll_structure(item: &Item) -> bool {
    item.rolls_per_carton > 0 && item.units_per_roll > 0
}

/// Number of base Units in one `unit`.
///
/// ## Errors
/// `Configuration` when the ratio for `unit` is zero or undefined.
pub fn units_in(item: &Item, unit: UnitKind) -> CoreResult<i64> {
    match unit {
        UnitKind::Carton => require_units_per_carton(item),
        UnitKind::Roll if item.units_per_roll > 0 => Ok(item.units_per_roll),
        UnitKind::Roll => Err(CoreError::configuration(
            &item.name,
            "units per roll is not defined",
        )),
        UnitKind::Unit => Ok(1),
    }
}

/// All stock expressed in base Units.
///
/// Cartons only count when the item defines how many units they hold.
///
/// ## Errors
/// `Configuration` when the total does not fit an `i64`.
pub fn total_units(item: &Item) -> CoreResult<i64> {
    let per_roll = item.units_per_roll.max(0);
    let per_carton = if has_roll_structure(item) {
        checked_count(item, item.rolls_per_carton, item.units_per_roll)?
    } else {
        item.units_per_carton.max(0)
    };

    let rolls = checked_count(item, item.stock_rolls, per_roll)?;
    let cartons = checked_count(item, item.stock_cartons, per_carton)?;
    item.stock_units
        .checked_add(rolls)
        .and_then(|n| n.checked_add(cartons))
        .ok_or_else(|| beyond_range(item))
}

/// Converts a purchase cost for one `unit` into the cost of one base Unit.
///
/// ## Example
/// ```text
///   Carton bought at 2400, 120 units per carton  →  20 per unit
///   Roll bought at 240, 12 units per roll         →  20 per unit
///   Roll bought at 240, units_per_roll = 0        →  ConfigurationError
/// ```
pub fn normalized_unit_cost(item: &Item, unit: UnitKind, cost: Money) -> CoreResult<Money> {
    let divisor = units_in(item, unit)?;
    cost.split_into(divisor)
        .map(|m| m.round_unit_cost())
        .ok_or_else(|| CoreError::configuration(&item.name, format!("cannot divide a {unit} cost")))
}

/// Scales the item's base unit cost up to one sold `unit` (`costAtTime`).
pub fn cost_at_time(item: &Item, unit: UnitKind) -> CoreResult<Money> {
    let factor = units_in(item, unit)?;
    item.base_unit_cost
        .checked_mul_quantity(factor)
        .map(|cost| cost.round_cents())
        .ok_or_else(|| CoreError::invalid_amount("costAtTime", "exceeds the supported range"))
}

// =============================================================================
// Structure Normalisation
// =============================================================================

/// Validated carton structure of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Structure {
    pub rolls_per_carton: i64,
    pub units_per_roll: i64,
    pub units_per_carton: i64,
}

impl Structure {
    /// Normalises the three ratios.
    ///
    /// - both roll ratios positive: `units_per_carton` is their product, an
    ///   explicit different value is rejected
    /// - otherwise the explicit value, or 1 when none is given
    ///
    /// Every ratio, derived or explicit, is at most [`MAX_PACK_SIZE`].
    pub fn normalize(
        rolls_per_carton: i64,
        units_per_roll: i64,
        units_per_carton: Option<i64>,
    ) -> ValidationResult<Self> {
        for (field, value) in [
            ("rollsPerCarton", rolls_per_carton),
            ("unitsPerRoll", units_per_roll),
            ("unitsPerCarton", units_per_carton.unwrap_or(0)),
        ] {
            if value < 0 {
                return Err(ValidationError::Negative {
                    field: field.to_string(),
                });
            }
            if value > MAX_PACK_SIZE {
                return Err(pack_too_large(field));
            }
        }

        let explicit = units_per_carton.filter(|n| *n > 0);

        let units_per_carton = if rolls_per_carton > 0 && units_per_roll > 0 {
            let derived = rolls_per_carton
                .checked_mul(units_per_roll)
                .filter(|n| *n <= MAX_PACK_SIZE)
                .ok_or_else(|| pack_too_large("unitsPerCarton"))?;
            if let Some(value) = explicit.filter(|v| *v != derived) {
                return Err(ValidationError::InvalidFormat {
                    field: "unitsPerCarton".to_string(),
                    reason: format!(
                        "{value} does not match {rolls_per_carton} rolls × {units_per_roll} units"
                    ),
                });
            }
            derived
        } else {
            explicit.unwrap_or(1)
        };

        Ok(Structure {
            rolls_per_carton,
            units_per_roll,
            units_per_carton,
        })
    }
}

fn pack_too_large(field: &str) -> ValidationError {
    ValidationError::OutOfRange {
        field: field.to_string(),
        min: 0,
        max: MAX_PACK_SIZE,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::item;

    #[test]
    fn test_units_per_carton_prefers_roll_structure() {
        assert_eq!(units_per_carton(&item(10, 12, 0, [0, 0, 0])), Some(120));
        assert_eq!(units_per_carton(&item(0, 0, 24, [0, 0, 0])), Some(24));
        assert_eq!(units_per_carton(&item(0, 12, 0, [0, 0, 0])), None);
        assert!(require_units_per_carton(&item(0, 0, 0, [0, 0, 0])).is_err());
    }

    #[test]
    fn test_units_in() {
        let tissue = item(10, 12, 120, [0, 0, 0]);
        assert_eq!(units_in(&tissue, UnitKind::Carton).unwrap(), 120);
        assert_eq!(units_in(&tissue, UnitKind::Roll).unwrap(), 12);
        assert_eq!(units_in(&tissue, UnitKind::Unit).unwrap(), 1);

        let flat = item(0, 0, 24, [0, 0, 0]);
        assert!(matches!(
            units_in(&flat, UnitKind::Roll),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_total_units() {
        assert_eq!(
            total_units(&item(10, 12, 120, [2, 3, 4])).unwrap(),
            2 * 120 + 3 * 12 + 4
        );
        // cartons without a ratio do not count
        assert_eq!(total_units(&item(0, 0, 0, [5, 0, 7])).unwrap(), 7);
    }

    #[test]
    fn test_total_units_beyond_i64_is_configuration_error() {
        let huge = item(10, 12, 120, [i64::MAX / 100, 0, 0]);
        assert!(matches!(
            total_units(&huge),
            Err(CoreError::Configuration { .. })
        ));

        let sum_overflows = item(0, 1, 1, [0, i64::MAX, 1]);
        assert!(matches!(
            total_units(&sum_overflows),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_units_per_carton_product_overflow_is_undefined() {
        let huge = item(4_000_000_000, 4_000_000_000, 0, [0, 0, 0]);
        assert_eq!(units_per_carton(&huge), None);
        assert!(matches!(
            units_in(&huge, UnitKind::Carton),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_normalized_unit_cost() {
        let tissue = item(10, 12, 120, [0, 0, 0]);
        assert_eq!(
            normalized_unit_cost(&tissue, UnitKind::Carton, Money::from_major(2400)).unwrap(),
            Money::from_major(20)
        );
        assert_eq!(
            normalized_unit_cost(&tissue, UnitKind::Roll, Money::from_major(240)).unwrap(),
            Money::from_major(20)
        );

        let no_rolls = item(0, 0, 24, [0, 0, 0]);
        assert!(matches!(
            normalized_unit_cost(&no_rolls, UnitKind::Roll, Money::from_major(240)),
            Err(CoreError::Configuration { .. })
        ));
    }

    #[test]
    fn test_cost_at_time_scales_base_cost() {
        let mut tissue = item(10, 12, 120, [0, 0, 0]);
        tissue.base_unit_cost = Money::from_major(20);
        assert_eq!(cost_at_time(&tissue, UnitKind::Unit).unwrap(), Money::from_major(20));
        assert_eq!(cost_at_time(&tissue, UnitKind::Roll).unwrap(), Money::from_major(240));
        assert_eq!(cost_at_time(&tissue, UnitKind::Carton).unwrap(), Money::from_major(2400));
    }

    #[test]
    fn test_cost_at_time_beyond_decimal_range() {
        let mut tissue = item(10, 12, 120, [0, 0, 0]);
        tissue.base_unit_cost = Money::new(rust_decimal::Decimal::MAX);
        assert!(matches!(
            cost_at_time(&tissue, UnitKind::Carton),
            Err(CoreError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_structure_normalize() {
        let s = Structure::normalize(10, 12, None).unwrap();
        assert_eq!(s.units_per_carton, 120);

        let s = Structure::normalize(10, 12, Some(120)).unwrap();
        assert_eq!(s.units_per_carton, 120);

        assert!(Structure::normalize(10, 12, Some(100)).is_err());
        assert!(Structure::normalize(-1, 12, None).is_err());

        let s = Structure::normalize(0, 0, Some(24)).unwrap();
        assert_eq!(s.units_per_carton, 24);

        let s = Structure::normalize(0, 0, None).unwrap();
        assert_eq!(s.units_per_carton, 1);
    }

    #[test]
    fn test_structure_normalize_bounds_ratios() {
        assert!(matches!(
            Structure::normalize(4_000_000_000, 4_000_000_000, None),
            Err(ValidationError::OutOfRange { .. })
        ));
        // each ratio fits but the product does not
        assert!(matches!(
            Structure::normalize(MAX_PACK_SIZE, 2, None),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(matches!(
            Structure::normalize(0, 0, Some(MAX_PACK_SIZE + 1)),
            Err(ValidationError::OutOfRange { .. })
        ));
        let s = Structure::normalize(1_000, 1_000, None).unwrap();
        assert_eq!(s.units_per_carton, MAX_PACK_SIZE);
    }
}
