//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Unit costs are divided and multiplied again:                           │
//! │    1000 / 7 per unit, × 7 units    → drift on every round trip         │
//! │                                                                         │
//! │  OUR SOLUTION: rust_decimal::Decimal                                    │
//! │    Base-10 fixed point, 28 significant digits, explicit rounding       │
//! │    at the two places the ledger snapshots a value:                     │
//! │      • base unit cost  → 6 decimal places                              │
//! │      • costAtTime      → 2 decimal places (bankers rounding)           │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tally_core::money::Money;
//!
//! let price = Money::from_major(250);        // 250.00
//! let line = price.checked_mul_quantity(3).unwrap(); // 750.00
//! let total = line + Money::parse("12.50").unwrap();
//! assert_eq!(total.to_string(), "762.50");
//! ```

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

use crate::error::ValidationError;

/// Decimal places kept on a normalised per-unit cost.
pub const UNIT_COST_SCALE: u32 = 6;

/// Decimal places kept on prices, totals and cost snapshots.
pub const MONEY_SCALE: u32 = 2;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the shop's currency.
///
/// Serialised as a decimal string (`"2400.00"`) so no JSON consumer ever
/// parses it into a float.
///
/// ## Where Money is Used
/// ```text
/// Item.price_* ──► Sale.price_at_time ──► Sale.total_amount ──► Invoice.total_amount
///
/// Purchase.cost_per_unit_kind ──► Item.base_unit_cost ──► Sale.cost_at_time
///
/// Invoice / Purchase / LedgerEntry amounts ──► derived account balances
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Wraps a decimal amount.
    #[inline]
    pub const fn new(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a whole amount in the major unit (naira, dollars, ...).
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert_eq!(Money::from_major(2400).to_string(), "2400.00");
    /// ```
    #[inline]
    pub fn from_major(amount: i64) -> Self {
        Money(Decimal::from(amount))
    }

    /// Parses a decimal string such as `"19.99"`.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// assert!(Money::parse("19.99").is_ok());
    /// assert!(Money::parse("nineteen").is_err());
    /// ```
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        Decimal::from_str(value.trim())
            .map(Money)
            .map_err(|e| ValidationError::InvalidFormat {
                field: "amount".to_string(),
                reason: e.to_string(),
            })
    }

    /// Returns zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Returns the underlying decimal.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Rounds to whole cents using bankers rounding (half to even).
    ///
    /// ```text
    ///   0.125 → 0.12      0.135 → 0.14      2400.005 → 2400.00
    /// ```
    pub fn round_cents(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven),
        )
    }

    /// Rounds to the precision kept on a per-unit cost.
    pub fn round_unit_cost(&self) -> Self {
        Money(
            self.0
                .round_dp_with_strategy(UNIT_COST_SCALE, RoundingStrategy::MidpointNearestEven),
        )
        .normalized()
    }

    /// Multiplies by an integer quantity. `None` when the product leaves
    /// the decimal range.
    ///
    /// ## Example
    /// ```rust
    /// use tally_core::money::Money;
    ///
    /// let unit_price = Money::parse("2.99").unwrap();
    /// assert_eq!(unit_price.checked_mul_quantity(3), Some(Money::parse("8.97").unwrap()));
    /// ```
    #[inline]
    pub fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Adds two amounts. `None` when the sum leaves the decimal range.
    #[inline]
    pub fn checked_add(&self, other: Money) -> Option<Self> {
        self.0.checked_add(other.0).map(Money)
    }

    /// Divides across `parts` equal pieces. `None` when `parts` is not positive.
    pub fn split_into(&self, parts: i64) -> Option<Self> {
        if parts <= 0 {
            return None;
        }
        self.0.checked_div(Decimal::from(parts)).map(Money)
    }

    /// Strips trailing zeros from the scale (`20.000000` → `20`).
    fn normalized(self) -> Self {
        Money(self.0.normalize())
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Always shows two decimal places. Currency symbols are a UI concern.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2}", self.0)
    }
}

impl FromStr for Money {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Money::parse(s)
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Money(amount)
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// SQLite Codec
// =============================================================================
// Stored as canonical decimal TEXT. SQLite has no decimal type and REAL
// would reintroduce float drift.

#[cfg(feature = "sqlx")]
mod sqlite_codec {
    use super::Money;
    use rust_decimal::Decimal;
    use sqlx::encode::IsNull;
    use sqlx::error::BoxDynError;
    use sqlx::sqlite::{Sqlite, SqliteArgumentValue, SqliteTypeInfo, SqliteValueRef};
    use sqlx::{Decode, Encode, Type};
    use std::str::FromStr;

    impl Type<Sqlite> for Money {
        fn type_info() -> SqliteTypeInfo {
            <String as Type<Sqlite>>::type_info()
        }

        fn compatible(ty: &SqliteTypeInfo) -> bool {
            <String as Type<Sqlite>>::compatible(ty)
        }
    }

    impl<'q> Encode<'q, Sqlite> for Money {
        fn encode_by_ref(
            &self,
            buf: &mut Vec<SqliteArgumentValue<'q>>,
        ) -> Result<IsNull, BoxDynError> {
            <String as Encode<'q, Sqlite>>::encode(self.0.to_string(), buf)
        }
    }

    impl<'r> Decode<'r, Sqlite> for Money {
        fn decode(value: SqliteValueRef<'r>) -> Result<Self, BoxDynError> {
            let text = <&str as Decode<'r, Sqlite>>::decode(value)?;
            Ok(Money(Decimal::from_str(text)?))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn m(s: &str) -> Money {
        Money::parse(s).unwrap()
    }

    #[test]
    fn test_display_always_two_places() {
        assert_eq!(Money::from_major(2400).to_string(), "2400.00");
        assert_eq!(m("0.5").to_string(), "0.50");
        assert_eq!(m("-12.3").to_string(), "-12.30");
        assert_eq!(Money::zero().to_string(), "0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_major(10);
        let b = m("2.50");

        assert_eq!(a + b, m("12.50"));
        assert_eq!(a - b, m("7.50"));
        assert_eq!(b.checked_mul_quantity(4), Some(Money::from_major(10)));

        let mut acc = Money::zero();
        acc += a;
        acc -= b;
        assert_eq!(acc, m("7.5"));
    }

    #[test]
    fn test_checked_arithmetic_stops_at_decimal_range() {
        let max = Money::new(Decimal::MAX);
        assert_eq!(max.checked_mul_quantity(2), None);
        assert_eq!(max.checked_mul_quantity(i64::MAX), None);
        assert_eq!(max.checked_add(Money::from_major(1)), None);
        assert_eq!(max.checked_mul_quantity(1), Some(max));
        assert_eq!(
            Money::from_major(crate::MAX_AMOUNT).checked_mul_quantity(crate::MAX_LINE_QUANTITY),
            Some(Money::from_major(1_000_000_000_000_000_000))
        );
    }

    #[test]
    fn test_sum() {
        let lines = vec![m("1.10"), m("2.20"), m("3.30")];
        let total: Money = lines.iter().sum();
        assert_eq!(total, m("6.60"));
        let owned: Money = lines.into_iter().sum();
        assert_eq!(owned, m("6.6"));
    }

    #[test]
    fn test_round_cents_is_bankers() {
        assert_eq!(m("0.125").round_cents(), m("0.12"));
        assert_eq!(m("0.135").round_cents(), m("0.14"));
        assert_eq!(m("19.999").round_cents(), m("20.00"));
    }

    #[test]
    fn test_split_and_round_unit_cost() {
        let per_unit = Money::from_major(2400).split_into(120).unwrap();
        assert_eq!(per_unit.round_unit_cost(), Money::from_major(20));

        let per_unit = Money::from_major(1000).split_into(7).unwrap().round_unit_cost();
        assert_eq!(per_unit, m("142.857143"));

        assert!(Money::from_major(10).split_into(0).is_none());
        assert!(Money::from_major(10).split_into(-3).is_none());
    }

    #[test]
    fn test_sign_checks() {
        assert!(Money::zero().is_zero());
        assert!(m("0.01").is_positive());
        assert!(m("-0.01").is_negative());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Money::parse("abc").is_err());
        assert_eq!("  42.10 ".parse::<Money>().unwrap(), m("42.1"));
    }

    #[test]
    fn test_serializes_as_string() {
        let json = serde_json::to_string(&m("2400.50")).unwrap();
        assert_eq!(json, "\"2400.50\"");
        let back: Money = serde_json::from_str("\"19.99\"").unwrap();
        assert_eq!(back, m("19.99"));
    }
}
