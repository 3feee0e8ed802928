//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  Quote forms are built in JavaScript, where:                            │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  A quote total that drifts by a cent no longer matches the EFT         │
//! │  payment the customer makes against its reference.                     │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents                                            │
//! │    Tent R1200.00 = 120000 cents, VIP toilet R500.00 = 50000 cents       │
//! │    Totals are exact sums of integers                                    │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use marquee_core::money::Money;
//!
//! let toilet = Money::from_major_minor(500, 0);
//! let tent = Money::from_major_minor(1200, 0);
//!
//! let total: Money = [toilet * 2i64, tent].into_iter().sum();
//! assert_eq!(total, Money::from_major_minor(2200, 0));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money Type
// =============================================================================

/// Represents a monetary value in the smallest currency unit (cents).
///
/// ## Design Decisions
/// - **i64 (signed)**: staff overrides on edit may produce credits
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Single currency**: multi-currency is out of scope for the business
/// - **Saturating operators**: `+`, `-`, `*` and `sum` clamp at the i64
///   bounds instead of panicking. Callers that must report overflow use the
///   `checked_*` methods.
///
/// ## Where Money Flows
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                                                                         │
/// │  CatalogItem.daily_price ──► SelectedItem.unit_price ──► line_total     │
/// │                                                                         │
/// │  Selection.total ──► QuoteRequest.total_amount ──► Customer.total_spent │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    ///
    /// ## Example
    /// ```rust
    /// use marquee_core::money::Money;
    ///
    /// let price = Money::from_cents(1099); // R10.99
    /// assert_eq!(price.cents(), 1099);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units (rands and cents).
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    /// `from_major_minor(-5, 50)` = -R5.50, not -R4.50
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit (rands) portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit (cents) portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use marquee_core::money::Money;
    ///
    /// let day_rate = Money::from_cents(50_000); // R500.00
    /// assert_eq!(day_rate.multiply_quantity(2).cents(), 100_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies by a quantity, or `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, or `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Sums amounts, or `None` as soon as the running total overflows.
    pub fn checked_sum<I>(amounts: I) -> Option<Self>
    where
        I: IntoIterator<Item = Option<Money>>,
    {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, amount| acc.checked_add(amount?))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows rands with two decimal places, e.g. `R1200.00`.
///
/// ## Note
/// This is for logs and emails. The storefront formats with its own locale.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}R{}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

/// Multiplication by quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

/// Summing line totals; an empty iterator sums to zero.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.cents_part(), 99);
    }

    #[test]
    fn test_from_major_minor() {
        assert_eq!(Money::from_major_minor(1200, 0).cents(), 120_000);
        assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(120_000)), "R1200.00");
        assert_eq!(format!("{}", Money::from_cents(505)), "R5.05");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-R5.50");
        assert_eq!(format!("{}", Money::zero()), "R0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3i64).cents(), 3000);

        let mut c = a;
        c += b;
        c -= Money::from_cents(100);
        assert_eq!(c.cents(), 1400);
    }

    #[test]
    fn test_operators_saturate() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max * 2i64, max);
        assert_eq!(max.multiply_quantity(3), max);
        assert_eq!(max + Money::from_cents(1), max);
        assert_eq!(Money::from_cents(i64::MIN) - Money::from_cents(1), Money::from_cents(i64::MIN));

        let total: Money = [max, max].into_iter().sum();
        assert_eq!(total, max);
    }

    #[test]
    fn test_checked_arithmetic() {
        let max = Money::from_cents(i64::MAX);

        assert_eq!(max.checked_multiply_quantity(2), None);
        assert_eq!(max.checked_add(Money::from_cents(1)), None);
        assert_eq!(
            Money::from_cents(50_000).checked_multiply_quantity(2),
            Some(Money::from_cents(100_000))
        );

        let lines = [Some(Money::from_cents(100)), Some(Money::from_cents(250))];
        assert_eq!(Money::checked_sum(lines), Some(Money::from_cents(350)));
        assert_eq!(Money::checked_sum([Some(max), Some(max)]), None);
        assert_eq!(Money::checked_sum([Some(max), None]), None);
        assert_eq!(Money::checked_sum(Vec::<Option<Money>>::new()), Some(Money::zero()));
    }

    #[test]
    fn test_sum_of_empty_is_zero() {
        let total: Money = Vec::<Money>::new().into_iter().sum();
        assert!(total.is_zero());
        assert!(!total.is_positive());
        assert!(!total.is_negative());
    }
}
