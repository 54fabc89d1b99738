//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Decimal Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE ROUNDING PROBLEM                                                   │
//! │                                                                         │
//! │  Floating point:                                                        │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  Integer cents, rounded per step:                                       │
//! │    profit 20.00 at 15% commission → unit price 133.33                   │
//! │    133.33 × 15% = 19.9995 → 20.00 (but 3 items drift by a cent)        │
//! │                                                                         │
//! │  OUR SOLUTION: exact base-10 Decimal, rounded ONCE for display          │
//! │    Every intermediate value keeps full precision                        │
//! │    `rounded()`, `cents()` and `Display` apply the single policy:        │
//! │    2 decimal places, midpoint away from zero                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::money::Money;
//!
//! let price = Money::from_cents(1150); // 11.50
//! let line = price.multiply_quantity(2);
//! assert_eq!(line, Money::from_cents(2300));
//! assert_eq!(line.to_string(), "23.00");
//! ```

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

use crate::policy::Rate;

/// Number of decimal places used when a value is shown or exported.
pub const DISPLAY_DECIMAL_PLACES: u32 = 2;

/// Rounding applied at display time.
pub const DISPLAY_ROUNDING: RoundingStrategy = RoundingStrategy::MidpointAwayFromZero;

/// Largest amount accepted from user input (prices, costs, profits,
/// fixed discounts) and the largest line total a cart will hold.
pub const MAX_AMOUNT: Money =
    Money::from_decimal(Decimal::from_parts(MAX_AMOUNT_UNITS, 0, 0, false, 0));

/// [`MAX_AMOUNT`] in whole currency units.
pub const MAX_AMOUNT_UNITS: u32 = 1_000_000_000;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in the store currency.
///
/// ## Design Decisions
/// - **Signed**: profit can be negative (a loss) and must be surfaced, not clamped
/// - **Unrounded**: arithmetic never rounds; only display does
/// - **Transparent serde**: serializes as the decimal string, e.g. `"23.00"`
///
/// ## Where Money Flows
/// ```text
/// Product.cost_price ──► PricingPolicy default price ──► CartItem.unit_price
///                                                             │
///              Cart subtotal ◄────────────────────────────────┘
///                   │
///                   ├──► discount ──► total charged ──► Customer.total_spent
///                   └──► profit (channel rules) ─────► Sale.profit
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero.
    #[inline]
    pub const fn zero() -> Self {
        Money(Decimal::ZERO)
    }

    /// Wraps an exact decimal amount.
    #[inline]
    pub const fn from_decimal(amount: Decimal) -> Self {
        Money(amount)
    }

    /// Creates a value from cents (two implied decimal places).
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    ///
    /// let price = Money::from_cents(8990);
    /// assert_eq!(price.to_string(), "89.90");
    /// ```
    #[inline]
    pub fn from_cents(cents: i64) -> Self {
        Money(Decimal::new(cents, 2))
    }

    /// Converts a float coming from an untyped boundary.
    ///
    /// Returns `None` for NaN and infinities.
    pub fn try_from_f64(value: f64) -> Option<Self> {
        if !value.is_finite() {
            return None;
        }
        Decimal::from_f64(value).map(Money)
    }

    /// Returns the exact, unrounded amount.
    #[inline]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Applies the display rounding policy.
    pub fn rounded(&self) -> Money {
        Money(
            self.0
                .round_dp_with_strategy(DISPLAY_DECIMAL_PLACES, DISPLAY_ROUNDING),
        )
    }

    /// Returns the rounded value in cents.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// // 133.333... rounds to 133.33
    /// let unit = Money::from_decimal(Decimal::from(20) / Decimal::new(15, 2));
    /// assert_eq!(unit.cents(), 13333);
    /// ```
    ///
    /// Saturates at `i64::MIN` / `i64::MAX`.
    pub fn cents(&self) -> i64 {
        let limit = if self.is_negative() { i64::MIN } else { i64::MAX };
        self.rounded()
            .0
            .saturating_mul(Decimal::ONE_HUNDRED)
            .trunc()
            .to_i64()
            .unwrap_or(limit)
    }

    /// Checks if the value is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Checks if the value is greater than zero.
    #[inline]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// Checks if the value is less than zero.
    #[inline]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// Returns the absolute value.
    #[inline]
    pub fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Floors the value at zero.
    #[inline]
    pub fn non_negative(self) -> Self {
        self.max(Money::zero())
    }

    /// Whether the amount is above [`MAX_AMOUNT`].
    #[inline]
    pub fn exceeds_max(&self) -> bool {
        self.0 > MAX_AMOUNT.0
    }

    /// Multiplies a unit price by a quantity, saturating at the `Decimal`
    /// range.
    #[inline]
    pub fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(Decimal::from(qty)))
    }

    /// Multiplies by a quantity. `None` on overflow.
    pub fn checked_multiply_quantity(&self, qty: u32) -> Option<Self> {
        self.0.checked_mul(Decimal::from(qty)).map(Money)
    }

    /// Divides by a quantity. `None` when `qty` is zero.
    pub fn divide_quantity(&self, qty: u32) -> Option<Self> {
        self.0.checked_div(Decimal::from(qty)).map(Money)
    }

    /// Returns `percent`% of this amount (`percent` is 0-100 scaled).
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::money::Money;
    /// use rust_decimal::Decimal;
    ///
    /// let subtotal = Money::from_cents(2300);
    /// assert_eq!(subtotal.percent(Decimal::from(10)), Money::from_cents(230));
    /// ```
    pub fn percent(&self, percent: Decimal) -> Self {
        Money(self.0.saturating_mul(percent / Decimal::ONE_HUNDRED))
    }

    /// Multiplies by a rate fraction (commission, margin).
    #[inline]
    pub fn apply_rate(&self, rate: Rate) -> Self {
        Money(self.0.saturating_mul(rate.fraction()))
    }

    /// Marks the amount up by a rate: `self × (1 + rate)`.
    #[inline]
    pub fn mark_up(&self, rate: Rate) -> Self {
        Money(self.0.saturating_mul(Decimal::ONE + rate.fraction()))
    }

    /// Divides by a rate fraction. `None` when the rate is zero.
    ///
    /// Used to back-derive a price from a target commission.
    pub fn divide_by_rate(&self, rate: Rate) -> Option<Self> {
        if rate.is_zero() {
            return None;
        }
        self.0.checked_div(rate.fraction()).map(Money)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Shows the rounded amount without a currency symbol.
///
/// ## Note
/// Symbol and locale come from the app configuration
/// (`ConfigState::format_currency`).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut shown = self.rounded().0;
        if shown.is_zero() {
            // no "-0.00"
            shown = Decimal::ZERO;
        }
        shown.rescale(DISPLAY_DECIMAL_PLACES);
        write!(f, "{}", shown)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
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

impl Neg for Money {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Money(-self.0)
    }
}

/// Multiplication by a quantity.
impl Mul<u32> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: u32) -> Self {
        self.multiply_quantity(qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.copied().sum()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
