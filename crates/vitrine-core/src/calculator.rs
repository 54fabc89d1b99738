//! # Sale Calculator
//!
//! Pure computation of subtotal, discount, total charged and profit from a
//! cart, its channel, a discount and the pricing policy.
//!
//! ## Formulas
//! ```text
//! subtotal        = Σ unit_price × quantity
//! discount        = PERCENT: subtotal × value / 100
//!                   FIXED:   value
//!                   invalid, negative or empty input: 0
//! total_charged   = max(0, subtotal − discount)
//!
//! profit PHYSICAL = (subtotal − Σ cost_price × quantity) − discount
//! profit ONLINE   = every line has a custom profit: Σ custom_profit − discount
//!                   otherwise:                       subtotal × commission − discount
//! ```
//!
//! Profit is never clamped. A negative value is a loss and is reported as
//! such (`SaleTotals::is_loss`).

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartItem};
use crate::money::Money;
use crate::policy::PricingPolicy;
use crate::types::Channel;

// =============================================================================
// Discount
// =============================================================================

/// How a discount value is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiscountKind {
    #[default]
    Percent,
    Fixed,
}

/// A discount as entered: a kind and a non-negative value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Discount {
    pub kind: DiscountKind,
    pub value: Decimal,
}

impl Discount {
    /// No discount.
    pub fn none() -> Self {
        Discount::default()
    }

    pub fn percent(value: Decimal) -> Self {
        Discount {
            kind: DiscountKind::Percent,
            value,
        }
    }

    pub fn fixed(value: Decimal) -> Self {
        Discount {
            kind: DiscountKind::Fixed,
            value,
        }
    }

    /// Reads a discount typed by the user.
    ///
    /// Empty, non-numeric, negative and above-`MAX_AMOUNT` input all mean
    /// "no discount".
    /// A comma is accepted as the decimal separator.
    ///
    /// ## Example
    /// ```rust
    /// use vitrine_core::calculator::{Discount, DiscountKind};
    /// use rust_decimal::Decimal;
    ///
    /// assert_eq!(Discount::parse(DiscountKind::Percent, "10").value, Decimal::from(10));
    /// assert_eq!(Discount::parse(DiscountKind::Fixed, "2,50").value, Decimal::new(250, 2));
    /// assert!(Discount::parse(DiscountKind::Fixed, "abc").value.is_zero());
    /// assert!(Discount::parse(DiscountKind::Fixed, "-5").value.is_zero());
    /// assert!(Discount::parse(DiscountKind::Fixed, "79228162514264337593543950335").value.is_zero());
    /// ```
    pub fn parse(kind: DiscountKind, input: &str) -> Self {
        let value = Decimal::from_str(&input.trim().replace(',', "."))
            .ok()
            .filter(|v| *v >= Decimal::ZERO && !Money::from_decimal(*v).exceeds_max())
            .unwrap_or(Decimal::ZERO);
        Discount { kind, value }
    }

    /// Discount amount on a given subtotal.
    pub fn amount(&self, subtotal: Money) -> Money {
        if self.value < Decimal::ZERO {
            return Money::zero();
        }
        match self.kind {
            DiscountKind::Percent => subtotal.percent(self.value),
            DiscountKind::Fixed => Money::from_decimal(self.value),
        }
    }
}

// =============================================================================
// Sale Totals
// =============================================================================

/// Everything the sale screen and the finalizer need to know about a cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total_charged: Money,
    pub profit: Money,
}

impl SaleTotals {
    /// True when the sale loses money.
    pub fn is_loss(&self) -> bool {
        self.profit.is_negative()
    }
}

// =============================================================================
// Calculations
// =============================================================================

/// Σ unit_price × quantity.
pub fn subtotal(cart: &Cart) -> Money {
    cart.items().iter().map(CartItem::line_total).sum()
}

/// Σ cost_price × quantity.
pub fn total_cost(cart: &Cart) -> Money {
    cart.items().iter().map(CartItem::line_cost).sum()
}

/// `max(0, subtotal − discount)`.
pub fn total_charged(subtotal: Money, discount: Money) -> Money {
    (subtotal - discount).non_negative()
}

/// Profit according to the channel rules.
pub fn profit(cart: &Cart, channel: Channel, discount: Money, policy: &PricingPolicy) -> Money {
    let subtotal = subtotal(cart);
    match channel {
        Channel::Physical => (subtotal - total_cost(cart)) - discount,
        Channel::Online => {
            let items = cart.items();
            let all_custom = !items.is_empty() && items.iter().all(|i| i.custom_profit.is_some());
            if all_custom {
                let custom: Money = items.iter().filter_map(|i| i.custom_profit).sum();
                custom - discount
            } else {
                subtotal.apply_rate(policy.online_commission_rate()) - discount
            }
        }
    }
}

/// Computes all totals for a cart.
///
/// ## Example
/// ```text
/// Physical, cost 10.00, margin 15% → unit price 11.50 (overridden to 11.50)
/// qty 2, discount 10%
///   subtotal      23.00
///   discount       2.30
///   total         20.70
///   profit         0.70   = (23.00 − 20.00) − 2.30
/// ```
pub fn calculate(
    cart: &Cart,
    channel: Channel,
    discount: &Discount,
    policy: &PricingPolicy,
) -> SaleTotals {
    let subtotal = subtotal(cart);
    let discount_amount = discount.amount(subtotal);

    SaleTotals {
        subtotal,
        discount: discount_amount,
        total_charged: total_charged(subtotal, discount_amount),
        profit: profit(cart, channel, discount_amount, policy),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
