//! # Cart Model
//!
//! The in-progress sale: one line per product, each with a quantity and a
//! unit price that starts at the channel default and can be overridden.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Operation              Rule checked                  State change      │
//! │  ─────────              ────────────                  ────────────      │
//! │  add_item ────────────► stock (physical only) ──────► qty + 1 / new line│
//! │  decrease_item ───────► none ───────────────────────► qty − 1 / removed │
//! │  set_unit_price ──────► price ≥ 0 ──────────────────► unit_price = p    │
//! │  set_custom_profit ───► profit ≥ 0, commission > 0 ─► unit_price derived│
//! │                                                                         │
//! │  A rejected operation returns CartError and leaves the cart unchanged.  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Invariants
//! - At most one line per product
//! - Every line has `quantity ≥ 1`
//! - Physical lines never exceed the product's stock at add time
//! - No line total goes above `MAX_AMOUNT`

use serde::{Deserialize, Serialize};

use crate::error::CartError;
use crate::money::{Money, MAX_AMOUNT};
use crate::policy::PricingPolicy;
use crate::types::{Channel, Product};

/// A line in the cart.
///
/// `product` is the snapshot taken when the line was created; name and
/// cost shown for the line come from it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub product: Product,
    pub quantity: u32,
    pub unit_price: Money,

    /// Profit target for the whole line (online sales).
    pub custom_profit: Option<Money>,
}

impl CartItem {
    pub fn product_id(&self) -> &str {
        &self.product.id
    }

    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        self.unit_price * self.quantity
    }

    /// Cost price × quantity.
    pub fn line_cost(&self) -> Money {
        self.product.cost_price * self.quantity
    }
}

/// The shopping cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    policy: PricingPolicy,
    items: Vec<CartItem>,
}

impl Cart {
    /// Creates an empty cart priced with `policy`.
    pub fn new(policy: PricingPolicy) -> Self {
        Cart {
            policy,
            items: Vec::new(),
        }
    }

    pub fn policy(&self) -> &PricingPolicy {
        &self.policy
    }

    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn item(&self, product_id: &str) -> Option<&CartItem> {
        self.items.iter().find(|i| i.product.id == product_id)
    }

    /// Adds one unit of `product`.
    ///
    /// ## Behavior
    /// - Already in cart: quantity + 1 (custom profit is dropped, price kept)
    /// - Not in cart: new line, quantity 1, channel default price
    /// - Physical channel: fails when stock is 0 or would be exceeded
    pub fn add_item(&mut self, product: &Product, channel: Channel) -> Result<(), CartError> {
        let stock_backed = channel.is_stock_backed();

        if stock_backed && product.is_out_of_stock() {
            return Err(CartError::OutOfStock {
                product: product.name.clone(),
            });
        }

        if let Some(item) = self.items.iter_mut().find(|i| i.product.id == product.id) {
            let new_qty = item.quantity.saturating_add(1);
            if stock_backed && new_qty > product.stock_quantity {
                return Err(CartError::StockLimitExceeded {
                    product: product.name.clone(),
                    available: product.stock_quantity,
                });
            }
            if !line_fits(item.unit_price, new_qty) {
                return Err(too_large(product));
            }
            item.quantity = new_qty;
            item.custom_profit = None;
            return Ok(());
        }

        let unit_price = self.policy.default_unit_price(product, channel);
        if !line_fits(unit_price, 1) {
            return Err(too_large(product));
        }
        self.items.push(CartItem {
            product: product.clone(),
            quantity: 1,
            unit_price,
            custom_profit: None,
        });
        Ok(())
    }

    /// Removes one unit; the line goes away when it reaches zero.
    ///
    /// A product with no line is ignored.
    pub fn decrease_item(&mut self, product_id: &str) {
        let Some(index) = self.items.iter().position(|i| i.product.id == product_id) else {
            return;
        };

        let item = &mut self.items[index];
        if item.quantity > 1 {
            item.quantity -= 1;
            item.custom_profit = None;
        } else {
            self.items.remove(index);
        }
    }

    /// Overrides the unit price of a line and clears its custom profit.
    pub fn set_unit_price(&mut self, product_id: &str, price: Money) -> Result<(), CartError> {
        if price.is_negative() {
            return Err(CartError::InvalidPrice {
                value: price.to_string(),
            });
        }

        let item = self.item_mut(product_id)?;
        if !line_fits(price, item.quantity) {
            return Err(too_large(&item.product));
        }
        item.unit_price = price;
        item.custom_profit = None;
        Ok(())
    }

    /// Sets the profit wanted on a line and derives its unit price:
    /// `unit_price = profit / commission_rate / quantity`.
    ///
    /// ## Example
    /// Profit 20.00 at 15% commission on one unit gives a unit price of
    /// 133.333..., shown as 133.33.
    pub fn set_custom_profit(&mut self, product_id: &str, profit: Money) -> Result<(), CartError> {
        if profit.is_negative() {
            return Err(CartError::InvalidProfit {
                value: profit.to_string(),
            });
        }

        let rate = self.policy.online_commission_rate();
        if rate.is_zero() {
            return Err(CartError::ZeroCommissionRate);
        }

        let item = self.item_mut(product_id)?;
        let line_price = profit
            .divide_by_rate(rate)
            .filter(|price| !price.exceeds_max())
            .ok_or_else(|| too_large(&item.product))?;
        // quantity is at least 1 on every line
        let unit_price = line_price
            .divide_quantity(item.quantity)
            .unwrap_or(line_price);
        item.unit_price = unit_price;
        item.custom_profit = Some(profit);
        Ok(())
    }

    /// Empties the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Number of distinct lines.
    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Units across all lines.
    pub fn total_quantity(&self) -> u32 {
        self.items.iter().map(|i| i.quantity).sum()
    }

    fn item_mut(&mut self, product_id: &str) -> Result<&mut CartItem, CartError> {
        self.items
            .iter_mut()
            .find(|i| i.product.id == product_id)
            .ok_or_else(|| CartError::ItemNotInCart(product_id.to_string()))
    }
}

fn line_fits(unit_price: Money, quantity: u32) -> bool {
    unit_price
        .checked_multiply_quantity(quantity)
        .is_some_and(|total| total <= MAX_AMOUNT)
}

fn too_large(product: &Product) -> CartError {
    CartError::AmountTooLarge {
        product: product.name.clone(),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
