//! # Inventory
//!
//! Stock status and restocking math.
//!
//! ## Restock
//! ```text
//! on hand: 5 @ 89.90      incoming: 5 @ 95.90
//!          │                        │
//!          └──────────┬─────────────┘
//!                     ▼
//!   cost = (5 × 89.90 + 5 × 95.90) / 10 = 92.90
//!   stock = 10
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::money::Money;
use crate::policy::PricingPolicy;
use crate::types::{Product, ProductPatch};
use crate::validation::ValidationResult;

/// Where a product's stock stands against the low-stock threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StockStatus {
    OutOfStock,
    Low,
    Ok,
}

impl StockStatus {
    /// `0` is out of stock; `0 < qty < threshold` is low.
    pub fn of(quantity: u32, threshold: u32) -> StockStatus {
        if quantity == 0 {
            StockStatus::OutOfStock
        } else if quantity < threshold {
            StockStatus::Low
        } else {
            StockStatus::Ok
        }
    }

    pub fn for_product(product: &Product, policy: &PricingPolicy) -> StockStatus {
        StockStatus::of(product.stock_quantity, policy.low_stock_threshold())
    }
}

/// Weighted average unit cost after receiving `incoming_qty` units.
///
/// When the combined quantity is zero the incoming cost is returned.
pub fn weighted_average_cost(
    current_cost: Money,
    current_qty: u32,
    incoming_cost: Money,
    incoming_qty: u32,
) -> Money {
    let combined = current_qty.saturating_add(incoming_qty);
    let value = current_cost * current_qty + incoming_cost * incoming_qty;
    value.divide_quantity(combined).unwrap_or(incoming_cost)
}

/// A restock receives at least one unit at a non-negative cost.
pub fn validate_restock(quantity: u32, unit_cost: Money) -> ValidationResult<()> {
    if quantity == 0 {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: i64::from(u32::MAX),
        });
    }
    if unit_cost.is_negative() {
        return Err(ValidationError::Negative {
            field: "unit_cost".to_string(),
        });
    }
    Ok(())
}

/// Builds the patch that receives `quantity` units bought at `unit_cost`.
///
/// Stock grows by `quantity`; cost becomes the weighted average.
pub fn restock(product: &Product, quantity: u32, unit_cost: Money) -> ValidationResult<ProductPatch> {
    validate_restock(quantity, unit_cost)?;

    Ok(ProductPatch {
        stock_quantity: Some(product.stock_quantity.saturating_add(quantity)),
        cost_price: Some(weighted_average_cost(
            product.cost_price,
            product.stock_quantity,
            unit_cost,
            quantity,
        )),
        ..Default::default()
    })
}

/// Σ stock × cost over a catalog.
pub fn inventory_value(products: &[Product]) -> Money {
    products
        .iter()
        .map(|p| p.cost_price * p.stock_quantity)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cart::tests::test_product;

    #[test]
    fn test_stock_status() {
        assert_eq!(StockStatus::of(0, 3), StockStatus::OutOfStock);
        assert_eq!(StockStatus::of(2, 3), StockStatus::Low);
        assert_eq!(StockStatus::of(3, 3), StockStatus::Ok);
        assert_eq!(StockStatus::of(1, 0), StockStatus::Ok);
    }

    #[test]
    fn test_weighted_average_cost() {
        let cost = weighted_average_cost(Money::from_cents(8990), 5, Money::from_cents(9590), 5);
        assert_eq!(cost, Money::from_cents(9290));

        // nothing on hand: incoming cost wins
        let cost = weighted_average_cost(Money::from_cents(1000), 0, Money::from_cents(1200), 4);
        assert_eq!(cost, Money::from_cents(1200));

        assert_eq!(
            weighted_average_cost(Money::from_cents(1000), 0, Money::from_cents(1200), 0),
            Money::from_cents(1200)
        );
    }

    #[test]
    fn test_restock_patch() {
        let product = test_product("1", 1000, 2);
        let patch = restock(&product, 2, Money::from_cents(2000)).unwrap();

        assert_eq!(patch.stock_quantity, Some(4));
        assert_eq!(patch.cost_price, Some(Money::from_cents(1500)));
        assert_eq!(patch.name, None);

        assert!(restock(&product, 0, Money::from_cents(2000)).is_err());
        assert!(restock(&product, 1, Money::from_cents(-1)).is_err());
    }

    #[test]
    fn test_inventory_value() {
        let products = vec![test_product("1", 1000, 2), test_product("2", 250, 4)];
        assert_eq!(inventory_value(&products), Money::from_cents(3000));
    }
}
