//! # Product Commands
//!
//! Catalog listing, product registration and restocking.
//!
//! ## Restock Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  invoke('restock_product', { productId, quantity: 4, unitCost: '12' }) │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  inventory::validate_restock (quantity ≥ 1, cost ≥ 0)                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductRepository::restock, one transaction:                          │
//! │    read stock 2 @ 10.00 ─► cost (2×10 + 4×12) / 6 = 11.333...          │
//! │    stock_quantity = stock_quantity + 4                                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ProductView with stock status                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use vitrine_core::inventory::{self, StockStatus};
use vitrine_core::validation::{parse_amount, validate_new_product};
use vitrine_core::{Brand, NewProduct, PricingPolicy, Product};

use crate::error::ApiError;
use crate::state::DbState;

/// Product as the catalog screen shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductView {
    #[serde(flatten)]
    pub product: Product,
    pub stock_status: StockStatus,
}

impl ProductView {
    pub fn new(product: Product, policy: &PricingPolicy) -> Self {
        let stock_status = StockStatus::for_product(&product, policy);
        ProductView {
            product,
            stock_status,
        }
    }
}

/// Product form as submitted; prices are the typed text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    #[serde(default)]
    pub brand: Brand,
    pub category: String,
    #[serde(default)]
    pub stock_quantity: u32,
    pub cost_price: String,
    pub sale_price: String,
    #[serde(default)]
    pub image: Option<String>,
}

/// Lists the catalog sorted by name, with stock alerts.
pub async fn list_products(db: &DbState) -> Result<Vec<ProductView>, ApiError> {
    debug!("list_products command");

    let policy = db.settings().get().await?;
    let products = db.products().list().await?;

    Ok(products
        .into_iter()
        .map(|p| ProductView::new(p, &policy))
        .collect())
}

/// Registers a product.
pub async fn create_product(
    db: &DbState,
    request: CreateProductRequest,
) -> Result<ProductView, ApiError> {
    debug!(name = %request.name, "create_product command");

    let new_product = NewProduct {
        name: request.name.trim().to_string(),
        brand: request.brand,
        category: request.category.trim().to_string(),
        stock_quantity: request.stock_quantity,
        cost_price: parse_amount("cost_price", &request.cost_price)?,
        sale_price: parse_amount("sale_price", &request.sale_price)?,
        image: request.image.filter(|i| !i.trim().is_empty()),
    };
    validate_new_product(&new_product)?;

    let product = db.products().insert(new_product).await?;
    info!(product_id = %product.id, name = %product.name, "Product created");

    let policy = db.settings().get().await?;
    Ok(ProductView::new(product, &policy))
}

/// Receives `quantity` units bought at `unit_cost`; cost becomes the
/// weighted average of old and new stock.
pub async fn restock_product(
    db: &DbState,
    product_id: String,
    quantity: u32,
    unit_cost: String,
) -> Result<ProductView, ApiError> {
    debug!(product_id = %product_id, quantity, "restock_product command");

    let unit_cost = parse_amount("unit_cost", &unit_cost)?;
    inventory::validate_restock(quantity, unit_cost)?;

    let product = db.products().restock(&product_id, quantity, unit_cost).await?;
    info!(
        product_id = %product.id,
        stock = product.stock_quantity,
        cost = %product.cost_price,
        "Product restocked"
    );

    let policy = db.settings().get().await?;
    Ok(ProductView::new(product, &policy))
}
