//! # Store Traits
//!
//! Persistence seams for products, customers, sales and settings.
//!
//! ```text
//!   vitrine-checkout ──► dyn ProductStore / CustomerStore / SaleStore
//!                                   ▲
//!                                   │ implemented by
//!   vitrine-db ─────────► ProductRepository, CustomerRepository, ...
//! ```
//!
//! Every store instance is scoped to one owner; ids from another owner
//! behave as if they did not exist.

use async_trait::async_trait;
use chrono::NaiveDate;
use thiserror::Error;

use crate::money::Money;
use crate::policy::PricingPolicy;
use crate::types::{
    Customer, CustomerPatch, NewCustomer, NewProduct, NewSale, Product, ProductPatch, Sale,
};

/// Failure reported by a store backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Storage failure: {0}")]
    Backend(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Option<Product>>;

    /// All products, by name.
    async fn list(&self) -> StoreResult<Vec<Product>>;

    async fn create(&self, product: NewProduct) -> StoreResult<Product>;

    async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Atomically lowers stock by `quantity`, never below zero.
    /// Returns the stock left.
    async fn decrement_stock_floored(&self, id: &str, quantity: u32) -> StoreResult<u32>;
}

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get(&self, id: &str) -> StoreResult<Option<Customer>>;

    /// All customers, by name.
    async fn list(&self) -> StoreResult<Vec<Customer>>;

    async fn create(&self, customer: NewCustomer) -> StoreResult<Customer>;

    async fn update(&self, id: &str, patch: CustomerPatch) -> StoreResult<()>;

    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Atomically adds `amount` to `total_spent` and sets `last_purchase_date`.
    async fn record_purchase(&self, id: &str, amount: Money, date: NaiveDate) -> StoreResult<()>;
}

#[async_trait]
pub trait SaleStore: Send + Sync {
    /// Writes the sale and all its items, or nothing.
    async fn create(&self, sale: NewSale) -> StoreResult<Sale>;

    async fn get(&self, id: &str) -> StoreResult<Option<Sale>>;

    /// Newest business date first.
    async fn list(&self) -> StoreResult<Vec<Sale>>;
}

#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// Saved policy, or the defaults when nothing was saved.
    async fn get(&self) -> StoreResult<PricingPolicy>;

    async fn save(&self, policy: &PricingPolicy) -> StoreResult<()>;
}
