//! # vitrine-core: Pure Business Logic for Vitrine POS
//!
//! This crate is the **heart** of Vitrine POS, a point of sale and
//! inventory manager for independent Natura/Avon resellers. It contains
//! the business rules as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Vitrine POS Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    apps/vitrine-app (commands)                  │   │
//! │  │    add_to_cart, set_item_profit, finalize_sale, get_dashboard   │   │
//! │  └──────────────┬───────────────────────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼──────────────┐  ┌─────────────▼──────────────────┐   │
//! │  │ vitrine-checkout            │  │ vitrine-db                     │   │
//! │  │ SaleFinalizer               │  │ SQLite stores                  │   │
//! │  └──────────────┬──────────────┘  └─────────────┬──────────────────┘   │
//! │                 │                               │                       │
//! │  ┌──────────────▼───────────────────────────────▼──────────────────┐   │
//! │  │               ★ vitrine-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   types    money    policy    cart    calculator               │   │
//! │  │   inventory    metrics    validation    store (traits)         │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Customer, Sale, Brand, Channel)
//! - [`money`] - Exact decimal Money, rounded only for display
//! - [`policy`] - Commission, margin and low-stock threshold
//! - [`cart`] - Cart lines and their rules
//! - [`calculator`] - Subtotal, discount, total and profit
//! - [`inventory`] - Stock status and restock cost averaging
//! - [`metrics`] - Dashboard figures
//! - [`store`] - Persistence traits
//! - [`error`] - Domain error types
//! - [`validation`] - Input parsing and field rules
//!
//! ## Example Usage
//!
//! ```rust
//! use rust_decimal::Decimal;
//! use vitrine_core::calculator::{calculate, Discount};
//! use vitrine_core::{Cart, Channel, Money, PricingPolicy};
//!
//! let policy = PricingPolicy::default();
//! let cart = Cart::new(policy);
//!
//! let totals = calculate(&cart, Channel::Physical, &Discount::percent(Decimal::from(10)), &policy);
//! assert_eq!(totals.total_charged, Money::zero());
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod calculator;
pub mod cart;
pub mod error;
pub mod inventory;
pub mod metrics;
pub mod money;
pub mod policy;
pub mod store;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use calculator::{Discount, DiscountKind, SaleTotals};
pub use cart::{Cart, CartItem};
pub use error::{CartError, CoreError, ValidationError};
pub use inventory::StockStatus;
pub use metrics::DashboardMetrics;
pub use money::{Money, MAX_AMOUNT};
pub use policy::{PricingPolicy, Rate, SettingsUpdate};
pub use store::{CustomerStore, ProductStore, SaleStore, SettingsStore, StoreError, StoreResult};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Owner used when none is configured (single-reseller install).
pub const DEFAULT_OWNER_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Customer name recorded when the selected customer has no name.
pub const UNKNOWN_CUSTOMER_NAME: &str = "Cliente Desconhecido";
