//! # Commands Module
//!
//! All commands exposed to the UI shell.
//!
//! ## Command Organization
//! ```text
//! commands/
//! ├── mod.rs        ◄─── You are here (exports)
//! ├── session.rs    ◄─── Channel, customer, discount, sale date
//! ├── cart.rs       ◄─── Cart manipulation
//! ├── sale.rs       ◄─── Finalize and sale history
//! ├── product.rs    ◄─── Catalog, registration, restock
//! ├── customer.rs   ◄─── Customer registration and listing
//! ├── config.rs     ◄─── App configuration and pricing settings
//! └── dashboard.rs  ◄─── Month figures
//! ```
//!
//! ## State Injection
//! Each command takes only the state it needs:
//! ```rust,ignore
//! // Only needs database
//! async fn list_products(db: &DbState)
//!
//! // Only needs the session
//! async fn clear_cart(session: &SessionState)
//!
//! // Needs both
//! async fn add_to_cart(db: &DbState, session: &SessionState, product_id: String)
//! ```
//!
//! Failures come back as [`ApiError`](crate::error::ApiError), which
//! serializes to `{ code, message }`.

pub mod cart;
pub mod config;
pub mod customer;
pub mod dashboard;
pub mod product;
pub mod sale;
pub mod session;
