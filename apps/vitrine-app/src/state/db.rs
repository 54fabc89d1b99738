//! # Database State
//!
//! Wraps the `Database` connection together with the owner every command
//! acts for.
//!
//! ## Thread Safety
//! The `Database` struct from `vitrine-db` contains a `SqlitePool` which
//! is inherently thread-safe. Multiple commands can execute queries
//! concurrently without explicit locking.
//!
//! ## Usage in Commands
//! ```rust,ignore
//! pub async fn list_products(db: &DbState) -> Result<Vec<ProductView>, ApiError> {
//!     let products = db.products().list().await?;
//!     ...
//! }
//! ```

use vitrine_db::{
    CustomerRepository, Database, ProductRepository, SaleRepository, SettingsRepository,
};

/// Database handle scoped to the configured owner.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
    owner_id: String,
}

impl DbState {
    pub fn new(db: Database, owner_id: impl Into<String>) -> Self {
        DbState {
            db,
            owner_id: owner_id.into(),
        }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    pub fn products(&self) -> ProductRepository {
        self.db.products(&self.owner_id)
    }

    pub fn customers(&self) -> CustomerRepository {
        self.db.customers(&self.owner_id)
    }

    pub fn sales(&self) -> SaleRepository {
        self.db.sales(&self.owner_id)
    }

    pub fn settings(&self) -> SettingsRepository {
        self.db.settings(&self.owner_id)
    }
}
