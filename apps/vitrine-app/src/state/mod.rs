//! # State Module
//!
//! Manages application state for the command layer.
//!
//! Instead of a single `AppState` struct containing everything, each
//! command takes only the state types it touches.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌──────────────┐ ┌──────────────┐ ┌───────────────┐ ┌──────────────┐  │
//! │  │   DbState    │ │ SessionState │ │ CheckoutState │ │ ConfigState  │  │
//! │  │              │ │              │ │               │ │              │  │
//! │  │  Database    │ │  Arc<Mutex<  │ │ SaleFinalizer │ │  owner_id    │  │
//! │  │  owner_id    │ │  SaleSession │ │ (double-submit│ │  store_name  │  │
//! │  │              │ │  >>          │ │  guard)       │ │  currency    │  │
//! │  └──────────────┘ └──────────────┘ └───────────────┘ └──────────────┘  │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • SessionState: Protected by an async Mutex                           │
//! │  • CheckoutState: Finalizer state is atomic                            │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod checkout;
mod config;
mod db;
mod session;

pub use checkout::CheckoutState;
pub use config::ConfigState;
pub use db::DbState;
pub use session::{SaleSession, SessionState};
