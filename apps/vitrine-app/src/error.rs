//! # API Error Type
//!
//! Unified error type for commands.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in Vitrine POS                            │
//! │                                                                         │
//! │  UI shell                    Rust Backend                               │
//! │  ────────                    ────────────                               │
//! │                                                                         │
//! │  invoke('add_to_cart')                                                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  Command Function                                                │  │
//! │  │  Result<T, ApiError>                                             │  │
//! │  │         │                                                        │  │
//! │  │         ▼                                                        │  │
//! │  │  Cart rule? ──────── CartError::OutOfStock ─────────┐           │  │
//! │  │  Bad input? ──────── ValidationError ───────────────┤           │  │
//! │  │  Database? ───────── DbError / StoreError ──────────┼─► ApiError│  │
//! │  │  Finalize? ───────── FinalizeError ─────────────────┘           │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                                                         │
//! │  catch (e) {                                                            │
//! │    // e.code = "OUT_OF_STOCK"                                           │
//! │    // e.message = "Essencial Oud Masculino is out of stock"             │
//! │  }                                                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use serde::Serialize;
use thiserror::Error;
use vitrine_checkout::{FinalizeError, RejectReason};
use vitrine_core::{CartError, CoreError, StoreError, ValidationError};
use vitrine_db::DbError;

/// API error returned from commands.
///
/// ## Serialization
/// ```json
/// {
///   "code": "OUT_OF_STOCK",
///   "message": "Essencial Oud Masculino is out of stock"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "camelCase")]
#[error("[{code:?}] {message}")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Resource not found
    NotFound,

    /// Input validation failed
    ValidationError,

    /// Database operation failed
    DatabaseError,

    /// Cart operation failed
    CartError,

    /// Physical sale of a product with no stock left
    OutOfStock,

    /// Finalize without a customer selected
    MissingCustomer,

    /// Finalize with nothing in the cart
    EmptyCart,

    /// Sale date not in `YYYY-MM-DD` form
    InvalidDate,

    /// Finalize while the previous one is still being recorded
    AlreadyCommitting,

    /// Sale write failed; nothing was recorded, safe to retry
    SaleNotRecorded,

    /// Internal error
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        ApiError::new(ErrorCode::NotFound, format!("{} not found: {}", resource, id))
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        let code = match err {
            CartError::OutOfStock { .. } | CartError::StockLimitExceeded { .. } => {
                ErrorCode::OutOfStock
            }
            CartError::InvalidPrice { .. }
            | CartError::InvalidProfit { .. }
            | CartError::AmountTooLarge { .. } => ErrorCode::ValidationError,
            CartError::ItemNotInCart(_) => ErrorCode::NotFound,
            CartError::ZeroCommissionRate => ErrorCode::CartError,
        };
        ApiError::new(code, err.to_string())
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::validation(err.to_string())
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::ProductNotFound(id) => ApiError::not_found("Product", &id),
            CoreError::CustomerNotFound(id) => ApiError::not_found("Customer", &id),
            CoreError::Cart(e) => e.into(),
            CoreError::Validation(e) => e.into(),
        }
    }
}

/// Converts database errors to API errors.
impl From<DbError> for ApiError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            DbError::UniqueViolation { field, value } => ApiError::validation(format!(
                "{} '{}' already exists",
                field, value
            )),
            DbError::CheckViolation(message) => {
                tracing::warn!("Constraint violation: {}", message);
                ApiError::validation("Value not allowed")
            }
            DbError::ForeignKeyViolation { message } => {
                tracing::error!("Foreign key violation: {}", message);
                ApiError::validation("Invalid reference")
            }
            DbError::ConnectionFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database connection failed")
            }
            DbError::MigrationFailed(_) => {
                ApiError::new(ErrorCode::DatabaseError, "Database migration failed")
            }
            DbError::PoolExhausted => {
                ApiError::new(ErrorCode::DatabaseError, "Database pool exhausted")
            }
            DbError::QueryFailed(e) | DbError::Internal(e) => {
                // Log the actual error but return a generic message
                tracing::error!("Database operation failed: {}", e);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
            DbError::Decode { column, message } => {
                tracing::error!(column = %column, "Stored value unreadable: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Stored data is corrupt")
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => ApiError::not_found(&entity, &id),
            StoreError::Conflict(message) => ApiError::validation(message),
            StoreError::Backend(message) => {
                tracing::error!("Store failure: {}", message);
                ApiError::new(ErrorCode::DatabaseError, "Database operation failed")
            }
        }
    }
}

/// `finalize_sale` reports `PartiallyCommitted` as a recorded sale with
/// warnings; it only reaches this conversion from other callers.
impl From<FinalizeError> for ApiError {
    fn from(err: FinalizeError) -> Self {
        match err {
            FinalizeError::Rejected(reason) => {
                let code = match reason {
                    RejectReason::MissingCustomer => ErrorCode::MissingCustomer,
                    RejectReason::EmptyCart => ErrorCode::EmptyCart,
                    RejectReason::InvalidDate => ErrorCode::InvalidDate,
                    RejectReason::AlreadyCommitting => ErrorCode::AlreadyCommitting,
                };
                ApiError::new(code, reason.to_string())
            }
            FinalizeError::SaleNotRecorded(e) => {
                tracing::error!("Sale not recorded: {}", e);
                ApiError::new(
                    ErrorCode::SaleNotRecorded,
                    "The sale could not be saved. Nothing was changed; try again.",
                )
            }
            FinalizeError::PartiallyCommitted { sale, failures } => ApiError::internal(format!(
                "Sale {} recorded with {} failed follow-up step(s)",
                sale.id,
                failures.len()
            )),
        }
    }
}

/// Failures while bringing the app up, before any command runs.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Could not determine the app data directory")]
    NoDataDir,

    #[error("Could not create the data directory: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Database(#[from] DbError),
}
