//! # Error Types
//!
//! Domain-specific error types for vitrine-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  vitrine-core errors (this file)                                        │
//! │  ├── CoreError        - General domain errors                           │
//! │  ├── CartError        - Cart rule violations (stock, price, profit)     │
//! │  └── ValidationError  - Input validation failures                       │
//! │                                                                         │
//! │  vitrine-core store errors (store.rs)                                   │
//! │  └── StoreError       - What any persistence backend reports            │
//! │                                                                         │
//! │  vitrine-checkout errors                                                │
//! │  └── FinalizeError    - Rejected / not recorded / partially committed   │
//! │                                                                         │
//! │  vitrine-db errors                                                      │
//! │  └── DbError          - Database operation failures                     │
//! │                                                                         │
//! │  App errors                                                             │
//! │  └── ApiError         - What the UI sees (serialized)                   │
//! │                                                                         │
//! │  Flow: ValidationError → CartError → CoreError → ApiError → UI          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (product name, id, value)
//! 3. Errors are enum variants, never String
//! 4. A rejected cart operation leaves the cart unchanged

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Product cannot be found.
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Customer cannot be found.
    #[error("Customer not found: {0}")]
    CustomerNotFound(String),

    /// Cart rule violation (wraps CartError).
    #[error(transparent)]
    Cart(#[from] CartError),

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Cart Error
// =============================================================================

/// Cart rule violations.
///
/// ## User Workflow
/// ```text
/// Tap product (physical sale, stock: 2)
///      │
///      ▼
/// Line already at qty 2
///      │
///      ▼
/// StockLimitExceeded { product: "Essencial Oud", available: 2 }
///      │
///      ▼
/// UI shows: "Only 2 Essencial Oud in stock", cart untouched
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Physical sale of a product with zero stock.
    #[error("{product} is out of stock")]
    OutOfStock { product: String },

    /// Physical sale asking for more units than stock holds.
    #[error("Only {available} {product} in stock")]
    StockLimitExceeded { product: String, available: u32 },

    /// Unit price below zero.
    #[error("Invalid unit price: {value}")]
    InvalidPrice { value: String },

    /// Desired profit below zero.
    #[error("Invalid profit amount: {value}")]
    InvalidProfit { value: String },

    /// A line total would go above the largest amount a sale may hold.
    #[error("Amount too large for {product}")]
    AmountTooLarge { product: String },

    /// Custom profit requested while the commission rate is zero.
    #[error("Commission rate is zero; a price cannot be derived from a profit target")]
    ZeroCommissionRate,

    /// The product has no line in the cart.
    #[error("Product {0} is not in the cart")]
    ItemNotInCart(String),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// These errors occur when user input doesn't meet requirements.
/// Used for early validation before business logic runs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    Negative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid date).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cart_error_messages() {
        let err = CartError::StockLimitExceeded {
            product: "Essencial Oud Masculino".to_string(),
            available: 2,
        };
        assert_eq!(err.to_string(), "Only 2 Essencial Oud Masculino in stock");

        let err = CartError::OutOfStock {
            product: "Hidratante Todo Dia".to_string(),
        };
        assert_eq!(err.to_string(), "Hidratante Todo Dia is out of stock");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::Required {
            field: "name".to_string(),
        };
        assert_eq!(err.to_string(), "name is required");

        let err = ValidationError::OutOfRange {
            field: "commission".to_string(),
            min: 0,
            max: 100,
        };
        assert_eq!(err.to_string(), "commission must be between 0 and 100");
    }

    #[test]
    fn test_errors_convert_to_core_error() {
        let core_err: CoreError = ValidationError::Required {
            field: "name".to_string(),
        }
        .into();
        assert!(matches!(core_err, CoreError::Validation(_)));

        let core_err: CoreError = CartError::ZeroCommissionRate.into();
        assert!(matches!(core_err, CoreError::Cart(CartError::ZeroCommissionRate)));
    }
}
