//! # Validation Module
//!
//! Input validation and parsing for Vitrine POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: App command                                                   │
//! │  ├── Text → number/date parsing (THIS MODULE)                           │
//! │  └── Field rules for new products and customers (THIS MODULE)           │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Domain (cart, policy)                                         │
//! │  └── Business rules: stock, non-negative price, commission > 0          │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                             │
//! │  ├── NOT NULL / CHECK constraints                                       │
//! │  └── Foreign key constraints                                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use vitrine_core::validation::{parse_amount, validate_product_name};
//!
//! validate_product_name("Kaiak Urbe Desodorante").unwrap();
//! let price = parse_amount("price", "11,50").unwrap();
//! assert_eq!(price.cents(), 1150);
//! ```

use std::str::FromStr;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::money::{Money, MAX_AMOUNT_UNITS};
use crate::types::{NewCustomer, NewProduct};

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Business dates are exchanged as `YYYY-MM-DD`.
pub const SALE_DATE_FORMAT: &str = "%Y-%m-%d";

const MAX_NAME_LEN: usize = 200;
const MAX_CATEGORY_LEN: usize = 100;

// =============================================================================
// String Validators
// =============================================================================

fn require_text(field: &str, value: &str, max: usize) -> ValidationResult<()> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(())
}

/// Validates a product name.
///
/// ## Rules
/// - Must not be empty
/// - At most 200 characters
pub fn validate_product_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, MAX_NAME_LEN)
}

/// Validates a customer name.
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    require_text("name", name, MAX_NAME_LEN)
}

/// Validates a product category (`"Maquiagem"` or `"Perfumaria - Masculino"`).
pub fn validate_category(category: &str) -> ValidationResult<()> {
    require_text("category", category, MAX_CATEGORY_LEN)
}

/// Validates an optional e-mail address. Only the shape is checked.
pub fn validate_email(email: Option<&str>) -> ValidationResult<()> {
    match email.map(str::trim) {
        None | Some("") => Ok(()),
        Some(value) if value.contains('@') && !value.starts_with('@') && !value.ends_with('@') => {
            Ok(())
        }
        Some(_) => Err(ValidationError::InvalidFormat {
            field: "email".to_string(),
            reason: "must look like name@domain".to_string(),
        }),
    }
}

// =============================================================================
// Numeric Parsers
// =============================================================================

/// Parses a decimal typed by the user. Accepts `,` as the decimal separator.
///
/// ## Rules
/// - Empty input → `Required`
/// - Anything `Decimal` cannot read (letters, NaN, infinity) → `InvalidFormat`
pub fn parse_decimal(field: &str, input: &str) -> ValidationResult<Decimal> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    Decimal::from_str(&input.replace(',', ".")).map_err(|_| ValidationError::InvalidFormat {
        field: field.to_string(),
        reason: format!("'{}' is not a number", input),
    })
}

/// Parses a non-negative money amount, at most [`MAX_AMOUNT`](crate::money::MAX_AMOUNT).
///
/// ## Example
/// ```rust
/// use vitrine_core::validation::parse_amount;
///
/// assert!(parse_amount("price", "89.90").is_ok());
/// assert!(parse_amount("price", "-1").is_err());
/// assert!(parse_amount("price", "inf").is_err());
/// assert!(parse_amount("price", "79228162514264337593543950335").is_err());
/// ```
pub fn parse_amount(field: &str, input: &str) -> ValidationResult<Money> {
    let value = parse_decimal(field, input)?;
    let amount = ensure_non_negative(field, Money::from_decimal(value))?;
    if amount.exceeds_max() {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: i64::from(MAX_AMOUNT_UNITS),
        });
    }
    Ok(amount)
}

/// Parses a percentage in `[0, 100]`.
pub fn parse_percentage(field: &str, input: &str) -> ValidationResult<Decimal> {
    let value = parse_decimal(field, input)?;
    if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
        return Err(ValidationError::OutOfRange {
            field: field.to_string(),
            min: 0,
            max: 100,
        });
    }
    Ok(value)
}

/// Rejects negative amounts.
pub fn ensure_non_negative(field: &str, amount: Money) -> ValidationResult<Money> {
    if amount.is_negative() {
        return Err(ValidationError::Negative {
            field: field.to_string(),
        });
    }
    Ok(amount)
}

// =============================================================================
// Date Parsers
// =============================================================================

/// Parses a sale's business date.
///
/// ## Rules
/// - Empty input → `today`
/// - Otherwise exactly `YYYY-MM-DD`
///
/// ## Example
/// ```rust
/// use chrono::NaiveDate;
/// use vitrine_core::validation::parse_sale_date;
///
/// let today = NaiveDate::from_ymd_opt(2026, 3, 14).unwrap();
/// assert_eq!(parse_sale_date("", today).unwrap(), today);
/// assert_eq!(
///     parse_sale_date("2026-02-28", today).unwrap(),
///     NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
/// );
/// assert!(parse_sale_date("28/02/2026", today).is_err());
/// ```
pub fn parse_sale_date(input: &str, today: NaiveDate) -> ValidationResult<NaiveDate> {
    let input = input.trim();

    if input.is_empty() {
        return Ok(today);
    }

    NaiveDate::parse_from_str(input, SALE_DATE_FORMAT).map_err(|_| ValidationError::InvalidFormat {
        field: "date".to_string(),
        reason: "expected YYYY-MM-DD".to_string(),
    })
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product before it is created.
pub fn validate_new_product(product: &NewProduct) -> ValidationResult<()> {
    validate_product_name(&product.name)?;
    validate_category(&product.category)?;
    ensure_non_negative("cost_price", product.cost_price)?;
    ensure_non_negative("sale_price", product.sale_price)?;
    Ok(())
}

/// Validates a customer before it is created.
pub fn validate_new_customer(customer: &NewCustomer) -> ValidationResult<()> {
    validate_customer_name(&customer.name)?;
    validate_email(customer.email.as_deref())?;
    Ok(())
}

// =============================================================================
// UUID Validators
// =============================================================================

/// Validates a UUID string format.
///
/// ## Example
/// ```rust
/// use vitrine_core::validation::validate_uuid;
///
/// assert!(validate_uuid("550e8400-e29b-41d4-a716-446655440000").is_ok());
/// assert!(validate_uuid("not-a-uuid").is_err());
/// ```
pub fn validate_uuid(id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "id".to_string(),
        });
    }

    uuid::Uuid::parse_str(id).map_err(|_| ValidationError::InvalidFormat {
        field: "id".to_string(),
        reason: "must be a valid UUID".to_string(),
    })?;

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
