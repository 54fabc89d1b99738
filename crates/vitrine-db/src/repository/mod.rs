//! # Repository Module
//!
//! Database repository implementations for Vitrine POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Command / SaleFinalizer                                                │
//! │       │                                                                 │
//! │       │  db.products(owner).get_by_id(id)                               │
//! │       │  or &dyn ProductStore                                           │
//! │       ▼                                                                 │
//! │  ProductRepository { pool, owner_id }                                   │
//! │  ├── get_by_id / list                                                   │
//! │  ├── insert / update / delete                                           │
//! │  └── decrement_stock                                                    │
//! │       │                                                                 │
//! │       │  SQL Query (always filtered by owner_id)                        │
//! │       ▼                                                                 │
//! │  SQLite Database                                                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`ProductRepository`](product::ProductRepository) - Product CRUD and stock
//! - [`CustomerRepository`](customer::CustomerRepository) - Customers and purchase totals
//! - [`SaleRepository`](sale::SaleRepository) - Sales with their line snapshots
//! - [`SettingsRepository`](settings::SettingsRepository) - Pricing policy per owner
//!
//! Each repository also implements the matching `vitrine_core` store trait.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound, Utc};
use rust_decimal::Decimal;
use vitrine_core::validation::SALE_DATE_FORMAT;
use vitrine_core::Money;

use crate::error::{DbError, DbResult};

pub mod customer;
pub mod product;
pub mod sale;
pub mod settings;

/// Money is stored as its exact decimal text.
pub(crate) fn encode_money(value: Money) -> String {
    value.amount().normalize().to_string()
}

pub(crate) fn decode_money(column: &str, raw: &str) -> DbResult<Money> {
    Decimal::from_str(raw.trim())
        .map(Money::from_decimal)
        .map_err(|e| DbError::decode(column, e))
}

pub(crate) fn decode_decimal(column: &str, raw: &str) -> DbResult<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|e| DbError::decode(column, e))
}

/// SQLite integers come back as i64.
pub(crate) fn decode_quantity(column: &str, raw: i64) -> DbResult<u32> {
    u32::try_from(raw).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn encode_date(date: NaiveDate) -> String {
    date.format(SALE_DATE_FORMAT).to_string()
}

pub(crate) fn decode_date(column: &str, raw: &str) -> DbResult<NaiveDate> {
    NaiveDate::parse_from_str(raw, SALE_DATE_FORMAT).map_err(|e| DbError::decode(column, e))
}

pub(crate) fn decode_optional_date(column: &str, raw: Option<&str>) -> DbResult<Option<NaiveDate>> {
    raw.map(|value| decode_date(column, value)).transpose()
}

/// Current time at the precision it is stored with.
pub(crate) fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

/// Fixed-width RFC 3339 so text order matches time order.
pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(column: &str, raw: &str) -> DbResult<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|at| at.with_timezone(&Utc))
        .map_err(|e| DbError::decode(column, e))
}
