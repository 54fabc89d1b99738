//! # Configuration State
//!
//! Stores application configuration loaded at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`VITRINE_*`)
//! 2. Defaults (this file)
//!
//! Pricing settings (commission, margin, low-stock threshold) are not
//! here: they belong to the owner and live in the database.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use vitrine_core::{Money, DEFAULT_OWNER_ID};

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigState {
    /// Owner whose data every command reads and writes.
    pub owner_id: String,

    /// Store name (shown in the header)
    pub store_name: String,

    /// Currency symbol (for display)
    pub currency_symbol: String,

    /// Database file; `None` means the platform data directory.
    pub db_path: Option<PathBuf>,
}

impl Default for ConfigState {
    fn default() -> Self {
        ConfigState {
            owner_id: DEFAULT_OWNER_ID.to_string(),
            store_name: "Vitrine".to_string(),
            currency_symbol: "R$".to_string(),
            db_path: None,
        }
    }
}

impl ConfigState {
    /// Creates a new ConfigState from environment variables and defaults.
    ///
    /// ## Environment Variables
    /// - `VITRINE_OWNER_ID`: Override owner id
    /// - `VITRINE_STORE_NAME`: Override store name
    /// - `VITRINE_CURRENCY_SYMBOL`: Override currency symbol
    /// - `VITRINE_DB_PATH`: Use a custom database file
    pub fn from_env() -> Self {
        let mut config = ConfigState::default();

        if let Some(owner_id) = non_empty_var("VITRINE_OWNER_ID") {
            config.owner_id = owner_id;
        }

        if let Some(store_name) = non_empty_var("VITRINE_STORE_NAME") {
            config.store_name = store_name;
        }

        if let Some(symbol) = non_empty_var("VITRINE_CURRENCY_SYMBOL") {
            config.currency_symbol = symbol;
        }

        if let Some(path) = non_empty_var("VITRINE_DB_PATH") {
            config.db_path = Some(PathBuf::from(path));
        }

        config
    }

    /// Formats an amount for display, rounded to cents.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let config = ConfigState::default();
    /// assert_eq!(config.format_currency(Money::from_cents(2300)), "R$ 23.00");
    /// ```
    pub fn format_currency(&self, amount: Money) -> String {
        if amount.rounded().is_negative() {
            format!("-{} {}", self.currency_symbol, amount.abs())
        } else {
            format!("{} {}", self.currency_symbol, amount.abs())
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}
