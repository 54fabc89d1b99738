//! # Config Commands
//!
//! Application configuration and the owner's pricing settings.
//!
//! Settings travel as percentages (`15` for 15%); the policy stores
//! fractions.

use rust_decimal::Decimal;
use serde::Serialize;
use tracing::{debug, info};
use vitrine_core::{PricingPolicy, SettingsUpdate};

use crate::error::ApiError;
use crate::state::{ConfigState, DbState};

/// Gets the current application configuration.
///
/// ## When Used
/// - App startup (to configure UI)
/// - Currency formatting
pub fn get_config(config: &ConfigState) -> ConfigState {
    debug!("get_config command");
    config.clone()
}

/// Pricing settings as the settings screen shows them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsView {
    pub commission_percent: Decimal,
    pub margin_percent: Decimal,
    pub low_stock_threshold: u32,
}

impl From<&PricingPolicy> for SettingsView {
    fn from(policy: &PricingPolicy) -> Self {
        SettingsView {
            commission_percent: policy.online_commission_rate().percentage().normalize(),
            margin_percent: policy.physical_profit_margin().percentage().normalize(),
            low_stock_threshold: policy.low_stock_threshold(),
        }
    }
}

pub async fn get_settings(db: &DbState) -> Result<SettingsView, ApiError> {
    debug!("get_settings command");
    let policy = db.settings().get().await?;
    Ok(SettingsView::from(&policy))
}

/// Applies a partial settings change.
///
/// All fields are checked before anything is saved; one bad value
/// leaves the stored settings as they were. The sale in progress keeps
/// its policy until the next `start_sale`.
pub async fn update_settings(
    db: &DbState,
    update: SettingsUpdate,
) -> Result<SettingsView, ApiError> {
    debug!(update = ?update, "update_settings command");

    let settings = db.settings();
    let mut policy = settings.get().await?;
    policy.apply(&update)?;
    settings.save(&policy).await?;

    info!(
        commission = %policy.online_commission_rate().percentage(),
        margin = %policy.physical_profit_margin().percentage(),
        low_stock_threshold = policy.low_stock_threshold(),
        "Settings updated"
    );
    Ok(SettingsView::from(&policy))
}
