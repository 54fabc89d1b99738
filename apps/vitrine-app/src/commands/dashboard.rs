//! # Dashboard Commands

use serde::Serialize;
use tracing::debug;
use vitrine_core::inventory::inventory_value;
use vitrine_core::{DashboardMetrics, Money};

use crate::error::ApiError;
use crate::state::DbState;

/// Month figures plus the value of the stock on hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(flatten)]
    pub metrics: DashboardMetrics,
    pub inventory_value: Money,
}

/// Gets the dashboard for the current calendar month.
pub async fn get_dashboard(db: &DbState) -> Result<DashboardResponse, ApiError> {
    debug!("get_dashboard command");

    let today = chrono::Local::now().date_naive();
    let policy = db.settings().get().await?;
    let sales = db.sales().list().await?;
    let products = db.products().list().await?;

    Ok(DashboardResponse {
        metrics: DashboardMetrics::compute(&sales, &products, &policy, today),
        inventory_value: inventory_value(&products),
    })
}
