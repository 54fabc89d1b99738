//! # Customer Commands

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::Deserialize;
use tracing::{debug, info};
use vitrine_core::validation::validate_new_customer;
use vitrine_core::{Customer, NewCustomer};

use crate::error::ApiError;
use crate::state::DbState;

/// Customer form as submitted. Blank optional fields count as absent.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateCustomerRequest {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub notes: Option<String>,
    pub birth_date: Option<NaiveDate>,
    pub tags: BTreeSet<String>,
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Registers a customer. No tags means tagged "Novo".
pub async fn create_customer(
    db: &DbState,
    request: CreateCustomerRequest,
) -> Result<Customer, ApiError> {
    debug!(name = %request.name, "create_customer command");

    let new_customer = NewCustomer {
        name: request.name.trim().to_string(),
        phone: blank_to_none(request.phone),
        email: blank_to_none(request.email),
        notes: blank_to_none(request.notes),
        birth_date: request.birth_date,
        tags: request.tags,
    };
    validate_new_customer(&new_customer)?;

    let customer = db.customers().insert(new_customer).await?;
    info!(customer_id = %customer.id, "Customer created");
    Ok(customer)
}

/// Lists customers sorted by name.
pub async fn list_customers(db: &DbState) -> Result<Vec<Customer>, ApiError> {
    debug!("list_customers command");
    Ok(db.customers().list().await?)
}
