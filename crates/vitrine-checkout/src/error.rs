//! # Finalize Errors
//!
//! ```text
//! FinalizeError
//! ├── Rejected(RejectReason)    nothing written; fix the input and retry
//! ├── SaleNotRecorded           nothing written; retry the whole thing
//! └── PartiallyCommitted        sale written; listed follow-ups failed
//! ```

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use vitrine_core::{Sale, StoreError};

/// Why a sale was refused before anything was written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Error)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectReason {
    #[error("Select a customer before finishing the sale")]
    MissingCustomer,

    #[error("The cart is empty")]
    EmptyCart,

    #[error("Sale date must be YYYY-MM-DD")]
    InvalidDate,

    #[error("This sale is already being recorded")]
    AlreadyCommitting,
}

/// A side effect applied after the sale was written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "step", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CommitStep {
    StockDecrement {
        product_id: String,
        product_name: String,
        quantity: u32,
    },
    CustomerUpdate {
        customer_id: String,
    },
}

impl fmt::Display for CommitStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommitStep::StockDecrement {
                product_name,
                quantity,
                ..
            } => write!(f, "stock decrement of {} × {}", quantity, product_name),
            CommitStep::CustomerUpdate { customer_id } => {
                write!(f, "purchase totals of customer {}", customer_id)
            }
        }
    }
}

/// A follow-up step that failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepFailure {
    pub step: CommitStep,
    pub error: StoreError,
}

impl fmt::Display for StepFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} failed: {}", self.step, self.error)
    }
}

#[derive(Debug, Error)]
pub enum FinalizeError {
    #[error("Sale rejected: {0}")]
    Rejected(#[from] RejectReason),

    #[error("Sale was not recorded: {0}")]
    SaleNotRecorded(#[source] StoreError),

    #[error("Sale {} recorded, but {} follow-up step(s) failed", .sale.id, .failures.len())]
    PartiallyCommitted {
        sale: Box<Sale>,
        failures: Vec<StepFailure>,
    },
}

impl FinalizeError {
    /// Whether the whole finalization can simply be tried again.
    ///
    /// False once the sale exists; a retry would record it twice.
    pub fn is_retryable_whole(&self) -> bool {
        !matches!(self, FinalizeError::PartiallyCommitted { .. })
    }

    /// The recorded sale, if the error happened after it was written.
    pub fn committed_sale(&self) -> Option<&Sale> {
        match self {
            FinalizeError::PartiallyCommitted { sale, .. } => Some(sale.as_ref()),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reject_reason_messages() {
        let err: FinalizeError = RejectReason::EmptyCart.into();
        assert_eq!(err.to_string(), "Sale rejected: The cart is empty");
        assert!(err.is_retryable_whole());
        assert!(err.committed_sale().is_none());
    }

    #[test]
    fn test_step_failure_display() {
        let failure = StepFailure {
            step: CommitStep::StockDecrement {
                product_id: "p1".to_string(),
                product_name: "Kaiak".to_string(),
                quantity: 2,
            },
            error: StoreError::Backend("disk I/O error".to_string()),
        };
        assert_eq!(
            failure.to_string(),
            "stock decrement of 2 × Kaiak failed: Storage failure: disk I/O error"
        );
    }
}
