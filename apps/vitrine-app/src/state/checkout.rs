//! # Checkout State
//!
//! Holds the one `SaleFinalizer` of the running app. The finalizer is
//! built over the owner-scoped repositories, seen through the core store
//! traits.

use std::sync::Arc;

use vitrine_checkout::SaleFinalizer;

use super::DbState;

pub struct CheckoutState {
    finalizer: SaleFinalizer,
}

impl CheckoutState {
    pub fn new(db: &DbState) -> Self {
        CheckoutState {
            finalizer: SaleFinalizer::new(
                Arc::new(db.products()),
                Arc::new(db.customers()),
                Arc::new(db.sales()),
            ),
        }
    }

    pub fn finalizer(&self) -> &SaleFinalizer {
        &self.finalizer
    }
}
