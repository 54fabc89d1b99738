//! # vitrine-checkout: Sale Finalization
//!
//! Takes a composed cart to a recorded sale:
//!
//! ```text
//! Cart + channel + customer + discount + date
//!         │
//!         ▼
//!   SaleFinalizer::finalize
//!         │  validate ─► write sale ─► decrement stock ─► update customer
//!         ▼
//!   CommittedSale | FinalizeError
//! ```
//!
//! The finalizer only knows the store traits from `vitrine-core`; the app
//! wires it to the SQLite repositories.

pub mod error;
pub mod finalizer;

pub use error::{CommitStep, FinalizeError, RejectReason, StepFailure};
pub use finalizer::{CommittedSale, FinalizeRequest, FinalizeState, SaleFinalizer};
