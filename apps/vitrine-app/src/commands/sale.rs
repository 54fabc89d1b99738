//! # Sale Commands
//!
//! Recording the composed sale and reading sale history.
//!
//! ## Finalize Outcomes
//! ```text
//! finalize_sale
//!   ├── Ok                   sale + stock + customer written ─► session reset
//!   ├── PartiallyCommitted   sale written, follow-ups failed ──► session reset,
//!   │                                                            warnings listed
//!   ├── Rejected             nothing written ──────────────────► ApiError,
//!   └── SaleNotRecorded      nothing written ──────────────────► session kept
//! ```

use serde::Serialize;
use tracing::{debug, info, warn};
use vitrine_checkout::{FinalizeError, FinalizeRequest};
use vitrine_core::{Sale, SaleTotals};

use crate::error::ApiError;
use crate::state::{CheckoutState, DbState, SaleSession, SessionState};

/// A recorded sale, with whatever follow-up steps failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalizeResponse {
    pub sale: Sale,
    pub totals: SaleTotals,

    /// One line per follow-up step that failed. The sale itself stands;
    /// stock or customer totals need a manual fix.
    pub warnings: Vec<String>,
}

/// Records the current session as a sale.
///
/// The session lock is held for the whole commit. Once the sale row
/// exists the session is reset, even if stock or customer updates
/// failed, so the same sale cannot be submitted twice. The next sale
/// prices with the settings as saved now.
pub async fn finalize_sale(
    db: &DbState,
    session: &SessionState,
    checkout: &CheckoutState,
) -> Result<FinalizeResponse, ApiError> {
    debug!("finalize_sale command");

    let today = chrono::Local::now().date_naive();
    let mut session = session.lock().await;
    let totals = session.totals();

    let outcome = checkout
        .finalizer()
        .finalize(FinalizeRequest {
            cart: &session.cart,
            channel: session.channel,
            customer: session.customer.as_ref(),
            discount: session.discount,
            date_input: &session.date_input,
            today,
        })
        .await;

    let response = match outcome {
        Ok(committed) => FinalizeResponse {
            sale: committed.sale,
            totals: committed.totals,
            warnings: Vec::new(),
        },
        Err(FinalizeError::PartiallyCommitted { sale, failures }) => {
            warn!(
                sale_id = %sale.id,
                failed_steps = failures.len(),
                "Sale recorded with failed follow-up steps"
            );
            FinalizeResponse {
                sale: *sale,
                totals,
                warnings: failures.iter().map(ToString::to_string).collect(),
            }
        }
        Err(err) => {
            checkout.finalizer().reset();
            return Err(err.into());
        }
    };

    match db.settings().get().await {
        Ok(policy) => *session = SaleSession::new(policy, session.channel),
        Err(e) => {
            warn!(error = %e, "Could not reload settings; keeping the current policy");
            session.reset();
        }
    }
    checkout.finalizer().reset();

    info!(
        sale_id = %response.sale.id,
        total = %response.sale.total_amount,
        "Sale finalized"
    );
    Ok(response)
}

/// Lists the owner's sales, newest business date first.
pub async fn list_sales(db: &DbState) -> Result<Vec<Sale>, ApiError> {
    debug!("list_sales command");
    Ok(db.sales().list().await?)
}
