//! # Cart Commands
//!
//! Commands for cart manipulation. They all answer with the whole
//! session, totals included.
//!
//! ## Cart Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Lifecycle                                       │
//! │                                                                         │
//! │  ┌──────────┐     ┌──────────┐     ┌──────────┐     ┌──────────┐       │
//! │  │  Empty   │────►│ In Cart  │────►│ Customer │────►│ Recorded │       │
//! │  │  Cart    │     │          │     │ + Date   │     │   Sale   │       │
//! │  └──────────┘     └──────────┘     └──────────┘     └──────────┘       │
//! │                        │                                 ▲             │
//! │                   add_to_cart                      finalize_sale       │
//! │                   decrease_cart_item               (sale.rs)           │
//! │                   set_item_price                                       │
//! │                   set_item_profit (online only)                        │
//! │                        │                                               │
//! │                        ▼                                               │
//! │                   clear_cart ──────────────────────► (back to empty)   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use tracing::debug;
use vitrine_core::validation::parse_amount;
use vitrine_core::{CartError, Channel};

use super::session::SessionResponse;
use crate::error::ApiError;
use crate::state::{DbState, SessionState};

/// Adds one unit of a product to the cart.
///
/// ## Behavior
/// - Product read fresh from the database, so the stock check sees the
///   current quantity
/// - Already in cart: quantity + 1
/// - Not in cart: new line at the channel's default price
/// - Physical sale: fails with `OUT_OF_STOCK` at zero stock or when the
///   cart would hold more than the stock
pub async fn add_to_cart(
    db: &DbState,
    session: &SessionState,
    product_id: String,
) -> Result<SessionResponse, ApiError> {
    debug!(product_id = %product_id, "add_to_cart command");

    let product = db
        .products()
        .get_by_id(&product_id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", &product_id))?;

    let mut session = session.lock().await;
    let channel = session.channel;
    session.cart.add_item(&product, channel)?;

    Ok(SessionResponse::from(&*session))
}

/// Removes one unit of a product; the line goes away at zero.
pub async fn decrease_cart_item(session: &SessionState, product_id: String) -> SessionResponse {
    debug!(product_id = %product_id, "decrease_cart_item command");

    let mut session = session.lock().await;
    session.cart.decrease_item(&product_id);
    SessionResponse::from(&*session)
}

/// Overrides the unit price of a line with the typed amount.
pub async fn set_item_price(
    session: &SessionState,
    product_id: String,
    input: String,
) -> Result<SessionResponse, ApiError> {
    debug!(product_id = %product_id, input = %input, "set_item_price command");

    let price = parse_amount("unit_price", &input).map_err(|_| CartError::InvalidPrice {
        value: input.trim().to_string(),
    })?;

    let mut session = session.lock().await;
    session.cart.set_unit_price(&product_id, price)?;
    Ok(SessionResponse::from(&*session))
}

/// Sets the profit wanted on an online line; its unit price is derived
/// from the commission rate.
pub async fn set_item_profit(
    session: &SessionState,
    product_id: String,
    input: String,
) -> Result<SessionResponse, ApiError> {
    debug!(product_id = %product_id, input = %input, "set_item_profit command");

    let profit = parse_amount("profit", &input).map_err(|_| CartError::InvalidProfit {
        value: input.trim().to_string(),
    })?;

    let mut session = session.lock().await;
    if session.channel != Channel::Online {
        return Err(ApiError::validation(
            "A profit target can only be set on online sales",
        ));
    }
    session.cart.set_custom_profit(&product_id, profit)?;
    Ok(SessionResponse::from(&*session))
}

/// Clears all items from the cart. Customer, discount and date stay.
pub async fn clear_cart(session: &SessionState) -> SessionResponse {
    debug!("clear_cart command");

    let mut session = session.lock().await;
    session.cart.clear();
    SessionResponse::from(&*session)
}
