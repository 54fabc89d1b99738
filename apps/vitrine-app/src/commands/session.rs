//! # Sale Session Commands
//!
//! Commands that shape the sale around the cart: channel, customer,
//! discount and business date.
//!
//! Every command returns the whole [`SessionResponse`], so the sale
//! screen redraws from one payload with live totals.

use serde::Serialize;
use tracing::debug;
use vitrine_core::{
    Brand, CartItem, Channel, CustomerRef, Discount, DiscountKind, Money, SaleTotals,
};

use crate::error::ApiError;
use crate::state::{CheckoutState, DbState, SaleSession, SessionState};

/// One cart line as the sale screen shows it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
    pub product_id: String,
    pub product_name: String,
    pub brand: Brand,
    pub quantity: u32,
    pub unit_price: Money,
    pub line_total: Money,
    pub custom_profit: Option<Money>,
    pub stock_quantity: u32,
}

impl From<&CartItem> for LineView {
    fn from(item: &CartItem) -> Self {
        LineView {
            product_id: item.product.id.clone(),
            product_name: item.product.name.clone(),
            brand: item.product.brand,
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
            custom_profit: item.custom_profit,
            stock_quantity: item.product.stock_quantity,
        }
    }
}

/// Session snapshot with totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
    pub channel: Channel,
    pub channel_label: &'static str,
    pub customer: Option<CustomerRef>,
    pub discount: Discount,
    pub discount_input: String,
    pub date_input: String,
    pub items: Vec<LineView>,
    pub totals: SaleTotals,
    pub is_loss: bool,
}

impl From<&SaleSession> for SessionResponse {
    fn from(session: &SaleSession) -> Self {
        let totals = session.totals();
        SessionResponse {
            channel: session.channel,
            channel_label: session.channel.label(),
            customer: session.customer.clone(),
            discount: session.discount,
            discount_input: session.discount_input.clone(),
            date_input: session.date_input.clone(),
            items: session.cart.items().iter().map(LineView::from).collect(),
            totals,
            is_loss: totals.is_loss(),
        }
    }
}

/// Starts a new sale on a channel.
///
/// Reloads the owner's pricing settings, so a settings change applies from
/// the next sale on. Whatever was in the cart is dropped.
pub async fn start_sale(
    db: &DbState,
    session: &SessionState,
    checkout: &CheckoutState,
    channel: Channel,
) -> Result<SessionResponse, ApiError> {
    debug!(channel = %channel, "start_sale command");

    let policy = db.settings().get().await?;

    let mut session = session.lock().await;
    *session = SaleSession::new(policy, channel);
    checkout.finalizer().reset();

    Ok(SessionResponse::from(&*session))
}

/// Gets the current session with live totals.
pub async fn get_session(session: &SessionState) -> SessionResponse {
    debug!("get_session command");
    SessionResponse::from(&*session.lock().await)
}

/// Attaches a customer to the sale, or detaches it with `None`.
pub async fn select_customer(
    db: &DbState,
    session: &SessionState,
    customer_id: Option<String>,
) -> Result<SessionResponse, ApiError> {
    debug!(customer_id = ?customer_id, "select_customer command");

    let customer = match customer_id {
        Some(id) => {
            let customer = db
                .customers()
                .get_by_id(&id)
                .await?
                .ok_or_else(|| ApiError::not_found("Customer", &id))?;
            Some(customer.to_ref())
        }
        None => None,
    };

    let mut session = session.lock().await;
    session.customer = customer;
    Ok(SessionResponse::from(&*session))
}

/// Sets the discount from the text typed in the discount field.
///
/// Unreadable or negative input means no discount rather than an error,
/// so totals keep updating while the user types.
pub async fn set_discount(
    session: &SessionState,
    kind: DiscountKind,
    input: String,
) -> SessionResponse {
    debug!(kind = ?kind, input = %input, "set_discount command");

    let mut session = session.lock().await;
    session.set_discount(kind, &input);
    SessionResponse::from(&*session)
}

/// Stores the business date as typed. It is checked at finalization.
pub async fn set_sale_date(session: &SessionState, input: String) -> SessionResponse {
    debug!(input = %input, "set_sale_date command");

    let mut session = session.lock().await;
    session.date_input = input.trim().to_string();
    SessionResponse::from(&*session)
}
