//! # Sale Session State
//!
//! The sale being composed on the sale screen: cart, channel, customer,
//! discount and business date.
//!
//! ## Thread Safety
//! The session is wrapped in `Arc<tokio::sync::Mutex<T>>`. `finalize_sale`
//! keeps the lock across the whole commit, so no command can change the
//! cart while its sale is being recorded.
//!
//! ## Session Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Sale Session Operations                              │
//! │                                                                         │
//! │  UI Action                Command                 Session Change        │
//! │  ─────────                ───────                 ──────────────        │
//! │                                                                         │
//! │  Pick channel ──────────► start_sale() ─────────► fresh cart + policy  │
//! │  Click product ─────────► add_to_cart() ────────► cart.add_item        │
//! │  Pick customer ─────────► select_customer() ────► customer = Some      │
//! │  Type discount ─────────► set_discount() ───────► discount parsed      │
//! │  Type date ─────────────► set_sale_date() ──────► date_input           │
//! │  Click finish ──────────► finalize_sale() ──────► reset on success     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{Mutex, MutexGuard};
use vitrine_core::calculator;
use vitrine_core::{Cart, Channel, CustomerRef, Discount, DiscountKind, PricingPolicy, SaleTotals};

/// The sale under composition.
#[derive(Debug, Clone)]
pub struct SaleSession {
    pub cart: Cart,
    pub channel: Channel,
    pub customer: Option<CustomerRef>,
    pub discount: Discount,

    /// Discount text as typed, echoed back to the UI.
    pub discount_input: String,

    /// Business date as typed; empty means today.
    pub date_input: String,
}

impl SaleSession {
    pub fn new(policy: PricingPolicy, channel: Channel) -> Self {
        SaleSession {
            cart: Cart::new(policy),
            channel,
            customer: None,
            discount: Discount::none(),
            discount_input: String::new(),
            date_input: String::new(),
        }
    }

    /// Starts over with the same policy and channel.
    pub fn reset(&mut self) {
        *self = SaleSession::new(*self.cart.policy(), self.channel);
    }

    pub fn set_discount(&mut self, kind: DiscountKind, input: &str) {
        self.discount = Discount::parse(kind, input);
        self.discount_input = input.to_string();
    }

    /// Live totals, recomputed from scratch.
    pub fn totals(&self) -> SaleTotals {
        calculator::calculate(&self.cart, self.channel, &self.discount, self.cart.policy())
    }
}

impl Default for SaleSession {
    fn default() -> Self {
        SaleSession::new(PricingPolicy::default(), Channel::default())
    }
}

/// Shared handle to the one sale session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    session: Arc<Mutex<SaleSession>>,
}

impl SessionState {
    pub fn new(session: SaleSession) -> Self {
        SessionState {
            session: Arc::new(Mutex::new(session)),
        }
    }

    /// Locks the session until the guard is dropped.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let mut session = session_state.lock().await;
    /// session.cart.add_item(&product, session.channel)?;
    /// ```
    pub async fn lock(&self) -> MutexGuard<'_, SaleSession> {
        self.session.lock().await
    }
}
