//! # Sale Finalizer
//!
//! Validates a composed sale, records it, then applies its side effects.
//!
//! ## State Machine
//! ```text
//!   Composing ──► Validating ──► Committing ──► Done
//!                     │               │
//!                     ▼               ▼ (sale write failed)
//!                  Rejected        Composing
//! ```
//!
//! ## Commit Order
//! ```text
//! 1. SaleStore::create            fails → SaleNotRecorded, nothing else runs
//! 2. ProductStore::decrement...   physical only, one call per line,
//!                                 failures logged and collected
//! 3. CustomerStore::record_purchase
//!                                 total_spent += total charged,
//!                                 last_purchase_date = sale date
//! ```
//! Steps 2 and 3 are not rolled back when one of them fails; the sale
//! stands and the caller receives `PartiallyCommitted` with the list.

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, error, info, warn};
use vitrine_core::calculator::{self, Discount, SaleTotals};
use vitrine_core::validation::parse_sale_date;
use vitrine_core::{
    Cart, Channel, CustomerRef, CustomerStore, NewSale, ProductStore, Sale, SaleItem, SaleStore,
    UNKNOWN_CUSTOMER_NAME,
};

use crate::error::{CommitStep, FinalizeError, RejectReason, StepFailure};

/// Where the finalizer stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(u8)]
pub enum FinalizeState {
    Composing = 0,
    Validating = 1,
    Committing = 2,
    Done = 3,
    Rejected = 4,
}

impl FinalizeState {
    fn from_u8(value: u8) -> FinalizeState {
        match value {
            1 => FinalizeState::Validating,
            2 => FinalizeState::Committing,
            3 => FinalizeState::Done,
            4 => FinalizeState::Rejected,
            _ => FinalizeState::Composing,
        }
    }
}

/// Everything needed to finalize one sale.
#[derive(Debug, Clone, Copy)]
pub struct FinalizeRequest<'a> {
    pub cart: &'a Cart,
    pub channel: Channel,
    pub customer: Option<&'a CustomerRef>,
    pub discount: Discount,

    /// Business date as typed; empty means `today`.
    pub date_input: &'a str,
    pub today: NaiveDate,
}

/// A sale that was recorded with every side effect applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommittedSale {
    pub sale: Sale,
    pub totals: SaleTotals,
}

/// Records sales against the store traits.
///
/// ## Double Submit
/// Only one `finalize` runs at a time per finalizer. A second call made
/// while one is in flight is rejected with `AlreadyCommitting`.
pub struct SaleFinalizer {
    products: Arc<dyn ProductStore>,
    customers: Arc<dyn CustomerStore>,
    sales: Arc<dyn SaleStore>,
    in_flight: AtomicBool,
    state: AtomicU8,
}

impl SaleFinalizer {
    pub fn new(
        products: Arc<dyn ProductStore>,
        customers: Arc<dyn CustomerStore>,
        sales: Arc<dyn SaleStore>,
    ) -> Self {
        SaleFinalizer {
            products,
            customers,
            sales,
            in_flight: AtomicBool::new(false),
            state: AtomicU8::new(FinalizeState::Composing as u8),
        }
    }

    pub fn state(&self) -> FinalizeState {
        FinalizeState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// True while a finalization is running; the UI disables its button.
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Back to `Composing` for the next sale. Ignored while busy.
    pub fn reset(&self) {
        if !self.is_busy() {
            self.set_state(FinalizeState::Composing);
        }
    }

    fn set_state(&self, state: FinalizeState) {
        self.state.store(state as u8, Ordering::Release);
    }

    /// Finalizes one sale.
    ///
    /// ## Returns
    /// - `Ok(CommittedSale)`: sale written, stock and customer updated
    /// - `Err(Rejected)`: validation failed or another finalization is running
    /// - `Err(SaleNotRecorded)`: the sale write failed; nothing changed
    /// - `Err(PartiallyCommitted)`: sale written, some follow-ups failed
    pub async fn finalize(&self, request: FinalizeRequest<'_>) -> Result<CommittedSale, FinalizeError> {
        let Some(_guard) = InFlight::acquire(&self.in_flight) else {
            warn!("Finalize requested while another sale is being recorded");
            return Err(RejectReason::AlreadyCommitting.into());
        };

        self.set_state(FinalizeState::Validating);
        let (new_sale, totals) = match prepare(&request) {
            Ok(prepared) => prepared,
            Err(reason) => {
                debug!(?reason, "Sale rejected before commit");
                self.set_state(FinalizeState::Rejected);
                return Err(reason.into());
            }
        };

        self.set_state(FinalizeState::Committing);
        let customer_id = new_sale.customer_id.clone();
        let sale = match self.sales.create(new_sale).await {
            Ok(sale) => sale,
            Err(e) => {
                error!(error = %e, "Failed to record sale");
                self.set_state(FinalizeState::Composing);
                return Err(FinalizeError::SaleNotRecorded(e));
            }
        };

        info!(
            sale_id = %sale.id,
            channel = %sale.channel,
            total = %sale.total_amount,
            profit = %sale.profit,
            "Sale recorded"
        );

        let mut failures = Vec::new();

        if sale.channel.is_stock_backed() {
            for item in &sale.items {
                match self
                    .products
                    .decrement_stock_floored(&item.product_id, item.quantity)
                    .await
                {
                    Ok(remaining) => {
                        debug!(product_id = %item.product_id, remaining, "Stock decremented");
                    }
                    Err(e) => {
                        warn!(
                            sale_id = %sale.id,
                            product_id = %item.product_id,
                            error = %e,
                            "Stock decrement failed"
                        );
                        failures.push(StepFailure {
                            step: CommitStep::StockDecrement {
                                product_id: item.product_id.clone(),
                                product_name: item.product_name.clone(),
                                quantity: item.quantity,
                            },
                            error: e,
                        });
                    }
                }
            }
        }

        if let Err(e) = self
            .customers
            .record_purchase(&customer_id, sale.total_amount, sale.date)
            .await
        {
            warn!(
                sale_id = %sale.id,
                customer_id = %customer_id,
                error = %e,
                "Customer purchase update failed"
            );
            failures.push(StepFailure {
                step: CommitStep::CustomerUpdate { customer_id },
                error: e,
            });
        }

        self.set_state(FinalizeState::Done);

        if failures.is_empty() {
            Ok(CommittedSale { sale, totals })
        } else {
            Err(FinalizeError::PartiallyCommitted {
                sale: Box::new(sale),
                failures,
            })
        }
    }
}

/// Pre-commit checks, in order: customer, cart, date.
fn prepare(request: &FinalizeRequest<'_>) -> Result<(NewSale, SaleTotals), RejectReason> {
    let customer = request.customer.ok_or(RejectReason::MissingCustomer)?;

    if request.cart.is_empty() {
        return Err(RejectReason::EmptyCart);
    }

    let date = parse_sale_date(request.date_input, request.today)
        .map_err(|_| RejectReason::InvalidDate)?;

    let totals = calculator::calculate(
        request.cart,
        request.channel,
        &request.discount,
        request.cart.policy(),
    );

    let customer_name = if customer.name.trim().is_empty() {
        UNKNOWN_CUSTOMER_NAME.to_string()
    } else {
        customer.name.clone()
    };

    let items = request
        .cart
        .items()
        .iter()
        .map(|item| SaleItem {
            product_id: item.product.id.clone(),
            product_name: item.product.name.clone(),
            quantity: item.quantity,
            unit_price: item.unit_price,
        })
        .collect();

    let sale = NewSale {
        customer_id: customer.id.clone(),
        customer_name,
        date,
        channel: request.channel,
        total_amount: totals.total_charged,
        discount: totals.discount,
        profit: totals.profit,
        items,
    };

    Ok((sale, totals))
}

/// Holds the in-flight flag; released on drop, whatever the outcome.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::{HashMap, HashSet};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Notify;
    use vitrine_core::store::StoreResult;
    use vitrine_core::{
        Brand, Customer, CustomerPatch, Money, NewCustomer, NewProduct, PricingPolicy, Product,
        ProductPatch, StoreError,
    };

    type Log = Arc<Mutex<Vec<String>>>;

    struct FakeProducts {
        stock: Mutex<HashMap<String, u32>>,
        failing: HashSet<String>,
        log: Log,
    }

    #[async_trait]
    impl ProductStore for FakeProducts {
        async fn get(&self, _id: &str) -> StoreResult<Option<Product>> {
            Ok(None)
        }
        async fn list(&self) -> StoreResult<Vec<Product>> {
            Ok(Vec::new())
        }
        async fn create(&self, _product: NewProduct) -> StoreResult<Product> {
            Err(StoreError::Backend("not supported".to_string()))
        }
        async fn update(&self, _id: &str, _patch: ProductPatch) -> StoreResult<()> {
            Ok(())
        }
        async fn delete(&self, _id: &str) -> StoreResult<()> {
            Ok(())
        }
        async fn decrement_stock_floored(&self, id: &str, quantity: u32) -> StoreResult<u32> {
            self.log.lock().unwrap().push(format!("stock:{}", id));
            if self.failing.contains(id) {
                return Err(StoreError::Backend("database is locked".to_string()));
            }
            let mut stock = self.stock.lock().unwrap();
            let entry = stock.entry(id.to_string()).or_insert(0);
            *entry = entry.saturating_sub(quantity);
            Ok(*entry)
        }
    }

    struct FakeCustomers {
        purchases: Mutex<Vec<(String, Money, NaiveDate)>>,
        fail: bool,
        log: Log,
    }

    #[async_trait]
    impl CustomerStore for FakeCustomers {
        async fn get(&self, _id: &str) -> StoreResult<Option<Customer>> {
            Ok(None)
        }
        async fn list(&self) -> StoreResult<Vec<Customer>> {
            Ok(Vec::new())
        }
        async fn create(&self, _customer: NewCustomer) -> StoreResult<Customer> {
            Err(StoreError::Backend("not supported".to_string()))
        }
        async fn update(&self, _id: &str, _patch: CustomerPatch) -> StoreResult<()> {
            Ok(())
        }
        async fn delete(&self, _id: &str) -> StoreResult<()> {
            Ok(())
        }
        async fn record_purchase(&self, id: &str, amount: Money, date: NaiveDate) -> StoreResult<()> {
            self.log.lock().unwrap().push(format!("customer:{}", id));
            if self.fail {
                return Err(StoreError::NotFound {
                    entity: "Customer".to_string(),
                    id: id.to_string(),
                });
            }
            self.purchases
                .lock()
                .unwrap()
                .push((id.to_string(), amount, date));
            Ok(())
        }
    }

    struct FakeSales {
        created: Mutex<Vec<Sale>>,
        fail: bool,
        gate: Option<Arc<Notify>>,
        log: Log,
    }

    #[async_trait]
    impl SaleStore for FakeSales {
        async fn create(&self, sale: NewSale) -> StoreResult<Sale> {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.log.lock().unwrap().push("sale".to_string());
            if self.fail {
                return Err(StoreError::Backend("disk full".to_string()));
            }
            let sale = Sale {
                id: format!("sale-{}", self.created.lock().unwrap().len() + 1),
                owner_id: "owner-1".to_string(),
                customer_id: sale.customer_id,
                customer_name: sale.customer_name,
                date: sale.date,
                channel: sale.channel,
                total_amount: sale.total_amount,
                discount: sale.discount,
                profit: sale.profit,
                items: sale.items,
                created_at: Utc::now(),
            };
            self.created.lock().unwrap().push(sale.clone());
            Ok(sale)
        }
        async fn get(&self, _id: &str) -> StoreResult<Option<Sale>> {
            Ok(None)
        }
        async fn list(&self) -> StoreResult<Vec<Sale>> {
            Ok(self.created.lock().unwrap().clone())
        }
    }

    struct Harness {
        products: Arc<FakeProducts>,
        customers: Arc<FakeCustomers>,
        sales: Arc<FakeSales>,
        log: Log,
        finalizer: SaleFinalizer,
    }

    #[derive(Default)]
    struct Faults {
        failing_products: Vec<&'static str>,
        customer: bool,
        sale: bool,
        gate: Option<Arc<Notify>>,
    }

    fn harness(faults: Faults) -> Harness {
        let log: Log = Arc::default();
        let products = Arc::new(FakeProducts {
            stock: Mutex::new(HashMap::from([("p1".to_string(), 5), ("p2".to_string(), 1)])),
            failing: faults.failing_products.iter().map(|s| s.to_string()).collect(),
            log: log.clone(),
        });
        let customers = Arc::new(FakeCustomers {
            purchases: Mutex::new(Vec::new()),
            fail: faults.customer,
            log: log.clone(),
        });
        let sales = Arc::new(FakeSales {
            created: Mutex::new(Vec::new()),
            fail: faults.sale,
            gate: faults.gate,
            log: log.clone(),
        });
        let finalizer = SaleFinalizer::new(products.clone(), customers.clone(), sales.clone());
        Harness {
            products,
            customers,
            sales,
            log,
            finalizer,
        }
    }

    fn product(id: &str, cost_cents: i64, stock: u32) -> Product {
        Product {
            id: id.to_string(),
            owner_id: "owner-1".to_string(),
            name: format!("Product {}", id),
            brand: Brand::Avon,
            category: "Maquiagem".to_string(),
            stock_quantity: stock,
            cost_price: Money::from_cents(cost_cents),
            sale_price: Money::from_cents(cost_cents * 2),
            image: None,
            created_at: Utc::now(),
        }
    }

    fn physical_cart() -> Cart {
        let mut cart = Cart::new(PricingPolicy::default());
        let p1 = product("p1", 1000, 5);
        cart.add_item(&p1, Channel::Physical).unwrap();
        cart.add_item(&p1, Channel::Physical).unwrap();
        cart.add_item(&product("p2", 2000, 1), Channel::Physical)
            .unwrap();
        cart
    }

    fn ana() -> CustomerRef {
        CustomerRef {
            id: "c1".to_string(),
            name: "Ana Silva".to_string(),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    fn request<'a>(cart: &'a Cart, customer: Option<&'a CustomerRef>, date: &'a str) -> FinalizeRequest<'a> {
        FinalizeRequest {
            cart,
            channel: Channel::Physical,
            customer,
            discount: Discount::none(),
            date_input: date,
            today: today(),
        }
    }

    #[tokio::test]
    async fn test_commit_order_and_effects() {
        let h = harness(Faults::default());
        let cart = physical_cart();
        let customer = ana();

        let committed = h
            .finalizer
            .finalize(request(&cart, Some(&customer), "2026-10-01"))
            .await
            .unwrap();

        assert_eq!(
            *h.log.lock().unwrap(),
            vec!["sale", "stock:p1", "stock:p2", "customer:c1"]
        );
        // 2 × 11.50 + 1 × 23.00
        assert_eq!(committed.sale.total_amount, Money::from_cents(4600));
        assert_eq!(committed.sale.date, NaiveDate::from_ymd_opt(2026, 10, 1).unwrap());
        assert_eq!(committed.sale.customer_name, "Ana Silva");
        assert_eq!(committed.sale.items.len(), 2);

        let stock = h.products.stock.lock().unwrap();
        assert_eq!(stock["p1"], 3);
        assert_eq!(stock["p2"], 0);

        let purchases = h.customers.purchases.lock().unwrap();
        assert_eq!(
            purchases[0],
            (
                "c1".to_string(),
                Money::from_cents(4600),
                NaiveDate::from_ymd_opt(2026, 10, 1).unwrap()
            )
        );
        assert_eq!(h.finalizer.state(), FinalizeState::Done);
        assert!(!h.finalizer.is_busy());
    }

    #[tokio::test]
    async fn test_empty_date_means_today() {
        let h = harness(Faults::default());
        let cart = physical_cart();
        let customer = ana();

        let committed = h
            .finalizer
            .finalize(request(&cart, Some(&customer), ""))
            .await
            .unwrap();
        assert_eq!(committed.sale.date, today());
    }

    #[tokio::test]
    async fn test_online_sale_leaves_stock_alone() {
        let h = harness(Faults::default());
        let mut cart = Cart::new(PricingPolicy::default());
        cart.add_item(&product("p1", 5000, 0), Channel::Online)
            .unwrap();
        let customer = ana();
        let mut req = request(&cart, Some(&customer), "");
        req.channel = Channel::Online;

        let committed = h.finalizer.finalize(req).await.unwrap();

        assert_eq!(committed.totals.profit, Money::from_cents(750));
        assert_eq!(*h.log.lock().unwrap(), vec!["sale", "customer:c1"]);
        assert_eq!(h.products.stock.lock().unwrap()["p1"], 5);
    }

    #[tokio::test]
    async fn test_validation_order() {
        let h = harness(Faults::default());
        let empty = Cart::new(PricingPolicy::default());
        let customer = ana();

        let err = h
            .finalizer
            .finalize(request(&empty, None, "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, FinalizeError::Rejected(RejectReason::MissingCustomer)));

        let err = h
            .finalizer
            .finalize(request(&empty, Some(&customer), "bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, FinalizeError::Rejected(RejectReason::EmptyCart)));

        let cart = physical_cart();
        let err = h
            .finalizer
            .finalize(request(&cart, Some(&customer), "19/10/2026"))
            .await
            .unwrap_err();
        assert!(matches!(err, FinalizeError::Rejected(RejectReason::InvalidDate)));

        assert!(h.log.lock().unwrap().is_empty());
        assert_eq!(h.finalizer.state(), FinalizeState::Rejected);
        assert!(!h.finalizer.is_busy());
    }

    #[tokio::test]
    async fn test_sale_write_failure_stops_everything() {
        let h = harness(Faults {
            sale: true,
            ..Default::default()
        });
        let cart = physical_cart();
        let customer = ana();

        let err = h
            .finalizer
            .finalize(request(&cart, Some(&customer), ""))
            .await
            .unwrap_err();

        assert!(matches!(err, FinalizeError::SaleNotRecorded(_)));
        assert!(err.is_retryable_whole());
        assert_eq!(*h.log.lock().unwrap(), vec!["sale"]);
        assert!(h.customers.purchases.lock().unwrap().is_empty());
        assert_eq!(h.finalizer.state(), FinalizeState::Composing);
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_sale_and_continues() {
        let h = harness(Faults {
            failing_products: vec!["p1"],
            ..Default::default()
        });
        let cart = physical_cart();
        let customer = ana();

        let err = h
            .finalizer
            .finalize(request(&cart, Some(&customer), ""))
            .await
            .unwrap_err();

        assert!(!err.is_retryable_whole());
        let FinalizeError::PartiallyCommitted { sale, failures } = &err else {
            panic!("expected partial commit, got {:?}", err);
        };
        assert_eq!(sale.id, "sale-1");
        assert_eq!(failures.len(), 1);
        assert!(matches!(
            &failures[0].step,
            CommitStep::StockDecrement { product_id, quantity: 2, .. } if product_id == "p1"
        ));

        // later steps still ran
        assert_eq!(h.products.stock.lock().unwrap()["p2"], 0);
        assert_eq!(h.customers.purchases.lock().unwrap().len(), 1);
        assert_eq!(h.sales.created.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_customer_failure_reported() {
        let h = harness(Faults {
            customer: true,
            ..Default::default()
        });
        let cart = physical_cart();
        let customer = ana();

        let err = h
            .finalizer
            .finalize(request(&cart, Some(&customer), ""))
            .await
            .unwrap_err();

        let FinalizeError::PartiallyCommitted { failures, .. } = err else {
            panic!("expected partial commit");
        };
        assert_eq!(
            failures[0].step,
            CommitStep::CustomerUpdate {
                customer_id: "c1".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_second_submit_while_committing_is_rejected() {
        let gate = Arc::new(Notify::new());
        let h = harness(Faults {
            gate: Some(gate.clone()),
            ..Default::default()
        });
        let cart = physical_cart();
        let customer = ana();

        let first = h.finalizer.finalize(request(&cart, Some(&customer), ""));
        tokio::pin!(first);

        // drive the first finalization until it waits inside the sale write
        tokio::select! {
            biased;
            _ = &mut first => panic!("sale write should be blocked"),
            _ = tokio::task::yield_now() => {}
        }
        assert!(h.finalizer.is_busy());
        assert_eq!(h.finalizer.state(), FinalizeState::Committing);

        let second = h
            .finalizer
            .finalize(request(&cart, Some(&customer), ""))
            .await;
        assert!(matches!(
            second,
            Err(FinalizeError::Rejected(RejectReason::AlreadyCommitting))
        ));

        gate.notify_one();
        assert!(first.await.is_ok());
        assert_eq!(h.sales.created.lock().unwrap().len(), 1);
        assert!(!h.finalizer.is_busy());

        h.finalizer.reset();
        assert_eq!(h.finalizer.state(), FinalizeState::Composing);

        gate.notify_one();
        assert!(h
            .finalizer
            .finalize(request(&cart, Some(&customer), ""))
            .await
            .is_ok());
        assert_eq!(h.sales.created.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_blank_customer_name_recorded_as_unknown() {
        let h = harness(Faults::default());
        let cart = physical_cart();
        let customer = CustomerRef {
            id: "c9".to_string(),
            name: "  ".to_string(),
        };

        let committed = h
            .finalizer
            .finalize(request(&cart, Some(&customer), ""))
            .await
            .unwrap();
        assert_eq!(committed.sale.customer_name, UNKNOWN_CUSTOMER_NAME);
    }
}
