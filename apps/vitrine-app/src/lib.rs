//! # Vitrine App Library
//!
//! Headless command layer of Vitrine POS. A UI shell builds one
//! [`AppContext`] at startup and calls the functions in [`commands`]
//! with the state each one needs.
//!
//! ## Module Organization
//! ```text
//! vitrine_app/
//! ├── lib.rs          ◄─── You are here (startup, tracing, data path)
//! ├── state/
//! │   ├── mod.rs      ◄─── State type exports
//! │   ├── db.rs       ◄─── Database + owner
//! │   ├── session.rs  ◄─── Sale being composed
//! │   ├── checkout.rs ◄─── Sale finalizer
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/       ◄─── One module per screen
//! └── error.rs        ◄─── API error type for commands
//! ```

pub mod commands;
pub mod error;
pub mod state;

use std::path::PathBuf;

use directories::ProjectDirs;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vitrine_core::Channel;
use vitrine_db::{Database, DbConfig};

use error::StartupError;
use state::{CheckoutState, ConfigState, DbState, SaleSession, SessionState};

/// Everything the commands need, built once at startup.
pub struct AppContext {
    pub config: ConfigState,
    pub db: DbState,
    pub session: SessionState,
    pub checkout: CheckoutState,
}

impl AppContext {
    /// Opens the database and prepares a physical sale session.
    ///
    /// ## Startup Sequence
    /// ```text
    /// ┌─────────────────────────────────────────────────────────────────────────┐
    /// │                       Application Startup                               │
    /// │                                                                         │
    /// │  1. Determine Database Path ──────────────────────────────────────────► │
    /// │     • VITRINE_DB_PATH, or the platform data directory                   │
    /// │                                                                         │
    /// │  2. Connect to Database ──────────────────────────────────────────────► │
    /// │     • SQLite with WAL mode                                              │
    /// │     • Run pending migrations                                            │
    /// │                                                                         │
    /// │  3. Initialize State Objects ─────────────────────────────────────────► │
    /// │     • DbState scoped to the configured owner                            │
    /// │     • SessionState with the owner's pricing settings                    │
    /// │     • CheckoutState over the owner's repositories                       │
    /// └─────────────────────────────────────────────────────────────────────────┘
    /// ```
    pub async fn bootstrap(config: ConfigState) -> Result<Self, StartupError> {
        info!("Starting Vitrine POS");

        let db_path = database_path(&config)?;
        info!(?db_path, "Database path determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        AppContext::with_database(config, db).await
    }

    /// Same as [`bootstrap`](Self::bootstrap) over a throwaway in-memory
    /// database.
    pub async fn in_memory(config: ConfigState) -> Result<Self, StartupError> {
        let db = Database::new(DbConfig::in_memory()).await?;
        AppContext::with_database(config, db).await
    }

    async fn with_database(config: ConfigState, db: Database) -> Result<Self, StartupError> {
        let db = DbState::new(db, config.owner_id.clone());
        let policy = db.settings().get().await?;

        let session = SessionState::new(SaleSession::new(policy, Channel::Physical));
        let checkout = CheckoutState::new(&db);

        info!(owner_id = %config.owner_id, "State initialized");
        Ok(AppContext {
            config,
            db,
            session,
            checkout,
        })
    }
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=vitrine=trace` - Show trace for vitrine crates only
/// - Default: INFO, DEBUG for vitrine crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vitrine=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Determines the database file path.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.vitrine.pos/vitrine.db`
/// - **Windows**: `%APPDATA%\vitrine\pos\data\vitrine.db`
/// - **Linux**: `~/.local/share/pos/vitrine.db`
///
/// `ConfigState::db_path` (from `VITRINE_DB_PATH`) wins when set.
pub fn database_path(config: &ConfigState) -> Result<PathBuf, StartupError> {
    if let Some(path) = &config.db_path {
        return Ok(path.clone());
    }

    let proj_dirs = ProjectDirs::from("com", "vitrine", "pos").ok_or(StartupError::NoDataDir)?;
    let data_dir = proj_dirs.data_dir();
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("vitrine.db"))
}

// =============================================================================
// End-to-End Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use vitrine_core::{DiscountKind, Money, SettingsUpdate};

    use crate::commands::customer::{self, CreateCustomerRequest};
    use crate::commands::product::{self, CreateProductRequest};
    use crate::commands::{cart, config, dashboard, sale, session};
    use crate::error::ErrorCode;

    async fn app() -> AppContext {
        AppContext::in_memory(ConfigState::default()).await.unwrap()
    }

    async fn add_product(app: &AppContext, name: &str, stock: u32, cost: &str) -> String {
        product::create_product(
            &app.db,
            CreateProductRequest {
                name: name.to_string(),
                brand: vitrine_core::Brand::Natura,
                category: "Perfumaria - Masculino".to_string(),
                stock_quantity: stock,
                cost_price: cost.to_string(),
                sale_price: "99.90".to_string(),
                image: None,
            },
        )
        .await
        .unwrap()
        .product
        .id
    }

    async fn add_customer(app: &AppContext, name: &str) -> String {
        customer::create_customer(
            &app.db,
            CreateCustomerRequest {
                name: name.to_string(),
                ..Default::default()
            },
        )
        .await
        .unwrap()
        .id
    }

    #[test]
    fn test_database_path_override() {
        let config = ConfigState {
            db_path: Some(PathBuf::from("/tmp/vitrine-test.db")),
            ..Default::default()
        };
        assert_eq!(
            database_path(&config).unwrap(),
            PathBuf::from("/tmp/vitrine-test.db")
        );
    }

    #[tokio::test]
    async fn test_physical_sale_end_to_end() {
        let app = app().await;
        let product_id = add_product(&app, "Kaiak Urbe Desodorante", 5, "10").await;
        let customer_id = add_customer(&app, "Ana Silva").await;

        session::start_sale(&app.db, &app.session, &app.checkout, Channel::Physical)
            .await
            .unwrap();
        cart::add_to_cart(&app.db, &app.session, product_id.clone()).await.unwrap();
        cart::add_to_cart(&app.db, &app.session, product_id.clone()).await.unwrap();
        session::select_customer(&app.db, &app.session, Some(customer_id.clone()))
            .await
            .unwrap();
        session::set_discount(&app.session, DiscountKind::Percent, "10".to_string()).await;
        let view = session::set_sale_date(&app.session, "2024-03-05".to_string()).await;

        assert_eq!(view.items[0].unit_price, Money::from_cents(1150));
        assert_eq!(view.totals.total_charged, Money::from_cents(2070));
        assert_eq!(view.totals.profit, Money::from_cents(70));

        let response = sale::finalize_sale(&app.db, &app.session, &app.checkout).await.unwrap();
        assert!(response.warnings.is_empty());
        assert_eq!(response.sale.total_amount, Money::from_cents(2070));
        assert_eq!(response.sale.discount, Money::from_cents(230));
        assert_eq!(response.sale.profit, Money::from_cents(70));
        assert_eq!(response.sale.customer_name, "Ana Silva");
        assert_eq!(response.sale.date, NaiveDate::from_ymd_opt(2024, 3, 5).unwrap());

        let stock = app.db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(stock.stock_quantity, 3);

        let buyer = app.db.customers().get_by_id(&customer_id).await.unwrap().unwrap();
        assert_eq!(buyer.total_spent, Money::from_cents(2070));
        assert_eq!(buyer.last_purchase_date, NaiveDate::from_ymd_opt(2024, 3, 5));

        let after = session::get_session(&app.session).await;
        assert!(after.items.is_empty());
        assert!(after.customer.is_none());
        assert_eq!(after.channel, Channel::Physical);

        assert_eq!(sale::list_sales(&app.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_online_sale_with_profit_target() {
        let app = app().await;
        let product_id = add_product(&app, "Essencial Oud Masculino", 0, "50").await;
        let customer_id = add_customer(&app, "Beatriz Costa").await;

        session::start_sale(&app.db, &app.session, &app.checkout, Channel::Online)
            .await
            .unwrap();
        let view = cart::add_to_cart(&app.db, &app.session, product_id.clone())
            .await
            .unwrap();
        assert_eq!(view.items[0].unit_price, Money::from_cents(5000));
        assert_eq!(view.totals.profit, Money::from_cents(750));

        let view = cart::set_item_profit(&app.session, product_id.clone(), "20".to_string())
            .await
            .unwrap();
        assert_eq!(view.items[0].unit_price.rounded(), Money::from_cents(13333));
        assert_eq!(view.items[0].custom_profit, Some(Money::from_cents(2000)));

        session::select_customer(&app.db, &app.session, Some(customer_id))
            .await
            .unwrap();
        let response = sale::finalize_sale(&app.db, &app.session, &app.checkout).await.unwrap();
        assert_eq!(response.sale.profit.rounded(), Money::from_cents(2000));

        // online sales leave stock alone
        let stock = app.db.products().get_by_id(&product_id).await.unwrap().unwrap();
        assert_eq!(stock.stock_quantity, 0);
    }

    #[tokio::test]
    async fn test_rejected_sale_keeps_session() {
        let app = app().await;
        let product_id = add_product(&app, "Renew Platinum Dia", 8, "45.50").await;

        cart::add_to_cart(&app.db, &app.session, product_id).await.unwrap();
        let err = sale::finalize_sale(&app.db, &app.session, &app.checkout).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingCustomer);
        assert_eq!(session::get_session(&app.session).await.items.len(), 1);

        let customer_id = add_customer(&app, "Carla Dias").await;
        session::select_customer(&app.db, &app.session, Some(customer_id))
            .await
            .unwrap();
        session::set_sale_date(&app.session, "05/03/2024".to_string()).await;
        let err = sale::finalize_sale(&app.db, &app.session, &app.checkout).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidDate);

        cart::clear_cart(&app.session).await;
        let err = sale::finalize_sale(&app.db, &app.session, &app.checkout).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::EmptyCart);
        assert!(sale::list_sales(&app.db).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cart_rules_surface_as_api_errors() {
        let app = app().await;
        let empty = add_product(&app, "Hidratante Todo Dia Algodão", 0, "25").await;
        let one_left = add_product(&app, "Batom Power Stay Vermelho", 1, "18").await;

        let err = cart::add_to_cart(&app.db, &app.session, empty).await.unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfStock);

        cart::add_to_cart(&app.db, &app.session, one_left.clone()).await.unwrap();
        let err = cart::add_to_cart(&app.db, &app.session, one_left.clone())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::OutOfStock);

        let err = cart::set_item_profit(&app.session, one_left.clone(), "5".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let err = cart::set_item_price(&app.session, one_left.clone(), "abc".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let view = cart::set_item_price(&app.session, one_left.clone(), "19,90".to_string())
            .await
            .unwrap();
        assert_eq!(view.totals.subtotal, Money::from_cents(1990));

        let err = cart::set_item_price(
            &app.session,
            one_left.clone(),
            "79228162514264337593543950335".to_string(),
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        let view = session::get_session(&app.session).await;
        assert_eq!(view.totals.subtotal, Money::from_cents(1990));

        let err = cart::add_to_cart(&app.db, &app.session, "missing".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::NotFound);

        let view = cart::decrease_cart_item(&app.session, one_left).await;
        assert!(view.items.is_empty());
    }

    #[tokio::test]
    async fn test_settings_update_is_all_or_nothing() {
        let app = app().await;

        let err = config::update_settings(
            &app.db,
            SettingsUpdate {
                margin_percent: Some(Decimal::from(30)),
                commission_percent: Some(Decimal::from(150)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        let settings = config::get_settings(&app.db).await.unwrap();
        assert_eq!(settings.margin_percent, Decimal::from(15));
        assert_eq!(settings.commission_percent, Decimal::from(15));

        let settings = config::update_settings(
            &app.db,
            SettingsUpdate {
                margin_percent: Some(Decimal::from(30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(settings.margin_percent, Decimal::from(30));
        assert_eq!(settings.low_stock_threshold, 3);

        // new margin applies from the next sale
        let product_id = add_product(&app, "Kaiak Urbe Desodorante", 5, "10").await;
        session::start_sale(&app.db, &app.session, &app.checkout, Channel::Physical)
            .await
            .unwrap();
        let view = cart::add_to_cart(&app.db, &app.session, product_id).await.unwrap();
        assert_eq!(view.items[0].unit_price, Money::from_cents(1300));
    }

    #[tokio::test]
    async fn test_next_sale_uses_settings_saved_mid_sale() {
        let app = app().await;
        let product_id = add_product(&app, "Kaiak Urbe Desodorante", 5, "10").await;
        let customer_id = add_customer(&app, "Ana Silva").await;

        let view = cart::add_to_cart(&app.db, &app.session, product_id.clone())
            .await
            .unwrap();
        assert_eq!(view.items[0].unit_price, Money::from_cents(1150));

        config::update_settings(
            &app.db,
            SettingsUpdate {
                margin_percent: Some(Decimal::from(30)),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        // the open sale keeps the price it was quoted
        session::select_customer(&app.db, &app.session, Some(customer_id))
            .await
            .unwrap();
        let response = sale::finalize_sale(&app.db, &app.session, &app.checkout)
            .await
            .unwrap();
        assert_eq!(response.sale.total_amount, Money::from_cents(1150));

        let view = cart::add_to_cart(&app.db, &app.session, product_id).await.unwrap();
        assert_eq!(view.items[0].unit_price, Money::from_cents(1300));
        assert_eq!(view.channel, Channel::Physical);
    }

    #[tokio::test]
    async fn test_restock_averages_cost() {
        let app = app().await;
        let product_id = add_product(&app, "Essencial Oud Masculino", 2, "10").await;

        let view = product::restock_product(&app.db, product_id.clone(), 4, "12".to_string())
            .await
            .unwrap();
        assert_eq!(view.product.stock_quantity, 6);
        assert_eq!(view.product.cost_price.rounded(), Money::from_cents(1133));

        let err = product::restock_product(&app.db, product_id, 0, "12".to_string())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[tokio::test]
    async fn test_dashboard_counts_current_month() {
        let app = app().await;
        let product_id = add_product(&app, "Kaiak Urbe Desodorante", 3, "10").await;
        let customer_id = add_customer(&app, "Ana Silva").await;

        cart::add_to_cart(&app.db, &app.session, product_id).await.unwrap();
        session::select_customer(&app.db, &app.session, Some(customer_id))
            .await
            .unwrap();
        sale::finalize_sale(&app.db, &app.session, &app.checkout).await.unwrap();

        let dashboard = dashboard::get_dashboard(&app.db).await.unwrap();
        assert_eq!(dashboard.metrics.month_sale_count, 1);
        assert_eq!(dashboard.metrics.month_sales, Money::from_cents(1150));
        assert_eq!(dashboard.metrics.month_profit, Money::from_cents(150));
        assert_eq!(dashboard.metrics.active_customers, 1);
        // 2 units left, under the threshold of 3
        assert_eq!(dashboard.metrics.low_stock_count, 1);
        assert_eq!(dashboard.inventory_value, Money::from_cents(2000));
    }

    #[tokio::test]
    async fn test_customer_defaults_and_validation() {
        let app = app().await;

        let created = customer::create_customer(
            &app.db,
            CreateCustomerRequest {
                name: "  Ana Silva ".to_string(),
                phone: Some("   ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(created.name, "Ana Silva");
        assert!(created.phone.is_none());
        assert!(created.has_tag(vitrine_core::TAG_NEW));

        let err = customer::create_customer(&app.db, CreateCustomerRequest::default())
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);

        assert_eq!(customer::list_customers(&app.db).await.unwrap().len(), 1);
    }
}
