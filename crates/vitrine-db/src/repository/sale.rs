//! # Sale Repository
//!
//! Database operations for sales and sale items.
//!
//! ## Sale Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Sale Lifecycle                                    │
//! │                                                                         │
//! │  1. INSERT (one transaction)                                            │
//! │     └── sales row          → totals, channel, customer snapshot         │
//! │     └── sale_items rows    → product name + unit price snapshots        │
//! │                                                                         │
//! │  2. READ                                                                │
//! │     └── get_by_id()        → Sale with items in cart order              │
//! │     └── list()             → newest business date first                 │
//! │                                                                         │
//! │  There is no update: a recorded sale is append-only.                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use vitrine_core::{Channel, NewSale, Sale, SaleItem, SaleStore, StoreResult};

use super::{
    decode_date, decode_money, decode_quantity, decode_timestamp, encode_date, encode_money,
    encode_timestamp, now,
};
use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str = "id, owner_id, customer_id, customer_name, sale_date, channel, \
                            total_amount, discount, profit, created_at";

#[derive(Debug, FromRow)]
struct SaleRow {
    id: String,
    owner_id: String,
    customer_id: String,
    customer_name: String,
    sale_date: String,
    channel: String,
    total_amount: String,
    discount: String,
    profit: String,
    created_at: String,
}

impl SaleRow {
    fn into_sale(self, items: Vec<SaleItem>) -> DbResult<Sale> {
        let channel = Channel::parse(&self.channel)
            .ok_or_else(|| DbError::decode("channel", format!("unknown channel {}", self.channel)))?;

        Ok(Sale {
            date: decode_date("sale_date", &self.sale_date)?,
            channel,
            total_amount: decode_money("total_amount", &self.total_amount)?,
            discount: decode_money("discount", &self.discount)?,
            profit: decode_money("profit", &self.profit)?,
            created_at: decode_timestamp("created_at", &self.created_at)?,
            id: self.id,
            owner_id: self.owner_id,
            customer_id: self.customer_id,
            customer_name: self.customer_name,
            items,
        })
    }
}

#[derive(Debug, FromRow)]
struct SaleItemRow {
    sale_id: String,
    product_id: String,
    product_name: String,
    quantity: i64,
    unit_price: String,
}

impl SaleItemRow {
    fn into_item(self) -> DbResult<SaleItem> {
        Ok(SaleItem {
            quantity: decode_quantity("quantity", self.quantity)?,
            unit_price: decode_money("unit_price", &self.unit_price)?,
            product_id: self.product_id,
            product_name: self.product_name,
        })
    }
}

/// Repository for sale database operations.
#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
    owner_id: String,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool, owner_id: impl Into<String>) -> Self {
        SaleRepository {
            pool,
            owner_id: owner_id.into(),
        }
    }

    /// Writes the sale and all of its items, or nothing.
    ///
    /// ## Snapshot Pattern
    /// Product names and unit prices are copied to the items, so the sale
    /// reads the same after the product is edited or deleted.
    pub async fn insert(&self, sale: NewSale) -> DbResult<Sale> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();
        debug!(
            id = %id,
            channel = %sale.channel,
            items = sale.items.len(),
            total = %sale.total_amount,
            "Inserting sale"
        );

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO sales (
                id, owner_id, customer_id, customer_name, sale_date, channel,
                total_amount, discount, profit, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(&self.owner_id)
        .bind(&sale.customer_id)
        .bind(&sale.customer_name)
        .bind(encode_date(sale.date))
        .bind(sale.channel.as_str())
        .bind(encode_money(sale.total_amount))
        .bind(encode_money(sale.discount))
        .bind(encode_money(sale.profit))
        .bind(encode_timestamp(created_at))
        .execute(&mut *tx)
        .await?;

        for (position, item) in sale.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO sale_items (
                    sale_id, position, product_id, product_name, quantity, unit_price
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(&id)
            .bind(i64::try_from(position).map_err(|e| DbError::Internal(e.to_string()))?)
            .bind(&item.product_id)
            .bind(&item.product_name)
            .bind(i64::from(item.quantity))
            .bind(encode_money(item.unit_price))
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Sale {
            id,
            owner_id: self.owner_id.clone(),
            customer_id: sale.customer_id,
            customer_name: sale.customer_name,
            date: sale.date,
            channel: sale.channel,
            total_amount: sale.total_amount,
            discount: sale.discount,
            profit: sale.profit,
            items: sale.items,
            created_at,
        })
    }

    /// Gets a sale with its items in cart order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Sale>> {
        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?1 AND owner_id = ?2");
        let row: Option<SaleRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&self.owner_id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let items = self.get_items(id).await?;
        row.into_sale(items).map(Some)
    }

    pub async fn get_items(&self, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let rows: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT sale_id, product_id, product_name, quantity, unit_price
            FROM sale_items
            WHERE sale_id = ?1
            ORDER BY position
            "#,
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(SaleItemRow::into_item).collect()
    }

    /// Lists the owner's sales, newest business date first.
    ///
    /// Sales on the same date are ordered by when they were recorded.
    pub async fn list(&self) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE owner_id = ?1 \
             ORDER BY sale_date DESC, created_at DESC"
        );
        let rows: Vec<SaleRow> = sqlx::query_as(&sql)
            .bind(&self.owner_id)
            .fetch_all(&self.pool)
            .await?;

        let item_rows: Vec<SaleItemRow> = sqlx::query_as(
            r#"
            SELECT i.sale_id, i.product_id, i.product_name, i.quantity, i.unit_price
            FROM sale_items i
            INNER JOIN sales s ON s.id = i.sale_id
            WHERE s.owner_id = ?1
            ORDER BY i.sale_id, i.position
            "#,
        )
        .bind(&self.owner_id)
        .fetch_all(&self.pool)
        .await?;

        let mut items_by_sale: HashMap<String, Vec<SaleItem>> = HashMap::new();
        for row in item_rows {
            let sale_id = row.sale_id.clone();
            items_by_sale.entry(sale_id).or_default().push(row.into_item()?);
        }

        debug!(count = rows.len(), "Listed sales");
        rows.into_iter()
            .map(|row| {
                let items = items_by_sale.remove(&row.id).unwrap_or_default();
                row.into_sale(items)
            })
            .collect()
    }

    /// Counts the owner's sales (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM sales WHERE owner_id = ?1")
            .bind(&self.owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl SaleStore for SaleRepository {
    async fn create(&self, sale: NewSale) -> StoreResult<Sale> {
        Ok(self.insert(sale).await?)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Sale>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn list(&self) -> StoreResult<Vec<Sale>> {
        Ok(SaleRepository::list(self).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use vitrine_core::Money;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn item(product_id: &str, name: &str, quantity: u32, cents: i64) -> SaleItem {
        SaleItem {
            product_id: product_id.to_string(),
            product_name: name.to_string(),
            quantity,
            unit_price: Money::from_cents(cents),
        }
    }

    fn new_sale(day: u32, items: Vec<SaleItem>) -> NewSale {
        let subtotal: Money = items.iter().map(SaleItem::line_total).sum();
        NewSale {
            customer_id: "c1".to_string(),
            customer_name: "Ana Silva".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            channel: Channel::Physical,
            total_amount: subtotal,
            discount: Money::zero(),
            profit: Money::from_cents(300),
            items,
        }
    }

    #[tokio::test]
    async fn test_insert_and_get_keeps_item_order() {
        let db = test_db().await;
        let repo = db.sales("owner-a");

        let items = vec![
            item("p2", "Renew Platinum Dia", 1, 5233),
            item("p1", "Batom Power Stay Vermelho", 2, 2070),
        ];
        let created = repo.insert(new_sale(14, items.clone())).await.unwrap();
        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(loaded.items, items);
        assert_eq!(loaded.channel, Channel::Physical);
        assert_eq!(loaded.customer_name, "Ana Silva");
        assert_eq!(loaded.total_amount, Money::from_cents(9373));
        assert_eq!(loaded.date, NaiveDate::from_ymd_opt(2026, 3, 14).unwrap());
    }

    #[tokio::test]
    async fn test_exact_amounts_survive_storage() {
        let db = test_db().await;
        let repo = db.sales("owner-a");

        let mut sale = new_sale(1, vec![item("p1", "Kaiak", 3, 1000)]);
        let odd_price = Money::from_decimal(Decimal::from(100) / Decimal::from(3));
        sale.items[0].unit_price = odd_price;
        sale.profit = -Money::from_cents(70);

        let created = repo.insert(sale).await.unwrap();
        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(loaded.items[0].unit_price, odd_price);
        assert_eq!(loaded.profit, -Money::from_cents(70));
        assert!(loaded.profit.is_negative());
    }

    #[tokio::test]
    async fn test_list_newest_business_date_first() {
        let db = test_db().await;
        let repo = db.sales("owner-a");

        let early = repo.insert(new_sale(2, vec![item("p1", "A", 1, 100)])).await.unwrap();
        let late = repo.insert(new_sale(20, vec![item("p1", "A", 1, 100)])).await.unwrap();
        let middle = repo
            .insert(new_sale(10, vec![item("p2", "B", 2, 100), item("p1", "A", 1, 100)]))
            .await
            .unwrap();

        let sales = repo.list().await.unwrap();
        let ids: Vec<&str> = sales.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec![late.id.as_str(), middle.id.as_str(), early.id.as_str()]);
        assert_eq!(sales[1].items.len(), 2);
        assert_eq!(sales[1].items[0].product_id, "p2");
    }

    #[tokio::test]
    async fn test_failed_item_rolls_back_sale() {
        let db = test_db().await;
        let repo = db.sales("owner-a");

        // quantity 0 violates the sale_items CHECK
        let sale = new_sale(5, vec![item("p1", "A", 1, 100), item("p2", "B", 0, 100)]);
        let result = repo.insert(sale).await;

        assert!(matches!(result, Err(DbError::CheckViolation(_))));
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sales_are_owner_scoped() {
        let db = test_db().await;
        let created = db
            .sales("owner-a")
            .insert(new_sale(5, vec![item("p1", "A", 1, 100)]))
            .await
            .unwrap();

        let other = db.sales("owner-b");
        assert!(other.get_by_id(&created.id).await.unwrap().is_none());
        assert!(other.list().await.unwrap().is_empty());
    }
}
