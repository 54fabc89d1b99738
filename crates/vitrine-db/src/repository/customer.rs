//! # Customer Repository
//!
//! Database operations for customers and their purchase aggregates.
//!
//! Tags are stored as a JSON array in a single column. `total_spent` is
//! exact decimal text, so a purchase is recorded as a read-modify-write
//! inside one transaction.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use vitrine_core::{
    Customer, CustomerPatch, CustomerStore, Money, NewCustomer, StoreResult,
};

use super::{
    decode_money, decode_optional_date, decode_timestamp, encode_date, encode_money,
    encode_timestamp, now,
};
use crate::error::{DbError, DbResult};

const CUSTOMER_COLUMNS: &str = "id, owner_id, name, phone, email, notes, birth_date, tags, \
                                total_spent, last_purchase_date, created_at";

#[derive(Debug, FromRow)]
struct CustomerRow {
    id: String,
    owner_id: String,
    name: String,
    phone: Option<String>,
    email: Option<String>,
    notes: Option<String>,
    birth_date: Option<String>,
    tags: String,
    total_spent: String,
    last_purchase_date: Option<String>,
    created_at: String,
}

impl CustomerRow {
    fn into_customer(self) -> DbResult<Customer> {
        Ok(Customer {
            birth_date: decode_optional_date("birth_date", self.birth_date.as_deref())?,
            tags: decode_tags(&self.tags)?,
            total_spent: decode_money("total_spent", &self.total_spent)?,
            last_purchase_date: decode_optional_date(
                "last_purchase_date",
                self.last_purchase_date.as_deref(),
            )?,
            created_at: decode_timestamp("created_at", &self.created_at)?,
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            phone: self.phone,
            email: self.email,
            notes: self.notes,
        })
    }
}

fn encode_tags(tags: &BTreeSet<String>) -> DbResult<String> {
    serde_json::to_string(tags).map_err(|e| DbError::decode("tags", e))
}

fn decode_tags(raw: &str) -> DbResult<BTreeSet<String>> {
    serde_json::from_str(raw).map_err(|e| DbError::decode("tags", e))
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
    owner_id: String,
}

impl CustomerRepository {
    pub fn new(pool: SqlitePool, owner_id: impl Into<String>) -> Self {
        CustomerRepository {
            pool,
            owner_id: owner_id.into(),
        }
    }

    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Customer>> {
        let sql =
            format!("SELECT {CUSTOMER_COLUMNS} FROM customers WHERE id = ?1 AND owner_id = ?2");
        let row: Option<CustomerRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&self.owner_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CustomerRow::into_customer).transpose()
    }

    /// Lists the owner's customers by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let sql = format!(
            "SELECT {CUSTOMER_COLUMNS} FROM customers WHERE owner_id = ?1 \
             ORDER BY name COLLATE NOCASE, id"
        );
        let rows: Vec<CustomerRow> = sqlx::query_as(&sql)
            .bind(&self.owner_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CustomerRow::into_customer).collect()
    }

    /// Inserts a customer with zero spent and no purchases yet.
    ///
    /// A customer created without tags is tagged "Novo".
    pub async fn insert(&self, customer: NewCustomer) -> DbResult<Customer> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();
        let tags = customer.effective_tags();
        debug!(id = %id, name = %customer.name, "Inserting customer");

        sqlx::query(
            r#"
            INSERT INTO customers (
                id, owner_id, name, phone, email, notes, birth_date, tags,
                total_spent, last_purchase_date, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, NULL, ?10, ?10)
            "#,
        )
        .bind(&id)
        .bind(&self.owner_id)
        .bind(&customer.name)
        .bind(&customer.phone)
        .bind(&customer.email)
        .bind(&customer.notes)
        .bind(customer.birth_date.map(encode_date))
        .bind(encode_tags(&tags)?)
        .bind(encode_money(Money::zero()))
        .bind(encode_timestamp(created_at))
        .execute(&self.pool)
        .await?;

        Ok(Customer {
            id,
            owner_id: self.owner_id.clone(),
            name: customer.name,
            phone: customer.phone,
            email: customer.email,
            notes: customer.notes,
            birth_date: customer.birth_date,
            tags,
            total_spent: Money::zero(),
            last_purchase_date: None,
            created_at,
        })
    }

    pub async fn update(&self, id: &str, patch: CustomerPatch) -> DbResult<()> {
        debug!(id = %id, "Updating customer");

        let tags = patch.tags.as_ref().map(encode_tags).transpose()?;

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE customers SET ");
        let mut fields = builder.separated(", ");
        if let Some(name) = patch.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(phone) = patch.phone {
            fields.push("phone = ").push_bind_unseparated(phone);
        }
        if let Some(email) = patch.email {
            fields.push("email = ").push_bind_unseparated(email);
        }
        if let Some(notes) = patch.notes {
            fields.push("notes = ").push_bind_unseparated(notes);
        }
        if let Some(birth_date) = patch.birth_date {
            fields
                .push("birth_date = ")
                .push_bind_unseparated(encode_date(birth_date));
        }
        if let Some(tags) = tags {
            fields.push("tags = ").push_bind_unseparated(tags);
        }
        if let Some(total) = patch.total_spent {
            fields
                .push("total_spent = ")
                .push_bind_unseparated(encode_money(total));
        }
        if let Some(date) = patch.last_purchase_date {
            fields
                .push("last_purchase_date = ")
                .push_bind_unseparated(encode_date(date));
        }
        fields
            .push("updated_at = ")
            .push_bind_unseparated(encode_timestamp(now()));

        builder
            .push(" WHERE id = ")
            .push_bind(id.to_string())
            .push(" AND owner_id = ")
            .push_bind(self.owner_id.clone());

        let result = builder.build().execute(&self.pool).await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Deletes a customer. Their sales keep the stored customer name.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(&self.owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }

    /// Adds `amount` to `total_spent` and sets `last_purchase_date`.
    ///
    /// The read and the write share one transaction.
    pub async fn record_purchase(&self, id: &str, amount: Money, date: NaiveDate) -> DbResult<()> {
        debug!(id = %id, amount = %amount, date = %date, "Recording purchase");

        let mut tx = self.pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT total_spent FROM customers WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(&self.owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Err(DbError::not_found("Customer", id));
        };
        let total = decode_money("total_spent", &current)? + amount;

        sqlx::query(
            r#"
            UPDATE customers
            SET total_spent = ?1, last_purchase_date = ?2, updated_at = ?3
            WHERE id = ?4 AND owner_id = ?5
            "#,
        )
        .bind(encode_money(total))
        .bind(encode_date(date))
        .bind(encode_timestamp(now()))
        .bind(id)
        .bind(&self.owner_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }
}

#[async_trait]
impl CustomerStore for CustomerRepository {
    async fn get(&self, id: &str) -> StoreResult<Option<Customer>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn list(&self) -> StoreResult<Vec<Customer>> {
        Ok(CustomerRepository::list(self).await?)
    }

    async fn create(&self, customer: NewCustomer) -> StoreResult<Customer> {
        Ok(self.insert(customer).await?)
    }

    async fn update(&self, id: &str, patch: CustomerPatch) -> StoreResult<()> {
        Ok(CustomerRepository::update(self, id, patch).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        Ok(CustomerRepository::delete(self, id).await?)
    }

    async fn record_purchase(&self, id: &str, amount: Money, date: NaiveDate) -> StoreResult<()> {
        Ok(CustomerRepository::record_purchase(self, id, amount, date).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use rust_decimal::Decimal;
    use vitrine_core::{TAG_NEW, TAG_VIP};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn ana() -> NewCustomer {
        NewCustomer {
            name: "Ana Silva".to_string(),
            phone: Some("(11) 98765-4321".to_string()),
            birth_date: NaiveDate::from_ymd_opt(1990, 5, 12),
            tags: BTreeSet::from([TAG_VIP.to_string()]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.customers("owner-a");

        let created = repo.insert(ana()).await.unwrap();
        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(loaded, created);
        assert!(loaded.has_tag(TAG_VIP));
        assert_eq!(loaded.total_spent, Money::zero());
        assert_eq!(loaded.last_purchase_date, None);
    }

    #[tokio::test]
    async fn test_untagged_customer_is_new() {
        let db = test_db().await;
        let repo = db.customers("owner-a");

        let created = repo
            .insert(NewCustomer {
                name: "Beatriz Costa".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert!(loaded.has_tag(TAG_NEW));
    }

    #[tokio::test]
    async fn test_record_purchase_accumulates_exactly() {
        let db = test_db().await;
        let repo = db.customers("owner-a");
        let created = repo.insert(ana()).await.unwrap();

        let third = Money::from_decimal(Decimal::from(100) / Decimal::from(3));
        let first_date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let second_date = NaiveDate::from_ymd_opt(2026, 2, 20).unwrap();

        repo.record_purchase(&created.id, third, first_date).await.unwrap();
        repo.record_purchase(&created.id, third, second_date).await.unwrap();
        repo.record_purchase(&created.id, third, first_date).await.unwrap();

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert_eq!(loaded.total_spent.rounded(), Money::from_cents(10000));
        // The most recent call wins, whatever its date.
        assert_eq!(loaded.last_purchase_date, Some(first_date));
    }

    #[tokio::test]
    async fn test_record_purchase_missing_customer() {
        let db = test_db().await;
        let result = db
            .customers("owner-a")
            .record_purchase("missing", Money::from_cents(100), NaiveDate::MIN)
            .await;
        assert!(matches!(result, Err(DbError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_update_tags_and_aggregates() {
        let db = test_db().await;
        let repo = db.customers("owner-a");
        let created = repo.insert(ana()).await.unwrap();

        let patch = CustomerPatch {
            tags: Some(BTreeSet::from(["Inativo".to_string()])),
            total_spent: Some(Money::from_cents(120000)),
            ..Default::default()
        };
        repo.update(&created.id, patch).await.unwrap();

        let loaded = repo.get_by_id(&created.id).await.unwrap().unwrap();
        assert!(loaded.has_tag("Inativo"));
        assert!(!loaded.has_tag(TAG_VIP));
        assert_eq!(loaded.total_spent, Money::from_cents(120000));
        assert_eq!(loaded.phone, created.phone);
    }

    #[tokio::test]
    async fn test_delete_is_owner_scoped() {
        let db = test_db().await;
        let created = db.customers("owner-a").insert(ana()).await.unwrap();

        assert!(matches!(
            db.customers("owner-b").delete(&created.id).await,
            Err(DbError::NotFound { .. })
        ));
        db.customers("owner-a").delete(&created.id).await.unwrap();
        assert!(db.customers("owner-a").list().await.unwrap().is_empty());
    }
}
