//! # Product Repository
//!
//! Database operations for products.
//!
//! ## Key Operations
//! - CRUD scoped to one owner
//! - Partial updates built from a [`ProductPatch`]
//! - Floored stock decrement for physical sales
//! - Restock with weighted average cost, read and written in one transaction
//!
//! ## Stock Decrement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Stock Update Strategy                                │
//! │                                                                         │
//! │  ❌ WRONG: read stock, subtract in Rust, write back                     │
//! │     two sales of the same product can both read 5 and both write 4      │
//! │                                                                         │
//! │  ✅ CORRECT: one conditional statement                                  │
//! │     UPDATE products                                                     │
//! │     SET stock_quantity = MAX(0, stock_quantity - ?)                     │
//! │     RETURNING stock_quantity                                            │
//! │                                                                         │
//! │  Stock never goes below zero, even if it changed since the cart        │
//! │  was built.                                                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use sqlx::{FromRow, QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use vitrine_core::inventory;
use vitrine_core::{Brand, Money, NewProduct, Product, ProductPatch, ProductStore, StoreResult};

use super::{decode_money, decode_quantity, decode_timestamp, encode_money, encode_timestamp, now};
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, owner_id, name, brand, category, stock_quantity, \
                               cost_price, sale_price, image, created_at";

/// Row as stored; money and timestamps are text.
#[derive(Debug, FromRow)]
struct ProductRow {
    id: String,
    owner_id: String,
    name: String,
    brand: String,
    category: String,
    stock_quantity: i64,
    cost_price: String,
    sale_price: String,
    image: Option<String>,
    created_at: String,
}

impl ProductRow {
    fn into_product(self) -> DbResult<Product> {
        Ok(Product {
            stock_quantity: decode_quantity("stock_quantity", self.stock_quantity)?,
            cost_price: decode_money("cost_price", &self.cost_price)?,
            sale_price: decode_money("sale_price", &self.sale_price)?,
            created_at: decode_timestamp("created_at", &self.created_at)?,
            brand: Brand::from_label(&self.brand),
            id: self.id,
            owner_id: self.owner_id,
            name: self.name,
            category: self.category,
            image: self.image,
        })
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products(&owner_id);
///
/// let product = repo.insert(new_product).await?;
/// let left = repo.decrement_stock(&product.id, 2).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
    owner_id: String,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool, owner_id: impl Into<String>) -> Self {
        ProductRepository {
            pool,
            owner_id: owner_id.into(),
        }
    }

    pub fn owner_id(&self) -> &str {
        &self.owner_id
    }

    /// Gets a product by its ID.
    ///
    /// ## Returns
    /// * `Ok(Some(Product))` - Product found
    /// * `Ok(None)` - No such product for this owner
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND owner_id = ?2");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .bind(&self.owner_id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ProductRow::into_product).transpose()
    }

    /// Lists the owner's products by name.
    pub async fn list(&self) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products WHERE owner_id = ?1 \
             ORDER BY name COLLATE NOCASE, id"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(&self.owner_id)
            .fetch_all(&self.pool)
            .await?;

        debug!(count = rows.len(), "Listed products");
        rows.into_iter().map(ProductRow::into_product).collect()
    }

    /// Inserts a new product with a fresh UUID.
    pub async fn insert(&self, product: NewProduct) -> DbResult<Product> {
        let id = Uuid::new_v4().to_string();
        let created_at = now();
        debug!(id = %id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, owner_id, name, brand, category, stock_quantity,
                cost_price, sale_price, image, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?10)
            "#,
        )
        .bind(&id)
        .bind(&self.owner_id)
        .bind(&product.name)
        .bind(product.brand.label())
        .bind(&product.category)
        .bind(i64::from(product.stock_quantity))
        .bind(encode_money(product.cost_price))
        .bind(encode_money(product.sale_price))
        .bind(&product.image)
        .bind(encode_timestamp(created_at))
        .execute(&self.pool)
        .await?;

        Ok(Product {
            id,
            owner_id: self.owner_id.clone(),
            name: product.name,
            brand: product.brand,
            category: product.category,
            stock_quantity: product.stock_quantity,
            cost_price: product.cost_price,
            sale_price: product.sale_price,
            image: product.image,
            created_at,
        })
    }

    /// Applies the fields set in `patch`.
    ///
    /// ## Returns
    /// * `Err(DbError::NotFound)` - Product doesn't exist for this owner
    pub async fn update(&self, id: &str, patch: ProductPatch) -> DbResult<()> {
        debug!(id = %id, "Updating product");

        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("UPDATE products SET ");
        let mut fields = builder.separated(", ");
        if let Some(name) = patch.name {
            fields.push("name = ").push_bind_unseparated(name);
        }
        if let Some(brand) = patch.brand {
            fields.push("brand = ").push_bind_unseparated(brand.label());
        }
        if let Some(category) = patch.category {
            fields.push("category = ").push_bind_unseparated(category);
        }
        if let Some(stock) = patch.stock_quantity {
            fields
                .push("stock_quantity = ")
                .push_bind_unseparated(i64::from(stock));
        }
        if let Some(cost) = patch.cost_price {
            fields.push("cost_price = ").push_bind_unseparated(encode_money(cost));
        }
        if let Some(price) = patch.sale_price {
            fields.push("sale_price = ").push_bind_unseparated(encode_money(price));
        }
        if let Some(image) = patch.image {
            fields.push("image = ").push_bind_unseparated(image);
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
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Deletes a product. Sales keep their snapshot of it.
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        debug!(id = %id, "Deleting product");

        let result = sqlx::query("DELETE FROM products WHERE id = ?1 AND owner_id = ?2")
            .bind(id)
            .bind(&self.owner_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Lowers stock by `quantity`, flooring at zero, in one statement.
    ///
    /// ## Returns
    /// * `Ok(remaining)` - Stock left after the decrement
    /// * `Err(DbError::NotFound)` - Product doesn't exist for this owner
    pub async fn decrement_stock(&self, id: &str, quantity: u32) -> DbResult<u32> {
        debug!(id = %id, quantity, "Decrementing stock");

        let remaining: Option<i64> = sqlx::query_scalar(
            r#"
            UPDATE products
            SET stock_quantity = MAX(0, stock_quantity - ?1),
                updated_at = ?2
            WHERE id = ?3 AND owner_id = ?4
            RETURNING stock_quantity
            "#,
        )
        .bind(i64::from(quantity))
        .bind(encode_timestamp(now()))
        .bind(id)
        .bind(&self.owner_id)
        .fetch_optional(&self.pool)
        .await?;

        match remaining {
            Some(left) => decode_quantity("stock_quantity", left),
            None => Err(DbError::not_found("Product", id)),
        }
    }

    /// Receives `quantity` units bought at `unit_cost`.
    ///
    /// Cost becomes the weighted average of the row as read inside the
    /// transaction; stock is added in SQL, capped at `u32::MAX`.
    ///
    /// ## Returns
    /// * `Ok(Product)` - Product after the restock
    /// * `Err(DbError::NotFound)` - Product doesn't exist for this owner
    /// * `Err(DbError::CheckViolation)` - Zero quantity or negative cost
    pub async fn restock(&self, id: &str, quantity: u32, unit_cost: Money) -> DbResult<Product> {
        debug!(id = %id, quantity, unit_cost = %unit_cost, "Restocking product");

        inventory::validate_restock(quantity, unit_cost)
            .map_err(|e| DbError::CheckViolation(e.to_string()))?;

        let mut tx = self.pool.begin().await?;

        let current: Option<(i64, String)> = sqlx::query_as(
            "SELECT stock_quantity, cost_price FROM products WHERE id = ?1 AND owner_id = ?2",
        )
        .bind(id)
        .bind(&self.owner_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some((stock, cost)) = current else {
            return Err(DbError::not_found("Product", id));
        };
        let cost_price = inventory::weighted_average_cost(
            decode_money("cost_price", &cost)?,
            decode_quantity("stock_quantity", stock)?,
            unit_cost,
            quantity,
        );

        let sql = format!(
            "UPDATE products \
             SET stock_quantity = MIN(stock_quantity + ?1, ?2), cost_price = ?3, updated_at = ?4 \
             WHERE id = ?5 AND owner_id = ?6 \
             RETURNING {PRODUCT_COLUMNS}"
        );
        let row: ProductRow = sqlx::query_as(&sql)
            .bind(i64::from(quantity))
            .bind(i64::from(u32::MAX))
            .bind(encode_money(cost_price))
            .bind(encode_timestamp(now()))
            .bind(id)
            .bind(&self.owner_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        row.into_product()
    }

    /// Counts the owner's products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE owner_id = ?1")
            .bind(&self.owner_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

#[async_trait]
impl ProductStore for ProductRepository {
    async fn get(&self, id: &str) -> StoreResult<Option<Product>> {
        Ok(self.get_by_id(id).await?)
    }

    async fn list(&self) -> StoreResult<Vec<Product>> {
        Ok(ProductRepository::list(self).await?)
    }

    async fn create(&self, product: NewProduct) -> StoreResult<Product> {
        Ok(self.insert(product).await?)
    }

    async fn update(&self, id: &str, patch: ProductPatch) -> StoreResult<()> {
        Ok(ProductRepository::update(self, id, patch).await?)
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        Ok(ProductRepository::delete(self, id).await?)
    }

    async fn decrement_stock_floored(&self, id: &str, quantity: u32) -> StoreResult<u32> {
        Ok(self.decrement_stock(id, quantity).await?)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
