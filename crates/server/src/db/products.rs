//! Inventory catalog repository.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use shoptill_core::{Money, ProductId};

use super::RepositoryError;
use crate::models::{NewProduct, Product};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for product queries.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    category: Option<String>,
    cost_price_cents: i64,
    selling_price_cents: i64,
    quantity: i64,
    low_stock_threshold: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: ProductId::new(row.id),
            name: row.name,
            category: row.category,
            cost_price: Money::from_cents(row.cost_price_cents),
            selling_price: Money::from_cents(row.selling_price_cents),
            quantity: row.quantity,
            low_stock_threshold: row.low_stock_threshold,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for inventory catalog database operations.
pub struct ProductRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List the whole catalog in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, category, cost_price_cents, selling_price_cents,
                    quantity, low_stock_threshold, created_at, updated_at
             FROM product
             ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List products at or below their low-stock threshold.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_low_stock(&self) -> Result<Vec<Product>, RepositoryError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, category, cost_price_cents, selling_price_cents,
                    quantity, low_stock_threshold, created_at, updated_at
             FROM product
             WHERE quantity <= low_stock_threshold
             ORDER BY id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get a product by its ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, category, cost_price_cents, selling_price_cents,
                    quantity, low_stock_threshold, created_at, updated_at
             FROM product
             WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Create a new product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create(&self, input: &NewProduct) -> Result<Product, RepositoryError> {
        let now = Utc::now();
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO product (name, category, cost_price_cents, selling_price_cents,
                                  quantity, low_stock_threshold, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id, name, category, cost_price_cents, selling_price_cents,
                       quantity, low_stock_threshold, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.quantity)
        .bind(input.low_stock_threshold)
        .bind(now)
        .bind(now)
        .fetch_one(self.pool)
        .await?;

        Ok(row.into())
    }

    /// Update every editable field of a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Database` if the update fails.
    pub async fn update(
        &self,
        id: ProductId,
        input: &NewProduct,
    ) -> Result<Product, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE product
             SET name = ?, category = ?, cost_price_cents = ?, selling_price_cents = ?,
                 quantity = ?, low_stock_threshold = ?, updated_at = ?
             WHERE id = ?
             RETURNING id, name, category, cost_price_cents, selling_price_cents,
                       quantity, low_stock_threshold, created_at, updated_at",
        )
        .bind(&input.name)
        .bind(&input.category)
        .bind(input.cost_price)
        .bind(input.selling_price)
        .bind(input.quantity)
        .bind(input.low_stock_threshold)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(self.pool)
        .await?;

        row.map(Into::into).ok_or(RepositoryError::NotFound)
    }

    /// Delete a product.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no product has this ID.
    /// Returns `RepositoryError::Conflict` if sale items still reference it;
    /// invoices keep their history, so such products cannot be removed.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn delete(&self, id: ProductId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product WHERE id = ?")
            .bind(id)
            .execute(self.pool)
            .await
            .map_err(|e| {
                if let sqlx::Error::Database(ref db_err) = e
                    && db_err.is_foreign_key_violation()
                {
                    return RepositoryError::Conflict(
                        "product is referenced by recorded sales".to_owned(),
                    );
                }
                RepositoryError::Database(e)
            })?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Create a batch of products in one transaction; on any failure nothing
    /// is inserted. Used by the CSV import so a bad mid-file row cannot leave
    /// a partial catalog behind.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any insert fails.
    pub async fn create_many(&self, inputs: &[NewProduct]) -> Result<usize, RepositoryError> {
        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        for input in inputs {
            sqlx::query(
                "INSERT INTO product (name, category, cost_price_cents, selling_price_cents,
                                      quantity, low_stock_threshold, created_at, updated_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(&input.name)
            .bind(&input.category)
            .bind(input.cost_price)
            .bind(input.selling_price)
            .bind(input.quantity)
            .bind(input.low_stock_threshold)
            .bind(now)
            .bind(now)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(inputs.len())
    }
}
