//! Sale and payment repository.
//!
//! Reading only; recording a sale is a multi-table transaction owned by
//! [`crate::services::sales::SaleService`], which validates stock and
//! allocates the invoice number inside the same transaction.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use shoptill_core::{InvoiceNumber, Money, PaymentId, ProductId, SaleId, SaleItemId};

use super::RepositoryError;
use crate::models::{Payment, Sale, SaleItem, SaleLine, SaleSummary};

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for sale header queries.
#[derive(Debug, sqlx::FromRow)]
struct SaleRow {
    id: i64,
    invoice_no: String,
    customer_name: String,
    customer_contact: Option<String>,
    customer_address: Option<String>,
    total_cents: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<SaleRow> for Sale {
    type Error = RepositoryError;

    fn try_from(row: SaleRow) -> Result<Self, Self::Error> {
        let invoice_no = InvoiceNumber::parse(&row.invoice_no).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid invoice number in database: {e}"))
        })?;

        Ok(Self {
            id: SaleId::new(row.id),
            invoice_no,
            customer_name: row.customer_name,
            customer_contact: row.customer_contact,
            customer_address: row.customer_address,
            total: Money::from_cents(row.total_cents),
            created_at: row.created_at,
        })
    }
}

/// Sale header plus the summed payments against it.
#[derive(Debug, sqlx::FromRow)]
struct SaleSummaryRow {
    id: i64,
    invoice_no: String,
    customer_name: String,
    customer_contact: Option<String>,
    customer_address: Option<String>,
    total_cents: i64,
    created_at: DateTime<Utc>,
    paid_cents: i64,
}

impl TryFrom<SaleSummaryRow> for SaleSummary {
    type Error = RepositoryError;

    fn try_from(row: SaleSummaryRow) -> Result<Self, Self::Error> {
        let paid = Money::from_cents(row.paid_cents);
        let sale = SaleRow {
            id: row.id,
            invoice_no: row.invoice_no,
            customer_name: row.customer_name,
            customer_contact: row.customer_contact,
            customer_address: row.customer_address,
            total_cents: row.total_cents,
            created_at: row.created_at,
        }
        .try_into()?;

        Ok(Self { sale, paid })
    }
}

/// Internal row type for sale line queries, with the product name joined in.
#[derive(Debug, sqlx::FromRow)]
struct SaleItemRow {
    id: i64,
    sale_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
}

impl From<SaleItemRow> for SaleItem {
    fn from(row: SaleItemRow) -> Self {
        Self {
            id: SaleItemId::new(row.id),
            sale_id: SaleId::new(row.sale_id),
            product_id: ProductId::new(row.product_id),
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price: Money::from_cents(row.unit_price_cents),
        }
    }
}

/// Internal row type for payment queries.
#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    id: i64,
    sale_id: i64,
    amount_cents: i64,
    paid_at: DateTime<Utc>,
}

impl From<PaymentRow> for Payment {
    fn from(row: PaymentRow) -> Self {
        Self {
            id: PaymentId::new(row.id),
            sale_id: SaleId::new(row.sale_id),
            amount: Money::from_cents(row.amount_cents),
            paid_at: row.paid_at,
        }
    }
}

/// Flat row for the sales CSV export: one row per item.
#[derive(Debug, sqlx::FromRow)]
struct SaleLineRow {
    sale_id: i64,
    invoice_no: String,
    customer_name: String,
    customer_contact: Option<String>,
    customer_address: Option<String>,
    total_cents: i64,
    sale_created_at: DateTime<Utc>,
    item_id: i64,
    product_id: i64,
    product_name: String,
    quantity: i64,
    unit_price_cents: i64,
}

impl TryFrom<SaleLineRow> for SaleLine {
    type Error = RepositoryError;

    fn try_from(row: SaleLineRow) -> Result<Self, Self::Error> {
        let sale = SaleRow {
            id: row.sale_id,
            invoice_no: row.invoice_no,
            customer_name: row.customer_name,
            customer_contact: row.customer_contact,
            customer_address: row.customer_address,
            total_cents: row.total_cents,
            created_at: row.sale_created_at,
        }
        .try_into()?;

        let item = SaleItem::from(SaleItemRow {
            id: row.item_id,
            sale_id: row.sale_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            unit_price_cents: row.unit_price_cents,
        });

        Ok(Self { sale, item })
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for sale and payment database operations.
pub struct SaleRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SaleRepository<'a> {
    /// Create a new sale repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// List every sale, newest first, with payment totals for the due column.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_summaries(&self) -> Result<Vec<SaleSummary>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleSummaryRow>(
            "SELECT s.id, s.invoice_no, s.customer_name, s.customer_contact,
                    s.customer_address, s.total_cents, s.created_at,
                    COALESCE(
                        (SELECT SUM(p.amount_cents) FROM payment p WHERE p.sale_id = s.id),
                        0
                    ) AS paid_cents
             FROM sale s
             ORDER BY s.created_at DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// The most recent sales, newest first. The dashboard shows a handful.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn recent(&self, limit: i64) -> Result<Vec<Sale>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleRow>(
            "SELECT id, invoice_no, customer_name, customer_contact, customer_address,
                    total_cents, created_at
             FROM sale
             ORDER BY created_at DESC
             LIMIT ?",
        )
        .bind(limit)
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a sale by its invoice number.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_by_invoice_no(
        &self,
        invoice_no: &InvoiceNumber,
    ) -> Result<Option<Sale>, RepositoryError> {
        let row = sqlx::query_as::<_, SaleRow>(
            "SELECT id, invoice_no, customer_name, customer_contact, customer_address,
                    total_cents, created_at
             FROM sale
             WHERE invoice_no = ?",
        )
        .bind(invoice_no.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// The line items of one sale, in insertion order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn items_for_sale(&self, sale_id: SaleId) -> Result<Vec<SaleItem>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleItemRow>(
            "SELECT si.id, si.sale_id, si.product_id, p.name AS product_name,
                    si.quantity, si.unit_price_cents
             FROM sale_item si
             JOIN product p ON p.id = si.product_id
             WHERE si.sale_id = ?
             ORDER BY si.id",
        )
        .bind(sale_id)
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Sum of payments recorded against a sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn paid_total(&self, sale_id: SaleId) -> Result<Money, RepositoryError> {
        let cents = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(amount_cents), 0) FROM payment WHERE sale_id = ?",
        )
        .bind(sale_id)
        .fetch_one(self.pool)
        .await?;

        Ok(Money::from_cents(cents))
    }

    /// Record a payment against a sale.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no sale has this ID.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn add_payment(
        &self,
        sale_id: SaleId,
        amount: Money,
    ) -> Result<Payment, RepositoryError> {
        let row = sqlx::query_as::<_, PaymentRow>(
            "INSERT INTO payment (sale_id, amount_cents, paid_at)
             VALUES (?, ?, ?)
             RETURNING id, sale_id, amount_cents, paid_at",
        )
        .bind(sale_id)
        .bind(amount)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_foreign_key_violation()
            {
                return RepositoryError::NotFound;
            }
            RepositoryError::Database(e)
        })?;

        Ok(row.into())
    }

    /// Every sale line across all sales, newest sale first, for the CSV
    /// export.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list_lines(&self) -> Result<Vec<SaleLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, SaleLineRow>(
            "SELECT s.id AS sale_id, s.invoice_no, s.customer_name, s.customer_contact,
                    s.customer_address, s.total_cents, s.created_at AS sale_created_at,
                    si.id AS item_id, si.product_id, p.name AS product_name,
                    si.quantity, si.unit_price_cents
             FROM sale s
             JOIN sale_item si ON si.sale_id = s.id
             JOIN product p ON p.id = si.product_id
             ORDER BY s.created_at DESC, si.id",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::super::test_support::test_pool;
    use super::*;

    /// Insert a sale header directly; repository tests don't need the full
    /// checkout transaction.
    async fn insert_sale(pool: &SqlitePool, seq: i64, total_cents: i64) -> SaleId {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO sale (invoice_no, customer_name, total_cents, created_at)
             VALUES (?, 'Walk-in Customer', ?, ?)
             RETURNING id",
        )
        .bind(InvoiceNumber::from_seq(seq).as_str())
        .bind(total_cents)
        .bind(Utc::now())
        .fetch_one(pool)
        .await
        .unwrap();
        SaleId::new(id)
    }

    #[tokio::test]
    async fn test_get_by_invoice_no() {
        let pool = test_pool().await;
        let repo = SaleRepository::new(&pool);
        insert_sale(&pool, 1, 5000).await;

        let sale = repo
            .get_by_invoice_no(&InvoiceNumber::from_seq(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sale.invoice_no.as_str(), "INV-0001");
        assert_eq!(sale.total, Money::from_cents(5000));

        let missing = repo.get_by_invoice_no(&InvoiceNumber::from_seq(2)).await.unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_payments_accumulate() {
        let pool = test_pool().await;
        let repo = SaleRepository::new(&pool);
        let sale_id = insert_sale(&pool, 1, 10_000).await;

        assert_eq!(repo.paid_total(sale_id).await.unwrap(), Money::ZERO);

        repo.add_payment(sale_id, Money::from_cents(4000)).await.unwrap();
        repo.add_payment(sale_id, Money::from_cents(2500)).await.unwrap();
        assert_eq!(repo.paid_total(sale_id).await.unwrap(), Money::from_cents(6500));

        let summaries = repo.list_summaries().await.unwrap();
        let summary = summaries.first().unwrap();
        assert_eq!(summary.paid, Money::from_cents(6500));
        assert_eq!(summary.due(), Money::from_cents(3500));
    }

    #[tokio::test]
    async fn test_payment_against_missing_sale_is_not_found() {
        let pool = test_pool().await;
        let repo = SaleRepository::new(&pool);

        let err = repo
            .add_payment(SaleId::new(42), Money::from_cents(100))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_recent_is_newest_first_and_limited() {
        let pool = test_pool().await;
        let repo = SaleRepository::new(&pool);
        for seq in 1..=4 {
            insert_sale(&pool, seq, seq * 100).await;
            // Distinct timestamps so the ordering is deterministic.
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        let recent = repo.recent(3).await.unwrap();
        assert_eq!(recent.len(), 3);
        assert_eq!(recent.first().unwrap().invoice_no.as_str(), "INV-0004");
    }
}
