//! Checkout: records a sale atomically.
//!
//! The whole sale happens in one database transaction: allocate the next
//! invoice number, insert the header, then per line item check stock,
//! decrement it and insert the line. Any failure rolls the whole sale back,
//! so stock counts move if and only if the invoice exists.

use chrono::Utc;
use sqlx::SqlitePool;
use thiserror::Error;

use shoptill_core::{InvoiceNumber, Money, ProductId, SaleId, SaleItemId};

use crate::models::{Sale, SaleItem};

/// Errors that can occur while recording a sale.
#[derive(Debug, Error)]
pub enum SaleError {
    /// Customer name missing or blank.
    #[error("customer name is required")]
    EmptyCustomer,

    /// No line items given.
    #[error("at least one item is required")]
    NoItems,

    /// A line item has a quantity below one.
    #[error("invalid quantity for product {0}")]
    InvalidQuantity(ProductId),

    /// A line item references a product that does not exist.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// Not enough stock on hand for a line item.
    #[error("insufficient stock for {name}")]
    InsufficientStock {
        /// Product display name, for the error shown at the till.
        name: String,
    },

    /// Line totals overflowed. Practically unreachable with sane prices.
    #[error("sale total exceeds the representable amount")]
    TotalTooLarge,

    /// Stored invoice number failed to parse back.
    #[error("invoice number corrupted: {0}")]
    Invoice(#[from] shoptill_core::InvoiceNumberError),

    /// Database error.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Input for one checkout.
#[derive(Debug, Clone)]
pub struct NewSale {
    pub customer_name: String,
    pub customer_contact: Option<String>,
    pub customer_address: Option<String>,
    pub items: Vec<NewSaleItem>,
}

/// One line of a checkout, by product.
#[derive(Debug, Clone, Copy)]
pub struct NewSaleItem {
    pub product_id: ProductId,
    pub quantity: i64,
}

/// A recorded sale, returned with its lines so the invoice PDF can be
/// rendered without re-reading the database.
#[derive(Debug, Clone)]
pub struct CreatedSale {
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Product fields the checkout needs while holding the transaction.
#[derive(Debug, sqlx::FromRow)]
struct StockRow {
    name: String,
    selling_price_cents: i64,
    quantity: i64,
}

/// Checkout service.
pub struct SaleService<'a> {
    pool: &'a SqlitePool,
}

impl<'a> SaleService<'a> {
    /// Create a new checkout service.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a sale: decrement stock and write the invoice rows atomically.
    ///
    /// Stock is checked line by line inside the transaction, so a failure on
    /// the third line also undoes the first two. The invoice number is
    /// allocated by the header insert itself; the insert is the transaction's
    /// first statement and takes the write lock, so two concurrent checkouts
    /// can never allocate the same number.
    ///
    /// # Errors
    ///
    /// Returns a validation variant for bad input, `InsufficientStock` when a
    /// line asks for more than is on hand, and `Database` for anything the
    /// storage layer refuses. In every error case nothing is persisted.
    pub async fn create_sale(&self, input: NewSale) -> Result<CreatedSale, SaleError> {
        let customer_name = input.customer_name.trim();
        if customer_name.is_empty() {
            return Err(SaleError::EmptyCustomer);
        }
        if input.items.is_empty() {
            return Err(SaleError::NoItems);
        }

        let created_at = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Header first. The invoice number is derived from MAX(id) + 1 in the
        // same statement; sale rows are never deleted, so the sequence only
        // moves forward.
        let (sale_id, invoice_no) = sqlx::query_as::<_, (i64, String)>(
            "INSERT INTO sale (invoice_no, customer_name, customer_contact,
                               customer_address, total_cents, created_at)
             VALUES (
                 'INV-' || printf('%04d', (SELECT COALESCE(MAX(id), 0) + 1 FROM sale)),
                 ?, ?, ?, 0, ?
             )
             RETURNING id, invoice_no",
        )
        .bind(customer_name)
        .bind(&input.customer_contact)
        .bind(&input.customer_address)
        .bind(created_at)
        .fetch_one(&mut *tx)
        .await?;
        let invoice_no = InvoiceNumber::parse(&invoice_no)?;

        let mut total = Money::ZERO;
        let mut items = Vec::with_capacity(input.items.len());
        for line in &input.items {
            if line.quantity < 1 {
                return Err(SaleError::InvalidQuantity(line.product_id));
            }

            let product = sqlx::query_as::<_, StockRow>(
                "SELECT name, selling_price_cents, quantity FROM product WHERE id = ?",
            )
            .bind(line.product_id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(SaleError::ProductNotFound(line.product_id))?;

            if product.quantity < line.quantity {
                return Err(SaleError::InsufficientStock { name: product.name });
            }

            sqlx::query("UPDATE product SET quantity = quantity - ?, updated_at = ? WHERE id = ?")
                .bind(line.quantity)
                .bind(created_at)
                .bind(line.product_id)
                .execute(&mut *tx)
                .await?;

            let unit_price = Money::from_cents(product.selling_price_cents);
            let line_total = unit_price
                .checked_mul(line.quantity)
                .ok_or(SaleError::TotalTooLarge)?;
            total = total.checked_add(line_total).ok_or(SaleError::TotalTooLarge)?;

            let item_id = sqlx::query_scalar::<_, i64>(
                "INSERT INTO sale_item (sale_id, product_id, quantity, unit_price_cents)
                 VALUES (?, ?, ?, ?)
                 RETURNING id",
            )
            .bind(sale_id)
            .bind(line.product_id)
            .bind(line.quantity)
            .bind(unit_price)
            .fetch_one(&mut *tx)
            .await?;

            items.push(SaleItem {
                id: SaleItemId::new(item_id),
                sale_id: SaleId::new(sale_id),
                product_id: line.product_id,
                product_name: product.name,
                quantity: line.quantity,
                unit_price,
            });
        }

        sqlx::query("UPDATE sale SET total_cents = ? WHERE id = ?")
            .bind(total)
            .bind(sale_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(CreatedSale {
            sale: Sale {
                id: SaleId::new(sale_id),
                invoice_no,
                customer_name: customer_name.to_owned(),
                customer_contact: input.customer_contact,
                customer_address: input.customer_address,
                total,
                created_at,
            },
            items,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::test_support::test_pool;
    use crate::db::{ProductRepository, SaleRepository};
    use crate::models::NewProduct;

    fn stocked(name: &str, price_cents: i64, quantity: i64) -> NewProduct {
        NewProduct {
            name: name.to_owned(),
            category: None,
            cost_price: Money::from_cents(price_cents),
            selling_price: Money::from_cents(price_cents),
            quantity,
            low_stock_threshold: 5,
        }
    }

    fn sale_of(items: Vec<NewSaleItem>) -> NewSale {
        NewSale {
            customer_name: "Asha".to_owned(),
            customer_contact: None,
            customer_address: None,
            items,
        }
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_exactly() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 50)).await.unwrap();

        let service = SaleService::new(&pool);
        let created = service
            .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 3 }]))
            .await
            .unwrap();

        assert_eq!(created.sale.total, Money::from_cents(9000));
        assert_eq!(created.items.len(), 1);

        let after = products.get_by_id(apple.id).await.unwrap().unwrap();
        assert_eq!(after.quantity, 47);
    }

    #[tokio::test]
    async fn test_multi_item_totals_and_stock() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 50)).await.unwrap();
        let milk = products.create(&stocked("Milk (1L)", 4500, 40)).await.unwrap();

        let service = SaleService::new(&pool);
        let created = service
            .create_sale(sale_of(vec![
                NewSaleItem { product_id: apple.id, quantity: 2 },
                NewSaleItem { product_id: milk.id, quantity: 1 },
            ]))
            .await
            .unwrap();

        // 2 * 30.00 + 1 * 45.00
        assert_eq!(created.sale.total, Money::from_cents(10_500));
        assert_eq!(products.get_by_id(apple.id).await.unwrap().unwrap().quantity, 48);
        assert_eq!(products.get_by_id(milk.id).await.unwrap().unwrap().quantity, 39);
    }

    #[tokio::test]
    async fn test_insufficient_stock_rolls_back_everything() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 50)).await.unwrap();
        let milk = products.create(&stocked("Milk (1L)", 4500, 2)).await.unwrap();

        let service = SaleService::new(&pool);
        let err = service
            .create_sale(sale_of(vec![
                NewSaleItem { product_id: apple.id, quantity: 10 },
                NewSaleItem { product_id: milk.id, quantity: 5 },
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::InsufficientStock { ref name } if name == "Milk (1L)"));

        // The apple decrement from the first line must be rolled back too.
        assert_eq!(products.get_by_id(apple.id).await.unwrap().unwrap().quantity, 50);
        assert_eq!(products.get_by_id(milk.id).await.unwrap().unwrap().quantity, 2);

        let sales = SaleRepository::new(&pool);
        assert!(sales.list_summaries().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_stock_never_goes_negative_on_exact_depletion() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 3)).await.unwrap();

        let service = SaleService::new(&pool);
        service
            .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 3 }]))
            .await
            .unwrap();
        assert_eq!(products.get_by_id(apple.id).await.unwrap().unwrap().quantity, 0);

        let err = service
            .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 1 }]))
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::InsufficientStock { .. }));
        assert_eq!(products.get_by_id(apple.id).await.unwrap().unwrap().quantity, 0);
    }

    #[tokio::test]
    async fn test_invoice_numbers_are_sequential_and_unique() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 50)).await.unwrap();

        let service = SaleService::new(&pool);
        let mut seen = Vec::new();
        for _ in 0..3 {
            let created = service
                .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 1 }]))
                .await
                .unwrap();
            seen.push(created.sale.invoice_no.as_str().to_owned());
        }
        assert_eq!(seen, vec!["INV-0001", "INV-0002", "INV-0003"]);
    }

    #[tokio::test]
    async fn test_failed_sale_does_not_consume_an_invoice_number() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 5)).await.unwrap();

        let service = SaleService::new(&pool);
        service
            .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 1 }]))
            .await
            .unwrap();
        service
            .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 99 }]))
            .await
            .unwrap_err();
        let created = service
            .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 1 }]))
            .await
            .unwrap();

        // The rolled-back attempt left no gap.
        assert_eq!(created.sale.invoice_no.as_str(), "INV-0002");
    }

    #[tokio::test]
    async fn test_unknown_product_is_rejected() {
        let pool = test_pool().await;
        let service = SaleService::new(&pool);

        let err = service
            .create_sale(sale_of(vec![NewSaleItem {
                product_id: ProductId::new(999),
                quantity: 1,
            }]))
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::ProductNotFound(id) if id == ProductId::new(999)));
    }

    #[tokio::test]
    async fn test_zero_quantity_is_rejected() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 50)).await.unwrap();

        let service = SaleService::new(&pool);
        let err = service
            .create_sale(sale_of(vec![NewSaleItem { product_id: apple.id, quantity: 0 }]))
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::InvalidQuantity(_)));
        assert_eq!(products.get_by_id(apple.id).await.unwrap().unwrap().quantity, 50);
    }

    #[tokio::test]
    async fn test_blank_customer_and_empty_items_are_rejected() {
        let pool = test_pool().await;
        let service = SaleService::new(&pool);

        let mut input = sale_of(vec![]);
        assert!(matches!(
            service.create_sale(input.clone()).await.unwrap_err(),
            SaleError::NoItems
        ));

        input.customer_name = "   ".to_owned();
        input.items = vec![NewSaleItem { product_id: ProductId::new(1), quantity: 1 }];
        assert!(matches!(
            service.create_sale(input).await.unwrap_err(),
            SaleError::EmptyCustomer
        ));
    }

    #[tokio::test]
    async fn test_repeated_product_lines_each_decrement() {
        let pool = test_pool().await;
        let products = ProductRepository::new(&pool);
        let apple = products.create(&stocked("Apple", 3000, 5)).await.unwrap();

        let service = SaleService::new(&pool);
        let created = service
            .create_sale(sale_of(vec![
                NewSaleItem { product_id: apple.id, quantity: 2 },
                NewSaleItem { product_id: apple.id, quantity: 3 },
            ]))
            .await
            .unwrap();
        assert_eq!(created.sale.total, Money::from_cents(15_000));
        assert_eq!(products.get_by_id(apple.id).await.unwrap().unwrap().quantity, 0);

        // A sixth unit would have overdrawn; the second line must have seen
        // the first line's decrement.
        let err = service
            .create_sale(sale_of(vec![
                NewSaleItem { product_id: apple.id, quantity: 1 },
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, SaleError::InsufficientStock { .. }));
    }
}
