//! CSV export of the catalog and sales ledger, and catalog import.
//!
//! The product headers are identical on the way out and the way in, so a
//! full export re-imports cleanly. Import is forgiving: malformed rows are
//! skipped with a warning instead of failing the whole file.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use shoptill_core::Money;

use crate::models::{NewProduct, Product, SaleLine};

/// Timestamp format in the sales export, e.g. `23-08-2026 05:30 PM`.
const SALE_DATE_FORMAT: &str = "%d-%m-%Y %I:%M %p";

const PRODUCT_HEADERS: [&str; 6] =
    ["Name", "Category", "Cost Price", "Selling Price", "Quantity", "Threshold"];

const SALE_HEADERS: [&str; 9] = [
    "Invoice",
    "Product",
    "Quantity",
    "Customer Name",
    "Contact",
    "Address",
    "Date",
    "Unit Price",
    "Total Price",
];

/// Errors that can occur while writing CSV output.
#[derive(Debug, Error)]
pub enum CsvError {
    /// CSV serialization error.
    #[error("csv processing error: {0}")]
    Csv(#[from] csv::Error),

    /// Underlying writer error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Records
// =============================================================================

/// One row of the products CSV.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Category")]
    pub category: Option<String>,
    #[serde(rename = "Cost Price")]
    pub cost_price: Money,
    #[serde(rename = "Selling Price")]
    pub selling_price: Money,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Threshold")]
    pub threshold: i64,
}

impl From<&Product> for ProductRecord {
    fn from(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            category: product.category.clone(),
            cost_price: product.cost_price,
            selling_price: product.selling_price,
            quantity: product.quantity,
            threshold: product.low_stock_threshold,
        }
    }
}

impl From<ProductRecord> for NewProduct {
    fn from(record: ProductRecord) -> Self {
        Self {
            name: record.name,
            category: record.category,
            cost_price: record.cost_price,
            selling_price: record.selling_price,
            quantity: record.quantity,
            low_stock_threshold: record.threshold,
        }
    }
}

/// One row of the sales CSV: a single sale line with its header fields.
#[derive(Debug, Serialize)]
pub struct SaleRecord {
    #[serde(rename = "Invoice")]
    pub invoice: String,
    #[serde(rename = "Product")]
    pub product: String,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
    #[serde(rename = "Customer Name")]
    pub customer_name: String,
    #[serde(rename = "Contact")]
    pub contact: Option<String>,
    #[serde(rename = "Address")]
    pub address: Option<String>,
    #[serde(rename = "Date")]
    pub date: String,
    #[serde(rename = "Unit Price")]
    pub unit_price: Money,
    #[serde(rename = "Total Price")]
    pub total_price: Money,
}

impl From<&SaleLine> for SaleRecord {
    fn from(line: &SaleLine) -> Self {
        Self {
            invoice: line.sale.invoice_no.as_str().to_owned(),
            product: line.item.product_name.clone(),
            quantity: line.item.quantity,
            customer_name: line.sale.customer_name.clone(),
            contact: line.sale.customer_contact.clone(),
            address: line.sale.customer_address.clone(),
            date: line.sale.created_at.format(SALE_DATE_FORMAT).to_string(),
            unit_price: line.item.unit_price,
            total_price: line.item.total(),
        }
    }
}

// =============================================================================
// Export
// =============================================================================

/// Serialize the catalog as CSV bytes.
///
/// # Errors
///
/// Returns [`CsvError`] if serialization fails.
pub fn export_products(products: &[Product]) -> Result<Vec<u8>, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if products.is_empty() {
        // Serde only emits headers alongside the first record.
        writer.write_record(PRODUCT_HEADERS)?;
    }
    for product in products {
        writer.serialize(ProductRecord::from(product))?;
    }

    Ok(writer.into_inner().map_err(csv::IntoInnerError::into_error)?)
}

/// Serialize the sales ledger as CSV bytes, one row per sale line.
///
/// # Errors
///
/// Returns [`CsvError`] if serialization fails.
pub fn export_sales(lines: &[SaleLine]) -> Result<Vec<u8>, CsvError> {
    let mut writer = csv::Writer::from_writer(Vec::new());

    if lines.is_empty() {
        writer.write_record(SALE_HEADERS)?;
    }
    for line in lines {
        writer.serialize(SaleRecord::from(line))?;
    }

    Ok(writer.into_inner().map_err(csv::IntoInnerError::into_error)?)
}

// =============================================================================
// Import
// =============================================================================

/// Outcome of parsing a products CSV.
#[derive(Debug)]
pub struct ProductImport {
    /// Rows that parsed cleanly, in file order.
    pub products: Vec<NewProduct>,
    /// Rows dropped for being malformed or carrying negative counts.
    pub skipped: usize,
}

/// Parse an uploaded products CSV.
///
/// Each bad row is logged and counted, never fatal; an unusable file simply
/// comes back with everything skipped.
#[must_use]
pub fn parse_products(data: &[u8]) -> ProductImport {
    let mut reader = csv::Reader::from_reader(data);
    let mut products = Vec::new();
    let mut skipped = 0usize;

    for row in reader.deserialize::<ProductRecord>() {
        match row {
            Ok(record) if record.quantity >= 0 && record.threshold >= 0 => {
                products.push(record.into());
            }
            Ok(record) => {
                tracing::warn!(name = %record.name, "skipping product row with negative counts");
                skipped += 1;
            }
            Err(e) => {
                tracing::warn!(error = %e, "skipping malformed product row");
                skipped += 1;
            }
        }
    }

    ProductImport { products, skipped }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};

    use shoptill_core::{InvoiceNumber, ProductId, SaleId, SaleItemId};

    use super::*;
    use crate::models::{Sale, SaleItem};

    fn apple() -> Product {
        Product {
            id: ProductId::new(1),
            name: "Apple".to_owned(),
            category: Some("Fruit".to_owned()),
            cost_price: Money::from_cents(2500),
            selling_price: Money::from_cents(3000),
            quantity: 50,
            low_stock_threshold: 5,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_product_export_headers() {
        let bytes = export_products(&[apple()]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        let header = text.lines().next().unwrap();
        assert_eq!(header, "Name,Category,Cost Price,Selling Price,Quantity,Threshold");
        assert!(text.lines().nth(1).unwrap().starts_with("Apple,Fruit,25.00,30.00,50,5"));
    }

    #[test]
    fn test_empty_export_still_has_headers() {
        let bytes = export_products(&[]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.trim_end(),
            "Name,Category,Cost Price,Selling Price,Quantity,Threshold"
        );
    }

    #[test]
    fn test_export_import_round_trip() {
        let mut banana = apple();
        banana.name = "Banana".to_owned();
        banana.category = None;
        banana.selling_price = Money::from_cents(1000);

        let bytes = export_products(&[apple(), banana]).unwrap();
        let import = parse_products(&bytes);

        assert_eq!(import.skipped, 0);
        assert_eq!(import.products.len(), 2);
        let first = import.products.first().unwrap();
        assert_eq!(first.name, "Apple");
        assert_eq!(first.category.as_deref(), Some("Fruit"));
        assert_eq!(first.cost_price, Money::from_cents(2500));
        assert_eq!(first.selling_price, Money::from_cents(3000));
        assert_eq!(first.quantity, 50);
        assert_eq!(first.low_stock_threshold, 5);
        let second = import.products.get(1).unwrap();
        assert_eq!(second.name, "Banana");
        assert_eq!(second.category, None);
    }

    #[test]
    fn test_import_skips_bad_rows() {
        let data = b"Name,Category,Cost Price,Selling Price,Quantity,Threshold\n\
                     Apple,Fruit,25.00,30.00,50,5\n\
                     Broken,Fruit,not-a-price,30.00,50,5\n\
                     Negative,Fruit,25.00,30.00,-3,5\n\
                     Banana,,9.00,10.00,100,10\n";
        let import = parse_products(data);

        assert_eq!(import.products.len(), 2);
        assert_eq!(import.skipped, 2);
        assert_eq!(import.products.first().unwrap().name, "Apple");
        assert_eq!(import.products.get(1).unwrap().name, "Banana");
    }

    #[test]
    fn test_import_rejects_negative_prices() {
        let data = b"Name,Category,Cost Price,Selling Price,Quantity,Threshold\n\
                     Refund,Fruit,-5.00,30.00,10,5\n";
        let import = parse_products(data);

        assert!(import.products.is_empty());
        assert_eq!(import.skipped, 1);
    }

    #[test]
    fn test_sales_export_shape() {
        let sale = Sale {
            id: SaleId::new(7),
            invoice_no: InvoiceNumber::from_seq(7),
            customer_name: "Asha".to_owned(),
            customer_contact: Some("9876543210".to_owned()),
            customer_address: None,
            total: Money::from_cents(9000),
            created_at: Utc.with_ymd_and_hms(2026, 8, 23, 17, 30, 0).unwrap(),
        };
        let line = SaleLine {
            item: SaleItem {
                id: SaleItemId::new(1),
                sale_id: sale.id,
                product_id: ProductId::new(1),
                product_name: "Apple".to_owned(),
                quantity: 3,
                unit_price: Money::from_cents(3000),
            },
            sale,
        };

        let bytes = export_sales(&[line]).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(
            text.lines().next().unwrap(),
            "Invoice,Product,Quantity,Customer Name,Contact,Address,Date,Unit Price,Total Price"
        );
        assert_eq!(
            text.lines().nth(1).unwrap(),
            "INV-0007,Apple,3,Asha,9876543210,,23-08-2026 05:30 PM,30.00,90.00"
        );
    }
}
