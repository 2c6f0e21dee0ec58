//! Sale and payment domain types.

use chrono::{DateTime, Utc};

use shoptill_core::{InvoiceNumber, Money, PaymentId, ProductId, SaleId, SaleItemId};

/// A completed checkout: the invoice header.
#[derive(Debug, Clone)]
pub struct Sale {
    /// Unique sale ID.
    pub id: SaleId,
    /// Invoice number printed on the receipt, unique across all sales.
    pub invoice_no: InvoiceNumber,
    /// Who bought.
    pub customer_name: String,
    /// Customer phone or other contact, if given.
    pub customer_contact: Option<String>,
    /// Customer address, if given.
    pub customer_address: Option<String>,
    /// Sum of all line totals.
    pub total: Money,
    /// When the sale was recorded.
    pub created_at: DateTime<Utc>,
}

/// One line of a sale.
///
/// `unit_price` is the selling price captured at checkout time, so later
/// price changes never rewrite history. `product_name` is joined in from the
/// catalog for display.
#[derive(Debug, Clone)]
pub struct SaleItem {
    pub id: SaleItemId,
    pub sale_id: SaleId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl SaleItem {
    /// Line total for this item.
    #[must_use]
    pub fn total(&self) -> Money {
        self.unit_price.checked_mul(self.quantity).unwrap_or(Money::ZERO)
    }
}

/// A payment recorded against a sale.
#[derive(Debug, Clone)]
pub struct Payment {
    pub id: PaymentId,
    pub sale_id: SaleId,
    pub amount: Money,
    pub paid_at: DateTime<Utc>,
}

/// A sale together with the sum of its payments, for listings.
#[derive(Debug, Clone)]
pub struct SaleSummary {
    pub sale: Sale,
    /// Total paid so far. Zero when nothing has been recorded.
    pub paid: Money,
}

/// One sale line joined with its invoice header, as the sales CSV export
/// wants it: one row per item, header fields repeated.
#[derive(Debug, Clone)]
pub struct SaleLine {
    pub sale: Sale,
    pub item: SaleItem,
}

impl SaleSummary {
    /// Outstanding balance. Never negative, even when overpaid.
    #[must_use]
    pub fn due(&self) -> Money {
        self.sale.total.saturating_sub_floor_zero(self.paid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(total_cents: i64) -> Sale {
        Sale {
            id: SaleId::new(1),
            invoice_no: InvoiceNumber::from_seq(1),
            customer_name: "Walk-in Customer".to_owned(),
            customer_contact: None,
            customer_address: None,
            total: Money::from_cents(total_cents),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_item_total() {
        let item = SaleItem {
            id: SaleItemId::new(1),
            sale_id: SaleId::new(1),
            product_id: ProductId::new(1),
            product_name: "Apple".to_owned(),
            quantity: 3,
            unit_price: Money::from_cents(3000),
        };
        assert_eq!(item.total(), Money::from_cents(9000));
    }

    #[test]
    fn test_due_is_total_minus_paid() {
        let summary = SaleSummary { sale: sale(10_000), paid: Money::from_cents(4000) };
        assert_eq!(summary.due(), Money::from_cents(6000));
    }

    #[test]
    fn test_due_never_negative_when_overpaid() {
        let summary = SaleSummary { sale: sale(10_000), paid: Money::from_cents(12_000) };
        assert_eq!(summary.due(), Money::ZERO);
    }
}
