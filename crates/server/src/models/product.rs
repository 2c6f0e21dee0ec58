//! Inventory catalog domain types.

use chrono::{DateTime, Utc};

use shoptill_core::{Money, ProductId};

/// A product in the inventory catalog (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// Display name.
    pub name: String,
    /// Free-form category label, if any.
    pub category: Option<String>,
    /// What the shop paid per unit.
    pub cost_price: Money,
    /// What the shop charges per unit.
    pub selling_price: Money,
    /// Units currently on hand. Never negative.
    pub quantity: i64,
    /// Stock level at or below which the product is flagged on the dashboard.
    pub low_stock_threshold: i64,
    /// When the product was created.
    pub created_at: DateTime<Utc>,
    /// When the product was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Whether the on-hand quantity has fallen to the reorder threshold.
    #[must_use]
    pub const fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}

/// Input for creating or updating a product.
///
/// Also the shape a CSV import row parses into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewProduct {
    pub name: String,
    pub category: Option<String>,
    pub cost_price: Money,
    pub selling_price: Money,
    pub quantity: i64,
    pub low_stock_threshold: i64,
}
