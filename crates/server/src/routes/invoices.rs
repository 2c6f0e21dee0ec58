//! Invoice retrieval routes.
//!
//! Both routes are public, as customers follow invoice links without a
//! staff session. The invoice number is parsed before it touches the
//! filesystem, so a crafted path segment can never escape the invoice
//! directory.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};

use shoptill_core::InvoiceNumber;

use crate::db::{SaleRepository, ShopInfoRepository};
use crate::error::AppError;
use crate::filters;
use crate::state::AppState;

use super::MessageQuery;

// =============================================================================
// Views & Templates
// =============================================================================

/// One line of the invoice table.
#[derive(Debug, Clone)]
pub struct InvoiceItemView {
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: String,
    pub total: String,
}

/// HTML invoice view template.
#[derive(Template, WebTemplate)]
#[template(path = "invoice_view.html")]
pub struct InvoiceViewTemplate {
    pub shop_name: String,
    pub shop_address: String,
    pub shop_phone: String,
    pub shop_gstin: String,
    pub invoice_no: String,
    pub customer_name: String,
    pub customer_contact: String,
    pub customer_address: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<InvoiceItemView>,
    pub total: String,
    pub paid: String,
    pub due: String,
    pub has_payments: bool,
    pub success: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Stream the stored invoice PDF.
///
/// GET /invoices/{invoice_no}
pub async fn pdf(
    State(state): State<AppState>,
    Path(invoice_no): Path<String>,
) -> Result<Response, AppError> {
    let invoice_no = InvoiceNumber::parse(&invoice_no)
        .map_err(|_| AppError::NotFound(format!("invoice {invoice_no}")))?;

    let path = state
        .config()
        .invoice_dir
        .join(format!("{invoice_no}.pdf"));
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|_| AppError::NotFound(format!("invoice {invoice_no}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("inline; filename=\"{invoice_no}.pdf\""),
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Render the HTML invoice view.
///
/// GET /invoices/{invoice_no}/view
pub async fn view(
    State(state): State<AppState>,
    Path(invoice_no): Path<String>,
    Query(query): Query<MessageQuery>,
) -> Result<InvoiceViewTemplate, AppError> {
    let invoice_no = InvoiceNumber::parse(&invoice_no)
        .map_err(|_| AppError::NotFound(format!("invoice {invoice_no}")))?;

    let sales = SaleRepository::new(state.pool());
    let sale = sales
        .get_by_invoice_no(&invoice_no)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("invoice {invoice_no}")))?;
    let items = sales.items_for_sale(sale.id).await?;
    let paid = sales.paid_total(sale.id).await?;
    let shop = ShopInfoRepository::new(state.pool()).get().await?;

    let due = sale.total.saturating_sub_floor_zero(paid);

    Ok(InvoiceViewTemplate {
        shop_name: shop.shop_name,
        shop_address: shop.address,
        shop_phone: shop.phone,
        shop_gstin: shop.gstin,
        invoice_no: sale.invoice_no.to_string(),
        customer_name: sale.customer_name,
        customer_contact: sale.customer_contact.unwrap_or_default(),
        customer_address: sale.customer_address.unwrap_or_default(),
        created_at: sale.created_at,
        items: items
            .iter()
            .map(|item| InvoiceItemView {
                product_name: item.product_name.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price.to_string(),
                total: item.total().to_string(),
            })
            .collect(),
        total: sale.total.to_string(),
        paid: paid.to_string(),
        due: due.to_string(),
        has_payments: !paid.is_zero(),
        success: query.success,
    })
}
