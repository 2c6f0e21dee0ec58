//! Sales route handlers: the till page, form-based checkout, payments and
//! the ledger CSV export.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use shoptill_core::{Money, ProductId, SaleId};

use crate::db::{ProductRepository, RepositoryError, SaleRepository, ShopInfoRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::SaleSummary;
use crate::services::csv_io;
use crate::services::invoice::{self, InvoiceContext};
use crate::services::sales::{NewSale, NewSaleItem, SaleError, SaleService};
use crate::state::AppState;

use super::products::ProductView;
use super::{MessageQuery, flash};

/// Customer name recorded when the till form leaves it blank.
const WALK_IN_CUSTOMER: &str = "Walk-in Customer";

// =============================================================================
// Views
// =============================================================================

/// Sale display data for the ledger table.
#[derive(Debug, Clone)]
pub struct SaleView {
    pub id: i64,
    pub invoice_no: String,
    pub customer_name: String,
    pub total: String,
    pub paid: String,
    pub due: String,
    pub created_at: DateTime<Utc>,
}

impl From<&SaleSummary> for SaleView {
    fn from(summary: &SaleSummary) -> Self {
        Self {
            id: summary.sale.id.as_i64(),
            invoice_no: summary.sale.invoice_no.to_string(),
            customer_name: summary.sale.customer_name.clone(),
            total: summary.sale.total.to_string(),
            paid: summary.paid.to_string(),
            due: summary.due().to_string(),
            created_at: summary.sale.created_at,
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Till page template: product picker plus the full ledger, newest first.
#[derive(Template, WebTemplate)]
#[template(path = "sales.html")]
pub struct SalesTemplate {
    pub products: Vec<ProductView>,
    pub sales: Vec<SaleView>,
    pub success: Option<String>,
    pub error: Option<String>,
}

// =============================================================================
// Forms
// =============================================================================

/// The till form: one product, one quantity.
#[derive(Debug, Deserialize)]
pub struct SaleForm {
    pub product_id: String,
    pub quantity: String,
    #[serde(default)]
    pub customer_name: String,
    #[serde(default)]
    pub customer_contact: String,
    #[serde(default)]
    pub customer_address: String,
}

/// Payment form against one sale.
#[derive(Debug, Deserialize)]
pub struct PaymentForm {
    pub amount: String,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the till page.
///
/// GET /sales
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<SalesTemplate, AppError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    let summaries = SaleRepository::new(state.pool()).list_summaries().await?;

    Ok(SalesTemplate {
        products: products.iter().map(Into::into).collect(),
        sales: summaries.iter().map(Into::into).collect(),
        success: query.success,
        error: query.error,
    })
}

/// Record a single-product sale from the till form.
///
/// POST /sales
///
/// On success the invoice PDF is rendered to disk and the user lands on the
/// invoice view. A PDF failure only logs; the sale is already committed.
pub async fn create(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Form(form): Form<SaleForm>,
) -> Result<Redirect, AppError> {
    let Ok(product_id) = form.product_id.trim().parse::<i64>() else {
        return Ok(flash("/sales", "error", "Select a product."));
    };
    let Ok(quantity) = form.quantity.trim().parse::<i64>() else {
        return Ok(flash("/sales", "error", "Invalid quantity."));
    };

    let customer_name = match form.customer_name.trim() {
        "" => WALK_IN_CUSTOMER.to_owned(),
        name => name.to_owned(),
    };
    let customer_contact = match form.customer_contact.trim() {
        "" => None,
        contact => Some(contact.to_owned()),
    };
    let customer_address = match form.customer_address.trim() {
        "" => None,
        address => Some(address.to_owned()),
    };

    let service = SaleService::new(state.pool());
    let created = match service
        .create_sale(NewSale {
            customer_name,
            customer_contact,
            customer_address,
            items: vec![NewSaleItem {
                product_id: ProductId::new(product_id),
                quantity,
            }],
        })
        .await
    {
        Ok(created) => created,
        Err(SaleError::InsufficientStock { .. }) => {
            return Ok(flash("/sales", "error", "Insufficient stock."));
        }
        Err(SaleError::ProductNotFound(_)) => {
            return Ok(flash("/sales", "error", "Product not found."));
        }
        Err(SaleError::InvalidQuantity(_)) => {
            return Ok(flash("/sales", "error", "Invalid quantity."));
        }
        Err(SaleError::Database(e)) => return Err(AppError::Database(e.into())),
        Err(e) => return Err(AppError::BadRequest(e.to_string())),
    };

    write_invoice_pdf(&state, &created.sale, &created.items).await;

    let invoice_no = created.sale.invoice_no.clone();
    tracing::info!(invoice_no = %invoice_no, "sale recorded");
    Ok(flash(
        &format!("/invoices/{invoice_no}/view"),
        "success",
        "Sale recorded and invoice generated.",
    ))
}

/// Record a payment against a sale.
///
/// POST /sales/{id}/payments
pub async fn add_payment(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<PaymentForm>,
) -> Result<Redirect, AppError> {
    let amount = match Money::parse(&form.amount) {
        Ok(amount) if !amount.is_zero() => amount,
        Ok(_) => return Ok(flash("/sales", "error", "Payment amount must be above zero.")),
        Err(e) => return Ok(flash("/sales", "error", &format!("Invalid amount: {e}"))),
    };

    match SaleRepository::new(state.pool())
        .add_payment(SaleId::new(id), amount)
        .await
    {
        Ok(_) => Ok(flash("/sales", "success", "Payment recorded.")),
        Err(RepositoryError::NotFound) => Err(AppError::NotFound(format!("sale {id}"))),
        Err(e) => Err(e.into()),
    }
}

/// Download the sales ledger as CSV, one row per sale line.
///
/// GET /sales/export
pub async fn export(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Response, AppError> {
    let lines = SaleRepository::new(state.pool()).list_lines().await?;
    let bytes = csv_io::export_sales(&lines)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"sales.csv\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Render the invoice PDF after a committed sale. Failures are logged and
/// never undo the sale.
pub(crate) async fn write_invoice_pdf(
    state: &AppState,
    sale: &crate::models::Sale,
    items: &[crate::models::SaleItem],
) {
    let shop = match ShopInfoRepository::new(state.pool()).get().await {
        Ok(shop) => shop,
        Err(e) => {
            tracing::error!(error = %e, "failed to load shop info for invoice");
            return;
        }
    };

    let context = InvoiceContext {
        shop: &shop,
        sale,
        items,
        paid: Money::ZERO,
    };
    if let Err(e) = invoice::write_pdf(&state.config().invoice_dir, context).await {
        tracing::error!(
            error = %e,
            invoice_no = %sale.invoice_no,
            "failed to write invoice pdf"
        );
    }
}
