//! Dashboard route handler.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::{Query, State};
use chrono::{DateTime, Utc};

use crate::db::{ProductRepository, SaleRepository};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::state::AppState;

use super::MessageQuery;
use super::products::ProductView;

/// How many recent sales the dashboard shows.
const RECENT_SALES: i64 = 5;

/// A recent sale on the dashboard; no payment math here, the ledger page
/// has that.
#[derive(Debug, Clone)]
pub struct RecentSaleView {
    pub invoice_no: String,
    pub customer_name: String,
    pub total: String,
    pub created_at: DateTime<Utc>,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub username: String,
    pub products: Vec<ProductView>,
    pub recent_sales: Vec<RecentSaleView>,
    pub low_stock: Vec<ProductView>,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Display the dashboard.
///
/// GET /
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<DashboardTemplate, AppError> {
    let products_repo = ProductRepository::new(state.pool());
    let products = products_repo.list_all().await?;
    let low_stock = products_repo.list_low_stock().await?;
    let recent = SaleRepository::new(state.pool()).recent(RECENT_SALES).await?;

    Ok(DashboardTemplate {
        username: user.username.to_string(),
        products: products.iter().map(Into::into).collect(),
        recent_sales: recent
            .iter()
            .map(|sale| RecentSaleView {
                invoice_no: sale.invoice_no.to_string(),
                customer_name: sale.customer_name.clone(),
                total: sale.total.to_string(),
                created_at: sale.created_at,
            })
            .collect(),
        low_stock: low_stock.iter().map(Into::into).collect(),
        success: query.success,
        error: query.error,
    })
}
