//! HTTP route handlers for the point of sale.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Dashboard (catalog, recent sales, low stock)
//! GET  /health                  - Health check
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! POST /logout                  - Logout action
//!
//! # Products
//! GET  /products                - Catalog with add form
//! POST /products/add            - Create product
//! GET  /products/{id}/edit      - Catalog with edit form
//! POST /products/{id}/edit      - Update product
//! POST /products/{id}/delete    - Delete product
//! GET  /products/export         - Catalog CSV download
//! GET  /products/import         - Import upload page
//! POST /products/import         - Import a products CSV
//!
//! # Sales
//! GET  /sales                   - Product picker and sales ledger
//! POST /sales                   - Record a single-product sale (form)
//! GET  /sales/export            - Sales ledger CSV download
//! POST /sales/{id}/payments     - Record a payment against a sale
//!
//! # Sales API (public, JSON)
//! POST /api/sales               - Record a multi-item sale
//!
//! # Invoices (public)
//! GET  /invoices/{invoice_no}        - Stored invoice PDF
//! GET  /invoices/{invoice_no}/view   - HTML invoice view
//!
//! # Settings
//! GET  /settings                - Shop identity page
//! POST /settings                - Update shop identity (multipart, logo upload)
//! ```

pub mod api;
pub mod auth;
pub mod dashboard;
pub mod invoices;
pub mod products;
pub mod sales;
pub mod settings;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};
use serde::Deserialize;

use crate::state::AppState;

/// Query parameters carrying flash feedback across a redirect.
#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Redirect to `path` with a flash message in the query string.
///
/// The message is rendered by the target page's template; `kind` is either
/// `success` or `error`.
pub(crate) fn flash(path: &str, kind: &str, message: &str) -> Redirect {
    let query = url::form_urlencoded::Serializer::new(String::new())
        .append_pair(kind, message)
        .finish();
    Redirect::to(&format!("{path}?{query}"))
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index))
        .route("/add", post(products::add))
        .route("/export", get(products::export))
        .route(
            "/import",
            get(products::import_page).post(products::import),
        )
        .route(
            "/{id}/edit",
            get(products::edit_page).post(products::edit),
        )
        .route("/{id}/delete", post(products::delete))
}

/// Create the sale routes router.
pub fn sale_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(sales::index).post(sales::create))
        .route("/export", get(sales::export))
        .route("/{id}/payments", post(sales::add_payment))
}

/// Create the invoice routes router.
pub fn invoice_routes() -> Router<AppState> {
    Router::new()
        .route("/{invoice_no}", get(invoices::pdf))
        .route("/{invoice_no}/view", get(invoices::view))
}

/// Create all routes for the server.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Dashboard
        .route("/", get(dashboard::index))
        // Auth
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/logout", post(auth::logout))
        // Products
        .nest("/products", product_routes())
        // Sales
        .nest("/sales", sale_routes())
        // Sales API (public, JSON)
        .route("/api/sales", post(api::create_sale))
        // Invoices (public)
        .nest("/invoices", invoice_routes())
        // Settings
        .route("/settings", get(settings::index).post(settings::update))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flash_encodes_message() {
        let redirect = flash("/sales", "error", "Insufficient stock.");
        let response = axum::response::IntoResponse::into_response(redirect);
        let location = response
            .headers()
            .get(axum::http::header::LOCATION)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default();
        assert_eq!(location, "/sales?error=Insufficient+stock.");
    }
}
