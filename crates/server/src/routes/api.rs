//! JSON sales API.
//!
//! The one programmatic endpoint: record a multi-item sale. Errors come back
//! as `{"error": "..."}` bodies with the matching status code, and the whole
//! sale rolls back on any failure.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

use shoptill_core::ProductId;

use crate::services::sales::{NewSale, NewSaleItem, SaleError, SaleService};
use crate::state::AppState;

// =============================================================================
// Request / Response Types
// =============================================================================

/// Request body for creating a sale.
///
/// Fields are optional so missing ones produce a 400 with a useful message
/// instead of a deserialization rejection.
#[derive(Debug, Deserialize)]
pub struct CreateSaleRequest {
    pub customer_name: Option<String>,
    pub customer_contact: Option<String>,
    pub customer_address: Option<String>,
    pub items: Option<Vec<CreateSaleItem>>,
}

/// One line of the requested sale.
///
/// Absent fields default to zero, which the sale service rejects as an
/// unknown product or an invalid quantity rather than failing
/// deserialization.
#[derive(Debug, Deserialize)]
pub struct CreateSaleItem {
    #[serde(default)]
    pub product_id: i64,
    #[serde(default)]
    pub quantity: i64,
}

/// Response body after a recorded sale.
#[derive(Debug, Serialize)]
pub struct CreateSaleResponse {
    pub invoice_no: String,
    /// Path the stored PDF can be fetched from.
    pub invoice: String,
}

/// JSON error body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(ErrorBody { error: message.into() })).into_response()
}

fn sale_error_response(err: SaleError) -> Response {
    let status = match &err {
        SaleError::EmptyCustomer
        | SaleError::NoItems
        | SaleError::InvalidQuantity(_)
        | SaleError::InsufficientStock { .. }
        | SaleError::TotalTooLarge => StatusCode::BAD_REQUEST,
        SaleError::ProductNotFound(_) => StatusCode::NOT_FOUND,
        SaleError::Database(_) | SaleError::Invoice(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let message = if status == StatusCode::INTERNAL_SERVER_ERROR {
        tracing::error!(error = %err, "sale creation failed");
        "Database error".to_owned()
    } else {
        err.to_string()
    };

    error_response(status, message)
}

// =============================================================================
// Handler
// =============================================================================

/// Record a multi-item sale.
///
/// POST /api/sales
///
/// Every failure mode answers with a JSON `{"error": ...}` body, including
/// an unparseable request, so the extractor rejection is handled here
/// instead of bubbling up as plain text.
pub async fn create_sale(
    State(state): State<AppState>,
    payload: Result<Json<CreateSaleRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return error_response(StatusCode::BAD_REQUEST, "Bad request, invalid JSON body");
    };

    let Some(customer_name) = request.customer_name else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Bad request, missing customer name or items",
        );
    };
    let Some(items) = request.items else {
        return error_response(
            StatusCode::BAD_REQUEST,
            "Bad request, missing customer name or items",
        );
    };

    let input = NewSale {
        customer_name,
        customer_contact: request.customer_contact,
        customer_address: request.customer_address,
        items: items
            .iter()
            .map(|item| NewSaleItem {
                product_id: ProductId::new(item.product_id),
                quantity: item.quantity,
            })
            .collect(),
    };

    let created = match SaleService::new(state.pool()).create_sale(input).await {
        Ok(created) => created,
        Err(e) => return sale_error_response(e),
    };

    super::sales::write_invoice_pdf(&state, &created.sale, &created.items).await;

    let invoice_no = created.sale.invoice_no.to_string();
    tracing::info!(invoice_no = %invoice_no, items = created.items.len(), "api sale recorded");

    Json(CreateSaleResponse {
        invoice: format!("/invoices/{invoice_no}"),
        invoice_no,
    })
    .into_response()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_item_fields_default_to_zero() {
        let item: CreateSaleItem = serde_json::from_str(r#"{"product_id": 3}"#).unwrap();
        assert_eq!(item.product_id, 3);
        assert_eq!(item.quantity, 0);

        let item: CreateSaleItem = serde_json::from_str(r#"{"quantity": 2}"#).unwrap();
        assert_eq!(item.product_id, 0);
        assert_eq!(item.quantity, 2);
    }

    #[test]
    fn test_request_tolerates_missing_fields() {
        let request: CreateSaleRequest = serde_json::from_str("{}").unwrap();
        assert!(request.customer_name.is_none());
        assert!(request.items.is_none());
    }

    #[test]
    fn test_error_response_is_json() {
        let response = error_response(StatusCode::BAD_REQUEST, "Bad request, invalid JSON body");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response
                .headers()
                .get(axum::http::header::CONTENT_TYPE)
                .unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_sale_error_statuses() {
        let response = sale_error_response(SaleError::InvalidQuantity(ProductId::new(1)));
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = sale_error_response(SaleError::ProductNotFound(ProductId::new(99)));
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
