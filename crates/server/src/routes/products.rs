//! Product catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Multipart, Path, Query, State},
    http::header,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use shoptill_core::{Money, ProductId};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{NewProduct, Product};
use crate::services::csv_io;
use crate::state::AppState;

use super::{MessageQuery, flash};

/// Default low-stock threshold when the form leaves it blank.
const DEFAULT_THRESHOLD: i64 = 5;

// =============================================================================
// Views
// =============================================================================

/// Product display data for templates.
#[derive(Debug, Clone)]
pub struct ProductView {
    pub id: i64,
    pub name: String,
    pub category: String,
    pub cost_price: String,
    pub selling_price: String,
    pub quantity: i64,
    pub threshold: i64,
    pub low_stock: bool,
}

impl From<&Product> for ProductView {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id.as_i64(),
            name: product.name.clone(),
            category: product.category.clone().unwrap_or_default(),
            cost_price: product.cost_price.to_string(),
            selling_price: product.selling_price.to_string(),
            quantity: product.quantity,
            threshold: product.low_stock_threshold,
            low_stock: product.is_low_stock(),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Catalog page template, with the add form and optionally an edit form.
#[derive(Template, WebTemplate)]
#[template(path = "products.html")]
pub struct ProductsTemplate {
    pub products: Vec<ProductView>,
    pub edit_product: Option<ProductView>,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// CSV import upload page template.
#[derive(Template, WebTemplate)]
#[template(path = "import_products.html")]
pub struct ImportTemplate {
    pub error: Option<String>,
}

// =============================================================================
// Forms
// =============================================================================

/// Raw product form fields; everything arrives as text and is validated here
/// so a bad price becomes a flash message rather than a rejected request.
#[derive(Debug, Deserialize)]
pub struct ProductForm {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub cost_price: String,
    pub selling_price: String,
    pub quantity: String,
    #[serde(default)]
    pub threshold: String,
}

impl ProductForm {
    /// Validate the form into a [`NewProduct`], with a user-facing message on
    /// failure.
    fn validate(self) -> Result<NewProduct, String> {
        let name = self.name.trim().to_owned();
        if name.is_empty() {
            return Err("Product name is required".to_owned());
        }

        let category = match self.category.trim() {
            "" => None,
            trimmed => Some(trimmed.to_owned()),
        };

        let cost_price =
            Money::parse(&self.cost_price).map_err(|e| format!("Invalid cost price: {e}"))?;
        let selling_price = Money::parse(&self.selling_price)
            .map_err(|e| format!("Invalid selling price: {e}"))?;

        let quantity = self
            .quantity
            .trim()
            .parse::<i64>()
            .map_err(|_| "Invalid quantity".to_owned())?;
        if quantity < 0 {
            return Err("Quantity must not be negative".to_owned());
        }

        let threshold = match self.threshold.trim() {
            "" => DEFAULT_THRESHOLD,
            raw => raw.parse::<i64>().map_err(|_| "Invalid threshold".to_owned())?,
        };
        if threshold < 0 {
            return Err("Threshold must not be negative".to_owned());
        }

        Ok(NewProduct {
            name,
            category,
            cost_price,
            selling_price,
            quantity,
            low_stock_threshold: threshold,
        })
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the catalog.
///
/// GET /products
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<ProductsTemplate, AppError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;

    Ok(ProductsTemplate {
        products: products.iter().map(Into::into).collect(),
        edit_product: None,
        success: query.success,
        error: query.error,
    })
}

/// Display the catalog with the edit form filled in for one product.
///
/// GET /products/{id}/edit
pub async fn edit_page(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
    Query(query): Query<MessageQuery>,
) -> Result<ProductsTemplate, AppError> {
    let repo = ProductRepository::new(state.pool());
    let product = repo
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let products = repo.list_all().await?;

    Ok(ProductsTemplate {
        products: products.iter().map(Into::into).collect(),
        edit_product: Some(ProductView::from(&product)),
        success: query.success,
        error: query.error,
    })
}

/// Create a product from the add form.
///
/// POST /products/add
pub async fn add(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => return Ok(flash("/products", "error", &message)),
    };

    ProductRepository::new(state.pool()).create(&input).await?;
    Ok(flash("/products", "success", "Product added successfully."))
}

/// Update a product from the edit form.
///
/// POST /products/{id}/edit
pub async fn edit(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
    Form(form): Form<ProductForm>,
) -> Result<Redirect, AppError> {
    let input = match form.validate() {
        Ok(input) => input,
        Err(message) => {
            return Ok(flash(&format!("/products/{id}/edit"), "error", &message));
        }
    };

    ProductRepository::new(state.pool())
        .update(ProductId::new(id), &input)
        .await?;
    Ok(flash("/products", "success", "Product updated successfully."))
}

/// Delete a product.
///
/// POST /products/{id}/delete
pub async fn delete(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Redirect, AppError> {
    use crate::db::RepositoryError;

    match ProductRepository::new(state.pool()).delete(ProductId::new(id)).await {
        Ok(()) => Ok(flash("/products", "success", "Product deleted!")),
        Err(RepositoryError::Conflict(_)) => Ok(flash(
            "/products",
            "error",
            "Product has recorded sales and cannot be deleted.",
        )),
        Err(e) => Err(e.into()),
    }
}

/// Download the catalog as CSV.
///
/// GET /products/export
pub async fn export(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
) -> Result<Response, AppError> {
    let products = ProductRepository::new(state.pool()).list_all().await?;
    let bytes = csv_io::export_products(&products)?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"products.csv\"",
            ),
        ],
        bytes,
    )
        .into_response())
}

/// Display the CSV import upload page.
///
/// GET /products/import
pub async fn import_page(
    RequireAuth(_user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> ImportTemplate {
    ImportTemplate { error: query.error }
}

/// Import an uploaded products CSV.
///
/// POST /products/import
pub async fn import(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut data = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() == Some("file") {
            data = Some(
                field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?,
            );
        }
    }

    let Some(data) = data else {
        return Ok(flash("/products/import", "error", "No file uploaded"));
    };

    let import = csv_io::parse_products(&data);
    // One transaction for the whole file; a failure imports nothing.
    ProductRepository::new(state.pool())
        .create_many(&import.products)
        .await?;

    let message = if import.skipped == 0 {
        format!("Imported {} products", import.products.len())
    } else {
        format!(
            "Imported {} products ({} rows skipped)",
            import.products.len(),
            import.skipped
        )
    };
    Ok(flash("/", "success", &message))
}
