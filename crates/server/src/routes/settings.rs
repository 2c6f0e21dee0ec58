//! Shop settings routes: identity fields and the logo upload.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Query, State},
    response::Redirect,
};

use crate::db::ShopInfoRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::ShopInfoUpdate;
use crate::state::AppState;

use super::{MessageQuery, flash};

/// File extensions accepted for the shop logo.
const ALLOWED_LOGO_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif"];

/// Settings page template.
#[derive(Template, WebTemplate)]
#[template(path = "settings.html")]
pub struct SettingsTemplate {
    pub shop_name: String,
    pub address: String,
    pub phone: String,
    pub gstin: String,
    pub logo_filename: String,
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Display the settings page.
///
/// GET /settings
pub async fn index(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<SettingsTemplate, AppError> {
    let shop = ShopInfoRepository::new(state.pool()).get().await?;

    Ok(SettingsTemplate {
        shop_name: shop.shop_name,
        address: shop.address,
        phone: shop.phone,
        gstin: shop.gstin,
        logo_filename: shop.logo_filename,
        success: query.success,
        error: query.error,
    })
}

/// Update the shop identity, optionally replacing the logo.
///
/// POST /settings (multipart)
pub async fn update(
    State(state): State<AppState>,
    RequireAuth(_user): RequireAuth,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut update = ShopInfoUpdate {
        shop_name: String::new(),
        address: String::new(),
        phone: String::new(),
        gstin: String::new(),
        logo_filename: None,
    };
    let mut logo: Option<(String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        let Some(name) = field.name().map(str::to_owned) else {
            continue;
        };
        match name.as_str() {
            "shop_name" | "address" | "phone" | "gstin" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                match name.as_str() {
                    "shop_name" => update.shop_name = value,
                    "address" => update.address = value,
                    "phone" => update.phone = value,
                    _ => update.gstin = value,
                }
            }
            "logo" => {
                let Some(filename) = field.file_name().map(str::to_owned) else {
                    continue;
                };
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(e.to_string()))?;
                if !bytes.is_empty() {
                    logo = Some((filename, bytes.to_vec()));
                }
            }
            _ => {}
        }
    }

    if update.shop_name.trim().is_empty() {
        return Ok(flash("/settings", "error", "Shop name is required."));
    }

    if let Some((filename, bytes)) = logo {
        let Some(safe_name) = sanitize_logo_filename(&filename) else {
            return Ok(flash(
                "/settings",
                "error",
                "Logo must be a png, jpg, jpeg or gif file.",
            ));
        };

        let dir = state.config().upload_dir();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| AppError::Internal(format!("failed to create upload dir: {e}")))?;
        tokio::fs::write(dir.join(&safe_name), &bytes)
            .await
            .map_err(|e| AppError::Internal(format!("failed to store logo: {e}")))?;

        update.logo_filename = Some(safe_name);
    }

    ShopInfoRepository::new(state.pool()).upsert(&update).await?;
    Ok(flash("/settings", "success", "Shop details updated!"))
}

/// Reduce an uploaded file name to a safe basename, or reject it.
///
/// Strips any path components, keeps only ASCII alphanumerics, `.`, `-` and
/// `_`, and requires an allowed image extension.
fn sanitize_logo_filename(filename: &str) -> Option<String> {
    let basename = filename
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(filename);

    let cleaned: String = basename
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_'))
        .collect();

    let (stem, extension) = cleaned.rsplit_once('.')?;
    if stem.is_empty() {
        return None;
    }
    let extension = extension.to_ascii_lowercase();
    if !ALLOWED_LOGO_EXTENSIONS.contains(&extension.as_str()) {
        return None;
    }

    Some(format!("{stem}.{extension}"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_accepts_plain_names() {
        assert_eq!(
            sanitize_logo_filename("logo.png").unwrap(),
            "logo.png"
        );
        assert_eq!(
            sanitize_logo_filename("My Logo (1).JPEG").unwrap(),
            "MyLogo1.jpeg"
        );
    }

    #[test]
    fn test_sanitize_strips_path_components() {
        assert_eq!(
            sanitize_logo_filename("../../etc/logo.png").unwrap(),
            "logo.png"
        );
        assert_eq!(
            sanitize_logo_filename("C:\\uploads\\shop.gif").unwrap(),
            "shop.gif"
        );
    }

    #[test]
    fn test_sanitize_rejects_bad_extensions() {
        assert!(sanitize_logo_filename("logo.svg").is_none());
        assert!(sanitize_logo_filename("logo.png.exe").is_none());
        assert!(sanitize_logo_filename("no-extension").is_none());
        assert!(sanitize_logo_filename(".png").is_none());
    }
}
