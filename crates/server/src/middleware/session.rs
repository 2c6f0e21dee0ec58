//! Session middleware configuration.
//!
//! Sets up `SQLite`-backed signed cookie sessions using tower-sessions.

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use tower_sessions::{Expiry, SessionManagerLayer};
use tower_sessions_sqlx_store::SqliteStore;

use crate::config::ServerConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "shoptill_session";

/// Session expiry time in seconds (24 hours).
const SESSION_EXPIRY_SECONDS: i64 = 24 * 60 * 60;

/// Create the session layer with a `SQLite` store.
///
/// Runs the store's own migration, which creates the `tower_sessions` table
/// on first start. Cookies are signed with a key derived from the validated
/// session secret.
///
/// # Errors
///
/// Returns `sqlx::Error` if the session table cannot be created.
///
/// # Panics
///
/// Panics if the session secret is shorter than 32 bytes; configuration
/// loading rejects such secrets before this is reached.
pub async fn create_session_layer(
    pool: &SqlitePool,
    config: &ServerConfig,
) -> Result<
    SessionManagerLayer<SqliteStore, tower_sessions::service::SignedCookie>,
    sqlx::Error,
> {
    let store = SqliteStore::new(pool.clone());
    store.migrate().await?;

    let key = tower_sessions::cookie::Key::derive_from(
        config.session_secret.expose_secret().as_bytes(),
    );

    // Determine if we're in production (HTTPS)
    let is_secure = config.base_url.starts_with("https://");

    Ok(SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(is_secure)
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
        .with_signed(key))
}
