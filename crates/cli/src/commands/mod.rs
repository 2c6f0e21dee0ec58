//! CLI command implementations.

pub mod admin;
pub mod migrate;
pub mod seed;

use sqlx::SqlitePool;
use sqlx::sqlite::SqliteConnectOptions;

/// Resolve the database URL the same way the server does:
/// `SHOPTILL_DATABASE_URL`, then `DATABASE_URL`, then the local default.
pub(crate) fn database_url() -> String {
    std::env::var("SHOPTILL_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .unwrap_or_else(|_| "sqlite:shoptill.db".to_owned())
}

/// Connect to the database, creating the file if it does not exist yet.
pub(crate) async fn connect(url: &str) -> Result<SqlitePool, sqlx::Error> {
    let options = url
        .parse::<SqliteConnectOptions>()?
        .create_if_missing(true)
        .foreign_keys(true);
    SqlitePool::connect_with(options).await
}
