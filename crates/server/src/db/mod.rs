//! Database operations for the shop's `SQLite` file.
//!
//! ## Tables
//!
//! - `user` - staff accounts
//! - `product` - inventory catalog
//! - `sale` / `sale_item` - invoice headers and their lines
//! - `payment` - payments recorded against sales
//! - `shop_info` - single-row shop identity
//! - `tower_sessions` - session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations are stored in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p shoptill-cli -- migrate
//! ```

pub mod products;
pub mod sales;
pub mod shop_info;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use thiserror::Error;

pub use products::ProductRepository;
pub use sales::SaleRepository;
pub use shop_info::ShopInfoRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique username, product still referenced).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// The database file is created on first connect. Foreign keys are enforced
/// on every connection, and WAL mode keeps readers from blocking the single
/// writer.
///
/// # Arguments
///
/// * `database_url` - `SQLite` connection string, e.g. `sqlite:shoptill.db`
///
/// # Errors
///
/// Returns `sqlx::Error` if the URL is malformed or the connection cannot be
/// established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(5));

    SqlitePoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::str::FromStr;

    use sqlx::SqlitePool;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

    /// Fresh in-memory database with all migrations applied.
    ///
    /// A single connection keeps the `:memory:` database alive for the whole
    /// test; a second connection would see an empty database. Foreign keys
    /// are on, matching production connections.
    pub async fn test_pool() -> SqlitePool {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .expect("valid connection string")
            .foreign_keys(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .expect("in-memory database");
        sqlx::migrate!()
            .run(&pool)
            .await
            .expect("migrations apply cleanly");
        pool
    }
}
