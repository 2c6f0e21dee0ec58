//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! shoptill-cli migrate
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPTILL_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`, then `sqlite:shoptill.db`)
//!
//! Migration files live in `crates/server/migrations/`.

use thiserror::Error;

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending database migrations.
pub async fn run() -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();

    let url = super::database_url();
    tracing::info!("Connecting to database...");
    let pool = super::connect(&url).await?;

    tracing::info!("Running migrations...");
    sqlx::migrate!("../server/migrations").run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
