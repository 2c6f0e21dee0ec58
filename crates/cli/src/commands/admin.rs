//! Staff user management commands.
//!
//! # Usage
//!
//! ```bash
//! shoptill-cli admin create -u admin -p <password> --admin
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPTILL_DATABASE_URL` - `SQLite` connection string (falls back to
//!   `DATABASE_URL`, then `sqlite:shoptill.db`)

use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use thiserror::Error;

use shoptill_core::{Username, UsernameError};

/// Minimum password length, matching the server's registration rules.
const MIN_PASSWORD_LENGTH: usize = 8;

/// Errors that can occur during staff user operations.
#[derive(Debug, Error)]
pub enum AdminError {
    /// Database connection error.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Invalid username.
    #[error("Invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// Password too weak.
    #[error("Password must be at least {MIN_PASSWORD_LENGTH} characters")]
    WeakPassword,

    /// User already exists.
    #[error("User already exists with username: {0}")]
    UserExists(String),

    /// Password hashing failure.
    #[error("Password hashing failed: {0}")]
    PasswordHash(String),
}

/// Create a new staff user.
///
/// # Arguments
///
/// * `username` - Login name (lowercase letters, digits, `.`, `-`, `_`)
/// * `password` - Plain-text password, hashed with Argon2id before storage
/// * `is_admin` - Whether the user gets admin rights
///
/// # Returns
///
/// The ID of the created user.
pub async fn create_user(username: &str, password: &str, is_admin: bool) -> Result<i64, AdminError> {
    dotenvy::dotenv().ok();

    let username = Username::parse(username)?;

    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(AdminError::WeakPassword);
    }

    let salt = SaltString::generate(&mut OsRng);
    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AdminError::PasswordHash(e.to_string()))?
        .to_string();

    let url = super::database_url();
    tracing::info!("Connecting to database...");
    let pool = super::connect(&url).await?;

    tracing::info!("Creating staff user: {}", username);

    let existing = sqlx::query_scalar::<_, i64>("SELECT id FROM user WHERE username = ?")
        .bind(username.as_str())
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(AdminError::UserExists(username.to_string()));
    }

    let user_id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO user (username, password_hash, is_admin, created_at)
         VALUES (?, ?, ?, ?)
         RETURNING id",
    )
    .bind(username.as_str())
    .bind(&password_hash)
    .bind(is_admin)
    .bind(chrono::Utc::now())
    .fetch_one(&pool)
    .await?;

    tracing::info!(
        "User created successfully! ID: {}, Username: {}, Admin: {}",
        user_id,
        username,
        is_admin
    );

    Ok(user_id)
}
