//! Staff account repository.
//!
//! Queries use the runtime sqlx API so the crate builds without a live
//! database; row structs derive `FromRow` and convert into domain types.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use shoptill_core::{UserId, Username};

use super::RepositoryError;
use crate::models::User;

// =============================================================================
// Internal Row Types
// =============================================================================

/// Internal row type for user queries.
#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    username: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<UserRow> for User {
    type Error = RepositoryError;

    fn try_from(row: UserRow) -> Result<Self, Self::Error> {
        let username = Username::parse(&row.username).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid username in database: {e}"))
        })?;

        Ok(Self {
            id: UserId::new(row.id),
            username,
            is_admin: row.is_admin,
            created_at: row.created_at,
        })
    }
}

/// Row carrying the password hash, only used during credential checks.
#[derive(Debug, sqlx::FromRow)]
struct UserCredentialRow {
    id: i64,
    username: String,
    password_hash: String,
    is_admin: bool,
    created_at: DateTime<Utc>,
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for staff account database operations.
pub struct UserRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Get a user together with their stored password hash.
    ///
    /// Only the auth service calls this; everything else works with [`User`],
    /// which never carries the hash.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get_with_password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<(User, String)>, RepositoryError> {
        let row = sqlx::query_as::<_, UserCredentialRow>(
            "SELECT id, username, password_hash, is_admin, created_at
             FROM user WHERE username = ?",
        )
        .bind(username.as_str())
        .fetch_optional(self.pool)
        .await?;

        row.map(|row| {
            let hash = row.password_hash.clone();
            let user = UserRow {
                id: row.id,
                username: row.username,
                is_admin: row.is_admin,
                created_at: row.created_at,
            }
            .try_into()?;
            Ok((user, hash))
        })
        .transpose()
    }

    /// Create a new user with an already-hashed password.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username already exists.
    /// Returns `RepositoryError::Database` for other database errors.
    pub async fn create(
        &self,
        username: &Username,
        password_hash: &str,
        is_admin: bool,
    ) -> Result<User, RepositoryError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO user (username, password_hash, is_admin, created_at)
             VALUES (?, ?, ?, ?)
             RETURNING id, username, is_admin, created_at",
        )
        .bind(username.as_str())
        .bind(password_hash)
        .bind(is_admin)
        .bind(Utc::now())
        .fetch_one(self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return RepositoryError::Conflict("username already exists".to_owned());
            }
            RepositoryError::Database(e)
        })?;

        row.try_into()
    }
}
