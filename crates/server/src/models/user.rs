//! Staff account domain types.

use chrono::{DateTime, Utc};

use shoptill_core::{UserId, Username};

/// A staff account (domain type).
///
/// The password hash never leaves the database layer; credential checks go
/// through [`crate::services::auth::AuthService`].
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Login name, unique across the shop.
    pub username: Username,
    /// Whether this user may manage other accounts.
    pub is_admin: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}
