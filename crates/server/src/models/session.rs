//! Session-stored types for authentication state.

use serde::{Deserialize, Serialize};

use shoptill_core::{UserId, Username};

/// Session-stored identity of the logged-in user.
///
/// Minimal data only; everything else is fetched per request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentUser {
    /// User's database ID.
    pub id: UserId,
    /// Login name, shown in the navigation bar.
    pub username: Username,
    /// Whether this user may manage other accounts.
    pub is_admin: bool,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in user.
    pub const CURRENT_USER: &str = "current_user";
}
