//! HTTP middleware for the point of sale.
//!
//! - `session` - cookie sessions backed by the `SQLite` database
//! - `auth` - extractors that require or optionally read the logged-in user

pub mod auth;
pub mod session;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth, clear_current_user, set_current_user};
pub use session::create_session_layer;
