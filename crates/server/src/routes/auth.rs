//! Authentication route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect},
};
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::AppError;
use crate::filters;
use crate::middleware::{OptionalAuth, clear_current_user, set_current_user};
use crate::models::CurrentUser;
use crate::services::auth::{AuthError, AuthService};
use crate::state::AppState;

use super::{MessageQuery, flash};

/// Login form data.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Login page template.
#[derive(Template, WebTemplate)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub error: Option<String>,
    pub success: Option<String>,
}

/// Display the login page.
///
/// GET /login
pub async fn login_page(
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<MessageQuery>,
) -> impl IntoResponse {
    if user.is_some() {
        return Redirect::to("/").into_response();
    }

    LoginTemplate {
        error: query.error,
        success: query.success,
    }
    .into_response()
}

/// Handle login form submission.
///
/// POST /login
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Redirect, AppError> {
    let auth = AuthService::new(state.pool());

    match auth.login(&form.username, &form.password).await {
        Ok(user) => {
            // Rotate the session id so a pre-login cookie cannot be replayed.
            session.cycle_id().await?;
            set_current_user(
                &session,
                &CurrentUser {
                    id: user.id,
                    username: user.username.clone(),
                    is_admin: user.is_admin,
                },
            )
            .await?;

            tracing::info!(username = %user.username, "user logged in");
            Ok(Redirect::to("/"))
        }
        Err(AuthError::InvalidCredentials) => {
            Ok(flash("/login", "error", "Invalid username or password"))
        }
        Err(e) => Err(e.into()),
    }
}

/// Handle logout.
///
/// POST /logout
pub async fn logout(session: Session) -> Result<Redirect, AppError> {
    clear_current_user(&session).await?;
    Ok(Redirect::to("/login"))
}
