//! Admin login, logout and session routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use showcase_core::{AdminUserId, LoginOutcome};
use tower_sessions::Session;

use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{ClientIp, RequireAdminAuth, clear_current_admin, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Login request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: SecretString,
}

/// The logged-in admin as returned to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionView {
    pub id: AdminUserId,
    pub username: String,
    pub login_ip: String,
}

impl From<CurrentAdmin> for SessionView {
    fn from(admin: CurrentAdmin) -> Self {
        Self {
            id: admin.id,
            username: admin.username,
            login_ip: admin.login_ip,
        }
    }
}

/// Log an admin in from the requesting IP.
///
/// Every rejection returns the same message; the reason is only logged.
pub async fn login(
    State(state): State<AppState>,
    client_ip: ClientIp,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<SessionView>> {
    let password = request.password.expose_secret();
    if request.username.trim().is_empty() || password.is_empty() {
        return Err(AppError::BadRequest(
            "Username and password are required".to_owned(),
        ));
    }

    let ip = client_ip.or_timestamp();
    let outcome = state
        .admins()
        .write()
        .await
        .login(&request.username, password, &ip)?;

    let LoginOutcome::Granted(admin) = outcome else {
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_owned(),
        ));
    };

    // New session ID on privilege change
    session.cycle_id().await?;
    let current = CurrentAdmin {
        id: admin.id,
        username: admin.username,
        login_ip: ip,
    };
    set_current_admin(&session, &current).await?;
    set_sentry_user(&current.id, &current.username);

    Ok(Json(current.into()))
}

/// Log the current admin out. Always succeeds.
pub async fn logout(session: Session) -> Result<Response> {
    clear_current_admin(&session).await?;
    clear_sentry_user();
    Ok(StatusCode::NO_CONTENT.into_response())
}

/// The admin bound to this session.
pub async fn current(RequireAdminAuth(admin): RequireAdminAuth) -> Json<SessionView> {
    Json(admin.into())
}
