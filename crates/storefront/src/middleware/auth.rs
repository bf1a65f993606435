//! Admin authentication extractor.
//!
//! The session only carries the admin's ID; every request re-reads the admin
//! registry, so deleting or deactivating an admin ends their sessions at the
//! next request.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires a logged-in, still-active admin.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Hello, {}!", admin.username)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .cloned()
            .ok_or_else(|| AppError::Internal("session layer missing".to_owned()))?;

        let Some(mut current) = session
            .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
            .await?
        else {
            return Err(AppError::Unauthorized("Login required".to_owned()));
        };

        let username = {
            let admins = state.admins().read().await;
            admins
                .find(&current.id)
                .filter(|admin| admin.active)
                .map(|admin| admin.username.clone())
        };

        let Some(username) = username else {
            tracing::info!(admin_id = %current.id, "Session revoked: admin removed or inactive");
            session.flush().await?;
            return Err(AppError::Unauthorized("Login required".to_owned()));
        };

        current.username = username;
        Ok(Self(current))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to end the admin session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
