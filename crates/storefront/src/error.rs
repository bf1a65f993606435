//! Unified error handling with Sentry integration.
//!
//! Provides a unified `AppError` type that captures errors to Sentry before
//! responding to the client. All route handlers should return `Result<T, AppError>`.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use showcase_core::{RegistryError, StorageError};
use thiserror::Error;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// A registry rejected the input or could not persist it.
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Session store operation failed.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// User is not authenticated.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        Self::Registry(RegistryError::Storage(err))
    }
}

impl AppError {
    const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Registry(RegistryError::Storage(_)) | Self::Session(_) | Self::Internal(_)
        )
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Capture server errors to Sentry
        if self.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = match &self {
            Self::Registry(RegistryError::Storage(_)) | Self::Session(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Registry(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Registry(RegistryError::Storage(_)) | Self::Session(_) | Self::Internal(_) => {
                "Internal server error".to_string()
            }
            Self::Registry(RegistryError::InvalidProduct(err)) => err.to_string(),
            Self::Registry(err @ RegistryError::IdsExhausted) => err.to_string(),
            Self::Registry(RegistryError::InvalidAdmin(msg))
            | Self::NotFound(msg)
            | Self::Unauthorized(msg)
            | Self::BadRequest(msg) => msg.clone(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;

/// Set the Sentry user context for a logged-in admin.
pub fn set_sentry_user(admin_id: &impl ToString, username: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            id: Some(admin_id.to_string()),
            username: Some(username.to_owned()),
            ..Default::default()
        }));
    });
}

/// Clear the Sentry user context.
pub fn clear_sentry_user() {
    sentry::configure_scope(|scope| {
        scope.set_user(None);
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use showcase_core::ProductError;

    use super::*;

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("product 123".to_string());
        assert_eq!(err.to_string(), "Not found: product 123");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_app_error_status_codes() {
        fn get_status(err: AppError) -> StatusCode {
            err.into_response().status()
        }

        assert_eq!(
            get_status(AppError::NotFound("test".to_string())),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(AppError::Unauthorized("test".to_string())),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(AppError::Registry(RegistryError::InvalidProduct(
                ProductError::MissingName
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Registry(RegistryError::InvalidAdmin(
                "username is required".to_string()
            ))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(AppError::Registry(RegistryError::IdsExhausted)),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(StorageError::Unavailable("disk".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_storage_details_are_hidden() {
        let response =
            AppError::from(StorageError::Unavailable("/var/lib/secret".to_string())).into_response();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Internal server error");
    }
}
