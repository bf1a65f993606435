//! Banned-visitor gate for the public routes.
//!
//! A banned IP gets the banned page (or a JSON error under `/api/`) with
//! `403 Forbidden`, and its visit is not recorded.

use axum::{
    Json,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;

use super::client_ip::ClientIp;
use crate::routes::shop::BannedTemplate;
use crate::state::AppState;

/// Middleware that rejects requests from banned IPs.
pub async fn ban_gate_middleware(
    State(state): State<AppState>,
    client_ip: ClientIp,
    request: Request,
    next: Next,
) -> Response {
    let Some(ip) = client_ip.0 else {
        return next.run(request).await;
    };

    if !state.visitors().is_ip_banned(&ip.to_string()).await {
        return next.run(request).await;
    }

    tracing::info!(%ip, path = %request.uri().path(), "Banned visitor blocked");
    if request.uri().path().starts_with("/api/") {
        (
            StatusCode::FORBIDDEN,
            Json(json!({ "error": "Access denied" })),
        )
            .into_response()
    } else {
        (StatusCode::FORBIDDEN, BannedTemplate).into_response()
    }
}
