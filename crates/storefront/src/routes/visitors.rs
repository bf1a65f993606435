//! Admin visitor management.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Serialize;
use showcase_core::VisitorInfo;

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Deduplicated visitor list.
#[derive(Debug, Serialize)]
pub struct VisitorList {
    pub count: usize,
    pub visitors: Vec<VisitorInfo>,
}

fn not_found(ip: &str) -> AppError {
    AppError::NotFound(format!("No visitor with IP {ip}"))
}

/// One record per IP, newest first.
pub async fn index(State(state): State<AppState>, _auth: RequireAdminAuth) -> Json<VisitorList> {
    let visitors = state.visitors().read().await.unique_visitors();
    Json(VisitorList {
        count: visitors.len(),
        visitors,
    })
}

/// Remove every visitor record.
pub async fn clear(State(state): State<AppState>, _auth: RequireAdminAuth) -> Result<StatusCode> {
    state.visitors().write().await.clear()?;
    Ok(StatusCode::NO_CONTENT)
}

/// Remove the records for one IP.
pub async fn delete(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(ip): Path<String>,
) -> Result<StatusCode> {
    if !state.visitors().write().await.delete(&ip)? {
        return Err(not_found(&ip));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Ban an IP that has visited.
pub async fn ban(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(ip): Path<String>,
) -> Result<StatusCode> {
    if !state.visitors().write().await.ban(&ip)? {
        return Err(not_found(&ip));
    }
    tracing::info!(admin = %admin.username, ip, "Visitor banned via API");
    Ok(StatusCode::NO_CONTENT)
}

/// Lift a ban.
pub async fn unban(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(ip): Path<String>,
) -> Result<StatusCode> {
    if !state.visitors().write().await.unban(&ip)? {
        return Err(not_found(&ip));
    }
    Ok(StatusCode::NO_CONTENT)
}
