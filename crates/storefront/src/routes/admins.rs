//! Admin account management.
//!
//! Passwords never appear in list or update responses. Creating an admin
//! returns its password once, since it may have been generated.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use showcase_core::{AdminUser, AdminUserId};

use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// An admin without its password.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminView {
    pub id: AdminUserId,
    pub username: String,
    pub multi_login: bool,
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login_ip: Option<String>,
}

impl From<&AdminUser> for AdminView {
    fn from(admin: &AdminUser) -> Self {
        Self {
            id: admin.id.clone(),
            username: admin.username.clone(),
            multi_login: admin.multi_login,
            active: admin.active,
            last_login_ip: admin.last_login_ip.clone(),
        }
    }
}

/// Body for creating an admin.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateAdminRequest {
    pub username: String,
    /// Generated when absent or empty.
    #[serde(default)]
    pub password: Option<SecretString>,
    #[serde(default)]
    pub multi_login: bool,
}

/// Response to a create: the admin plus its password.
#[derive(Debug, Serialize)]
pub struct CreatedAdmin {
    pub admin: AdminView,
    pub password: String,
}

/// Body for updating an admin; absent fields keep their value.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAdminRequest {
    pub username: Option<String>,
    pub password: Option<SecretString>,
    pub multi_login: Option<bool>,
    pub active: Option<bool>,
}

fn not_found(id: &AdminUserId) -> AppError {
    AppError::NotFound(format!("Admin {id} not found"))
}

/// List admins.
pub async fn index(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
) -> Json<Vec<AdminView>> {
    Json(
        state
            .admins()
            .read()
            .await
            .list()
            .iter()
            .map(AdminView::from)
            .collect(),
    )
}

/// Create an admin.
pub async fn create(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Json(request): Json<CreateAdminRequest>,
) -> Result<(StatusCode, Json<CreatedAdmin>)> {
    let password = request
        .password
        .map(|p| p.expose_secret().to_owned());
    let now = chrono::Utc::now().timestamp_millis();

    let admin = state.admins().write().await.add(
        &request.username,
        password,
        request.multi_login,
        now,
    )?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedAdmin {
            admin: AdminView::from(&admin),
            password: admin.password,
        }),
    ))
}

/// Update an admin's fields.
pub async fn update(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
    Json(request): Json<UpdateAdminRequest>,
) -> Result<Json<AdminView>> {
    let mut admins = state.admins().write().await;
    let mut admin = admins.find(&id).cloned().ok_or_else(|| not_found(&id))?;

    if let Some(username) = request.username {
        admin.username = username.trim().to_owned();
    }
    if let Some(password) = request.password {
        admin.password = password.expose_secret().to_owned();
    }
    if let Some(multi_login) = request.multi_login {
        admin.multi_login = multi_login;
    }
    if let Some(active) = request.active {
        admin.active = active;
    }

    let view = AdminView::from(&admin);
    if !admins.update(admin)? {
        return Err(not_found(&id));
    }
    Ok(Json(view))
}

/// Delete an admin. Deleting the last one is allowed.
pub async fn delete(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
) -> Result<StatusCode> {
    if !state.admins().write().await.delete(&id)? {
        return Err(not_found(&id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Flip the `active` flag.
pub async fn toggle_status(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
) -> Result<Json<AdminView>> {
    let mut admins = state.admins().write().await;
    if !admins.toggle_status(&id)? {
        return Err(not_found(&id));
    }
    admins
        .find(&id)
        .map(|a| Json(AdminView::from(a)))
        .ok_or_else(|| not_found(&id))
}

/// Flip the `multi_login` flag.
pub async fn toggle_multi_login(
    State(state): State<AppState>,
    _auth: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
) -> Result<Json<AdminView>> {
    let mut admins = state.admins().write().await;
    if !admins.toggle_multi_login(&id)? {
        return Err(not_found(&id));
    }
    admins
        .find(&id)
        .map(|a| Json(AdminView::from(a)))
        .ok_or_else(|| not_found(&id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_view_omits_password() {
        let json = serde_json::to_string(&AdminView::from(&AdminUser::seed())).unwrap_or_default();
        assert!(json.contains("\"multiLogin\":true"));
        assert!(!json.contains("password"));
        assert!(!json.contains("lastLoginIp"));
    }
}
