//! Admin account management commands.
//!
//! # Usage
//!
//! ```bash
//! sc-cli admin list
//! sc-cli admin create -u ops --multi-login
//! sc-cli admin toggle-active 1700000000000
//! sc-cli admin reset-password 1
//! ```

use std::sync::Arc;

use showcase_core::admins::generate_password;
use showcase_core::{AdminRegistry, AdminUserId, StateStore};
use tracing::info;

use super::{CliError, found};

/// Length of passwords generated by `reset-password`.
const RESET_PASSWORD_LENGTH: usize = 16;

/// Print every admin without its password.
pub fn list(store: Arc<dyn StateStore>) {
    let admins = AdminRegistry::load(store);
    for admin in admins.list() {
        info!(
            id = %admin.id,
            username = %admin.username,
            active = admin.active,
            multi_login = admin.multi_login,
            last_login_ip = admin.last_login_ip.as_deref().unwrap_or("-"),
            "admin"
        );
    }
    info!(count = admins.list().len(), "Admins listed");
}

/// Create an active admin and print its password.
///
/// # Errors
///
/// Returns an error for a blank username or if the store cannot be written.
pub fn create(
    store: Arc<dyn StateStore>,
    username: &str,
    password: Option<String>,
    multi_login: bool,
) -> Result<(), CliError> {
    let mut admins = AdminRegistry::load(store);
    let now = chrono::Utc::now().timestamp_millis();
    let admin = admins.add(username, password, multi_login, now)?;

    info!("Admin created successfully!");
    info!("  ID: {}", admin.id);
    info!("  Username: {}", admin.username);
    info!("  Password: {}", admin.password);
    info!("  Multi-login: {}", admin.multi_login);
    Ok(())
}

/// Flip an admin's `active` flag.
///
/// # Errors
///
/// Returns `CliError::NotFound` for an unknown ID.
pub fn toggle_active(store: Arc<dyn StateStore>, id: &str) -> Result<(), CliError> {
    let id = AdminUserId::new(id);
    let mut admins = AdminRegistry::load(store);
    found(admins.toggle_status(&id)?, || format!("admin {id}"))?;

    if let Some(admin) = admins.find(&id) {
        info!(id = %admin.id, active = admin.active, "Admin status toggled");
    }
    Ok(())
}

/// Flip an admin's `multi_login` flag.
///
/// # Errors
///
/// Returns `CliError::NotFound` for an unknown ID.
pub fn toggle_multi_login(store: Arc<dyn StateStore>, id: &str) -> Result<(), CliError> {
    let id = AdminUserId::new(id);
    let mut admins = AdminRegistry::load(store);
    found(admins.toggle_multi_login(&id)?, || format!("admin {id}"))?;

    if let Some(admin) = admins.find(&id) {
        info!(id = %admin.id, multi_login = admin.multi_login, "Admin multi-login toggled");
    }
    Ok(())
}

/// Replace an admin's password with a generated one and print it.
///
/// # Errors
///
/// Returns `CliError::NotFound` for an unknown ID.
pub fn reset_password(store: Arc<dyn StateStore>, id: &str) -> Result<(), CliError> {
    let id = AdminUserId::new(id);
    let mut admins = AdminRegistry::load(store);
    let mut admin = admins
        .find(&id)
        .cloned()
        .ok_or_else(|| CliError::NotFound(format!("admin {id}")))?;

    admin.password = generate_password(RESET_PASSWORD_LENGTH);
    let password = admin.password.clone();
    found(admins.update(admin)?, || format!("admin {id}"))?;

    info!("Password reset for admin {id}");
    info!("  New password: {password}");
    Ok(())
}

/// Delete an admin.
///
/// # Errors
///
/// Returns `CliError::NotFound` for an unknown ID.
pub fn delete(store: Arc<dyn StateStore>, id: &str) -> Result<(), CliError> {
    let id = AdminUserId::new(id);
    let mut admins = AdminRegistry::load(store);
    found(admins.delete(&id)?, || format!("admin {id}"))?;

    if admins.list().iter().all(|a| !a.active) {
        tracing::warn!("No active admins remain; run `sc-cli admin create` to add one");
    }
    Ok(())
}
