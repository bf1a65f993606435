//! Session-related types.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use showcase_core::AdminUserId;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin. It is
/// re-checked against the admin registry on every request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin ID.
    pub id: AdminUserId,
    /// Username at login time.
    pub username: String,
    /// Client IP the login came from.
    pub login_ip: String,
}

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
