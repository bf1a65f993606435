//! Admin accounts and the login gate.
//!
//! Credentials are compared as stored plaintext. The per-admin `multi_login`
//! flag controls a legacy single-IP restriction: an admin without it may only
//! log in again from the IP recorded at their last successful login. That
//! check is an equality test on a client-supplied address and is not a
//! security boundary; real access control sits in the server's session layer.

use std::fmt;
use std::sync::Arc;

use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};

use crate::error::{RegistryError, Result};
use crate::persistence::{StateStore, keys, load_collection, save_collection};
use crate::types::AdminUserId;

/// Length of passwords generated for new admins.
pub const DEFAULT_PASSWORD_LENGTH: usize = 12;

const PASSWORD_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*";

const SEED_ADMIN_ID: &str = "1";
const SEED_ADMIN_USERNAME: &str = "darknes";
const SEED_ADMIN_PASSWORD: &str = "darknes";

/// An admin account as stored.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminUser {
    pub id: AdminUserId,
    pub username: String,
    pub password: String,
    /// Permits logins from an IP other than `last_login_ip`.
    pub multi_login: bool,
    /// Inactive admins cannot log in.
    pub active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_login_ip: Option<String>,
}

impl fmt::Debug for AdminUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AdminUser")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .field("multi_login", &self.multi_login)
            .field("active", &self.active)
            .field("last_login_ip", &self.last_login_ip)
            .finish()
    }
}

impl AdminUser {
    /// The seed account present when no admins are stored.
    #[must_use]
    pub fn seed() -> Self {
        Self {
            id: AdminUserId::new(SEED_ADMIN_ID),
            username: SEED_ADMIN_USERNAME.to_owned(),
            password: SEED_ADMIN_PASSWORD.to_owned(),
            multi_login: true,
            active: true,
            last_login_ip: None,
        }
    }

    /// Whether a login from `ip` is blocked by the single-IP restriction.
    #[must_use]
    pub fn blocks_ip(&self, ip: &str) -> bool {
        !self.multi_login
            && self
                .last_login_ip
                .as_deref()
                .is_some_and(|last| !last.is_empty() && last != ip)
    }
}

/// Result of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginOutcome {
    /// Credentials accepted; carries the admin with `last_login_ip` updated.
    Granted(AdminUser),
    /// No admin has this exact username and password.
    InvalidCredentials,
    /// The matching admin is deactivated.
    Inactive,
    /// The admin is limited to one IP and last logged in from another.
    IpMismatch,
}

impl LoginOutcome {
    /// Whether the login was accepted.
    #[must_use]
    pub const fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }
}

/// Generate a random password of `length` characters.
#[must_use]
pub fn generate_password(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .filter_map(|_| PASSWORD_CHARSET.choose(&mut rng).copied().map(char::from))
        .collect()
}

/// Admin accounts, mirrored to a [`StateStore`] under `admins`.
pub struct AdminRegistry {
    store: Arc<dyn StateStore>,
    admins: Vec<AdminUser>,
    seeded: bool,
}

impl AdminRegistry {
    /// Load the admins, seeding the default account when nothing is stored.
    #[must_use]
    pub fn load(store: Arc<dyn StateStore>) -> Self {
        let (admins, seeded) = match load_collection(store.as_ref(), keys::ADMINS) {
            Some(admins) => (admins, false),
            None => {
                tracing::info!("No stored admins, seeding default account");
                (vec![AdminUser::seed()], true)
            }
        };
        Self {
            store,
            admins,
            seeded,
        }
    }

    /// Whether [`load`](Self::load) fell back to the seed account.
    #[must_use]
    pub const fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// All admins in insertion order.
    #[must_use]
    pub fn list(&self) -> &[AdminUser] {
        &self.admins
    }

    /// Look up an admin by ID.
    #[must_use]
    pub fn find(&self, id: &AdminUserId) -> Option<&AdminUser> {
        self.admins.iter().find(|a| &a.id == id)
    }

    /// Create an active admin.
    ///
    /// The ID is derived from `now_millis`, bumped until it is unique. A
    /// missing or blank password is replaced with a generated one.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidAdmin` for a blank username or
    /// `RegistryError::Storage` if the admins cannot be saved.
    pub fn add(
        &mut self,
        username: &str,
        password: Option<String>,
        multi_login: bool,
        now_millis: i64,
    ) -> Result<AdminUser> {
        let username = username.trim();
        if username.is_empty() {
            return Err(RegistryError::InvalidAdmin("username is required".to_owned()));
        }

        let mut millis = now_millis;
        while self.find(&AdminUserId::from_millis(millis)).is_some() {
            millis += 1;
        }

        let password = password
            .filter(|p| !p.is_empty())
            .unwrap_or_else(|| generate_password(DEFAULT_PASSWORD_LENGTH));

        let admin = AdminUser {
            id: AdminUserId::from_millis(millis),
            username: username.to_owned(),
            password,
            multi_login,
            active: true,
            last_login_ip: None,
        };

        let mut next = self.admins.clone();
        next.push(admin.clone());
        self.commit(next)?;

        tracing::info!(admin_id = %admin.id, username = %admin.username, "Admin created");
        Ok(admin)
    }

    /// Replace the admin with the same ID. Returns `false` if none matched.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::InvalidAdmin` if the username or password is
    /// blank, or `RegistryError::Storage` if the admins cannot be saved.
    pub fn update(&mut self, admin: AdminUser) -> Result<bool> {
        if admin.username.trim().is_empty() || admin.password.is_empty() {
            return Err(RegistryError::InvalidAdmin(
                "username and password are required".to_owned(),
            ));
        }
        let id = admin.id.clone();
        let changed = self.modify(&id, |a| *a = admin)?;
        if changed {
            tracing::info!(admin_id = %id, "Admin updated");
        }
        Ok(changed)
    }

    /// Remove the admin with `id`. Returns `false` if it did not exist.
    ///
    /// Deleting the last active admin is allowed.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the admins cannot be saved.
    pub fn delete(&mut self, id: &AdminUserId) -> Result<bool> {
        if self.find(id).is_none() {
            return Ok(false);
        }
        let next = self.admins.iter().filter(|a| &a.id != id).cloned().collect();
        self.commit(next)?;
        tracing::info!(admin_id = %id, "Admin deleted");
        Ok(true)
    }

    /// Flip the `active` flag. Returns `false` if the admin does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the admins cannot be saved.
    pub fn toggle_status(&mut self, id: &AdminUserId) -> Result<bool> {
        self.modify(id, |a| a.active = !a.active)
    }

    /// Flip the `multi_login` flag. Returns `false` if the admin does not exist.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the admins cannot be saved.
    pub fn toggle_multi_login(&mut self, id: &AdminUserId) -> Result<bool> {
        self.modify(id, |a| a.multi_login = !a.multi_login)
    }

    /// Attempt a login from `ip`.
    ///
    /// Only the first admin matching both username and password is
    /// considered. On success its `last_login_ip` is set to `ip` and saved
    /// before returning.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the updated login IP cannot be
    /// saved; the login is then not granted.
    pub fn login(&mut self, username: &str, password: &str, ip: &str) -> Result<LoginOutcome> {
        let Some(admin) = self
            .admins
            .iter()
            .find(|a| a.username == username && a.password == password)
        else {
            tracing::info!(username, ip, "Login rejected: invalid credentials");
            return Ok(LoginOutcome::InvalidCredentials);
        };

        if !admin.active {
            tracing::info!(admin_id = %admin.id, ip, "Login rejected: admin inactive");
            return Ok(LoginOutcome::Inactive);
        }

        if admin.blocks_ip(ip) {
            tracing::warn!(
                admin_id = %admin.id,
                ip,
                last_login_ip = admin.last_login_ip.as_deref().unwrap_or_default(),
                "Login rejected: single-IP admin already logged in elsewhere"
            );
            return Ok(LoginOutcome::IpMismatch);
        }

        let id = admin.id.clone();
        self.modify(&id, |a| a.last_login_ip = Some(ip.to_owned()))?;

        let admin = self
            .find(&id)
            .cloned()
            .ok_or_else(|| RegistryError::InvalidAdmin(format!("admin {id} vanished")))?;
        tracing::info!(admin_id = %id, ip, "Login granted");
        Ok(LoginOutcome::Granted(admin))
    }

    /// Boolean form of [`login`](Self::login).
    ///
    /// # Errors
    ///
    /// See [`login`](Self::login).
    pub fn can_login(&mut self, username: &str, password: &str, ip: &str) -> Result<bool> {
        Ok(self.login(username, password, ip)?.is_granted())
    }

    /// Write the current admins to the store.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the write fails.
    pub fn persist(&self) -> Result<()> {
        save_collection(self.store.as_ref(), keys::ADMINS, &self.admins)?;
        Ok(())
    }

    fn modify(&mut self, id: &AdminUserId, change: impl FnOnce(&mut AdminUser)) -> Result<bool> {
        let mut next = self.admins.clone();
        let Some(admin) = next.iter_mut().find(|a| &a.id == id) else {
            return Ok(false);
        };
        change(admin);
        self.commit(next)?;
        Ok(true)
    }

    fn commit(&mut self, next: Vec<AdminUser>) -> Result<()> {
        save_collection(self.store.as_ref(), keys::ADMINS, &next)?;
        self.admins = next;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::StorageError;
    use crate::persistence::MemoryStore;

    const NOW: i64 = 1_700_000_000_000;

    fn registry() -> AdminRegistry {
        AdminRegistry::load(Arc::new(MemoryStore::new()))
    }

    fn seed_id() -> AdminUserId {
        AdminUserId::new(SEED_ADMIN_ID)
    }

    #[test]
    fn test_seed_admin_multi_login_allows_two_ips() {
        let mut admins = registry();
        assert!(admins.can_login("darknes", "darknes", "1.2.3.4").unwrap());
        assert!(admins.can_login("darknes", "darknes", "5.6.7.8").unwrap());
    }

    #[test]
    fn test_toggling_multi_login_blocks_second_ip() {
        let mut admins = registry();
        assert!(admins.can_login("darknes", "darknes", "1.2.3.4").unwrap());
        assert!(admins.toggle_multi_login(&seed_id()).unwrap());

        assert_eq!(
            admins.login("darknes", "darknes", "5.6.7.8").unwrap(),
            LoginOutcome::IpMismatch
        );
        assert!(admins.can_login("darknes", "darknes", "1.2.3.4").unwrap());
    }

    #[test]
    fn test_single_ip_admin_first_login_from_any_ip() {
        let mut admins = registry();
        let admin = admins
            .add("ops", Some("hunter2".to_owned()), false, NOW)
            .unwrap();
        assert!(admin.last_login_ip.is_none());

        assert!(admins.can_login("ops", "hunter2", "10.0.0.1").unwrap());
        assert!(!admins.can_login("ops", "hunter2", "10.0.0.2").unwrap());
        assert!(admins.can_login("ops", "hunter2", "10.0.0.1").unwrap());
        assert_eq!(
            admins.find(&admin.id).unwrap().last_login_ip.as_deref(),
            Some("10.0.0.1")
        );
    }

    #[test]
    fn test_rejects_inexact_credentials() {
        let mut admins = registry();
        assert_eq!(
            admins.login("darknes", "wrong", "1.1.1.1").unwrap(),
            LoginOutcome::InvalidCredentials
        );
        assert_eq!(
            admins.login("Darknes", "darknes", "1.1.1.1").unwrap(),
            LoginOutcome::InvalidCredentials
        );
        assert_eq!(
            admins.login("darknes", "darknes ", "1.1.1.1").unwrap(),
            LoginOutcome::InvalidCredentials
        );
        assert!(admins.find(&seed_id()).unwrap().last_login_ip.is_none());
    }

    #[test]
    fn test_inactive_admin_cannot_login() {
        let mut admins = registry();
        admins.toggle_status(&seed_id()).unwrap();
        assert_eq!(
            admins.login("darknes", "darknes", "1.1.1.1").unwrap(),
            LoginOutcome::Inactive
        );
        admins.toggle_status(&seed_id()).unwrap();
        assert!(admins.can_login("darknes", "darknes", "1.1.1.1").unwrap());
    }

    #[test]
    fn test_empty_last_login_ip_does_not_block() {
        let mut admin = AdminUser::seed();
        admin.multi_login = false;
        admin.last_login_ip = Some(String::new());
        assert!(!admin.blocks_ip("9.9.9.9"));
    }

    #[test]
    fn test_add_generates_password_and_unique_ids() {
        let mut admins = registry();
        let first = admins.add("alice", None, false, NOW).unwrap();
        let second = admins.add("bob", Some(String::new()), true, NOW).unwrap();

        assert_eq!(first.password.chars().count(), DEFAULT_PASSWORD_LENGTH);
        assert_eq!(second.password.chars().count(), DEFAULT_PASSWORD_LENGTH);
        assert_eq!(first.id.as_str(), NOW.to_string());
        assert_ne!(first.id, second.id);
        assert!(first.active && second.active);
    }

    #[test]
    fn test_add_rejects_blank_username() {
        let mut admins = registry();
        assert!(matches!(
            admins.add("  ", None, false, NOW),
            Err(RegistryError::InvalidAdmin(_))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        let mut admins = registry();
        let mut admin = admins.add("carol", Some("pw".to_owned()), false, NOW).unwrap();
        admin.password = "new-pw".to_owned();
        assert!(admins.update(admin.clone()).unwrap());
        assert!(admins.can_login("carol", "new-pw", "1.1.1.1").unwrap());

        assert!(admins.delete(&admin.id).unwrap());
        assert!(!admins.delete(&admin.id).unwrap());
        assert!(!admins.toggle_status(&admin.id).unwrap());
    }

    #[test]
    fn test_seeded_only_when_nothing_stored() {
        assert!(registry().is_seeded());

        let store = Arc::new(MemoryStore::new());
        store.save(keys::ADMINS, "[]").unwrap();
        let admins = AdminRegistry::load(store);
        assert!(!admins.is_seeded());
        assert!(admins.list().is_empty());
    }

    #[test]
    fn test_can_delete_last_admin() {
        let mut admins = registry();
        assert!(admins.delete(&seed_id()).unwrap());
        assert!(admins.list().is_empty());
        assert!(!admins.can_login("darknes", "darknes", "1.1.1.1").unwrap());
    }

    #[test]
    fn test_login_ip_is_persisted() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let mut admins = AdminRegistry::load(Arc::clone(&store));
        admins.login("darknes", "darknes", "4.4.4.4").unwrap();

        let reloaded = AdminRegistry::load(store);
        assert_eq!(
            reloaded.find(&seed_id()).unwrap().last_login_ip.as_deref(),
            Some("4.4.4.4")
        );
    }

    struct ReadOnlyStore;

    impl StateStore for ReadOnlyStore {
        fn load(&self, _key: &str) -> std::result::Result<Option<String>, StorageError> {
            Ok(None)
        }

        fn save(&self, _key: &str, _value: &str) -> std::result::Result<(), StorageError> {
            Err(StorageError::Unavailable("read-only".to_owned()))
        }
    }

    #[test]
    fn test_failed_save_leaves_state_unchanged() {
        let mut admins = AdminRegistry::load(Arc::new(ReadOnlyStore));
        assert!(matches!(
            admins.login("darknes", "darknes", "1.1.1.1"),
            Err(RegistryError::Storage(_))
        ));
        assert!(admins.find(&seed_id()).unwrap().last_login_ip.is_none());
    }

    #[test]
    fn test_debug_redacts_password() {
        let debug = format!("{:?}", AdminUser::seed());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("password: \"darknes\""));
    }

    #[test]
    fn test_generate_password_length() {
        assert_eq!(generate_password(16).chars().count(), 16);
        assert!(generate_password(0).is_empty());
    }
}
