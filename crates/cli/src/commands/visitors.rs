//! Visitor management commands.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use showcase_core::{StateStore, VisitorRegistry};
use tracing::info;

use super::{CliError, found};

/// Print the deduplicated visitor list, newest first.
pub fn list(store: Arc<dyn StateStore>) {
    let visitors = VisitorRegistry::load(store).unique_visitors();
    for visitor in &visitors {
        let seen = DateTime::<Utc>::from_timestamp_millis(visitor.timestamp)
            .map_or_else(|| visitor.timestamp.to_string(), |t| t.to_rfc3339());
        info!(
            ip = %visitor.ip,
            seen = %seen,
            city = visitor.city.as_deref().unwrap_or("-"),
            region = visitor.region.as_deref().unwrap_or("-"),
            browser = visitor.browser.as_deref().unwrap_or("-"),
            banned = visitor.banned,
            "visitor"
        );
    }
    info!(count = visitors.len(), "Unique visitors");
}

/// Ban an IP.
///
/// # Errors
///
/// Returns `CliError::NotFound` if the IP has no record.
pub fn ban(store: Arc<dyn StateStore>, ip: &str) -> Result<(), CliError> {
    found(VisitorRegistry::load(store).ban(ip)?, || format!("visitor {ip}"))?;
    info!(ip, "Visitor banned");
    Ok(())
}

/// Lift a ban.
///
/// # Errors
///
/// Returns `CliError::NotFound` if the IP has no record.
pub fn unban(store: Arc<dyn StateStore>, ip: &str) -> Result<(), CliError> {
    found(VisitorRegistry::load(store).unban(ip)?, || format!("visitor {ip}"))?;
    info!(ip, "Visitor unbanned");
    Ok(())
}

/// Delete the records for an IP.
///
/// # Errors
///
/// Returns `CliError::NotFound` if the IP has no record.
pub fn delete(store: Arc<dyn StateStore>, ip: &str) -> Result<(), CliError> {
    found(VisitorRegistry::load(store).delete(ip)?, || format!("visitor {ip}"))?;
    info!(ip, "Visitor deleted");
    Ok(())
}

/// Delete every visitor record.
///
/// # Errors
///
/// Returns an error if the store cannot be written.
pub fn clear(store: Arc<dyn StateStore>) -> Result<(), CliError> {
    VisitorRegistry::load(store).clear()?;
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use showcase_core::{MemoryStore, VisitorMetadata};

    use super::*;

    fn store_with_visitor(ip: &str) -> Arc<dyn StateStore> {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        VisitorRegistry::load(Arc::clone(&store))
            .record_visit(ip, 1_700_000_000_000, VisitorMetadata::default())
            .unwrap();
        store
    }

    #[test]
    fn test_ban_unban_roundtrip_through_store() {
        let store = store_with_visitor("9.9.9.9");
        ban(Arc::clone(&store), "9.9.9.9").unwrap();
        assert!(VisitorRegistry::load(Arc::clone(&store)).is_ip_banned("9.9.9.9"));

        unban(Arc::clone(&store), "9.9.9.9").unwrap();
        assert!(!VisitorRegistry::load(store).is_ip_banned("9.9.9.9"));
    }

    #[test]
    fn test_unknown_ip_is_not_found() {
        let store = store_with_visitor("9.9.9.9");
        assert!(matches!(
            ban(Arc::clone(&store), "8.8.8.8"),
            Err(CliError::NotFound(_))
        ));
        assert!(matches!(delete(store, "8.8.8.8"), Err(CliError::NotFound(_))));
    }

    #[test]
    fn test_clear() {
        let store = store_with_visitor("9.9.9.9");
        clear(Arc::clone(&store)).unwrap();
        assert_eq!(VisitorRegistry::load(store).visitor_count(), 0);
    }
}
