//! Subcommand implementations.

pub mod admin;
pub mod products;
pub mod seed;
pub mod visitors;

use std::path::Path;
use std::sync::Arc;

use showcase_core::{RegistryError, StateStore, StorageError};
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// The data directory could not be opened.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A registry operation failed.
    #[error("{0}")]
    Registry(#[from] RegistryError),

    /// The named record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),
}

/// Open the file store backing the storefront.
///
/// # Errors
///
/// Returns `CliError::Storage` if the directory cannot be created.
pub fn open_store(dir: &Path) -> Result<Arc<dyn StateStore>, CliError> {
    Ok(showcase_storefront::db::open_store(dir)?)
}

/// Map a registry's "nothing matched" result to an error.
fn found(changed: bool, what: impl FnOnce() -> String) -> Result<(), CliError> {
    if changed {
        Ok(())
    } else {
        Err(CliError::NotFound(what()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use showcase_core::persistence::keys;
    use showcase_core::{AdminRegistry, VisitorRegistry};

    use super::*;

    #[test]
    fn test_commands_persist_through_file_store() {
        let dir = std::env::temp_dir().join(format!("sc-cli-test-{}", uuid::Uuid::new_v4()));
        let store = open_store(&dir).unwrap();

        seed::run(Arc::clone(&store), false).unwrap();
        admin::create(Arc::clone(&store), "ops", Some("pw".to_owned()), true).unwrap();
        assert!(dir.join(format!("{}.json", keys::ADMINS)).exists());

        // A fresh handle sees what the commands wrote
        let reopened = open_store(&dir).unwrap();
        assert_eq!(AdminRegistry::load(Arc::clone(&reopened)).list().len(), 2);
        assert_eq!(VisitorRegistry::load(reopened).visitor_count(), 0);
        assert!(matches!(
            visitors::ban(Arc::clone(&store), "10.0.0.1"),
            Err(CliError::NotFound(_))
        ));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
