//! File-backed persistence for the registries.
//!
//! # Layout
//!
//! One JSON document per registry under the data directory:
//!
//! - `products.json` - Product catalog
//! - `admins.json` - Admin accounts
//! - `visitors.json` - Visitor records
//!
//! Writes go to a sibling `.tmp` file that is then renamed over the target,
//! so a crash mid-write leaves the previous document intact.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use showcase_core::{StateStore, StorageError};

/// [`StateStore`] that keeps each key in `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Open (and create if needed) a data directory.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::Io` if the directory cannot be created.
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            key: dir.display().to_string(),
            source,
        })?;
        Ok(Self { dir })
    }

    /// The data directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, StorageError> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
        if !valid {
            return Err(StorageError::Unavailable(format!("invalid storage key: {key}")));
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl StateStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>, StorageError> {
        let path = self.path_for(key)?;
        match fs::read_to_string(&path) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StorageError::Io {
                key: key.to_owned(),
                source,
            }),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let path = self.path_for(key)?;
        let tmp = path.with_extension("json.tmp");
        let io_err = |source| StorageError::Io {
            key: key.to_owned(),
            source,
        };

        fs::write(&tmp, value).map_err(io_err)?;
        fs::rename(&tmp, &path).map_err(io_err)?;
        tracing::trace!(key, bytes = value.len(), "State saved");
        Ok(())
    }
}

/// Open the file store at `dir` as a shared [`StateStore`].
///
/// # Errors
///
/// Returns `StorageError::Io` if the directory cannot be created.
pub fn open_store(dir: &Path) -> Result<Arc<dyn StateStore>, StorageError> {
    let store = FileStore::open(dir)?;
    tracing::info!(dir = %store.dir().display(), "File store opened");
    Ok(Arc::new(store))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn temp_store() -> FileStore {
        let dir = std::env::temp_dir().join(format!("showcase-test-{}", uuid::Uuid::new_v4()));
        FileStore::open(dir).unwrap()
    }

    #[test]
    fn test_missing_key_loads_none() {
        let store = temp_store();
        assert!(store.load("products").unwrap().is_none());
    }

    #[test]
    fn test_save_then_load() {
        let store = temp_store();
        store.save("visitors", "[]").unwrap();
        store.save("visitors", r#"[{"ip":"1.1.1.1"}]"#).unwrap();
        assert_eq!(
            store.load("visitors").unwrap().as_deref(),
            Some(r#"[{"ip":"1.1.1.1"}]"#)
        );
        assert!(store.dir().join("visitors.json").exists());
        assert!(!store.dir().join("visitors.json.tmp").exists());
        fs::remove_dir_all(store.dir()).unwrap();
    }

    #[test]
    fn test_rejects_path_like_keys() {
        let store = temp_store();
        assert!(store.save("../escape", "x").is_err());
        assert!(store.load("a/b").is_err());
        assert!(store.load("").is_err());
    }

    #[test]
    fn test_registries_over_file_store() {
        use showcase_core::{AdminRegistry, ProductCatalog};

        let store = temp_store();
        let dir = store.dir().to_path_buf();
        let shared: Arc<dyn StateStore> = Arc::new(store);

        let mut admins = AdminRegistry::load(Arc::clone(&shared));
        admins.login("darknes", "darknes", "7.7.7.7").unwrap();
        let catalog = ProductCatalog::load(Arc::clone(&shared));
        catalog.persist().unwrap();

        let reopened = open_store(&dir).unwrap();
        let admins = AdminRegistry::load(Arc::clone(&reopened));
        assert_eq!(
            admins.list()[0].last_login_ip.as_deref(),
            Some("7.7.7.7")
        );
        assert_eq!(ProductCatalog::load(reopened).list().len(), 6);
        fs::remove_dir_all(dir).unwrap();
    }
}
