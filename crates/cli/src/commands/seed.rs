//! Write default data to the store.
//!
//! Without `--force` only missing collections are written: the seed admin
//! `darknes` and the six demo products. Visitors are never touched.

use std::sync::Arc;

use showcase_core::catalog::default_products;
use showcase_core::persistence::{keys, save_collection};
use showcase_core::{AdminRegistry, AdminUser, ProductCatalog, StateStore};
use tracing::info;

use super::CliError;

/// Seed products and admins.
///
/// # Errors
///
/// Returns an error if the store cannot be read or written.
pub fn run(store: Arc<dyn StateStore>, force: bool) -> Result<(), CliError> {
    if force {
        save_collection(store.as_ref(), keys::PRODUCTS, &default_products())?;
        save_collection(store.as_ref(), keys::ADMINS, &[AdminUser::seed()])?;
        info!("Products and admins reset to defaults");
        return Ok(());
    }

    let mut seeded = Vec::new();
    if store.load(keys::PRODUCTS)?.is_none() {
        ProductCatalog::load(Arc::clone(&store)).persist()?;
        seeded.push(keys::PRODUCTS);
    }
    if store.load(keys::ADMINS)?.is_none() {
        AdminRegistry::load(Arc::clone(&store)).persist()?;
        seeded.push(keys::ADMINS);
    }

    if seeded.is_empty() {
        info!("Nothing to seed; use --force to overwrite");
    } else {
        info!(collections = ?seeded, "Seeded defaults");
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use showcase_core::{MemoryStore, ProductId};

    use super::*;

    #[test]
    fn test_seed_writes_missing_collections() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        run(Arc::clone(&store), false).unwrap();

        assert!(store.load(keys::PRODUCTS).unwrap().is_some());
        assert!(store.load(keys::ADMINS).unwrap().is_some());
        assert!(store.load(keys::VISITORS).unwrap().is_none());
    }

    #[test]
    fn test_seed_keeps_existing_data_unless_forced() {
        let store: Arc<dyn StateStore> = Arc::new(MemoryStore::new());
        let mut catalog = ProductCatalog::load(Arc::clone(&store));
        catalog.delete(ProductId::new(1)).unwrap();

        run(Arc::clone(&store), false).unwrap();
        assert_eq!(ProductCatalog::load(Arc::clone(&store)).list().len(), 5);

        run(Arc::clone(&store), true).unwrap();
        assert_eq!(ProductCatalog::load(store).list().len(), 6);
    }
}
