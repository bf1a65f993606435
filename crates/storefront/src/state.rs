//! Application state shared across handlers.

use std::sync::Arc;

use showcase_core::{AdminRegistry, ProductCatalog, StateStore, StorageError, VisitorRegistry};
use tokio::sync::RwLock;

use crate::config::StorefrontConfig;
use crate::db;
use crate::services::{GeoError, GeoLookup, HttpGeoLookup, VisitorService};

/// Error building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
    #[error("geolocation client error: {0}")]
    Geo(#[from] GeoError),
}

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. Each registry sits behind its
/// own lock; handlers hold a lock only for the duration of one operation.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    products: RwLock<ProductCatalog>,
    admins: RwLock<AdminRegistry>,
    visitors: VisitorService,
}

impl AppState {
    /// Create application state over an existing store and geolocation
    /// provider. Registries are loaded immediately; seeded defaults are
    /// written back so storage matches what is served.
    #[must_use]
    pub fn new(
        config: StorefrontConfig,
        store: Arc<dyn StateStore>,
        geo: Arc<dyn GeoLookup>,
    ) -> Self {
        let products = ProductCatalog::load(Arc::clone(&store));
        if products.is_seeded()
            && let Err(e) = products.persist()
        {
            tracing::warn!(error = %e, "Failed to store default products");
        }
        let admins = AdminRegistry::load(Arc::clone(&store));
        if admins.is_seeded()
            && let Err(e) = admins.persist()
        {
            tracing::warn!(error = %e, "Failed to store default admin");
        }
        let visitors = VisitorService::new(VisitorRegistry::load(store), geo);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                products: RwLock::new(products),
                admins: RwLock::new(admins),
                visitors,
            }),
        }
    }

    /// Create application state backed by the configured data directory and
    /// geolocation endpoint.
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be created or the HTTP
    /// client cannot be built.
    pub fn from_config(config: StorefrontConfig) -> Result<Self, StateError> {
        let store = db::open_store(&config.data_dir)?;
        let geo = Arc::new(HttpGeoLookup::new(&config.geoip_url)?);
        Ok(Self::new(config, store, geo))
    }

    /// Get a reference to the storefront configuration.
    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    /// The product catalog.
    #[must_use]
    pub fn products(&self) -> &RwLock<ProductCatalog> {
        &self.inner.products
    }

    /// The admin registry.
    #[must_use]
    pub fn admins(&self) -> &RwLock<AdminRegistry> {
        &self.inner.admins
    }

    /// Visitor tracking.
    #[must_use]
    pub fn visitors(&self) -> &VisitorService {
        &self.inner.visitors
    }
}
