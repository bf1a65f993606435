//! Visitor recording with geolocation and user-agent enrichment.

use std::sync::Arc;

use showcase_core::{RegistryError, VisitorInfo, VisitorMetadata, VisitorRegistry};
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::geoip::GeoLookup;
use super::user_agent;

/// Shared visitor registry plus the lookups that enrich new records.
#[derive(Clone)]
pub struct VisitorService {
    registry: Arc<RwLock<VisitorRegistry>>,
    geo: Arc<dyn GeoLookup>,
}

impl VisitorService {
    /// Wrap a loaded registry.
    #[must_use]
    pub fn new(registry: VisitorRegistry, geo: Arc<dyn GeoLookup>) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            geo,
        }
    }

    /// Record a visit from `ip` unless it was recorded within the last hour.
    ///
    /// The lookup runs without holding the registry lock. A failed
    /// geolocation leaves region and city unset; the user-agent fields are
    /// still filled in. Returns the new record, or `None` when the existing
    /// one is still fresh.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError::Storage` if the visitors cannot be saved.
    pub async fn add_visitor(
        &self,
        ip: &str,
        user_agent: Option<&str>,
        now_millis: i64,
    ) -> Result<Option<VisitorInfo>, RegistryError> {
        if !self.registry.read().await.needs_refresh(ip, now_millis) {
            return Ok(None);
        }

        let mut metadata = VisitorMetadata::default();
        match self.geo.lookup(ip).await {
            Ok(location) => {
                metadata.region = Some(location.region);
                metadata.city = Some(location.city);
            }
            Err(e) => {
                tracing::warn!(ip, provider = self.geo.name(), error = %e, "Geolocation failed");
            }
        }
        let client = user_agent::describe(user_agent.unwrap_or_default());
        metadata.device = Some(client.device);
        metadata.browser = Some(client.browser);
        metadata.os = Some(client.os);

        let mut registry = self.registry.write().await;
        // A concurrent request may have recorded this IP during the lookup.
        if !registry.needs_refresh(ip, now_millis) {
            return Ok(None);
        }
        registry.record_visit(ip, now_millis, metadata).map(Some)
    }

    /// Whether `ip` is banned.
    pub async fn is_ip_banned(&self, ip: &str) -> bool {
        self.registry.read().await.is_ip_banned(ip)
    }

    /// Read access to the registry.
    pub async fn read(&self) -> RwLockReadGuard<'_, VisitorRegistry> {
        self.registry.read().await
    }

    /// Write access to the registry.
    pub async fn write(&self) -> RwLockWriteGuard<'_, VisitorRegistry> {
        self.registry.write().await
    }
}
