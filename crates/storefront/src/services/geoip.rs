//! IP geolocation over an HTTP JSON API.
//!
//! The endpoint is a URL template with an `{ip}` placeholder
//! (`https://ipapi.co/{ip}/json/` by default). Successful lookups are cached
//! for 15 minutes; concurrent lookups for the same IP share one request.
//! Failures are not cached.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use thiserror::Error;

const CACHE_TTL_SECS: u64 = 15 * 60;
const CACHE_MAX_CAPACITY: u64 = 10_000;
const HTTP_TIMEOUT_SECS: u64 = 3;
const UNKNOWN: &str = "Unknown";

/// Errors from a geolocation lookup.
#[derive(Debug, Error)]
pub enum GeoError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned a non-success status.
    #[error("API error: {0}")]
    Status(u16),

    /// API answered but reported an error in the body.
    #[error("Lookup rejected: {0}")]
    Rejected(String),
}

/// Region and city for an IP.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeoLocation {
    pub region: String,
    pub city: String,
}

/// Resolves an IP to a location.
#[async_trait]
pub trait GeoLookup: Send + Sync {
    /// Look up `ip`.
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, Arc<GeoError>>;

    /// Provider name for logs.
    fn name(&self) -> &'static str;
}

/// Body shape of ipapi-style responses.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    error: bool,
    #[serde(default)]
    reason: Option<String>,
    #[serde(default)]
    region: Option<String>,
    #[serde(default)]
    city: Option<String>,
}

impl ApiResponse {
    fn into_location(self) -> Result<GeoLocation, GeoError> {
        if self.error {
            return Err(GeoError::Rejected(
                self.reason.unwrap_or_else(|| "unspecified".to_owned()),
            ));
        }
        let or_unknown = |v: Option<String>| {
            v.filter(|s| !s.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN.to_owned())
        };
        Ok(GeoLocation {
            region: or_unknown(self.region),
            city: or_unknown(self.city),
        })
    }
}

/// [`GeoLookup`] backed by an HTTP API and an in-process cache.
pub struct HttpGeoLookup {
    client: reqwest::Client,
    url_template: String,
    cache: Cache<String, GeoLocation>,
}

impl HttpGeoLookup {
    /// Create a lookup for `url_template`.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(url_template: &str) -> Result<Self, GeoError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()?;

        let cache = Cache::builder()
            .time_to_live(Duration::from_secs(CACHE_TTL_SECS))
            .max_capacity(CACHE_MAX_CAPACITY)
            .build();

        Ok(Self {
            client,
            url_template: url_template.to_owned(),
            cache,
        })
    }

    async fn fetch(&self, ip: &str) -> Result<GeoLocation, GeoError> {
        let url = self.url_template.replace("{ip}", ip);
        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeoError::Status(status.as_u16()));
        }

        response.json::<ApiResponse>().await?.into_location()
    }
}

#[async_trait]
impl GeoLookup for HttpGeoLookup {
    async fn lookup(&self, ip: &str) -> Result<GeoLocation, Arc<GeoError>> {
        self.cache
            .try_get_with(ip.to_owned(), async {
                tracing::trace!(ip, "GeoIP cache miss, fetching");
                self.fetch(ip).await
            })
            .await
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
