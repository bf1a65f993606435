//! Integration tests for Showcase.
//!
//! The tests drive the full storefront router in-process with
//! `tower::ServiceExt::oneshot`. State lives in a `MemoryStore`, geolocation
//! is stubbed, and the client IP is supplied through `X-Forwarded-For`.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p showcase-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `shop` - Shop page, catalog JSON and the ban gate
//! - `auth` - Login, single-IP restriction, sessions and logout
//! - `products` - Product CRUD through the admin API
//! - `admins` - Admin management through the admin API
//! - `visitors` - Visitor listing, bans and deletion

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::missing_panics_doc)]

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode, header};
use serde_json::Value;
use showcase_core::{MemoryStore, StateStore};
use showcase_storefront::config::StorefrontConfig;
use showcase_storefront::middleware::session::SESSION_COOKIE_NAME;
use showcase_storefront::services::{GeoError, GeoLocation, GeoLookup};
use showcase_storefront::state::AppState;
use tower::ServiceExt;

/// Region returned by the stub geolocation provider.
pub const STUB_REGION: &str = "Istanbul";
/// City returned by the stub geolocation provider.
pub const STUB_CITY: &str = "Kadikoy";

/// Seed admin credentials.
pub const SEED_USERNAME: &str = "darknes";
pub const SEED_PASSWORD: &str = "darknes";

/// Geolocation provider answering every IP with the same place.
pub struct StubLookup;

#[async_trait]
impl GeoLookup for StubLookup {
    async fn lookup(&self, _ip: &str) -> Result<GeoLocation, Arc<GeoError>> {
        Ok(GeoLocation {
            region: STUB_REGION.to_owned(),
            city: STUB_CITY.to_owned(),
        })
    }

    fn name(&self) -> &'static str {
        "stub"
    }
}

/// A storefront wired to in-memory state.
pub struct TestApp {
    router: Router,
    state: AppState,
    store: Arc<dyn StateStore>,
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

impl TestApp {
    /// Build an app over a fresh store; registries are seeded on load.
    #[must_use]
    pub fn new() -> Self {
        Self::with_store(Arc::new(MemoryStore::new()))
    }

    /// Build an app over a store that may already hold data.
    #[must_use]
    pub fn with_store(store: Arc<dyn StateStore>) -> Self {
        let config = StorefrontConfig::from_vars(|key| {
            (key == "SHOWCASE_TRUST_PROXY").then(|| "true".to_owned())
        })
        .expect("test configuration should parse");
        let state = AppState::new(config, Arc::clone(&store), Arc::new(StubLookup));
        let router = showcase_storefront::app(state.clone());
        Self {
            router,
            state,
            store,
        }
    }

    /// Shared application state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// The backing store, for checking what was persisted.
    #[must_use]
    pub fn store(&self) -> &dyn StateStore {
        self.store.as_ref()
    }

    /// Send one request through the router.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible")
    }

    /// Log in from `ip` and return the status and session cookie.
    pub async fn login(
        &self,
        ip: &str,
        username: &str,
        password: &str,
    ) -> (StatusCode, Option<String>) {
        let body = serde_json::json!({ "username": username, "password": password });
        let response = self
            .send(request(Method::POST, "/api/admin/login", ip, None, Some(&body)))
            .await;
        let cookie = session_cookie(&response);
        (response.status(), cookie)
    }

    /// Log in as the seed admin and return the session cookie.
    pub async fn login_seed(&self, ip: &str) -> String {
        let (status, cookie) = self.login(ip, SEED_USERNAME, SEED_PASSWORD).await;
        assert_eq!(status, StatusCode::OK, "seed admin login should succeed");
        cookie.expect("login should set a session cookie")
    }

    /// Wait for the background visit recording to land.
    pub async fn wait_for_visitor(&self, ip: &str) -> bool {
        for _ in 0..100 {
            if self.state.visitors().read().await.find(ip).is_some() {
                return true;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        false
    }
}

/// Build a request from `ip`, optionally carrying a session cookie and a JSON
/// body.
#[must_use]
pub fn request(
    method: Method,
    uri: &str,
    ip: &str,
    cookie: Option<&str>,
    body: Option<&Value>,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header("x-forwarded-for", ip);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let body = match body {
        Some(json) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    builder.body(body).expect("request should build")
}

/// `name=value` of the session cookie set by `response`, if any.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| v.split(';').next())
        .find(|pair| pair.starts_with(&format!("{SESSION_COOKIE_NAME}=")))
        .map(str::to_owned)
}

/// Collect the response body as text.
pub async fn text_body(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should be readable");
    String::from_utf8(bytes.to_vec()).expect("body should be UTF-8")
}

/// Collect the response body as JSON.
pub async fn json_body(response: Response<Body>) -> Value {
    serde_json::from_str(&text_body(response).await).expect("body should be JSON")
}
