//! Showcase Storefront library.
//!
//! This crate provides the storefront server as a library, allowing it to be
//! tested in-process and reused by the CLI.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::{Router, routing::get};
use tower_http::trace::{DefaultOnResponse, OnResponse, TraceLayer};
use tracing::Span;

use crate::state::AppState;

/// Build the application router with every layer except Sentry's, which the
/// binary adds outermost.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .route("/health", get(health))
        .merge(routes::routes(&state))
        .layer(session_layer)
        .layer(axum::middleware::from_fn(
            middleware::request_id_middleware,
        ))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = tracing::field::Empty,
                        status = tracing::field::Empty,
                        latency_ms = tracing::field::Empty,
                    )
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &Span| {
                        span.record("status", response.status().as_u16());
                        span.record(
                            "latency_ms",
                            u64::try_from(latency.as_millis()).unwrap_or(u64::MAX),
                        );
                        DefaultOnResponse::default().on_response(response, latency, span);
                    },
                ),
        )
        .with_state(state)
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running.
async fn health() -> &'static str {
    "ok"
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use showcase_core::MemoryStore;
    use tower::ServiceExt;

    use super::*;
    use crate::config::StorefrontConfig;
    use crate::services::{GeoError, GeoLocation, GeoLookup};

    struct NoLookup;

    #[async_trait]
    impl GeoLookup for NoLookup {
        async fn lookup(&self, _ip: &str) -> Result<GeoLocation, Arc<GeoError>> {
            Err(Arc::new(GeoError::Status(503)))
        }

        fn name(&self) -> &'static str {
            "none"
        }
    }

    fn test_app() -> Router {
        let config = StorefrontConfig::from_vars(|_| None).unwrap();
        app(AppState::new(
            config,
            Arc::new(MemoryStore::new()),
            Arc::new(NoLookup),
        ))
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_app()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_admin_api_requires_session() {
        let response = test_app()
            .oneshot(
                Request::get("/api/admin/visitors")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
