//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET    /                                    - Shop page (banned page for banned IPs)
//! GET    /api/products                        - Catalog JSON
//!
//! # Admin auth
//! POST   /api/admin/login                     - Log in (rate limited)
//! POST   /api/admin/logout                    - Log out
//! GET    /api/admin/session                   - Current admin
//!
//! # Admin API (requires auth)
//! GET    /api/admin/products                  - List products
//! POST   /api/admin/products                  - Create product
//! PUT    /api/admin/products/{id}             - Replace product
//! DELETE /api/admin/products/{id}             - Delete product
//! GET    /api/admin/admins                    - List admins
//! POST   /api/admin/admins                    - Create admin
//! PUT    /api/admin/admins/{id}               - Update admin
//! DELETE /api/admin/admins/{id}               - Delete admin
//! POST   /api/admin/admins/{id}/toggle-status
//! POST   /api/admin/admins/{id}/toggle-multi-login
//! GET    /api/admin/visitors                  - Deduplicated visitors
//! DELETE /api/admin/visitors                  - Clear all visitors
//! DELETE /api/admin/visitors/{ip}             - Delete one visitor
//! POST   /api/admin/visitors/{ip}/ban
//! POST   /api/admin/visitors/{ip}/unban
//! ```

pub mod admins;
pub mod auth;
pub mod products;
pub mod shop;
pub mod visitors;

use axum::{
    Router, middleware,
    routing::{get, post, put},
};

use crate::middleware::{ban_gate_middleware, login_rate_limiter};
use crate::state::AppState;

/// Public shop routes, behind the ban gate.
pub fn shop_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/api/products", get(shop::products))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            ban_gate_middleware,
        ))
}

/// Create the admin API router.
pub fn admin_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/login",
            post(auth::login).layer(login_rate_limiter(state.config().trust_proxy)),
        )
        .route("/logout", post(auth::logout))
        .route("/session", get(auth::current))
        .route("/products", get(products::index).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::delete),
        )
        .route("/admins", get(admins::index).post(admins::create))
        .route("/admins/{id}", put(admins::update).delete(admins::delete))
        .route("/admins/{id}/toggle-status", post(admins::toggle_status))
        .route(
            "/admins/{id}/toggle-multi-login",
            post(admins::toggle_multi_login),
        )
        .route("/visitors", get(visitors::index).delete(visitors::clear))
        .route("/visitors/{ip}", axum::routing::delete(visitors::delete))
        .route("/visitors/{ip}/ban", post(visitors::ban))
        .route("/visitors/{ip}/unban", post(visitors::unban))
}

/// Create all routes for the storefront.
pub fn routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(shop_routes(state))
        .nest("/api/admin", admin_routes(state))
}
