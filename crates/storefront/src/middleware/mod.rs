//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span)
//! 3. Request ID (recorded on the request span)
//! 4. Session layer (tower-sessions, in-memory store)
//! 5. Ban gate (public routes only)
//! 6. Rate limiting (login route only)

pub mod auth;
pub mod ban;
pub mod client_ip;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{RequireAdminAuth, clear_current_admin, set_current_admin};
pub use ban::ban_gate_middleware;
pub use client_ip::ClientIp;
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
