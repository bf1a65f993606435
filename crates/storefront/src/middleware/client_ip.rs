//! Client IP resolution.
//!
//! With `SHOWCASE_TRUST_PROXY` set, the first `X-Forwarded-For` entry wins,
//! then `X-Real-IP`. Otherwise only the socket peer address is used, since
//! forwarded headers are client-controlled.

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::{
    extract::{ConnectInfo, FromRequestParts},
    http::{HeaderMap, request::Parts},
};

use crate::state::AppState;

fn header_ip(headers: &HeaderMap, name: &str) -> Option<IpAddr> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .and_then(|s| s.trim().parse::<IpAddr>().ok())
}

/// Resolve the client IP from headers and the peer address.
#[must_use]
pub fn resolve_ip(
    headers: &HeaderMap,
    peer: Option<&ConnectInfo<SocketAddr>>,
    trust_proxy: bool,
) -> Option<IpAddr> {
    if trust_proxy
        && let Some(ip) =
            header_ip(headers, "x-forwarded-for").or_else(|| header_ip(headers, "x-real-ip"))
    {
        return Some(ip);
    }
    peer.map(|ConnectInfo(addr)| addr.ip())
}

/// The requesting client's IP, if it could be determined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientIp(pub Option<IpAddr>);

impl ClientIp {
    /// The IP as a string, or the current epoch milliseconds when unknown.
    ///
    /// The fallback gives every unidentified request its own identity rather
    /// than merging them into one record.
    #[must_use]
    pub fn or_timestamp(&self) -> String {
        self.0.map_or_else(
            || chrono::Utc::now().timestamp_millis().to_string(),
            |ip| ip.to_string(),
        )
    }
}

impl FromRequestParts<AppState> for ClientIp {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(resolve_ip(
            &parts.headers,
            parts.extensions.get::<ConnectInfo<SocketAddr>>(),
            state.config().trust_proxy,
        )))
    }
}
