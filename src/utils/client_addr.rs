//! Client address extraction for per-client quotas.

use crate::AppError;
use crate::state::AppState;
use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::{HeaderMap, request::Parts};
use std::net::{IpAddr, SocketAddr};

const X_FORWARDED_FOR: &str = "x-forwarded-for";
const X_REAL_IP: &str = "x-real-ip";

/// Network address identifying the client for rate limiting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientAddr(pub String);

impl ClientAddr {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Determines the client address of a request.
///
/// With `behind_proxy` the first address in `X-Forwarded-For`, then
/// `X-Real-IP`, is trusted before the socket peer. Header values that are not
/// IP addresses are ignored. Ports are never part of the result, so one
/// client opening several connections shares a single quota.
///
/// # Errors
///
/// Returns [`AppError::MissingClientAddr`] if no address can be determined.
///
/// # Examples
///
/// ```ignore
/// let mut headers = HeaderMap::new();
/// headers.insert("x-forwarded-for", "203.0.113.7, 10.0.0.1".parse().unwrap());
///
/// let addr = extract_client_addr(&headers, None, true).unwrap();
/// assert_eq!(addr.as_str(), "203.0.113.7");
/// ```
pub fn extract_client_addr(
    headers: &HeaderMap,
    peer: Option<SocketAddr>,
    behind_proxy: bool,
) -> Result<ClientAddr, AppError> {
    if behind_proxy {
        let forwarded = header_ip(headers, X_FORWARDED_FOR, |value| value.split(',').next())
            .or_else(|| header_ip(headers, X_REAL_IP, Some));
        if let Some(ip) = forwarded {
            return Ok(ClientAddr(ip.to_string()));
        }
    }

    peer.map(|addr| ClientAddr(addr.ip().to_string()))
        .ok_or(AppError::MissingClientAddr)
}

fn header_ip<'a>(
    headers: &'a HeaderMap,
    name: &str,
    pick: impl FnOnce(&'a str) -> Option<&'a str>,
) -> Option<IpAddr> {
    let value = headers.get(name)?.to_str().ok()?;
    pick(value)?.trim().parse().ok()
}

impl FromRequestParts<AppState> for ClientAddr {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);

        extract_client_addr(&parts.headers, peer, state.behind_proxy)
    }
}
