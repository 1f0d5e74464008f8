//! Client identification utilities
//!
//! Resolving the address that rate limits are keyed on.

use http::HeaderMap;
use std::net::IpAddr;

/// Resolve the client IP
///
/// With `trust_forwarded_for` the first entry of `X-Forwarded-For` wins
/// (only enable it behind a proxy that overwrites the header). Otherwise,
/// or when the header is absent or unparseable, the socket peer is used.
pub fn extract_client_ip(
    headers: &HeaderMap,
    direct_ip: Option<IpAddr>,
    trust_forwarded_for: bool,
) -> Option<IpAddr> {
    if trust_forwarded_for {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|xff| xff.split(',').next())
            .and_then(|first| first.trim().parse::<IpAddr>().ok());
        if forwarded.is_some() {
            return forwarded;
        }
    }
    direct_ip
}

/// Rate-limit key for an action class and client.
/// Clients without a resolvable address share the `unknown` bucket.
pub fn rate_limit_key(action: &str, ip: Option<IpAddr>) -> String {
    match ip {
        Some(ip) => format!("{action}:{ip}"),
        None => format!("{action}:unknown"),
    }
}
