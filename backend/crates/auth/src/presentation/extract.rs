//! Request Extractors

use std::convert::Infallible;
use std::net::{IpAddr, SocketAddr};

use axum::extract::rejection::JsonRejection;
use axum::extract::{ConnectInfo, FromRequest, FromRequestParts};
use axum::http::{header, request::Parts};
use platform::client::extract_client_ip;
use platform::rate_limit::RateLimitStore;

use crate::domain::repository::AuthStore;
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// JSON body whose parse failures become `InvalidInput` on field `body`
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AuthError))]
pub struct ApiJson<T>(pub T);

impl From<JsonRejection> for AuthError {
    fn from(rejection: JsonRejection) -> Self {
        AuthError::invalid_input("body", rejection.body_text())
    }
}

/// Token from the `Authorization` header, raw or `Bearer <token>`.
/// Absent or blank headers yield `None`; the use case decides what that means.
#[derive(Debug, Clone)]
pub struct BearerToken(pub Option<String>);

impl BearerToken {
    pub fn as_deref(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

fn parse_authorization(value: &str) -> Option<String> {
    let value = value.trim();
    let token = match value.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if value.eq_ignore_ascii_case("bearer") => "",
        _ => value,
    };
    (!token.is_empty()).then(|| token.to_string())
}

impl<S> FromRequestParts<S> for BearerToken
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_authorization);
        Ok(Self(token))
    }
}

/// Client address used for rate limiting. `X-Forwarded-For` is honored only
/// when the service is configured to trust it.
#[derive(Debug, Clone, Copy)]
pub struct ClientIp(pub Option<IpAddr>);

impl<R, L> FromRequestParts<AuthAppState<R, L>> for ClientIp
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AuthAppState<R, L>,
    ) -> Result<Self, Self::Rejection> {
        // Missing when the router is served without connect info (tests)
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| addr.ip());

        Ok(Self(extract_client_ip(
            &parts.headers,
            peer,
            state.service.config().trust_forwarded_for,
        )))
    }
}
