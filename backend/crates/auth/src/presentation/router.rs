//! Auth Router

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;

use platform::rate_limit::{RateLimitStore, SlidingWindowLimiter};

use crate::application::{AuthConfig, AuthService};
use crate::domain::notifier::ResetNotifier;
use crate::domain::repository::AuthStore;
use crate::error::AuthResult;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(
    repo: PgAuthRepository,
    limiter: Arc<SlidingWindowLimiter>,
    notifier: Arc<dyn ResetNotifier>,
    config: AuthConfig,
) -> AuthResult<Router> {
    auth_router_generic(repo, limiter, notifier, config)
}

/// Create a generic Auth router for any store and limiter
pub fn auth_router_generic<R, L>(
    repo: R,
    limiter: Arc<L>,
    notifier: Arc<dyn ResetNotifier>,
    config: AuthConfig,
) -> AuthResult<Router>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let service = AuthService::new(Arc::new(repo), limiter, notifier, config)?;
    Ok(auth_routes(service))
}

/// Routes over an already built service
pub fn auth_routes<R, L>(service: AuthService<R, L>) -> Router
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let state = AuthAppState { service };

    Router::new()
        .route("/signup", post(handlers::sign_up::<R, L>))
        .route("/login", post(handlers::sign_in::<R, L>))
        .route("/logout", post(handlers::sign_out::<R, L>))
        .route("/validate", get(handlers::validate::<R, L>))
        .route("/forgot-password", post(handlers::forgot_password::<R, L>))
        .route("/reset-password", post(handlers::reset_password::<R, L>))
        .route(
            "/profile",
            get(handlers::get_profile::<R, L>).put(handlers::update_profile::<R, L>),
        )
        .with_state(state)
}
