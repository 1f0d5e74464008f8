//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository and notifier traits
//! - `application/` - Use cases, session/reset token managers, `AuthService`
//! - `infra/` - PostgreSQL and in-memory stores, reset notifiers
//! - `presentation/` - HTTP handlers, DTOs, extractors, router
//!
//! ## Features
//! - Signup with username, email and password, plus optional names
//! - Login with bearer session tokens (24h, or 30 days with remember-me)
//! - Session validation and logout
//! - Password reset through single-use, one-hour tokens
//! - Profile read and partial update
//!
//! ## Security Model
//! - Passwords hashed with Argon2id, optional server-side pepper
//! - Only SHA-256 digests of tokens are stored
//! - Per-client sliding-window rate limits on login and signup
//! - Login and forgot-password do not reveal whether an account exists

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

#[cfg(test)]
mod tests;

// Re-exports for convenience
pub use application::{AuthConfig, AuthService, CleanupReport};
pub use domain::ResetNotifier;
pub use error::{AuthError, AuthResult};
pub use infra::{InMemoryAuthRepository, LogResetNotifier, NoopResetNotifier, PgAuthRepository};
pub use presentation::router::{auth_router, auth_router_generic, auth_routes};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}
