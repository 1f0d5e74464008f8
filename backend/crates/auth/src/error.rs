//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Public messages are fixed per variant;
//! infrastructure detail only ever reaches the logs.

use std::time::Duration;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use derive_more::Display;
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::crypto::TokenError;
use platform::password::{PasswordHashError, PasswordPolicyError};
use platform::rate_limit::RateLimitError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Unique field that collided on insert or update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum ConflictField {
    #[display("username")]
    Username,
    #[display("email")]
    Email,
}

fn conflict_message(field: &Option<ConflictField>) -> &'static str {
    match field {
        Some(ConflictField::Username) => "Username already exists",
        Some(ConflictField::Email) => "Email already exists",
        None => "Username or email already exists",
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// Input failed a shape check
    #[error("{message}")]
    InvalidInput {
        field: &'static str,
        message: String,
    },

    /// Password failed the strength policy
    #[error("{0}")]
    WeakPassword(#[from] PasswordPolicyError),

    /// Username or email already taken. `None` hides which one.
    #[error("{}", conflict_message(.field))]
    Conflict { field: Option<ConflictField> },

    /// Login failed. Deliberately says nothing about why.
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, unknown or expired session
    #[error("Unauthorized")]
    Unauthorized,

    #[error("Too many {action} attempts. Please try again later.")]
    RateLimited { action: &'static str },

    /// Token absent from storage (never issued, consumed, or revoked)
    #[error("Invalid or expired reset token")]
    InvalidToken,

    /// Token found but past its expiry
    #[error("Token has expired")]
    TokenExpired,

    #[error("User not found")]
    UserNotFound,

    /// Persistence call exceeded its deadline
    #[error("Persistence call exceeded {0:?}")]
    Timeout(Duration),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    pub fn invalid_input(field: &'static str, message: impl Into<String>) -> Self {
        AuthError::InvalidInput {
            field,
            message: message.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            AuthError::InvalidInput { .. }
            | AuthError::WeakPassword(_)
            | AuthError::InvalidToken
            | AuthError::TokenExpired => StatusCode::BAD_REQUEST,
            AuthError::Conflict { .. } => StatusCode::CONFLICT,
            AuthError::InvalidCredentials | AuthError::Unauthorized => StatusCode::UNAUTHORIZED,
            AuthError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AuthError::UserNotFound => StatusCode::NOT_FOUND,
            AuthError::Timeout(_) => StatusCode::SERVICE_UNAVAILABLE,
            AuthError::Database(_) | AuthError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::InvalidInput { .. }
            | AuthError::WeakPassword(_)
            | AuthError::InvalidToken
            | AuthError::TokenExpired => ErrorKind::BadRequest,
            AuthError::Conflict { .. } => ErrorKind::Conflict,
            AuthError::InvalidCredentials | AuthError::Unauthorized => ErrorKind::Unauthorized,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::UserNotFound => ErrorKind::NotFound,
            AuthError::Timeout(_) => ErrorKind::ServiceUnavailable,
            AuthError::Database(_) | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to AppError. Only client-safe text survives.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::WeakPassword(_) => AppError::new(self.kind(), self.to_string())
                .with_action(
                    "Use 8-128 characters with upper and lower case letters, a number and a special character",
                ),
            AuthError::RateLimited { .. } => AppError::new(self.kind(), self.to_string())
                .with_action("Please try again later"),
            AuthError::InvalidToken | AuthError::TokenExpired => {
                AppError::new(self.kind(), "Invalid or expired reset token")
                    .with_action("Request a new password reset link")
            }
            AuthError::Timeout(_) => {
                AppError::new(self.kind(), "Service temporarily unavailable")
                    .with_action("Please try again later")
            }
            AuthError::Database(_) | AuthError::Internal(_) => {
                AppError::new(self.kind(), "Internal server error")
            }
            _ => AppError::new(self.kind(), self.to_string()),
        }
    }

    /// Token failures from session lookup become 401; anything else passes through
    pub(crate) fn into_unauthorized(self) -> Self {
        match self {
            AuthError::InvalidToken | AuthError::TokenExpired => AuthError::Unauthorized,
            other => other,
        }
    }

    /// Log the error with appropriate level
    fn log(&self) {
        match self {
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::Timeout(limit) => {
                tracing::error!(limit_ms = limit.as_millis() as u64, "Auth persistence timeout");
            }
            AuthError::InvalidCredentials => {
                tracing::warn!("Invalid login attempt");
            }
            AuthError::RateLimited { action } => {
                tracing::warn!(action, "Rate limit exceeded");
            }
            AuthError::InvalidToken | AuthError::TokenExpired => {
                tracing::warn!(error = %self, "Rejected reset token");
            }
            _ => {
                tracing::debug!(error = %self, "Auth error");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        self.to_app_error().into_response()
    }
}

impl From<PasswordHashError> for AuthError {
    fn from(err: PasswordHashError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<TokenError> for AuthError {
    fn from(err: TokenError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<RateLimitError> for AuthError {
    fn from(err: RateLimitError) -> Self {
        AuthError::Internal(err.to_string())
    }
}

impl From<tokio::task::JoinError> for AuthError {
    fn from(err: tokio::task::JoinError) -> Self {
        AuthError::Internal(format!("Blocking task failed: {err}"))
    }
}
