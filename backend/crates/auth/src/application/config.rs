//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

use platform::password::{HasherConfig, PasswordHasher};
use platform::rate_limit::RateLimitConfig;

use crate::error::{AuthError, AuthResult};

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session TTL without "Remember Me" (24 hours)
    pub session_ttl_short: Duration,
    /// Session TTL with "Remember Me" (30 days)
    pub session_ttl_long: Duration,
    /// Password reset token TTL (1 hour)
    pub reset_token_ttl: Duration,
    /// Login attempts per client (5 per minute)
    pub login_rate_limit: RateLimitConfig,
    /// Signup attempts per client (3 per hour)
    pub signup_rate_limit: RateLimitConfig,
    /// Deadline for every persistence call
    pub persistence_timeout: Duration,
    /// Argon2id work factor
    pub password_hashing: HasherConfig,
    /// Password pepper (optional, application-wide secret)
    pub password_pepper: Option<Vec<u8>>,
    /// Say which field collided on signup (username vs email)
    pub reveal_conflict_field: bool,
    /// Key rate limits on `X-Forwarded-For` instead of the socket peer
    pub trust_forwarded_for: bool,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_ttl_short: Duration::from_secs(24 * 3600), // 24 hours
            session_ttl_long: Duration::from_secs(30 * 24 * 3600), // 30 days
            reset_token_ttl: Duration::from_secs(3600),        // 1 hour
            login_rate_limit: RateLimitConfig::new(5, 60),
            signup_rate_limit: RateLimitConfig::new(3, 3600),
            persistence_timeout: Duration::from_secs(5),
            password_hashing: HasherConfig::default(),
            password_pepper: None,
            reveal_conflict_field: true,
            trust_forwarded_for: false,
        }
    }
}

impl AuthConfig {
    /// Local development: defaults, but trusts a local proxy's forwarded-for
    pub fn development() -> Self {
        Self {
            trust_forwarded_for: true,
            ..Default::default()
        }
    }

    /// Cheapest hashing parameters. For tests only.
    pub fn minimal_cost() -> Self {
        Self {
            password_hashing: HasherConfig::minimal_cost(),
            ..Default::default()
        }
    }

    /// Session lifetime for the remember-me choice
    pub fn session_ttl(&self, remember_me: bool) -> AuthResult<chrono::Duration> {
        let ttl = if remember_me {
            self.session_ttl_long
        } else {
            self.session_ttl_short
        };
        chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid session TTL: {e}")))
    }

    pub fn reset_ttl(&self) -> AuthResult<chrono::Duration> {
        chrono::Duration::from_std(self.reset_token_ttl)
            .map_err(|e| AuthError::Internal(format!("Invalid reset token TTL: {e}")))
    }

    /// Build the password hasher from the work factor and pepper
    pub fn password_hasher(&self) -> AuthResult<PasswordHasher> {
        Ok(PasswordHasher::new(
            self.password_hashing,
            self.password_pepper.clone(),
        )?)
    }
}
