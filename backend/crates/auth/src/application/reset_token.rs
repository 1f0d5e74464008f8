//! Reset Token Manager
//!
//! One-time password reset grants.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::reset_token::ResetToken;
use crate::domain::repository::ResetTokenRepository;
use crate::domain::value_object::{token::OpaqueToken, user_id::UserId};
use crate::error::{AuthError, AuthResult};

pub struct ResetTokenManager<T>
where
    T: ResetTokenRepository,
{
    reset_repo: Arc<T>,
    config: Arc<AuthConfig>,
}

impl<T> ResetTokenManager<T>
where
    T: ResetTokenRepository,
{
    pub fn new(reset_repo: Arc<T>, config: Arc<AuthConfig>) -> Self {
        Self { reset_repo, config }
    }

    pub async fn issue(&self, user_id: &UserId) -> AuthResult<OpaqueToken> {
        self.issue_at(user_id, Utc::now()).await
    }

    pub async fn issue_at(&self, user_id: &UserId, now: DateTime<Utc>) -> AuthResult<OpaqueToken> {
        let token = OpaqueToken::generate()?;
        let record = ResetToken::new(token.hash(), *user_id, self.config.reset_ttl()?, now);

        within(
            self.config.persistence_timeout,
            self.reset_repo.insert_reset_token(&record),
        )
        .await?;

        tracing::debug!(user_id = %user_id, expires_at = %record.expires_at, "Reset token issued");
        Ok(token)
    }

    /// Redeem a token. The row is removed whether or not it had expired,
    /// so every token works at most once.
    pub async fn consume(&self, token: &str) -> AuthResult<UserId> {
        self.consume_at(token, Utc::now()).await
    }

    pub async fn consume_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<UserId> {
        let token = OpaqueToken::parse(token)?;

        let record = within(
            self.config.persistence_timeout,
            self.reset_repo.take_reset_token(&token.hash()),
        )
        .await?
        .ok_or(AuthError::InvalidToken)?;

        if record.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }

        Ok(record.user_id)
    }

    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = within(
            self.config.persistence_timeout,
            self.reset_repo.delete_expired_reset_tokens(Utc::now()),
        )
        .await?;

        if deleted > 0 {
            tracing::info!(deleted, "Cleaned up expired reset tokens");
        }
        Ok(deleted)
    }
}
