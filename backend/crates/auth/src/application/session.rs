//! Session Manager
//!
//! Issues, resolves and revokes bearer sessions.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::domain::entity::session::Session;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::{token::OpaqueToken, user_id::UserId};
use crate::error::{AuthError, AuthResult};

/// A freshly created session as handed to the client
#[derive(Debug)]
pub struct IssuedSession {
    pub token: OpaqueToken,
    pub expires_at: DateTime<Utc>,
}

pub struct SessionManager<S>
where
    S: SessionRepository,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> SessionManager<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    pub async fn create(&self, user_id: &UserId, remember_me: bool) -> AuthResult<IssuedSession> {
        self.create_at(user_id, remember_me, Utc::now()).await
    }

    pub async fn create_at(
        &self,
        user_id: &UserId,
        remember_me: bool,
        now: DateTime<Utc>,
    ) -> AuthResult<IssuedSession> {
        let token = OpaqueToken::generate()?;
        let ttl = self.config.session_ttl(remember_me)?;
        let session = Session::new(token.hash(), *user_id, remember_me, ttl, now);

        within(
            self.config.persistence_timeout,
            self.session_repo.insert_session(&session),
        )
        .await?;

        tracing::debug!(
            user_id = %user_id,
            remember_me,
            expires_at = %session.expires_at,
            "Session created"
        );

        Ok(IssuedSession {
            token,
            expires_at: session.expires_at,
        })
    }

    /// Owner of a live session.
    /// `InvalidToken` when empty or unknown, `TokenExpired` at or past expiry.
    pub async fn resolve(&self, token: &str) -> AuthResult<UserId> {
        self.resolve_at(token, Utc::now()).await
    }

    pub async fn resolve_at(&self, token: &str, now: DateTime<Utc>) -> AuthResult<UserId> {
        let token = OpaqueToken::parse(token)?;

        let session = within(
            self.config.persistence_timeout,
            self.session_repo.find_session(&token.hash()),
        )
        .await?
        .ok_or(AuthError::InvalidToken)?;

        if session.is_expired_at(now) {
            return Err(AuthError::TokenExpired);
        }

        Ok(session.user_id)
    }

    /// Idempotent
    pub async fn revoke(&self, token: &str) -> AuthResult<()> {
        let token = OpaqueToken::parse(token)?;
        within(
            self.config.persistence_timeout,
            self.session_repo.delete_session(&token.hash()),
        )
        .await
    }

    pub async fn revoke_all(&self, user_id: &UserId) -> AuthResult<u64> {
        within(
            self.config.persistence_timeout,
            self.session_repo.delete_sessions_by_user(user_id),
        )
        .await
    }

    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = within(
            self.config.persistence_timeout,
            self.session_repo.delete_expired_sessions(Utc::now()),
        )
        .await?;

        if deleted > 0 {
            tracing::info!(deleted, "Cleaned up expired sessions");
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::memory::InMemoryAuthRepository;
    use chrono::Duration;

    fn manager() -> SessionManager<InMemoryAuthRepository> {
        SessionManager::new(
            Arc::new(InMemoryAuthRepository::new()),
            Arc::new(AuthConfig::minimal_cost()),
        )
    }

    #[tokio::test]
    async fn test_create_and_resolve() {
        let sessions = manager();
        let user_id = UserId::new();

        let issued = sessions.create(&user_id, false).await.unwrap();
        assert!(issued.token.as_str().len() >= 32);
        assert_eq!(sessions.resolve(issued.token.as_str()).await.unwrap(), user_id);
    }

    #[tokio::test]
    async fn test_short_session_expires_after_24h() {
        let sessions = manager();
        let user_id = UserId::new();
        let now = Utc::now();

        let issued = sessions.create_at(&user_id, false, now).await.unwrap();
        assert_eq!(issued.expires_at, now + Duration::hours(24));

        let token = issued.token.as_str();
        let almost = now + Duration::hours(24) - Duration::seconds(1);
        assert_eq!(sessions.resolve_at(token, almost).await.unwrap(), user_id);
        assert!(matches!(
            sessions.resolve_at(token, now + Duration::hours(24)).await,
            Err(AuthError::TokenExpired)
        ));
    }

    #[tokio::test]
    async fn test_remember_me_lasts_30_days() {
        let sessions = manager();
        let now = Utc::now();

        let issued = sessions.create_at(&UserId::new(), true, now).await.unwrap();
        assert_eq!(issued.expires_at, now + Duration::days(30));
        assert!(
            sessions
                .resolve_at(issued.token.as_str(), now + Duration::days(29))
                .await
                .is_ok()
        );
    }

    #[tokio::test]
    async fn test_resolve_unknown_or_empty() {
        let sessions = manager();
        assert!(matches!(
            sessions.resolve("").await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(
            sessions.resolve("no-such-token").await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_revoke_is_idempotent() {
        let sessions = manager();
        let issued = sessions.create(&UserId::new(), false).await.unwrap();
        let token = issued.token.as_str();

        sessions.revoke(token).await.unwrap();
        sessions.revoke(token).await.unwrap();
        assert!(matches!(
            sessions.resolve(token).await,
            Err(AuthError::InvalidToken)
        ));
    }

    #[tokio::test]
    async fn test_revoke_all_only_touches_one_user() {
        let sessions = manager();
        let alice = UserId::new();
        let bob = UserId::new();

        let a1 = sessions.create(&alice, false).await.unwrap();
        let a2 = sessions.create(&alice, true).await.unwrap();
        let b1 = sessions.create(&bob, false).await.unwrap();

        assert_eq!(sessions.revoke_all(&alice).await.unwrap(), 2);
        assert!(sessions.resolve(a1.token.as_str()).await.is_err());
        assert!(sessions.resolve(a2.token.as_str()).await.is_err());
        assert_eq!(sessions.resolve(b1.token.as_str()).await.unwrap(), bob);
    }

    #[tokio::test]
    async fn test_cleanup_expired() {
        let sessions = manager();
        let long_ago = Utc::now() - Duration::days(2);

        sessions.create_at(&UserId::new(), false, long_ago).await.unwrap();
        let live = sessions.create(&UserId::new(), false).await.unwrap();

        assert_eq!(sessions.cleanup_expired().await.unwrap(), 1);
        assert!(sessions.resolve(live.token.as_str()).await.is_ok());
    }
}
