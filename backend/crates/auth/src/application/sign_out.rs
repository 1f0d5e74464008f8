//! Sign Out Use Case
//!
//! Invalidates a user session.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session::SessionManager;
use crate::domain::repository::SessionRepository;
use crate::error::{AuthError, AuthResult};

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository,
{
    sessions: SessionManager<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            sessions: SessionManager::new(session_repo, config),
        }
    }

    /// Sign out from current session. The token must still resolve.
    pub async fn execute(&self, session_token: Option<&str>) -> AuthResult<()> {
        let token = session_token.ok_or(AuthError::Unauthorized)?;

        let user_id = self
            .sessions
            .resolve(token)
            .await
            .map_err(AuthError::into_unauthorized)?;
        self.sessions.revoke(token).await?;

        tracing::info!(user_id = %user_id, "User signed out");
        Ok(())
    }
}
