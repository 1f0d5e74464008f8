//! Check Session Use Case
//!
//! Verifies a bearer token for the validate endpoint and for routes that
//! need an authenticated caller.

use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::application::session::SessionManager;
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Session status output
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionStatus {
    pub valid: bool,
    pub user_id: Option<UserId>,
}

impl SessionStatus {
    fn invalid() -> Self {
        Self {
            valid: false,
            user_id: None,
        }
    }
}

/// Check session use case
pub struct CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    sessions: SessionManager<S>,
}

impl<S> CheckSessionUseCase<S>
where
    S: SessionRepository,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            sessions: SessionManager::new(session_repo, config),
        }
    }

    /// Never fails: every problem reads as an invalid session
    pub async fn execute(&self, session_token: Option<&str>) -> SessionStatus {
        match self.authenticate(session_token).await {
            Ok(user_id) => SessionStatus {
                valid: true,
                user_id: Some(user_id),
            },
            Err(AuthError::Unauthorized) => SessionStatus::invalid(),
            Err(e) => {
                tracing::error!(error = %e, "Session validation failed");
                SessionStatus::invalid()
            }
        }
    }

    /// Owner of the presented session, or `Unauthorized`
    pub async fn authenticate(&self, session_token: Option<&str>) -> AuthResult<UserId> {
        let token = session_token.ok_or(AuthError::Unauthorized)?;
        self.sessions
            .resolve(token)
            .await
            .map_err(AuthError::into_unauthorized)
    }
}
