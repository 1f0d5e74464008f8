//! Reset Password Use Case
//!
//! Redeems a reset token, replaces the password and signs the user out
//! everywhere.

use std::sync::Arc;

use platform::password::PasswordHasher;

use crate::application::config::AuthConfig;
use crate::application::deadline::{hash_password, within};
use crate::application::reset_token::ResetTokenManager;
use crate::application::session::SessionManager;
use crate::domain::repository::{ResetTokenRepository, SessionRepository, UserRepository};
use crate::domain::value_object::user_password::RawPassword;
use crate::error::AuthResult;

pub struct ResetPasswordInput {
    pub token: String,
    pub password: String,
}

pub struct ResetPasswordUseCase<U, S, T>
where
    U: UserRepository,
    S: SessionRepository,
    T: ResetTokenRepository,
{
    user_repo: Arc<U>,
    sessions: SessionManager<S>,
    resets: ResetTokenManager<T>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl<U, S, T> ResetPasswordUseCase<U, S, T>
where
    U: UserRepository,
    S: SessionRepository,
    T: ResetTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        reset_repo: Arc<T>,
        hasher: PasswordHasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            sessions: SessionManager::new(session_repo, config.clone()),
            resets: ResetTokenManager::new(reset_repo, config.clone()),
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: ResetPasswordInput) -> AuthResult<()> {
        // Policy first: a weak password must not burn the token
        let password = RawPassword::new(input.password)?;
        let user_id = self.resets.consume(&input.token).await?;

        let password_hash = hash_password(&self.hasher, password).await?;
        within(
            self.config.persistence_timeout,
            self.user_repo.update_password(&user_id, &password_hash),
        )
        .await?;

        // The password has already changed; a failed revoke must not undo that
        match self.sessions.revoke_all(&user_id).await {
            Ok(revoked) => {
                tracing::info!(user_id = %user_id, revoked, "Password reset, sessions revoked");
            }
            Err(e) => {
                tracing::warn!(
                    user_id = %user_id,
                    error = %e,
                    "Password reset, session revocation failed"
                );
            }
        }

        Ok(())
    }
}
