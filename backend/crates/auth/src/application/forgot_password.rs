//! Forgot Password Use Case
//!
//! Starts a password reset. The outcome is invisible to the caller: known
//! address, unknown address, malformed address and internal failure all
//! return normally, and every path generates one token.

use std::sync::Arc;

use platform::sanitize::sanitize;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::application::reset_token::ResetTokenManager;
use crate::domain::notifier::ResetNotifier;
use crate::domain::repository::{ResetTokenRepository, UserRepository};
use crate::domain::value_object::{email::Email, token::OpaqueToken};
use crate::error::AuthResult;

/// Message returned for every forgot-password request
pub const FORGOT_PASSWORD_MESSAGE: &str =
    "If the email exists, a password reset link has been sent";

pub struct ForgotPasswordUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    user_repo: Arc<U>,
    resets: ResetTokenManager<T>,
    notifier: Arc<dyn ResetNotifier>,
    config: Arc<AuthConfig>,
}

impl<U, T> ForgotPasswordUseCase<U, T>
where
    U: UserRepository,
    T: ResetTokenRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        reset_repo: Arc<T>,
        notifier: Arc<dyn ResetNotifier>,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            resets: ResetTokenManager::new(reset_repo, config.clone()),
            notifier,
            config,
        }
    }

    pub async fn execute(&self, email: &str) {
        if let Err(e) = self.try_execute(email).await {
            tracing::error!(error = %e, "Password reset request failed");
        }
    }

    async fn try_execute(&self, email: &str) -> AuthResult<()> {
        let email = match Email::new(sanitize(email)) {
            Ok(email) => email,
            Err(_) => {
                tracing::debug!("Password reset requested for malformed email");
                return discard_token();
            }
        };

        let user = within(
            self.config.persistence_timeout,
            self.user_repo.find_user_by_email(&email),
        )
        .await?;

        let Some(user) = user else {
            tracing::debug!("Password reset requested for unknown email");
            return discard_token();
        };

        let token = self.resets.issue(&user.user_id).await?;
        self.notifier.send_reset(&user, &token);

        tracing::info!(user_id = %user.user_id, "Password reset token issued");
        Ok(())
    }
}

/// Same entropy cost as a real issue, nothing stored
fn discard_token() -> AuthResult<()> {
    OpaqueToken::generate().map(drop)
}
