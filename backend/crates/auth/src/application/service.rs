//! Auth Service
//!
//! Entry point for every auth flow. Owns the shared pieces (store, rate
//! limiter, hasher, notifier, config) and builds the use case per call.
//! Rate limiting happens here, before any validation or hashing.

use std::net::IpAddr;
use std::sync::Arc;

use platform::client::rate_limit_key;
use platform::password::PasswordHasher;
use platform::rate_limit::{RateLimitConfig, RateLimitStore, SlidingWindowLimiter};

use crate::application::check_session::{CheckSessionUseCase, SessionStatus};
use crate::application::config::AuthConfig;
use crate::application::forgot_password::ForgotPasswordUseCase;
use crate::application::profile::{ProfileInput, ProfileUseCase};
use crate::application::reset_password::{ResetPasswordInput, ResetPasswordUseCase};
use crate::application::reset_token::ResetTokenManager;
use crate::application::session::SessionManager;
use crate::application::sign_in::{SignInInput, SignInOutput, SignInUseCase};
use crate::application::sign_out::SignOutUseCase;
use crate::application::sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
use crate::domain::entity::user::User;
use crate::domain::notifier::ResetNotifier;
use crate::domain::repository::AuthStore;
use crate::domain::value_object::user_id::UserId;
use crate::error::{AuthError, AuthResult};

/// Rows removed by one cleanup pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupReport {
    pub sessions: u64,
    pub reset_tokens: u64,
}

pub struct AuthService<R, L = SlidingWindowLimiter> {
    repo: Arc<R>,
    limiter: Arc<L>,
    notifier: Arc<dyn ResetNotifier>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl<R, L> Clone for AuthService<R, L> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
            limiter: Arc::clone(&self.limiter),
            notifier: Arc::clone(&self.notifier),
            hasher: self.hasher.clone(),
            config: Arc::clone(&self.config),
        }
    }
}

impl<R, L> AuthService<R, L>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    pub fn new(
        repo: Arc<R>,
        limiter: Arc<L>,
        notifier: Arc<dyn ResetNotifier>,
        config: AuthConfig,
    ) -> AuthResult<Self> {
        let hasher = config.password_hasher()?;
        Ok(Self {
            repo,
            limiter,
            notifier,
            hasher,
            config: Arc::new(config),
        })
    }

    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    pub fn sessions(&self) -> SessionManager<R> {
        SessionManager::new(self.repo.clone(), self.config.clone())
    }

    pub fn reset_tokens(&self) -> ResetTokenManager<R> {
        ResetTokenManager::new(self.repo.clone(), self.config.clone())
    }

    /// Admit one attempt of `action` from `client`. A store failure rejects.
    async fn admit(
        &self,
        action: &'static str,
        client: Option<IpAddr>,
        policy: &RateLimitConfig,
    ) -> AuthResult<()> {
        let key = rate_limit_key(action, client);
        let decision = self.limiter.check_and_record(&key, policy).await?;
        if !decision.allowed {
            return Err(AuthError::RateLimited { action });
        }
        Ok(())
    }

    // ========================================================================
    // Flows
    // ========================================================================

    pub async fn sign_up(
        &self,
        client: Option<IpAddr>,
        input: SignUpInput,
    ) -> AuthResult<SignUpOutput> {
        self.admit("signup", client, &self.config.signup_rate_limit).await?;
        SignUpUseCase::new(self.repo.clone(), self.hasher.clone(), self.config.clone())
            .execute(input)
            .await
    }

    pub async fn sign_in(
        &self,
        client: Option<IpAddr>,
        input: SignInInput,
    ) -> AuthResult<SignInOutput> {
        self.admit("login", client, &self.config.login_rate_limit).await?;
        SignInUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.hasher.clone(),
            self.config.clone(),
        )
        .execute(input)
        .await
    }

    pub async fn sign_out(&self, token: Option<&str>) -> AuthResult<()> {
        SignOutUseCase::new(self.repo.clone(), self.config.clone())
            .execute(token)
            .await
    }

    pub async fn validate(&self, token: Option<&str>) -> SessionStatus {
        CheckSessionUseCase::new(self.repo.clone(), self.config.clone())
            .execute(token)
            .await
    }

    pub async fn authenticate(&self, token: Option<&str>) -> AuthResult<UserId> {
        CheckSessionUseCase::new(self.repo.clone(), self.config.clone())
            .authenticate(token)
            .await
    }

    /// Always completes; see [`ForgotPasswordUseCase`]
    pub async fn forgot_password(&self, email: &str) {
        ForgotPasswordUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.notifier.clone(),
            self.config.clone(),
        )
        .execute(email)
        .await
    }

    pub async fn reset_password(&self, input: ResetPasswordInput) -> AuthResult<()> {
        ResetPasswordUseCase::new(
            self.repo.clone(),
            self.repo.clone(),
            self.repo.clone(),
            self.hasher.clone(),
            self.config.clone(),
        )
        .execute(input)
        .await
    }

    pub async fn profile(&self, token: Option<&str>) -> AuthResult<User> {
        let user_id = self.authenticate(token).await?;
        ProfileUseCase::new(self.repo.clone(), self.config.clone())
            .get(&user_id)
            .await
    }

    pub async fn update_profile(&self, token: Option<&str>, input: ProfileInput) -> AuthResult<()> {
        let user_id = self.authenticate(token).await?;
        ProfileUseCase::new(self.repo.clone(), self.config.clone())
            .update(&user_id, input)
            .await
    }

    /// Remove expired sessions and reset tokens. Both passes run even if
    /// the first fails; the first error is returned.
    pub async fn cleanup_expired(&self) -> AuthResult<CleanupReport> {
        let sessions = self.sessions().cleanup_expired().await;
        let reset_tokens = self.reset_tokens().cleanup_expired().await;
        Ok(CleanupReport {
            sessions: sessions?,
            reset_tokens: reset_tokens?,
        })
    }
}
