//! Sign In Use Case
//!
//! Authenticates a user and creates a session. Unknown user, malformed
//! user name and wrong password all end in the same `InvalidCredentials`,
//! and all pay for one Argon2 verification.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use platform::password::PasswordHasher;
use platform::sanitize::sanitize;

use crate::application::config::AuthConfig;
use crate::application::deadline::{verify_password, within};
use crate::application::session::SessionManager;
use crate::domain::repository::{SessionRepository, UserRepository};
use crate::domain::value_object::{
    token::OpaqueToken, user_id::UserId, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult};

/// Sign in input
pub struct SignInInput {
    pub user_name: String,
    pub password: String,
    pub remember_me: bool,
}

/// Sign in output
#[derive(Debug)]
pub struct SignInOutput {
    pub token: OpaqueToken,
    pub user_id: UserId,
    pub user_name: UserName,
    pub expires_at: DateTime<Utc>,
}

/// Sign in use case
pub struct SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    user_repo: Arc<U>,
    sessions: SessionManager<S>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl<U, S> SignInUseCase<U, S>
where
    U: UserRepository,
    S: SessionRepository,
{
    pub fn new(
        user_repo: Arc<U>,
        session_repo: Arc<S>,
        hasher: PasswordHasher,
        config: Arc<AuthConfig>,
    ) -> Self {
        Self {
            user_repo,
            sessions: SessionManager::new(session_repo, config.clone()),
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: SignInInput) -> AuthResult<SignInOutput> {
        let password = RawPassword::for_verification(input.password);

        // A name that fails the shape check cannot exist; skip the lookup
        let user = match UserName::new(sanitize(&input.user_name)) {
            Ok(user_name) => {
                within(
                    self.config.persistence_timeout,
                    self.user_repo.find_user_by_username(&user_name),
                )
                .await?
            }
            Err(_) => None,
        };

        let verified =
            verify_password(&self.hasher, password, user.as_ref().map(|u| &u.password_hash))
                .await?;

        let user = match user {
            Some(user) if verified => user,
            _ => return Err(AuthError::InvalidCredentials),
        };

        let issued = self.sessions.create(&user.user_id, input.remember_me).await?;

        tracing::info!(
            user_id = %user.user_id,
            remember_me = input.remember_me,
            "User signed in"
        );

        Ok(SignInOutput {
            token: issued.token,
            user_id: user.user_id,
            user_name: user.user_name,
            expires_at: issued.expires_at,
        })
    }
}
