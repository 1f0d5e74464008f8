//! Sign Up Use Case
//!
//! Creates a new user account.

use std::sync::Arc;

use platform::password::PasswordHasher;
use platform::sanitize::sanitize;

use crate::application::config::AuthConfig;
use crate::application::deadline::{hash_password, within};
use crate::domain::entity::user::User;
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::RawPassword,
};
use crate::error::{AuthError, AuthResult, ConflictField};

/// Sign up input
pub struct SignUpInput {
    pub user_name: String,
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Sign up output
#[derive(Debug)]
pub struct SignUpOutput {
    pub user_id: UserId,
    pub user_name: UserName,
    pub email: Email,
}

/// Sign up use case
pub struct SignUpUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    hasher: PasswordHasher,
    config: Arc<AuthConfig>,
}

impl<U> SignUpUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, hasher: PasswordHasher, config: Arc<AuthConfig>) -> Self {
        Self {
            user_repo,
            hasher,
            config,
        }
    }

    pub async fn execute(&self, input: SignUpInput) -> AuthResult<SignUpOutput> {
        let limit = self.config.persistence_timeout;

        // Shape checks first, in field order
        let user_name = UserName::new(sanitize(&input.user_name))?;
        let email = Email::new(sanitize(&input.email))?;
        let password = RawPassword::new(input.password)?;
        let first_name = optional_text(input.first_name.as_deref());
        let last_name = optional_text(input.last_name.as_deref());

        if within(limit, self.user_repo.username_exists(&user_name)).await? {
            return Err(self.conflict(ConflictField::Username));
        }
        if within(limit, self.user_repo.email_exists(&email, None)).await? {
            return Err(self.conflict(ConflictField::Email));
        }

        let password_hash = hash_password(&self.hasher, password).await?;
        let user = User::new(user_name, email, password_hash, first_name, last_name);

        // A concurrent signup can still win the race; the store reports it as a conflict
        within(limit, self.user_repo.insert_user(&user))
            .await
            .map_err(|e| match e {
                AuthError::Conflict { field } => self.redact(field),
                other => other,
            })?;

        tracing::info!(
            user_id = %user.user_id,
            user_name = %user.user_name,
            "User signed up"
        );

        Ok(SignUpOutput {
            user_id: user.user_id,
            user_name: user.user_name,
            email: user.email,
        })
    }

    fn conflict(&self, field: ConflictField) -> AuthError {
        self.redact(Some(field))
    }

    fn redact(&self, field: Option<ConflictField>) -> AuthError {
        AuthError::Conflict {
            field: field.filter(|_| self.config.reveal_conflict_field),
        }
    }
}

/// Sanitized optional text; blank collapses to `None`
pub(crate) fn optional_text(raw: Option<&str>) -> Option<String> {
    raw.map(sanitize).filter(|s| !s.is_empty())
}
