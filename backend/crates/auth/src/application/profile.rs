//! Profile Use Case
//!
//! Read and partially update the caller's own profile.

use std::sync::Arc;

use platform::sanitize::sanitize;

use crate::application::config::AuthConfig;
use crate::application::deadline::within;
use crate::application::sign_up::optional_text;
use crate::domain::entity::user::{ProfileUpdate, User};
use crate::domain::repository::UserRepository;
use crate::domain::value_object::{email::Email, user_id::UserId};
use crate::error::{AuthError, AuthResult, ConflictField};

/// Requested changes. Absent or blank fields stay as they are.
#[derive(Debug, Default)]
pub struct ProfileInput {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

pub struct ProfileUseCase<U>
where
    U: UserRepository,
{
    user_repo: Arc<U>,
    config: Arc<AuthConfig>,
}

impl<U> ProfileUseCase<U>
where
    U: UserRepository,
{
    pub fn new(user_repo: Arc<U>, config: Arc<AuthConfig>) -> Self {
        Self { user_repo, config }
    }

    pub async fn get(&self, user_id: &UserId) -> AuthResult<User> {
        within(
            self.config.persistence_timeout,
            self.user_repo.find_user_by_id(user_id),
        )
        .await?
        .ok_or(AuthError::UserNotFound)
    }

    pub async fn update(&self, user_id: &UserId, input: ProfileInput) -> AuthResult<()> {
        let limit = self.config.persistence_timeout;

        let email = match input.email.as_deref().map(sanitize) {
            Some(raw) if !raw.is_empty() => Some(Email::new(raw)?),
            _ => None,
        };

        let update = ProfileUpdate {
            email,
            first_name: optional_text(input.first_name.as_deref()),
            last_name: optional_text(input.last_name.as_deref()),
        };

        if update.is_empty() {
            return Ok(());
        }

        if let Some(email) = &update.email {
            if within(limit, self.user_repo.email_exists(email, Some(user_id))).await? {
                return Err(AuthError::Conflict {
                    field: Some(ConflictField::Email),
                });
            }
        }

        within(limit, self.user_repo.update_profile(user_id, &update)).await?;

        tracing::info!(
            user_id = %user_id,
            email_changed = update.email.is_some(),
            "Profile updated"
        );
        Ok(())
    }
}
