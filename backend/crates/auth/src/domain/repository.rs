//! Repository Traits
//!
//! Interfaces for data persistence. Implementations live in the
//! infrastructure layer.

use chrono::{DateTime, Utc};

use crate::domain::entity::{
    reset_token::ResetToken,
    session::Session,
    user::{ProfileUpdate, User},
};
use crate::domain::value_object::{
    email::Email, token::TokenHash, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};
use crate::error::AuthResult;

/// User repository trait
#[trait_variant::make(UserRepository: Send)]
pub trait LocalUserRepository {
    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>>;

    async fn find_user_by_username(&self, user_name: &UserName) -> AuthResult<Option<User>>;

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>>;

    async fn username_exists(&self, user_name: &UserName) -> AuthResult<bool>;

    /// `excluding` skips one account (the caller's own, on profile update)
    async fn email_exists(&self, email: &Email, excluding: Option<&UserId>) -> AuthResult<bool>;

    /// Insert a new user. A uniqueness violation is `AuthError::Conflict`.
    async fn insert_user(&self, user: &User) -> AuthResult<()>;

    /// Apply a partial update. `AuthError::UserNotFound` if the user is gone.
    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate) -> AuthResult<()>;

    async fn update_password(&self, user_id: &UserId, password: &UserPassword) -> AuthResult<()>;
}

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    async fn insert_session(&self, session: &Session) -> AuthResult<()>;

    /// Lookup by hash. Expiry is checked by the caller.
    async fn find_session(&self, token_hash: &TokenHash) -> AuthResult<Option<Session>>;

    /// Idempotent
    async fn delete_session(&self, token_hash: &TokenHash) -> AuthResult<()>;

    async fn delete_sessions_by_user(&self, user_id: &UserId) -> AuthResult<u64>;

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Password reset token repository trait
#[trait_variant::make(ResetTokenRepository: Send)]
pub trait LocalResetTokenRepository {
    async fn insert_reset_token(&self, token: &ResetToken) -> AuthResult<()>;

    /// Find and delete in one atomic step. Of two concurrent callers
    /// presenting the same token, at most one receives it.
    async fn take_reset_token(&self, token_hash: &TokenHash) -> AuthResult<Option<ResetToken>>;

    async fn delete_expired_reset_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Everything the auth service persists, in one store
pub trait AuthStore:
    UserRepository + SessionRepository + ResetTokenRepository + Send + Sync + 'static
{
}

impl<T> AuthStore for T where
    T: UserRepository + SessionRepository + ResetTokenRepository + Send + Sync + 'static
{
}
