//! In-Memory Repository
//!
//! Single-process store behind one lock, for tests and embedding. The
//! server binary always runs on PostgreSQL.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::entity::{
    reset_token::ResetToken,
    session::Session,
    user::{ProfileUpdate, User},
};
use crate::domain::repository::{ResetTokenRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, token::TokenHash, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult, ConflictField};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    sessions: HashMap<TokenHash, Session>,
    reset_tokens: HashMap<TokenHash, ResetToken>,
}

/// Clones share the same data
#[derive(Clone, Default)]
pub struct InMemoryAuthRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryAuthRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn session_count(&self) -> usize {
        self.state.read().await.sessions.len()
    }

    pub async fn reset_token_count(&self) -> usize {
        self.state.read().await.reset_tokens.len()
    }
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for InMemoryAuthRepository {
    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        Ok(self.state.read().await.users.get(user_id).cloned())
    }

    async fn find_user_by_username(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|u| u.user_name == *user_name)
            .cloned())
    }

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let state = self.state.read().await;
        Ok(state.users.values().find(|u| u.email == *email).cloned())
    }

    async fn username_exists(&self, user_name: &UserName) -> AuthResult<bool> {
        let state = self.state.read().await;
        Ok(state.users.values().any(|u| u.user_name == *user_name))
    }

    async fn email_exists(&self, email: &Email, excluding: Option<&UserId>) -> AuthResult<bool> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .any(|u| u.email == *email && Some(&u.user_id) != excluding))
    }

    async fn insert_user(&self, user: &User) -> AuthResult<()> {
        let mut state = self.state.write().await;

        // Check and insert under the same write guard
        if state.users.values().any(|u| u.user_name == user.user_name) {
            return Err(AuthError::Conflict {
                field: Some(ConflictField::Username),
            });
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(AuthError::Conflict {
                field: Some(ConflictField::Email),
            });
        }

        state.users.insert(user.user_id, user.clone());
        Ok(())
    }

    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate) -> AuthResult<()> {
        let mut state = self.state.write().await;

        if let Some(email) = &update.email {
            let taken = state
                .users
                .values()
                .any(|u| u.email == *email && u.user_id != *user_id);
            if taken {
                return Err(AuthError::Conflict {
                    field: Some(ConflictField::Email),
                });
            }
        }

        let user = state.users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        user.apply(update);
        Ok(())
    }

    async fn update_password(&self, user_id: &UserId, password: &UserPassword) -> AuthResult<()> {
        let mut state = self.state.write().await;
        let user = state.users.get_mut(user_id).ok_or(AuthError::UserNotFound)?;
        user.password_hash = password.clone();
        user.updated_at = Utc::now();
        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for InMemoryAuthRepository {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        self.state
            .write()
            .await
            .sessions
            .insert(session.token_hash, session.clone());
        Ok(())
    }

    async fn find_session(&self, token_hash: &TokenHash) -> AuthResult<Option<Session>> {
        Ok(self.state.read().await.sessions.get(token_hash).cloned())
    }

    async fn delete_session(&self, token_hash: &TokenHash) -> AuthResult<()> {
        self.state.write().await.sessions.remove(token_hash);
        Ok(())
    }

    async fn delete_sessions_by_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| s.user_id != *user_id);
        Ok((before - state.sessions.len()) as u64)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.sessions.len();
        state.sessions.retain(|_, s| !s.is_expired_at(now));
        Ok((before - state.sessions.len()) as u64)
    }
}

// ============================================================================
// Reset Token Repository Implementation
// ============================================================================

impl ResetTokenRepository for InMemoryAuthRepository {
    async fn insert_reset_token(&self, token: &ResetToken) -> AuthResult<()> {
        self.state
            .write()
            .await
            .reset_tokens
            .insert(token.token_hash, token.clone());
        Ok(())
    }

    async fn take_reset_token(&self, token_hash: &TokenHash) -> AuthResult<Option<ResetToken>> {
        Ok(self.state.write().await.reset_tokens.remove(token_hash))
    }

    async fn delete_expired_reset_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let mut state = self.state.write().await;
        let before = state.reset_tokens.len();
        state.reset_tokens.retain(|_, t| !t.is_expired_at(now));
        Ok((before - state.reset_tokens.len()) as u64)
    }
}
