//! Session Entity
//!
//! A bearer session. Stored under the hash of its token; TTL is decided by
//! the application layer, not here.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{token::TokenHash, user_id::UserId};

#[derive(Debug, Clone)]
pub struct Session {
    pub token_hash: TokenHash,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub remember_me: bool,
    pub created_at: DateTime<Utc>,
}

impl Session {
    pub fn new(
        token_hash: TokenHash,
        user_id: UserId,
        remember_me: bool,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            token_hash,
            user_id,
            expires_at: now + ttl,
            remember_me,
            created_at: now,
        }
    }

    /// Valid strictly before `expires_at`
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
