//! Password Reset Token Entity

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::{token::TokenHash, user_id::UserId};

/// Single-use reset grant, removed from storage when consumed
#[derive(Debug, Clone)]
pub struct ResetToken {
    pub token_hash: TokenHash,
    pub user_id: UserId,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

impl ResetToken {
    pub fn new(token_hash: TokenHash, user_id: UserId, ttl: Duration, now: DateTime<Utc>) -> Self {
        Self {
            token_hash,
            user_id,
            expires_at: now + ttl,
            created_at: now,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}
