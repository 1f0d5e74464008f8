//! User Entity
//!
//! Account record: credentials plus the small profile the service owns.

use chrono::{DateTime, Utc};

use crate::domain::value_object::{
    email::Email, user_id::UserId, user_name::UserName, user_password::UserPassword,
};

/// User entity
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: UserId,
    /// Unique, case-sensitive login handle
    pub user_name: UserName,
    /// Unique, case-sensitive
    pub email: Email,
    pub password_hash: UserPassword,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(
        user_name: UserName,
        email: Email,
        password_hash: UserPassword,
        first_name: Option<String>,
        last_name: Option<String>,
    ) -> Self {
        let now = Utc::now();

        Self {
            user_id: UserId::new(),
            user_name,
            email,
            password_hash,
            first_name,
            last_name,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in memory (the in-memory store uses this)
    pub fn apply(&mut self, update: &ProfileUpdate) {
        if let Some(email) = &update.email {
            self.email = email.clone();
        }
        if let Some(first_name) = &update.first_name {
            self.first_name = Some(first_name.clone());
        }
        if let Some(last_name) = &update.last_name {
            self.last_name = Some(last_name.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// Partial profile update. `None` leaves the column untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub email: Option<Email>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl ProfileUpdate {
    pub fn is_empty(&self) -> bool {
        self.email.is_none() && self.first_name.is_none() && self.last_name.is_none()
    }
}
