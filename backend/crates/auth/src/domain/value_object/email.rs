//! Email Value Object
//!
//! Shape check only. Case is preserved: two addresses differing only in
//! case are different accounts.

use std::sync::LazyLock;

use derive_more::Display;
use regex::Regex;
use serde::Serialize;

use crate::error::{AuthError, AuthResult};

/// Maximum email length (per RFC 5321)
pub const EMAIL_MAX_LENGTH: usize = 254;

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+\-]+@[a-zA-Z0-9.\-]+\.[a-zA-Z]{2,}$")
        .expect("email pattern is a valid regex")
});

/// Email address value object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
pub struct Email(String);

impl Email {
    /// Validate an already-sanitized address
    pub fn new(email: impl Into<String>) -> AuthResult<Self> {
        let email = email.into();

        if email.is_empty() {
            return Err(AuthError::invalid_input("email", "email is required"));
        }
        if !EMAIL_PATTERN.is_match(&email) {
            return Err(AuthError::invalid_input("email", "invalid email format"));
        }
        if email.len() > EMAIL_MAX_LENGTH {
            return Err(AuthError::invalid_input("email", "email too long"));
        }

        Ok(Self(email))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(email: impl Into<String>) -> Self {
        Self(email.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
