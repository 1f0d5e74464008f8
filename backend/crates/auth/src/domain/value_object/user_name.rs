//! User Name Value Object
//!
//! The public handle a user logs in with.
//!
//! ## Invariants
//! - Length: 3 to 50 characters
//! - ASCII letters, digits, `_` and `-` only
//! - Case-sensitive and stored exactly as given

use derive_more::Display;
use serde::Serialize;

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Constants
// ============================================================================

pub const USER_NAME_MIN_LENGTH: usize = 3;

pub const USER_NAME_MAX_LENGTH: usize = 50;

// ============================================================================
// UserName Value Object
// ============================================================================

/// Validated user name
#[derive(Debug, Clone, PartialEq, Eq, Hash, Display, Serialize)]
pub struct UserName(String);

impl UserName {
    /// Validate an already-sanitized user name
    pub fn new(input: impl Into<String>) -> AuthResult<Self> {
        let name = input.into();
        Self::validate(&name)?;
        Ok(Self(name))
    }

    /// Create from database value (assumed already validated)
    pub fn from_db(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }

    fn validate(name: &str) -> AuthResult<()> {
        if name.is_empty() {
            return Err(AuthError::invalid_input("username", "username is required"));
        }

        // All accepted characters are ASCII, so the byte count is the
        // character count for every name that can pass.
        let length = name.chars().count();
        if length < USER_NAME_MIN_LENGTH {
            return Err(AuthError::invalid_input(
                "username",
                format!("username must be at least {USER_NAME_MIN_LENGTH} characters long"),
            ));
        }
        if length > USER_NAME_MAX_LENGTH {
            return Err(AuthError::invalid_input(
                "username",
                format!("username must not exceed {USER_NAME_MAX_LENGTH} characters"),
            ));
        }

        if !name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(AuthError::invalid_input(
                "username",
                "username can only contain letters, numbers, underscores, and hyphens",
            ));
        }

        Ok(())
    }
}

impl AsRef<str> for UserName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// Tests
// ============================================================================
