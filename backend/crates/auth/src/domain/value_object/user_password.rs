//! User Password Value Object
//!
//! Domain wrappers over `platform::password`. Hashing itself needs the
//! configured [`PasswordHasher`](platform::password::PasswordHasher) and
//! lives in the application layer.

use std::fmt;

use platform::password::{ClearTextPassword, HashedPassword, check_strength};

use crate::error::{AuthError, AuthResult};

// ============================================================================
// Raw Password (User Input)
// ============================================================================

/// Raw password from user input, zeroized on drop
pub struct RawPassword(ClearTextPassword);

impl RawPassword {
    /// New password being set (signup, reset). Applies the strength policy.
    pub fn new(raw: String) -> AuthResult<Self> {
        check_strength(&raw)?;
        Ok(Self(ClearTextPassword::new(raw)))
    }

    /// Password presented at login. Only compared, never policy-checked,
    /// so a policy change cannot lock out existing accounts.
    pub fn for_verification(raw: String) -> Self {
        Self(ClearTextPassword::new(raw))
    }

    pub(crate) fn into_inner(self) -> ClearTextPassword {
        self.0
    }
}

impl fmt::Debug for RawPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RawPassword").field(&"[REDACTED]").finish()
    }
}

// ============================================================================
// User Password (Hashed, for storage)
// ============================================================================

/// Stored password hash (Argon2id PHC string)
#[derive(Clone, PartialEq, Eq)]
pub struct UserPassword(HashedPassword);

impl UserPassword {
    pub fn from_hashed(hashed: HashedPassword) -> Self {
        Self(hashed)
    }

    /// Create from PHC string (from database)
    pub fn from_db(phc_string: impl Into<String>) -> AuthResult<Self> {
        HashedPassword::from_phc_string(phc_string)
            .map(Self)
            .map_err(|_| AuthError::Internal("Invalid password hash in database".to_string()))
    }

    pub fn as_phc_string(&self) -> &str {
        self.0.as_phc_string()
    }

    pub(crate) fn as_hashed(&self) -> &HashedPassword {
        &self.0
    }
}

impl fmt::Debug for UserPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
