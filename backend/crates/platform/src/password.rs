//! Password Hashing and Verification
//!
//! - Argon2id hashing with a configurable work factor (OWASP profile by default)
//! - Zeroization of clear text
//! - Optional application-wide pepper
//! - A strength policy checked before anything is hashed
//!
//! Hashing is CPU and memory heavy. Async callers should run
//! [`PasswordHasher::hash`] and [`PasswordHasher::verify`] on the blocking pool.

use std::fmt;
use std::sync::{Arc, OnceLock};

use argon2::{
    Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version,
    password_hash::SaltString,
};
use rand::rngs::OsRng;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

// ============================================================================
// Constants
// ============================================================================

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const MAX_PASSWORD_LENGTH: usize = 128;

/// At least one of these must appear in a password
pub const SPECIAL_CHARACTERS: &str = "!@#$%^&*(),.?\":{}|<>";

// ============================================================================
// Error Types
// ============================================================================

/// Password policy violations, one per rule
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PasswordPolicyError {
    #[error("password must be at least {min} characters long")]
    TooShort { min: usize, actual: usize },

    #[error("password must not exceed {max} characters")]
    TooLong { max: usize, actual: usize },

    #[error("password must contain at least one uppercase letter")]
    MissingUppercase,

    #[error("password must contain at least one lowercase letter")]
    MissingLowercase,

    #[error("password must contain at least one number")]
    MissingDigit,

    #[error("password must contain at least one special character")]
    MissingSpecial,
}

/// Password hashing/verification errors
#[derive(Debug, Error)]
pub enum PasswordHashError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),

    #[error("Invalid hashing parameters: {0}")]
    InvalidParams(String),

    #[error("Invalid password hash format")]
    InvalidHashFormat,
}

// ============================================================================
// Strength policy
// ============================================================================

/// Check a candidate password against the strength policy
///
/// Length is counted in UTF-8 bytes. The rules are checked in order and the
/// first violation is reported.
///
/// ```rust
/// use platform::password::{check_strength, PasswordPolicyError};
///
/// assert!(check_strength("Str0ng!Pass").is_ok());
/// assert_eq!(check_strength("Str0ngPass"), Err(PasswordPolicyError::MissingSpecial));
/// ```
pub fn check_strength(raw: &str) -> Result<(), PasswordPolicyError> {
    let length = raw.len();

    if length < MIN_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooShort {
            min: MIN_PASSWORD_LENGTH,
            actual: length,
        });
    }
    if length > MAX_PASSWORD_LENGTH {
        return Err(PasswordPolicyError::TooLong {
            max: MAX_PASSWORD_LENGTH,
            actual: length,
        });
    }
    if !raw.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(PasswordPolicyError::MissingUppercase);
    }
    if !raw.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(PasswordPolicyError::MissingLowercase);
    }
    if !raw.chars().any(|c| c.is_ascii_digit()) {
        return Err(PasswordPolicyError::MissingDigit);
    }
    if !raw.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        return Err(PasswordPolicyError::MissingSpecial);
    }

    Ok(())
}

// ============================================================================
// Clear Text Password (Zeroized on drop)
// ============================================================================

/// Clear text password, zeroized on drop
///
/// Not `Clone`, Debug output is redacted. Construction applies no policy;
/// run [`check_strength`] first where the policy matters (signup, reset).
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct ClearTextPassword(String);

impl ClearTextPassword {
    pub fn new(raw: String) -> Self {
        Self(raw)
    }

    pub(crate) fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ClearTextPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ClearTextPassword")
            .field(&"[REDACTED]")
            .finish()
    }
}

// ============================================================================
// Hashed Password (Safe to store)
// ============================================================================

/// Hashed password in PHC string format
///
/// The PHC string carries algorithm, version, parameters and salt, so a hash
/// produced under one work factor still verifies after the factor changes.
#[derive(Clone, PartialEq, Eq)]
pub struct HashedPassword {
    hash: String,
}

impl HashedPassword {
    /// Create from PHC string (e.g., from database)
    pub fn from_phc_string(s: impl Into<String>) -> Result<Self, PasswordHashError> {
        let hash = s.into();
        PasswordHash::new(&hash).map_err(|_| PasswordHashError::InvalidHashFormat)?;
        Ok(Self { hash })
    }

    pub fn as_phc_string(&self) -> &str {
        &self.hash
    }
}

impl fmt::Debug for HashedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HashedPassword")
            .field("hash", &"[HASH]")
            .finish()
    }
}

// ============================================================================
// Hasher
// ============================================================================

/// Argon2id work factor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HasherConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for HasherConfig {
    /// OWASP recommended: m=19456 (19 MiB), t=2, p=1
    fn default() -> Self {
        Self {
            memory_kib: 19_456,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl HasherConfig {
    /// Cheapest parameters Argon2 accepts. Tests only.
    pub fn minimal_cost() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

/// Argon2id password hasher
///
/// Cheap to clone; clones share the lazily built dummy hash used by
/// [`PasswordHasher::verify_dummy`].
///
/// ```rust
/// use platform::password::{ClearTextPassword, HasherConfig, PasswordHasher};
///
/// let hasher = PasswordHasher::new(HasherConfig::minimal_cost(), None).unwrap();
/// let password = ClearTextPassword::new("Str0ng!Pass".to_string());
/// let hashed = hasher.hash(&password).unwrap();
/// assert!(hasher.verify(&password, &hashed));
/// ```
#[derive(Clone)]
pub struct PasswordHasher {
    params: Params,
    pepper: Option<Arc<[u8]>>,
    dummy: Arc<OnceLock<HashedPassword>>,
}

impl PasswordHasher {
    pub fn new(config: HasherConfig, pepper: Option<Vec<u8>>) -> Result<Self, PasswordHashError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| PasswordHashError::InvalidParams(e.to_string()))?;

        Ok(Self {
            params,
            pepper: pepper.map(Arc::from),
            dummy: Arc::new(OnceLock::new()),
        })
    }

    fn engine(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }

    /// Password bytes with the pepper appended
    fn peppered(&self, password: &ClearTextPassword) -> Zeroizing<Vec<u8>> {
        let mut bytes = Zeroizing::new(password.as_bytes().to_vec());
        if let Some(pepper) = &self.pepper {
            bytes.extend_from_slice(pepper);
        }
        bytes
    }

    /// Hash with a fresh 16-byte salt
    pub fn hash(&self, password: &ClearTextPassword) -> Result<HashedPassword, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .engine()
            .hash_password(&self.peppered(password), &salt)
            .map_err(|e| PasswordHashError::HashingFailed(e.to_string()))?;

        Ok(HashedPassword {
            hash: hash.to_string(),
        })
    }

    /// Constant-time verification. False on mismatch or an unparseable hash.
    pub fn verify(&self, password: &ClearTextPassword, hashed: &HashedPassword) -> bool {
        let Ok(parsed) = PasswordHash::new(&hashed.hash) else {
            return false;
        };
        // Parameters come from the PHC string, not from self.params
        self.engine()
            .verify_password(&self.peppered(password), &parsed)
            .is_ok()
    }

    /// Spend the same effort as [`verify`](Self::verify) when there is no
    /// stored hash to check against. Always returns false.
    pub fn verify_dummy(&self, password: &ClearTextPassword) -> bool {
        let dummy = match self.dummy.get() {
            Some(hash) => hash,
            None => {
                let throwaway = ClearTextPassword::new("dummy-password-never-matches".into());
                match self.hash(&throwaway) {
                    Ok(hash) => self.dummy.get_or_init(|| hash),
                    Err(_) => return false,
                }
            }
        };
        let _ = self.verify(password, dummy);
        false
    }
}

impl fmt::Debug for PasswordHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordHasher")
            .field("params", &self.params)
            .field("pepper", &self.pepper.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
