//! Opaque Token Value Objects
//!
//! Session and reset tokens are random strings handed to the client. Storage
//! only ever sees their SHA-256 digest, so a leaked table cannot be replayed.

use std::fmt;

use platform::crypto::{generate_token, sha256};

use crate::error::{AuthError, AuthResult};

/// Plaintext token as issued to (or presented by) a client
#[derive(Clone, PartialEq, Eq)]
pub struct OpaqueToken(String);

impl OpaqueToken {
    /// 32 random bytes, URL-safe base64
    pub fn generate() -> AuthResult<Self> {
        Ok(Self(generate_token()?))
    }

    /// Accept a presented token. Only emptiness is rejected here;
    /// anything else is simply looked up.
    pub fn parse(raw: impl Into<String>) -> AuthResult<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            return Err(AuthError::InvalidToken);
        }
        Ok(Self(raw))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }

    pub fn hash(&self) -> TokenHash {
        TokenHash(sha256(self.0.as_bytes()))
    }
}

impl fmt::Debug for OpaqueToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("OpaqueToken").field(&"[REDACTED]").finish()
    }
}

/// SHA-256 digest of an [`OpaqueToken`], the storage key
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct TokenHash([u8; 32]);

impl TokenHash {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// From a database column. `None` if the length is wrong.
    pub fn from_slice(bytes: &[u8]) -> Option<Self> {
        <[u8; 32]>::try_from(bytes).ok().map(Self)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for TokenHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Prefix is enough to correlate log lines
        write!(
            f,
            "TokenHash({:02x}{:02x}{:02x}{:02x}..)",
            self.0[0], self.0[1], self.0[2], self.0[3]
        )
    }
}
