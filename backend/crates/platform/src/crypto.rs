//! Cryptographic Utilities

use base64::{Engine, engine::general_purpose};
use rand::{RngCore, rngs::OsRng};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Entropy carried by every opaque token (256 bits)
pub const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("System random source unavailable: {0}")]
    Entropy(#[from] rand::Error),
}

/// Fill a buffer from the OS random source
pub fn random_bytes(len: usize) -> Result<Vec<u8>, TokenError> {
    let mut bytes = vec![0u8; len];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(bytes)
}

/// Generate an unguessable token: [`TOKEN_BYTES`] random bytes,
/// URL-safe base64 without padding (43 chars).
pub fn generate_token() -> Result<String, TokenError> {
    let bytes = random_bytes(TOKEN_BYTES)?;
    Ok(general_purpose::URL_SAFE_NO_PAD.encode(bytes))
}

/// Compute SHA-256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Decode standard base64 (configuration secrets)
pub fn from_base64(s: &str) -> Result<Vec<u8>, base64::DecodeError> {
    general_purpose::STANDARD.decode(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_values() {
        let hash = sha256(b"");
        let expected =
            hex::decode("e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);

        let hash = sha256(b"hello");
        let expected =
            hex::decode("2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824")
                .unwrap();
        assert_eq!(hash.to_vec(), expected);
    }

    #[test]
    fn test_random_bytes() {
        let bytes = random_bytes(32).unwrap();
        assert_eq!(bytes.len(), 32);
        // Statistically never all zeros
        assert!(bytes.iter().any(|&b| b != 0));
    }

    #[test]
    fn test_generate_token_shape() {
        let token = generate_token().unwrap();
        assert_eq!(token.len(), 43);
        assert!(
            token
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
        assert_eq!(
            general_purpose::URL_SAFE_NO_PAD.decode(&token).unwrap().len(),
            TOKEN_BYTES
        );
    }

    #[test]
    fn test_generate_token_unique() {
        let a = generate_token().unwrap();
        let b = generate_token().unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_from_base64() {
        assert_eq!(from_base64("aGVsbG8=").unwrap(), b"hello");
        assert!(from_base64("not base64!").is_err());
    }
}
