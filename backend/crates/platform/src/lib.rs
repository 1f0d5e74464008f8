//! Platform Crate - Technical Infrastructure
//!
//! Shared technical building blocks with no business rules:
//! - Cryptographic utilities (random tokens, SHA-256, constant-time compare)
//! - Password hashing (Argon2id) and the password strength policy
//! - Free-text sanitizing
//! - Rate limiting (policy, store trait, sliding-window implementation)
//! - Client identification from HTTP headers

pub mod client;
pub mod crypto;
pub mod password;
pub mod rate_limit;
pub mod sanitize;
