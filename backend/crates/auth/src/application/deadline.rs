//! Persistence deadlines and blocking-pool offload

use std::future::Future;
use std::time::Duration;

use platform::password::PasswordHasher;

use crate::domain::value_object::user_password::{RawPassword, UserPassword};
use crate::error::{AuthError, AuthResult};

/// Run a persistence call under a deadline. On expiry the future is dropped.
pub(crate) async fn within<T, F>(limit: Duration, fut: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Timeout(limit)),
    }
}

/// Hash on the blocking pool
pub(crate) async fn hash_password(
    hasher: &PasswordHasher,
    password: RawPassword,
) -> AuthResult<UserPassword> {
    let hasher = hasher.clone();
    let clear = password.into_inner();
    let hashed = tokio::task::spawn_blocking(move || hasher.hash(&clear)).await??;
    Ok(UserPassword::from_hashed(hashed))
}

/// Verify on the blocking pool. With no stored hash a dummy verification
/// runs so the caller cannot tell "no such user" from "wrong password".
pub(crate) async fn verify_password(
    hasher: &PasswordHasher,
    password: RawPassword,
    stored: Option<&UserPassword>,
) -> AuthResult<bool> {
    let hasher = hasher.clone();
    let clear = password.into_inner();
    let stored = stored.map(|p| p.as_hashed().clone());
    let verified = tokio::task::spawn_blocking(move || match stored {
        Some(hash) => hasher.verify(&clear, &hash),
        None => hasher.verify_dummy(&clear),
    })
    .await?;
    Ok(verified)
}
