//! Reset delivery seam
//!
//! How a reset token reaches its owner (mail, queue, log) is outside this
//! crate. The service hands over the plaintext token exactly once.

use crate::domain::entity::user::User;
use crate::domain::value_object::token::OpaqueToken;

pub trait ResetNotifier: Send + Sync {
    /// Deliver a freshly issued reset token. Must not block on network I/O;
    /// queue the work instead.
    fn send_reset(&self, user: &User, token: &OpaqueToken);
}
