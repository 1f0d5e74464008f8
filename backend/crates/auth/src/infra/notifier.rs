//! Reset Notifiers

use crate::domain::entity::user::User;
use crate::domain::notifier::ResetNotifier;
use crate::domain::value_object::token::OpaqueToken;

/// Writes the reset link to the log instead of sending mail.
/// Meant for development; the link grants a password change.
#[derive(Debug, Clone)]
pub struct LogResetNotifier {
    reset_link_base: String,
}

impl LogResetNotifier {
    /// `reset_link_base` is the URL the token is appended to,
    /// e.g. `https://app.example.com/reset-password?token=`
    pub fn new(reset_link_base: impl Into<String>) -> Self {
        Self {
            reset_link_base: reset_link_base.into(),
        }
    }

    pub fn reset_link(&self, token: &OpaqueToken) -> String {
        format!("{}{}", self.reset_link_base, token.as_str())
    }
}

impl ResetNotifier for LogResetNotifier {
    fn send_reset(&self, user: &User, token: &OpaqueToken) {
        tracing::info!(
            user_id = %user.user_id,
            email = %user.email,
            link = %self.reset_link(token),
            "Password reset link"
        );
    }
}

/// Drops every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResetNotifier;

impl ResetNotifier for NoopResetNotifier {
    fn send_reset(&self, _user: &User, _token: &OpaqueToken) {}
}
