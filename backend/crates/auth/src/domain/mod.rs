//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod notifier;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{reset_token::ResetToken, session::Session, user::User};
pub use notifier::ResetNotifier;
pub use repository::{AuthStore, ResetTokenRepository, SessionRepository, UserRepository};
