//! Application Layer
//!
//! Use cases, the session and reset token managers, and the service that
//! ties them together.

pub mod check_session;
pub mod config;
pub mod deadline;
pub mod forgot_password;
pub mod profile;
pub mod reset_password;
pub mod reset_token;
pub mod service;
pub mod session;
pub mod sign_in;
pub mod sign_out;
pub mod sign_up;

// Re-exports
pub use check_session::{CheckSessionUseCase, SessionStatus};
pub use config::AuthConfig;
pub use forgot_password::{FORGOT_PASSWORD_MESSAGE, ForgotPasswordUseCase};
pub use profile::{ProfileInput, ProfileUseCase};
pub use reset_password::{ResetPasswordInput, ResetPasswordUseCase};
pub use reset_token::ResetTokenManager;
pub use service::{AuthService, CleanupReport};
pub use session::{IssuedSession, SessionManager};
pub use sign_in::{SignInInput, SignInOutput, SignInUseCase};
pub use sign_out::SignOutUseCase;
pub use sign_up::{SignUpInput, SignUpOutput, SignUpUseCase};
