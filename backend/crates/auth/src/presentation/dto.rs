//! API DTOs (Data Transfer Objects)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{SessionStatus, SignInOutput, SignUpOutput};
use crate::domain::entity::user::User;

/// `{"message": "..."}` body shared by several endpoints
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}

impl MessageResponse {
    pub fn new(message: &'static str) -> Self {
        Self { message }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// Sign up request
///
/// Missing string fields decode as empty and fail validation by name.
#[derive(Debug, Clone, Deserialize)]
pub struct SignUpRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Sign up response
#[derive(Debug, Clone, Serialize)]
pub struct SignUpResponse {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub message: &'static str,
}

impl From<SignUpOutput> for SignUpResponse {
    fn from(output: SignUpOutput) -> Self {
        Self {
            user_id: output.user_id.into_uuid(),
            username: output.user_name.into_inner(),
            email: output.email.into_inner(),
            message: "User created successfully",
        }
    }
}

// ============================================================================
// Sign In
// ============================================================================

/// Login request
#[derive(Debug, Clone, Deserialize)]
pub struct SignInRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub remember_me: bool,
}

/// Login response
#[derive(Debug, Clone, Serialize)]
pub struct SignInResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
    pub expires_at: DateTime<Utc>,
}

impl From<SignInOutput> for SignInResponse {
    fn from(output: SignInOutput) -> Self {
        Self {
            token: output.token.into_inner(),
            user_id: output.user_id.into_uuid(),
            username: output.user_name.into_inner(),
            expires_at: output.expires_at,
        }
    }
}

// ============================================================================
// Session Status
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ValidateResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<Uuid>,
}

impl From<SessionStatus> for ValidateResponse {
    fn from(status: SessionStatus) -> Self {
        Self {
            valid: status.valid,
            user_id: status.user_id.map(|id| id.into_uuid()),
        }
    }
}

// ============================================================================
// Password Reset
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
}

// ============================================================================
// Profile
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<User> for ProfileResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.user_id.into_uuid(),
            username: user.user_name.into_inner(),
            email: user.email.into_inner(),
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: user.created_at,
        }
    }
}

/// Absent fields are left unchanged
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateProfileRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}
