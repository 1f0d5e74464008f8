//! HTTP Handlers

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;

use platform::rate_limit::RateLimitStore;

use crate::application::{
    AuthService, FORGOT_PASSWORD_MESSAGE, ProfileInput, ResetPasswordInput, SignInInput,
    SignUpInput,
};
use crate::domain::repository::AuthStore;
use crate::error::AuthResult;
use crate::presentation::dto::{
    ForgotPasswordRequest, MessageResponse, ProfileResponse, ResetPasswordRequest, SignInRequest,
    SignInResponse, SignUpRequest, SignUpResponse, UpdateProfileRequest, ValidateResponse,
};
use crate::presentation::extract::{ApiJson, BearerToken, ClientIp};

/// Shared state for auth handlers
pub struct AuthAppState<R, L> {
    pub service: AuthService<R, L>,
}

impl<R, L> Clone for AuthAppState<R, L> {
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
        }
    }
}

// ============================================================================
// Sign Up
// ============================================================================

/// POST /api/auth/signup
pub async fn sign_up<R, L>(
    State(state): State<AuthAppState<R, L>>,
    ClientIp(client): ClientIp,
    ApiJson(req): ApiJson<SignUpRequest>,
) -> AuthResult<(StatusCode, Json<SignUpResponse>)>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let input = SignUpInput {
        user_name: req.username,
        email: req.email,
        password: req.password,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    let output = state.service.sign_up(client, input).await?;

    Ok((StatusCode::CREATED, Json(output.into())))
}

// ============================================================================
// Sign In / Sign Out
// ============================================================================

/// POST /api/auth/login
pub async fn sign_in<R, L>(
    State(state): State<AuthAppState<R, L>>,
    ClientIp(client): ClientIp,
    ApiJson(req): ApiJson<SignInRequest>,
) -> AuthResult<Json<SignInResponse>>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let input = SignInInput {
        user_name: req.username,
        password: req.password,
        remember_me: req.remember_me,
    };

    let output = state.service.sign_in(client, input).await?;

    Ok(Json(output.into()))
}

/// POST /api/auth/logout
pub async fn sign_out<R, L>(
    State(state): State<AuthAppState<R, L>>,
    token: BearerToken,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    state.service.sign_out(token.as_deref()).await?;
    Ok(Json(MessageResponse::new("Logged out successfully")))
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/validate
///
/// Always 200; an unusable token is reported as `{"valid": false}`.
pub async fn validate<R, L>(
    State(state): State<AuthAppState<R, L>>,
    token: BearerToken,
) -> Json<ValidateResponse>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let status = state.service.validate(token.as_deref()).await;
    Json(status.into())
}

// ============================================================================
// Password Reset
// ============================================================================

/// POST /api/auth/forgot-password
pub async fn forgot_password<R, L>(
    State(state): State<AuthAppState<R, L>>,
    ApiJson(req): ApiJson<ForgotPasswordRequest>,
) -> Json<MessageResponse>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    state.service.forgot_password(&req.email).await;
    Json(MessageResponse::new(FORGOT_PASSWORD_MESSAGE))
}

/// POST /api/auth/reset-password
pub async fn reset_password<R, L>(
    State(state): State<AuthAppState<R, L>>,
    ApiJson(req): ApiJson<ResetPasswordRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let input = ResetPasswordInput {
        token: req.token,
        password: req.password,
    };

    state.service.reset_password(input).await?;

    Ok(Json(MessageResponse::new("Password reset successful")))
}

// ============================================================================
// Profile (requires authentication)
// ============================================================================

/// GET /api/auth/profile
pub async fn get_profile<R, L>(
    State(state): State<AuthAppState<R, L>>,
    token: BearerToken,
) -> AuthResult<Json<ProfileResponse>>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let user = state.service.profile(token.as_deref()).await?;
    Ok(Json(user.into()))
}

/// PUT /api/auth/profile
pub async fn update_profile<R, L>(
    State(state): State<AuthAppState<R, L>>,
    token: BearerToken,
    ApiJson(req): ApiJson<UpdateProfileRequest>,
) -> AuthResult<Json<MessageResponse>>
where
    R: AuthStore,
    L: RateLimitStore + Send + Sync + 'static,
{
    let input = ProfileInput {
        email: req.email,
        first_name: req.first_name,
        last_name: req.last_name,
    };

    state.service.update_profile(token.as_deref(), input).await?;

    Ok(Json(MessageResponse::new("Profile updated successfully")))
}
