//! End-to-end flows over the in-memory store

use std::net::IpAddr;
use std::sync::{Arc, Mutex};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use chrono::{Duration, Utc};
use platform::rate_limit::SlidingWindowLimiter;
use serde_json::{Value, json};
use tower::ServiceExt;

use crate::application::{
    AuthConfig, AuthService, FORGOT_PASSWORD_MESSAGE, ProfileInput, ResetPasswordInput,
    SignInInput, SignUpInput,
};
use crate::domain::entity::user::User;
use crate::domain::notifier::ResetNotifier;
use crate::domain::value_object::{token::OpaqueToken, user_id::UserId};
use crate::error::{AuthError, ConflictField};
use crate::infra::memory::InMemoryAuthRepository;
use crate::presentation::router::auth_routes;

const PASSWORD: &str = "Password1!";

/// Keeps every token it is handed
#[derive(Default)]
struct CapturingNotifier {
    sent: Mutex<Vec<(UserId, String)>>,
}

impl CapturingNotifier {
    fn last_token(&self) -> Option<String> {
        self.sent.lock().unwrap().last().map(|(_, t)| t.clone())
    }

    fn count(&self) -> usize {
        self.sent.lock().unwrap().len()
    }
}

impl ResetNotifier for CapturingNotifier {
    fn send_reset(&self, user: &User, token: &OpaqueToken) {
        self.sent
            .lock()
            .unwrap()
            .push((user.user_id, token.as_str().to_string()));
    }
}

struct Harness {
    service: AuthService<InMemoryAuthRepository>,
    repo: InMemoryAuthRepository,
    notifier: Arc<CapturingNotifier>,
}

fn harness_with(config: AuthConfig) -> Harness {
    let repo = InMemoryAuthRepository::new();
    let notifier = Arc::new(CapturingNotifier::default());
    let service = AuthService::new(
        Arc::new(repo.clone()),
        Arc::new(SlidingWindowLimiter::new()),
        notifier.clone(),
        config,
    )
    .unwrap();
    Harness {
        service,
        repo,
        notifier,
    }
}

fn harness() -> Harness {
    harness_with(AuthConfig::minimal_cost())
}

fn ip(last: u8) -> Option<IpAddr> {
    Some(IpAddr::from([10, 0, 0, last]))
}

fn signup_input(user_name: &str, email: &str) -> SignUpInput {
    SignUpInput {
        user_name: user_name.to_string(),
        email: email.to_string(),
        password: PASSWORD.to_string(),
        first_name: None,
        last_name: None,
    }
}

fn login_input(user_name: &str, password: &str) -> SignInInput {
    SignInInput {
        user_name: user_name.to_string(),
        password: password.to_string(),
        remember_me: false,
    }
}

async fn signed_up(h: &Harness, user_name: &str) -> UserId {
    h.service
        .sign_up(ip(1), signup_input(user_name, &format!("{user_name}@example.com")))
        .await
        .unwrap()
        .user_id
}

async fn logged_in(h: &Harness, user_name: &str, password: &str) -> String {
    h.service
        .sign_in(ip(1), login_input(user_name, password))
        .await
        .unwrap()
        .token
        .into_inner()
}

// ============================================================================
// Signup
// ============================================================================

#[tokio::test]
async fn test_signup_rejects_bad_input() {
    let h = harness();

    let err = h
        .service
        .sign_up(ip(1), signup_input("ab", "ab@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidInput { field: "username", .. }));

    let err = h
        .service
        .sign_up(ip(2), signup_input("alice", "not-an-email"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidInput { field: "email", .. }));

    let mut weak = signup_input("alice", "alice@example.com");
    weak.password = "password".to_string();
    let err = h.service.sign_up(ip(3), weak).await.unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword(_)));
}

#[tokio::test]
async fn test_signup_duplicate_username_then_email() {
    let h = harness();
    signed_up(&h, "alice").await;

    let err = h
        .service
        .sign_up(ip(2), signup_input("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Conflict {
            field: Some(ConflictField::Username)
        }
    ));

    let err = h
        .service
        .sign_up(ip(3), signup_input("bob", "alice@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Conflict {
            field: Some(ConflictField::Email)
        }
    ));
}

#[tokio::test]
async fn test_signup_conflict_field_can_be_hidden() {
    let h = harness_with(AuthConfig {
        reveal_conflict_field: false,
        ..AuthConfig::minimal_cost()
    });
    signed_up(&h, "alice").await;

    let err = h
        .service
        .sign_up(ip(2), signup_input("alice", "other@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::Conflict { field: None }));
}

#[tokio::test]
async fn test_signup_sanitizes_names() {
    let h = harness();
    let mut input = signup_input("alice", "alice@example.com");
    input.first_name = Some("  <b>Alice</b> ".to_string());
    input.last_name = Some("   ".to_string());
    let user_id = h.service.sign_up(ip(1), input).await.unwrap().user_id;

    let token = logged_in(&h, "alice", PASSWORD).await;
    let user = h.service.profile(Some(&token)).await.unwrap();
    assert_eq!(user.user_id, user_id);
    assert_eq!(user.first_name.as_deref(), Some("&lt;b&gt;Alice&lt;/b&gt;"));
    assert_eq!(user.last_name, None);
}

#[tokio::test]
async fn test_signup_rate_limited_per_client() {
    let h = harness();
    for i in 0..3 {
        let name = format!("user{i}");
        h.service
            .sign_up(ip(1), signup_input(&name, &format!("{name}@example.com")))
            .await
            .unwrap();
    }

    let err = h
        .service
        .sign_up(ip(1), signup_input("user9", "user9@example.com"))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RateLimited { action: "signup" }));

    // Another client has its own budget
    assert!(
        h.service
            .sign_up(ip(2), signup_input("user9", "user9@example.com"))
            .await
            .is_ok()
    );
}

// ============================================================================
// Login / Logout / Validate
// ============================================================================

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let h = harness();
    signed_up(&h, "alice").await;

    let wrong_password = h
        .service
        .sign_in(ip(1), login_input("alice", "Wrong1!pass"))
        .await
        .unwrap_err();
    let unknown_user = h
        .service
        .sign_in(ip(1), login_input("nobody", PASSWORD))
        .await
        .unwrap_err();
    let bad_shape = h
        .service
        .sign_in(ip(1), login_input("a", PASSWORD))
        .await
        .unwrap_err();

    for err in [&wrong_password, &unknown_user, &bad_shape] {
        assert!(matches!(err, AuthError::InvalidCredentials));
    }
    assert_eq!(
        wrong_password.to_app_error().to_problem_json(),
        unknown_user.to_app_error().to_problem_json()
    );
}

#[tokio::test]
async fn test_login_is_case_sensitive() {
    let h = harness();
    signed_up(&h, "alice").await;

    let err = h
        .service
        .sign_in(ip(1), login_input("Alice", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_rate_limited_after_five_attempts() {
    let h = harness();
    signed_up(&h, "alice").await;

    for _ in 0..5 {
        let _ = h
            .service
            .sign_in(ip(7), login_input("alice", "Wrong1!pass"))
            .await;
    }

    // Even the right password is refused now
    let err = h
        .service
        .sign_in(ip(7), login_input("alice", PASSWORD))
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::RateLimited { action: "login" }));
}

#[tokio::test]
async fn test_login_validate_logout() {
    let h = harness();
    let user_id = signed_up(&h, "alice").await;
    let token = logged_in(&h, "alice", PASSWORD).await;

    let status = h.service.validate(Some(&token)).await;
    assert!(status.valid);
    assert_eq!(status.user_id, Some(user_id));

    h.service.sign_out(Some(&token)).await.unwrap();
    assert!(!h.service.validate(Some(&token)).await.valid);

    // The token no longer resolves
    assert!(matches!(
        h.service.sign_out(Some(&token)).await,
        Err(AuthError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_logout_requires_token() {
    let h = harness();
    assert!(matches!(
        h.service.sign_out(None).await,
        Err(AuthError::Unauthorized)
    ));
    assert!(matches!(
        h.service.sign_out(Some("no-such-token")).await,
        Err(AuthError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_validate_never_fails() {
    let h = harness();
    assert!(!h.service.validate(None).await.valid);
    assert!(!h.service.validate(Some("")).await.valid);
    assert!(!h.service.validate(Some("garbage")).await.valid);
}

#[tokio::test]
async fn test_remember_me_session_outlives_short_one() {
    let h = harness();
    let user_id = signed_up(&h, "alice").await;
    let sessions = h.service.sessions();
    let now = Utc::now();

    let short = sessions.create_at(&user_id, false, now).await.unwrap();
    let long = sessions.create_at(&user_id, true, now).await.unwrap();
    let later = now + Duration::days(2);

    assert!(
        sessions
            .resolve_at(short.token.as_str(), later)
            .await
            .is_err()
    );
    assert_eq!(
        sessions
            .resolve_at(long.token.as_str(), later)
            .await
            .unwrap(),
        user_id
    );
}

// ============================================================================
// Password Reset
// ============================================================================

#[tokio::test]
async fn test_forgot_password_unknown_email_issues_nothing() {
    let h = harness();
    signed_up(&h, "alice").await;

    h.service.forgot_password("nobody@example.com").await;
    h.service.forgot_password("not an email").await;

    assert_eq!(h.notifier.count(), 0);
    assert_eq!(h.repo.reset_token_count().await, 0);
}

#[tokio::test]
async fn test_full_password_reset() {
    let h = harness();
    signed_up(&h, "alice").await;
    let old_session = logged_in(&h, "alice", PASSWORD).await;

    h.service.forgot_password("alice@example.com").await;
    assert_eq!(h.notifier.count(), 1);
    let reset_token = h.notifier.last_token().unwrap();

    h.service
        .reset_password(ResetPasswordInput {
            token: reset_token.clone(),
            password: "NewPassword2@".to_string(),
        })
        .await
        .unwrap();

    // Every session was signed out
    assert!(!h.service.validate(Some(&old_session)).await.valid);

    // Old password is gone, new one works
    assert!(matches!(
        h.service
            .sign_in(ip(2), login_input("alice", PASSWORD))
            .await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(
        h.service
            .sign_in(ip(2), login_input("alice", "NewPassword2@"))
            .await
            .is_ok()
    );

    // Single use
    let err = h
        .service
        .reset_password(ResetPasswordInput {
            token: reset_token,
            password: "Another3#pass".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidToken));
}

#[tokio::test]
async fn test_reset_with_weak_password_keeps_token() {
    let h = harness();
    signed_up(&h, "alice").await;
    h.service.forgot_password("alice@example.com").await;
    let reset_token = h.notifier.last_token().unwrap();

    let err = h
        .service
        .reset_password(ResetPasswordInput {
            token: reset_token.clone(),
            password: "short".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::WeakPassword(_)));

    assert!(
        h.service
            .reset_password(ResetPasswordInput {
                token: reset_token,
                password: "NewPassword2@".to_string(),
            })
            .await
            .is_ok()
    );
}

#[tokio::test]
async fn test_reset_with_expired_token_keeps_sessions() {
    let h = harness();
    let user_id = signed_up(&h, "alice").await;
    let session = logged_in(&h, "alice", PASSWORD).await;

    let stale = h
        .service
        .reset_tokens()
        .issue_at(&user_id, Utc::now() - Duration::hours(2))
        .await
        .unwrap();

    let err = h
        .service
        .reset_password(ResetPasswordInput {
            token: stale.into_inner(),
            password: "NewPassword2@".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::TokenExpired));
    assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);

    assert!(h.service.validate(Some(&session)).await.valid);
    assert_eq!(h.repo.reset_token_count().await, 0);
}

// ============================================================================
// Profile
// ============================================================================

#[tokio::test]
async fn test_profile_requires_session() {
    let h = harness();
    assert!(matches!(
        h.service.profile(None).await,
        Err(AuthError::Unauthorized)
    ));
    assert!(matches!(
        h.service
            .update_profile(Some("bogus"), ProfileInput::default())
            .await,
        Err(AuthError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_profile_partial_update() {
    let h = harness();
    signed_up(&h, "alice").await;
    let token = logged_in(&h, "alice", PASSWORD).await;

    h.service
        .update_profile(
            Some(&token),
            ProfileInput {
                first_name: Some("Alice".to_string()),
                last_name: Some("  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let user = h.service.profile(Some(&token)).await.unwrap();
    assert_eq!(user.first_name.as_deref(), Some("Alice"));
    assert_eq!(user.last_name, None);
    assert_eq!(user.email.as_str(), "alice@example.com");

    h.service
        .update_profile(
            Some(&token),
            ProfileInput {
                email: Some("alice@new.example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let user = h.service.profile(Some(&token)).await.unwrap();
    assert_eq!(user.email.as_str(), "alice@new.example.com");
    assert_eq!(user.first_name.as_deref(), Some("Alice"));
}

#[tokio::test]
async fn test_profile_email_conflict_and_validation() {
    let h = harness();
    signed_up(&h, "alice").await;
    signed_up(&h, "bob").await;
    let token = logged_in(&h, "alice", PASSWORD).await;

    let err = h
        .service
        .update_profile(
            Some(&token),
            ProfileInput {
                email: Some("bob@example.com".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AuthError::Conflict {
            field: Some(ConflictField::Email)
        }
    ));

    let err = h
        .service
        .update_profile(
            Some(&token),
            ProfileInput {
                email: Some("broken".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, AuthError::InvalidInput { field: "email", .. }));

    // Re-submitting one's own address is not a conflict
    assert!(
        h.service
            .update_profile(
                Some(&token),
                ProfileInput {
                    email: Some("alice@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .is_ok()
    );
}

// ============================================================================
// Maintenance
// ============================================================================

#[tokio::test]
async fn test_cleanup_expired() {
    let h = harness();
    let user_id = signed_up(&h, "alice").await;
    let past = Utc::now() - Duration::days(31);

    h.service
        .sessions()
        .create_at(&user_id, true, past)
        .await
        .unwrap();
    h.service.sessions().create(&user_id, false).await.unwrap();
    h.service
        .reset_tokens()
        .issue_at(&user_id, past)
        .await
        .unwrap();

    let report = h.service.cleanup_expired().await.unwrap();
    assert_eq!(report.sessions, 1);
    assert_eq!(report.reset_tokens, 1);
    assert_eq!(h.repo.session_count().await, 1);
}

// ============================================================================
// HTTP
// ============================================================================

fn app() -> (Router, Harness) {
    let h = harness();
    (auth_routes(h.service.clone()), h)
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn signup_body(user_name: &str, email: &str) -> Value {
    json!({ "username": user_name, "email": email, "password": PASSWORD })
}

#[tokio::test]
async fn test_http_signup_statuses() {
    let (app, _h) = app();

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(signup_body("alice", "alice@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["username"], "alice");
    assert_eq!(body["email"], "alice@example.com");
    assert_eq!(body["message"], "User created successfully");
    assert!(body["user_id"].is_string());

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(signup_body("alice", "other@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Username already exists");

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(signup_body("ab", "ab@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "username must be at least 3 characters long");

    // Three attempts per hour from one client
    let (status, _) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(signup_body("carol", "carol@example.com")),
    )
    .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
}

#[tokio::test]
async fn test_http_malformed_body() {
    let (app, _h) = app();
    let (status, body) = send(&app, "POST", "/login", None, Some(json!({ "username": 5 }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["status"], 400);
}

#[tokio::test]
async fn test_http_missing_fields_reach_validation() {
    let (app, h) = app();

    let (status, body) = send(
        &app,
        "POST",
        "/signup",
        None,
        Some(json!({ "username": "ab" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "username must be at least 3 characters long");

    let (status, body) = send(&app, "POST", "/forgot-password", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], FORGOT_PASSWORD_MESSAGE);
    assert_eq!(h.notifier.count(), 0);

    let (status, _) = send(&app, "POST", "/login", None, Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_http_login_failures_identical() {
    let (app, h) = app();
    signed_up(&h, "alice").await;

    let (s1, wrong) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice", "password": "Wrong1!pass" })),
    )
    .await;
    let (s2, unknown) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "nobody", "password": PASSWORD })),
    )
    .await;

    assert_eq!(s1, StatusCode::UNAUTHORIZED);
    assert_eq!(s2, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong, unknown);
    assert_eq!(wrong["detail"], "Invalid credentials");
}

#[tokio::test]
async fn test_http_session_lifecycle() {
    let (app, h) = app();
    signed_up(&h, "alice").await;

    let (status, body) = send(
        &app,
        "POST",
        "/login",
        None,
        Some(json!({ "username": "alice", "password": PASSWORD, "remember_me": true })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    let token = body["token"].as_str().unwrap().to_string();

    let (status, body) = send(&app, "GET", "/validate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["valid"], true);

    let (status, body) = send(&app, "GET", "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["username"], "alice");
    assert!(body.get("password_hash").is_none());

    let (status, _) = send(
        &app,
        "PUT",
        "/profile",
        Some(&token),
        Some(json!({ "first_name": "Alice" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "POST", "/logout", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(&app, "GET", "/validate", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "valid": false }));

    let (status, _) = send(&app, "GET", "/profile", Some(&token), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_http_raw_authorization_header() {
    let (app, h) = app();
    signed_up(&h, "alice").await;
    let token = logged_in(&h, "alice", PASSWORD).await;

    let request = Request::builder()
        .method("GET")
        .uri("/validate")
        .header(header::AUTHORIZATION, token)
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["valid"], true);
}

#[tokio::test]
async fn test_http_password_reset() {
    let (app, h) = app();
    signed_up(&h, "alice").await;

    let (known_status, known) = send(
        &app,
        "POST",
        "/forgot-password",
        None,
        Some(json!({ "email": "alice@example.com" })),
    )
    .await;
    let (unknown_status, unknown) = send(
        &app,
        "POST",
        "/forgot-password",
        None,
        Some(json!({ "email": "nobody@example.com" })),
    )
    .await;
    assert_eq!(known_status, StatusCode::OK);
    assert_eq!(unknown_status, StatusCode::OK);
    assert_eq!(known, unknown);
    assert_eq!(h.notifier.count(), 1);

    let reset_token = h.notifier.last_token().unwrap();
    let (status, _) = send(
        &app,
        "POST",
        "/reset-password",
        None,
        Some(json!({ "token": &reset_token, "password": "NewPassword2@" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &app,
        "POST",
        "/reset-password",
        None,
        Some(json!({ "token": &reset_token, "password": "NewPassword2@" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], "Invalid or expired reset token");
}
