//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{
    reset_token::ResetToken,
    session::Session,
    user::{ProfileUpdate, User},
};
use crate::domain::repository::{ResetTokenRepository, SessionRepository, UserRepository};
use crate::domain::value_object::{
    email::Email, token::TokenHash, user_id::UserId, user_name::UserName,
    user_password::UserPassword,
};
use crate::error::{AuthError, AuthResult, ConflictField};

const USERNAME_CONSTRAINT: &str = "users_username_key";
const EMAIL_CONSTRAINT: &str = "users_email_key";

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a unique violation on `users` to a conflict on the offending field
fn map_unique_violation(err: sqlx::Error) -> AuthError {
    if let Some(db_err) = err.as_database_error() {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some(USERNAME_CONSTRAINT) => Some(ConflictField::Username),
                Some(EMAIL_CONSTRAINT) => Some(ConflictField::Email),
                _ => None,
            };
            return AuthError::Conflict { field };
        }
    }
    AuthError::Database(err)
}

// ============================================================================
// User Repository Implementation
// ============================================================================

impl UserRepository for PgAuthRepository {
    async fn find_user_by_id(&self, user_id: &UserId) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_user_by_username(&self, user_name: &UserName) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   created_at, updated_at
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(user_name.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn find_user_by_email(&self, email: &Email) -> AuthResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, first_name, last_name,
                   created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_user()).transpose()
    }

    async fn username_exists(&self, user_name: &UserName) -> AuthResult<bool> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE username = $1)")
                .bind(user_name.as_str())
                .fetch_one(&self.pool)
                .await?;

        Ok(exists)
    }

    async fn email_exists(&self, email: &Email, excluding: Option<&UserId>) -> AuthResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM users
                WHERE email = $1 AND ($2::uuid IS NULL OR id <> $2)
            )
            "#,
        )
        .bind(email.as_str())
        .bind(excluding.map(|id| *id.as_uuid()))
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn insert_user(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id,
                username,
                email,
                password_hash,
                first_name,
                last_name,
                created_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(user.user_id.as_uuid())
        .bind(user.user_name.as_str())
        .bind(user.email.as_str())
        .bind(user.password_hash.as_phc_string())
        .bind(&user.first_name)
        .bind(&user.last_name)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        Ok(())
    }

    async fn update_profile(&self, user_id: &UserId, update: &ProfileUpdate) -> AuthResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE users SET
                email = COALESCE($2, email),
                first_name = COALESCE($3, first_name),
                last_name = COALESCE($4, last_name),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(update.email.as_ref().map(Email::as_str))
        .bind(&update.first_name)
        .bind(&update.last_name)
        .execute(&self.pool)
        .await
        .map_err(map_unique_violation)?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }

    async fn update_password(&self, user_id: &UserId, password: &UserPassword) -> AuthResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = NOW() WHERE id = $1",
        )
        .bind(user_id.as_uuid())
        .bind(password.as_phc_string())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AuthError::UserNotFound);
        }
        Ok(())
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn insert_session(&self, session: &Session) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO sessions (token_hash, user_id, expires_at, remember_me, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&session.token_hash.as_bytes()[..])
        .bind(session.user_id.as_uuid())
        .bind(session.expires_at)
        .bind(session.remember_me)
        .bind(session.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(&self, token_hash: &TokenHash) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT token_hash, user_id, expires_at, remember_me, created_at
            FROM sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(&token_hash.as_bytes()[..])
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_session()).transpose()
    }

    async fn delete_session(&self, token_hash: &TokenHash) -> AuthResult<()> {
        sqlx::query("DELETE FROM sessions WHERE token_hash = $1")
            .bind(&token_hash.as_bytes()[..])
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn delete_sessions_by_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Reset Token Repository Implementation
// ============================================================================

impl ResetTokenRepository for PgAuthRepository {
    async fn insert_reset_token(&self, token: &ResetToken) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO password_reset_tokens (token_hash, user_id, expires_at, created_at)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(&token.token_hash.as_bytes()[..])
        .bind(token.user_id.as_uuid())
        .bind(token.expires_at)
        .bind(token.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn take_reset_token(&self, token_hash: &TokenHash) -> AuthResult<Option<ResetToken>> {
        // Single statement: a concurrent second caller sees no row
        let row = sqlx::query_as::<_, ResetTokenRow>(
            r#"
            DELETE FROM password_reset_tokens
            WHERE token_hash = $1
            RETURNING token_hash, user_id, expires_at, created_at
            "#,
        )
        .bind(&token_hash.as_bytes()[..])
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| r.into_reset_token()).transpose()
    }

    async fn delete_expired_reset_tokens(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let deleted = sqlx::query("DELETE FROM password_reset_tokens WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted)
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl UserRow {
    fn into_user(self) -> AuthResult<User> {
        Ok(User {
            user_id: UserId::from_uuid(self.id),
            user_name: UserName::from_db(self.username),
            email: Email::from_db(self.email),
            password_hash: UserPassword::from_db(self.password_hash)?,
            first_name: self.first_name,
            last_name: self.last_name,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn token_hash_from_row(bytes: &[u8]) -> AuthResult<TokenHash> {
    TokenHash::from_slice(bytes)
        .ok_or_else(|| AuthError::Internal(format!("Invalid token hash length: {}", bytes.len())))
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    token_hash: Vec<u8>,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    remember_me: bool,
    created_at: DateTime<Utc>,
}

impl SessionRow {
    fn into_session(self) -> AuthResult<Session> {
        Ok(Session {
            token_hash: token_hash_from_row(&self.token_hash)?,
            user_id: UserId::from_uuid(self.user_id),
            expires_at: self.expires_at,
            remember_me: self.remember_me,
            created_at: self.created_at,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ResetTokenRow {
    token_hash: Vec<u8>,
    user_id: Uuid,
    expires_at: DateTime<Utc>,
    created_at: DateTime<Utc>,
}

impl ResetTokenRow {
    fn into_reset_token(self) -> AuthResult<ResetToken> {
        Ok(ResetToken {
            token_hash: token_hash_from_row(&self.token_hash)?,
            user_id: UserId::from_uuid(self.user_id),
            expires_at: self.expires_at,
            created_at: self.created_at,
        })
    }
}
