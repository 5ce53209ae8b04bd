use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use axum::{
    extract::{FromRef, FromRequestParts},
    http::{header, request::Parts},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{
    DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::AppConfig,
    error::AppError,
    models::Role,
    repository::RepositoryState,
};

pub const MISSING_TOKEN: &str = "当前接口需要认证才能访问。";
pub const INVALID_TOKEN: &str = "认证失败，您提交的token错误。";
pub const EXPIRED_TOKEN: &str = "认证失败，您的token已过期。";
pub const ADMIN_ONLY: &str = "您没有权限访问管理员后台。";

/// Claims
///
/// The payload signed into every bearer token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (sub): the id of the signed-in user.
    pub sub: i64,
    /// Expiration Time (exp): Timestamp after which the JWT must not be accepted.
    pub exp: usize,
    /// Issued At (iat): Timestamp when the JWT was issued.
    pub iat: usize,
}

/// issue_token
///
/// Signs an HS256 token for `user_id` valid for `config.token_ttl_days`.
pub fn issue_token(user_id: i64, config: &AppConfig) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id,
        iat: now.timestamp() as usize,
        exp: (now + Duration::days(config.token_ttl_days)).timestamp() as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret.as_bytes()),
    )
    .map_err(|e| AppError::internal(format!("token signing failed: {e}")))
}

/// Decodes and validates a bearer token, returning the user id it was issued to.
pub fn verify_token(token: &str, config: &AppConfig) -> Result<i64, AppError> {
    let decoding_key = DecodingKey::from_secret(config.jwt_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    match decode::<Claims>(token, &decoding_key, &validation) {
        Ok(data) => Ok(data.claims.sub),
        Err(e) => match e.kind() {
            ErrorKind::ExpiredSignature => Err(AppError::Unauthorized(EXPIRED_TOKEN.to_string())),
            _ => {
                tracing::debug!(error = %e, "token rejected");
                Err(AppError::Unauthorized(INVALID_TOKEN.to_string()))
            }
        },
    }
}

pub fn hash_password(password: &str) -> Result<String, AppError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AppError::internal(format!("password hash failed: {e}")))
}

pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    let parsed = PasswordHash::new(hash)
        .map_err(|e| AppError::internal(format!("invalid password hash: {e}")))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// AuthUser
///
/// The resolved principal of an authenticated request. Only the id and role are carried;
/// handlers that need the full profile look it up again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub id: i64,
    pub role: Role,
}

impl AuthUser {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// AuthUser Extractor Implementation
///
/// 1. Reuses the principal already attached by the `user_auth`/`admin_auth` middleware.
/// 2. Otherwise extracts the bearer token and verifies signature and expiry.
/// 3. Re-fetches the user so that a principal deleted after issuance is refused.
///
/// Rejection: `AppError::Unauthorized` on any failure.
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>() {
            return Ok(*user);
        }

        let repo = RepositoryState::from_ref(state);
        let config = AppConfig::from_ref(state);

        let auth_header = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::Unauthorized(MISSING_TOKEN.to_string()))?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_string()))?;

        let user_id = verify_token(token, &config)?;

        // The user may have been deleted after the token was issued.
        let user = repo
            .get_user(user_id)
            .await?
            .ok_or_else(|| AppError::Unauthorized(INVALID_TOKEN.to_string()))?;

        let principal = AuthUser {
            id: user.id,
            role: user.role,
        };
        parts.extensions.insert(principal);
        Ok(principal)
    }
}

/// AdminUser
///
/// An `AuthUser` whose role is admin. A valid non-admin principal is rejected with Forbidden.
#[derive(Debug, Clone, Copy)]
pub struct AdminUser(pub AuthUser);

impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
    RepositoryState: FromRef<S>,
    AppConfig: FromRef<S>,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            tracing::warn!(user_id = user.id, "non-admin principal refused");
            return Err(AppError::Forbidden(ADMIN_ONLY.to_string()));
        }
        Ok(AdminUser(user))
    }
}
