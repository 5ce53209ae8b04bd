mod common;

use axum::{
    extract::FromRequestParts,
    http::{Method, Request, StatusCode, Uri, header, request::Parts},
};
use common::{seed_user, test_state};
use course_platform::{
    AppError,
    auth::{
        ADMIN_ONLY, AdminUser, AuthUser, Claims, EXPIRED_TOKEN, MISSING_TOKEN, hash_password,
        issue_token, verify_password,
    },
    models::{Role, Sex},
    repository::Repository,
};
use jsonwebtoken::{EncodingKey, Header, encode};
use std::time::SystemTime;

// --- Helper Functions ---

fn token_with_exp(user_id: i64, secret: &str, exp_offset: i64) -> String {
    let now = SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .unwrap()
        .as_secs() as i64;

    let claims = Claims {
        sub: user_id,
        iat: now as usize,
        exp: (now + exp_offset) as usize,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

/// Helper to get the mutable Parts struct from a generated Request
fn get_request_parts(method: Method, uri: Uri) -> Parts {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(axum::body::Body::empty())
        .unwrap();
    let (parts, _) = request.into_parts();
    parts
}

fn with_bearer(token: &str) -> Parts {
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
    );
    parts
}

fn message(error: AppError) -> String {
    match error {
        AppError::Unauthorized(m) | AppError::Forbidden(m) => m,
        other => panic!("unexpected error: {other:?}"),
    }
}

// --- Tests ---

#[tokio::test]
async fn test_auth_success_with_valid_jwt() {
    let (state, repo) = test_state();
    let user = seed_user(&repo, "alice", Role::Ordinary, Sex::Female).await;
    let token = issue_token(user.id, &state.config).unwrap();

    let mut parts = with_bearer(&token);
    let auth_user = AuthUser::from_request_parts(&mut parts, &state).await.unwrap();

    assert_eq!(auth_user.id, user.id);
    assert_eq!(auth_user.role, Role::Ordinary);
    // The principal is cached for later extractors of the same request.
    assert_eq!(parts.extensions.get::<AuthUser>(), Some(&auth_user));
}

#[tokio::test]
async fn test_auth_failure_with_missing_header() {
    let (state, _repo) = test_state();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(err), MISSING_TOKEN);
}

#[tokio::test]
async fn test_auth_failure_with_malformed_header() {
    let (state, _repo) = test_state();
    let mut parts = get_request_parts(Method::GET, "/".parse().unwrap());
    parts.headers.insert(
        header::AUTHORIZATION,
        header::HeaderValue::from_static("Token abc"),
    );

    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_with_expired_jwt() {
    let (state, repo) = test_state();
    let user = seed_user(&repo, "bob", Role::Ordinary, Sex::Male).await;
    // Well past the library's default leeway.
    let token = token_with_exp(user.id, &state.config.jwt_secret, -3600);

    let mut parts = with_bearer(&token);
    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(message(err), EXPIRED_TOKEN);
}

#[tokio::test]
async fn test_auth_failure_with_foreign_secret() {
    let (state, repo) = test_state();
    let user = seed_user(&repo, "carol", Role::Admin, Sex::Unknown).await;
    let token = token_with_exp(user.id, "some-other-secret", 3600);

    let mut parts = with_bearer(&token);
    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_auth_failure_for_deleted_principal() {
    let (state, repo) = test_state();
    let user = seed_user(&repo, "dave", Role::Ordinary, Sex::Male).await;
    let token = issue_token(user.id, &state.config).unwrap();
    repo.delete_user(user.id).await.unwrap();

    let mut parts = with_bearer(&token);
    let err = AuthUser::from_request_parts(&mut parts, &state).await.unwrap_err();
    assert_eq!(err.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_admin_guard_refuses_ordinary_user() {
    let (state, repo) = test_state();
    let user = seed_user(&repo, "erin", Role::Ordinary, Sex::Female).await;
    let token = issue_token(user.id, &state.config).unwrap();

    let mut parts = with_bearer(&token);
    let err = AdminUser::from_request_parts(&mut parts, &state).await.unwrap_err();

    assert_eq!(err.status(), StatusCode::FORBIDDEN);
    assert_eq!(message(err), ADMIN_ONLY);
}

#[tokio::test]
async fn test_admin_guard_admits_admin() {
    let (state, repo) = test_state();
    let admin = seed_user(&repo, "root", Role::Admin, Sex::Male).await;
    let token = issue_token(admin.id, &state.config).unwrap();

    let mut parts = with_bearer(&token);
    let AdminUser(principal) = AdminUser::from_request_parts(&mut parts, &state).await.unwrap();
    assert_eq!(principal.id, admin.id);
    assert!(principal.is_admin());
}

#[test]
fn test_password_hash_round_trip() {
    let hash = hash_password("123123").unwrap();
    assert_ne!(hash, "123123");
    assert!(verify_password("123123", &hash).unwrap());
    assert!(!verify_password("wrong-password", &hash).unwrap());
}
