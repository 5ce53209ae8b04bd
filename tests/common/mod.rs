#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode},
    response::Response,
};
use course_platform::{
    AppConfig, AppState, MemoryRepository, create_router,
    auth::{hash_password, issue_token},
    models::{Role, Sex, User, UserRecord},
    repository::Repository,
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

pub const PASSWORD: &str = "123123";

/// A state over a fresh in-memory store, plus a handle to that store for seeding and
/// inspection.
pub fn test_state() -> (AppState, Arc<MemoryRepository>) {
    let repo = Arc::new(MemoryRepository::new());
    let state = AppState {
        repo: repo.clone(),
        config: AppConfig::default(),
    };
    (state, repo)
}

pub fn test_app() -> (Router, AppState, Arc<MemoryRepository>) {
    let (state, repo) = test_state();
    (create_router(state.clone()), state, repo)
}

pub async fn seed_user(repo: &MemoryRepository, username: &str, role: Role, sex: Sex) -> User {
    repo.create_user(&UserRecord {
        email: format!("{username}@example.com"),
        username: username.to_string(),
        nickname: format!("{username}-nick"),
        password: hash_password(PASSWORD).expect("hash"),
        sex,
        role,
        ..UserRecord::default()
    })
    .await
    .expect("seed user")
}

pub fn bearer(user_id: i64, config: &AppConfig) -> String {
    format!("Bearer {}", issue_token(user_id, config).expect("token"))
}

pub async fn request(
    app: &Router,
    method: Method,
    path: &str,
    body: Option<Value>,
    headers: &[(&str, String)],
) -> Response {
    let mut builder = Request::builder().method(method).uri(path);
    for (k, v) in headers {
        builder = builder.header(*k, v.as_str());
    }
    let req = match body {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string()))
            .expect("request body"),
        None => builder.body(Body::empty()).expect("empty body"),
    };
    app.clone().oneshot(req).await.expect("oneshot response")
}

pub async fn response_json(resp: Response) -> (StatusCode, Value) {
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body bytes");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("parse json body")
    };
    (status, json)
}
