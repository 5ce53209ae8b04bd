use axum::extract::State;

use crate::{
    AppState,
    auth::{hash_password, issue_token, verify_password},
    error::{AppError, FieldError},
    extract::JsonBody,
    models::{SignInRequest, SignUpRequest, TokenResponse, User, UserRequest},
    response::{ApiResult, created, success},
    validation,
};

/// sign_up
///
/// [Public Route] Self-registration. Role is always ordinary and sex starts as unknown,
/// whatever the client sends.
#[utoipa::path(
    post,
    path = "/auth/sign_up",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "Registered", body = User),
        (status = 400, description = "Validation failed or email/username taken")
    )
)]
pub async fn sign_up(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignUpRequest>,
) -> ApiResult<User> {
    let request = UserRequest::from(payload);
    let mut record = validation::user(&request, true)?;
    record.password = hash_password(&record.password)?;
    let user = state.repo.create_user(&record).await?;
    tracing::info!(user_id = user.id, "user registered");
    created("创建用户成功。", user)
}

/// Resolves the credentials of a sign-in request to a live user.
async fn authenticate(state: &AppState, payload: SignInRequest) -> Result<User, AppError> {
    let mut errors = Vec::new();
    let login = payload.login.filter(|l| !l.trim().is_empty());
    let password = payload.password.filter(|p| !p.is_empty());
    if login.is_none() {
        errors.push(FieldError::new("login", "邮箱/用户名必须填写。"));
    }
    if password.is_none() {
        errors.push(FieldError::new("password", "密码必须填写。"));
    }
    let (Some(login), Some(password)) = (login, password) else {
        return Err(AppError::Validation(errors));
    };

    let user = state
        .repo
        .find_user_by_login(login.trim())
        .await?
        .ok_or_else(|| AppError::NotFound("用户不存在，无法登录。".to_string()))?;

    if !verify_password(&password, &user.password)? {
        return Err(AppError::Unauthorized("密码错误。".to_string()));
    }
    Ok(user)
}

/// sign_in
///
/// [Public Route] Exchanges email-or-username plus password for a bearer token.
#[utoipa::path(
    post,
    path = "/auth/sign_in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Wrong password"),
        (status = 404, description = "Unknown user")
    )
)]
pub async fn sign_in(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignInRequest>,
) -> ApiResult<TokenResponse> {
    let user = authenticate(&state, payload).await?;
    let token = issue_token(user.id, &state.config)?;
    success("登录成功。", TokenResponse { token })
}

/// admin_sign_in
///
/// [Public Route] As `sign_in`, but only admins receive a token.
#[utoipa::path(
    post,
    path = "/admin/auth/sign_in",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Signed in", body = TokenResponse),
        (status = 401, description = "Wrong password or not an admin")
    )
)]
pub async fn admin_sign_in(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SignInRequest>,
) -> ApiResult<TokenResponse> {
    let user = authenticate(&state, payload).await?;
    if !user.is_admin() {
        tracing::warn!(user_id = user.id, "admin sign-in refused for ordinary user");
        return Err(AppError::Unauthorized("您没有权限登录管理员后台。".to_string()));
    }
    let token = issue_token(user.id, &state.config)?;
    success("登录成功。", TokenResponse { token })
}
