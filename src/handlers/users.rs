use axum::extract::State;

use super::{deleted, found};
use crate::{
    AppState,
    auth::{AuthUser, hash_password, verify_password},
    error::AppError,
    extract::{JsonBody, PathId, QueryParams},
    models::{
        AccountRequest, Paginated, User, UserFilter, UserInfoRequest, UserRecord, UserRequest,
    },
    response::{ApiResult, created, success},
    validation,
};

/// Replaces the plain password in `record` with its hash, or with `current_hash` when the
/// request left the password out.
fn seal_password(record: &mut UserRecord, current_hash: &str) -> Result<(), AppError> {
    record.password = if record.password.is_empty() {
        current_hash.to_string()
    } else {
        hash_password(&record.password)?
    };
    Ok(())
}

// --- Self service (User Auth) ---

/// get_me
///
/// [User Route] The principal's own profile.
#[utoipa::path(
    get,
    path = "/users/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "Unauthorized")
    )
)]
pub async fn get_me(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<User> {
    let user = found(state.repo.get_user(id).await?, id)?;
    success("查询当前用户信息成功。", user)
}

/// update_info
///
/// [User Route] Profile fields only; email, username, password and role are untouched.
#[utoipa::path(
    put,
    path = "/users/info",
    request_body = UserInfoRequest,
    responses((status = 200, description = "Updated", body = User))
)]
pub async fn update_info(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserInfoRequest>,
) -> ApiResult<User> {
    let current = found(state.repo.get_user(id).await?, id)?;
    let mut record = validation::user(&payload.merge(&current), false)?;
    record.password = current.password.clone();
    let user = found(state.repo.update_user(id, &record).await?, id)?;
    success("更新用户信息成功。", user)
}

/// update_account
///
/// [User Route] Changes email, username and/or password. Always requires the current password;
/// a new password must be repeated in `passwordConfirmation`.
#[utoipa::path(
    put,
    path = "/users/account",
    request_body = AccountRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn update_account(
    AuthUser { id, .. }: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<AccountRequest>,
) -> ApiResult<User> {
    let current = found(state.repo.get_user(id).await?, id)?;

    let Some(current_password) = payload.current_password.as_deref() else {
        return Err(AppError::field("currentPassword", "当前密码必须填写。"));
    };
    if !verify_password(current_password, &current.password)? {
        return Err(AppError::field("currentPassword", "当前密码不正确。"));
    }
    if payload.password.is_some() && payload.password != payload.password_confirmation {
        return Err(AppError::field("passwordConfirmation", "两次输入的密码不一致。"));
    }

    let request = UserRequest {
        email: payload.email,
        username: payload.username,
        password: payload.password,
        ..UserRequest::default()
    }
    .merge(&current);
    let mut record = validation::user(&request, false)?;
    seal_password(&mut record, &current.password)?;

    let user = found(state.repo.update_user(id, &record).await?, id)?;
    success("更新账户信息成功。", user)
}

// --- Administration (Admin Auth) ---

#[utoipa::path(
    get,
    path = "/admin/users",
    params(UserFilter),
    responses((status = 200, description = "Users", body = Paginated<User>))
)]
pub async fn admin_list_users(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<UserFilter>,
) -> ApiResult<Paginated<User>> {
    let page = filter.page();
    let users = state.repo.list_users(&filter, page).await?;
    success("查询用户列表成功。", Paginated::new(users, page))
}

#[utoipa::path(
    get,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Found", body = User),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_get_user(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<User> {
    let user = found(state.repo.get_user(id).await?, id)?;
    success("查询用户成功。", user)
}

/// admin_create_user
///
/// [Admin Route] The password is mandatory and stored as an argon2 hash.
#[utoipa::path(
    post,
    path = "/admin/users",
    request_body = UserRequest,
    responses(
        (status = 201, description = "Created", body = User),
        (status = 400, description = "Validation failed or email/username taken")
    )
)]
pub async fn admin_create_user(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<UserRequest>,
) -> ApiResult<User> {
    let mut record = validation::user(&payload, true)?;
    record.password = hash_password(&record.password)?;
    let user = state.repo.create_user(&record).await?;
    created("创建用户成功。", user)
}

/// admin_update_user
///
/// [Admin Route] An absent password keeps the stored hash.
#[utoipa::path(
    put,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UserRequest,
    responses((status = 200, description = "Updated", body = User))
)]
pub async fn admin_update_user(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(payload): JsonBody<UserRequest>,
) -> ApiResult<User> {
    let current = found(state.repo.get_user(id).await?, id)?;
    let mut record = validation::user(&payload.merge(&current), false)?;
    seal_password(&mut record, &current.password)?;
    let user = found(state.repo.update_user(id, &record).await?, id)?;
    success("更新用户成功。", user)
}

/// admin_delete_user
///
/// [Admin Route] Soft delete. The user can no longer sign in or use issued tokens.
/// Refused while the user still owns courses.
#[utoipa::path(
    delete,
    path = "/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "User still owns courses"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_user(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<()> {
    found(state.repo.get_user(id).await?, id)?;
    if state.repo.count_courses_owned_by(id).await? > 0 {
        return Err(AppError::field("id", "当前用户有课程，无法删除。"));
    }
    deleted::<User>(state.repo.delete_user(id).await?, id)?;
    success("删除用户成功。", ())
}
