use axum::extract::State;

use crate::{
    AppState,
    error::AppError,
    extract::JsonBody,
    models::{Setting, SettingRequest},
    repository::RepositoryState,
    response::{ApiResult, success},
    validation,
};

async fn current_setting(repo: &RepositoryState) -> Result<Setting, AppError> {
    repo.get_setting()
        .await?
        .ok_or_else(|| AppError::NotFound("未找到系统设置，请联系管理员。".to_string()))
}

/// get_settings
///
/// [Public Route] The site-wide settings row.
#[utoipa::path(
    get,
    path = "/settings",
    responses(
        (status = 200, description = "Settings", body = Setting),
        (status = 404, description = "No settings row")
    )
)]
pub async fn get_settings(State(state): State<AppState>) -> ApiResult<Setting> {
    let setting = current_setting(&state.repo).await?;
    success("查询系统信息成功。", setting)
}

#[utoipa::path(
    get,
    path = "/admin/settings",
    responses((status = 200, description = "Settings", body = Setting))
)]
pub async fn admin_get_settings(State(state): State<AppState>) -> ApiResult<Setting> {
    let setting = current_setting(&state.repo).await?;
    success("查询系统设置成功。", setting)
}

#[utoipa::path(
    put,
    path = "/admin/settings",
    request_body = SettingRequest,
    responses((status = 200, description = "Updated", body = Setting))
)]
pub async fn admin_update_settings(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<SettingRequest>,
) -> ApiResult<Setting> {
    let current = current_setting(&state.repo).await?;
    let record = validation::setting(payload.merge(&current))?;
    let setting = state
        .repo
        .update_setting(current.id, &record)
        .await?
        .ok_or_else(|| AppError::NotFound("未找到系统设置，请联系管理员。".to_string()))?;
    success("更新系统设置成功。", setting)
}
