use axum::extract::State;

use super::{deleted, found};
use crate::{
    AppState,
    error::AppError,
    extract::{JsonBody, PathId},
    models::{Category, CategoryRequest},
    response::{ApiResult, created, success},
    validation,
};

/// list_categories
///
/// [Public Route] Every category, rank ASC then id DESC.
#[utoipa::path(
    get,
    path = "/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.repo.list_categories().await?;
    success("查询分类成功。", categories)
}

#[utoipa::path(
    get,
    path = "/admin/categories",
    responses((status = 200, description = "Categories", body = [Category]))
)]
pub async fn admin_list_categories(State(state): State<AppState>) -> ApiResult<Vec<Category>> {
    let categories = state.repo.list_categories().await?;
    success("查询分类列表成功。", categories)
}

#[utoipa::path(
    get,
    path = "/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses((status = 200, description = "Found", body = Category))
)]
pub async fn admin_get_category(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<Category> {
    let category = found(state.repo.get_category(id).await?, id)?;
    success("查询分类成功。", category)
}

#[utoipa::path(
    post,
    path = "/admin/categories",
    request_body = CategoryRequest,
    responses(
        (status = 201, description = "Created", body = Category),
        (status = 400, description = "Validation failed or name taken")
    )
)]
pub async fn admin_create_category(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> ApiResult<Category> {
    let record = validation::category(&payload)?;
    let category = state.repo.create_category(&record).await?;
    created("创建分类成功。", category)
}

#[utoipa::path(
    put,
    path = "/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    request_body = CategoryRequest,
    responses((status = 200, description = "Updated", body = Category))
)]
pub async fn admin_update_category(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(payload): JsonBody<CategoryRequest>,
) -> ApiResult<Category> {
    let current = found(state.repo.get_category(id).await?, id)?;
    let record = validation::category(&payload.merge(&current))?;
    let category = found(state.repo.update_category(id, &record).await?, id)?;
    success("更新分类成功。", category)
}

/// admin_delete_category
///
/// [Admin Route] Hard delete, refused while any course is filed under the category.
#[utoipa::path(
    delete,
    path = "/admin/categories/{id}",
    params(("id" = i64, Path, description = "Category ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Category still has courses"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_category(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<()> {
    found(state.repo.get_category(id).await?, id)?;
    if state.repo.count_courses_in_category(id).await? > 0 {
        return Err(AppError::field("id", "当前分类有课程，无法删除。"));
    }
    deleted::<Category>(state.repo.delete_category(id).await?, id)?;
    success("删除分类成功。", ())
}
