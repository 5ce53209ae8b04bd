use axum::extract::State;

use super::{deleted, found};
use crate::{
    AppState,
    error::AppError,
    extract::{JsonBody, PathId, QueryParams},
    models::{Article, ArticleFilter, ArticleRequest, PageQuery, Paginated},
    response::{ApiResult, created, success},
    validation,
};

/// list_articles
///
/// [Public Route] Live articles, newest first.
#[utoipa::path(
    get,
    path = "/articles",
    params(PageQuery),
    responses((status = 200, description = "Articles", body = Paginated<Article>))
)]
pub async fn list_articles(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<Paginated<Article>> {
    let page = query.page();
    let articles = state
        .repo
        .list_articles(&ArticleFilter::default(), page)
        .await?;
    success("查询文章列表成功。", Paginated::new(articles, page))
}

/// get_article
///
/// [Public Route] A single live article.
#[utoipa::path(
    get,
    path = "/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Found", body = Article),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_article(State(state): State<AppState>, PathId(id): PathId) -> ApiResult<Article> {
    let article = found(state.repo.get_article(id).await?, id)?;
    success("查询文章成功。", article)
}

/// admin_list_articles
///
/// [Admin Route] Filters by title; `deleted=true` lists the trash instead.
#[utoipa::path(
    get,
    path = "/admin/articles",
    params(ArticleFilter),
    responses((status = 200, description = "Articles", body = Paginated<Article>))
)]
pub async fn admin_list_articles(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ArticleFilter>,
) -> ApiResult<Paginated<Article>> {
    let page = filter.page();
    let articles = state.repo.list_articles(&filter, page).await?;
    success("查询文章列表成功。", Paginated::new(articles, page))
}

#[utoipa::path(
    get,
    path = "/admin/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses((status = 200, description = "Found", body = Article))
)]
pub async fn admin_get_article(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<Article> {
    let article = found(state.repo.get_article(id).await?, id)?;
    success("查询文章成功。", article)
}

/// admin_create_article
///
/// [Admin Route] Nothing is stored unless the payload validates.
#[utoipa::path(
    post,
    path = "/admin/articles",
    request_body = ArticleRequest,
    responses(
        (status = 201, description = "Created", body = Article),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn admin_create_article(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ArticleRequest>,
) -> ApiResult<Article> {
    let record = validation::article(&payload)?;
    let article = state.repo.create_article(&record).await?;
    created("创建文章成功。", article)
}

/// admin_update_article
///
/// [Admin Route] Patches the stored article and re-validates the merged result.
#[utoipa::path(
    put,
    path = "/admin/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    request_body = ArticleRequest,
    responses((status = 200, description = "Updated", body = Article))
)]
pub async fn admin_update_article(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(payload): JsonBody<ArticleRequest>,
) -> ApiResult<Article> {
    let current = found(state.repo.get_article(id).await?, id)?;
    let record = validation::article(&payload.merge(&current))?;
    let article = found(state.repo.update_article(id, &record).await?, id)?;
    success("更新文章成功。", article)
}

/// admin_delete_article
///
/// [Admin Route] Soft delete: the row moves to the trash.
#[utoipa::path(
    delete,
    path = "/admin/articles/{id}",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_article(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<()> {
    deleted::<Article>(state.repo.delete_article(id).await?, id)?;
    success("删除文章成功。", ())
}

#[utoipa::path(
    post,
    path = "/admin/articles/{id}/restore",
    params(("id" = i64, Path, description = "Article ID")),
    responses(
        (status = 200, description = "Restored"),
        (status = 404, description = "Not in the trash")
    )
)]
pub async fn admin_restore_article(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<()> {
    if !state.repo.restore_article(id).await? {
        return Err(AppError::not_found::<Article>(id));
    }
    success("恢复文章成功。", ())
}
