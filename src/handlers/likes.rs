use axum::extract::State;

use super::{deleted, found};
use crate::{
    AppState,
    auth::AuthUser,
    error::AppError,
    extract::{JsonBody, PathId, QueryParams},
    models::{Course, Like, LikeRequest, PageQuery, Paginated},
    response::{ApiResult, created, success},
};

/// list_likes
///
/// [User Route] Courses the principal has liked, most recent like first.
#[utoipa::path(
    get,
    path = "/likes",
    params(PageQuery),
    responses((status = 200, description = "Liked courses", body = Paginated<Course>))
)]
pub async fn list_likes(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    QueryParams(query): QueryParams<PageQuery>,
) -> ApiResult<Paginated<Course>> {
    let page = query.page();
    let courses = state.repo.list_liked_courses(user_id, page).await?;
    success("查询用户点赞的课程成功。", Paginated::new(courses, page))
}

/// create_like
///
/// [User Route] Likes a course on behalf of the principal. The store's unique
/// `(user_id, course_id)` constraint decides the race between concurrent duplicates.
#[utoipa::path(
    post,
    path = "/likes",
    request_body = LikeRequest,
    responses(
        (status = 201, description = "Liked", body = Like),
        (status = 400, description = "Already liked"),
        (status = 404, description = "Unknown course")
    )
)]
pub async fn create_like(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<LikeRequest>,
) -> ApiResult<Like> {
    let Some(course_id) = payload.course_id else {
        return Err(AppError::field("courseId", "课程ID必须填写。"));
    };
    found(state.repo.get_course(course_id).await?, course_id)?;

    match state.repo.create_like(user_id, course_id).await? {
        Some(like) => created("点赞成功。", like),
        None => Err(AppError::field("courseId", "您已经赞过该课程。")),
    }
}

/// delete_like
///
/// [User Route] Removes one of the principal's likes. Another user's like is reported as
/// not found.
#[utoipa::path(
    delete,
    path = "/likes/{id}",
    params(("id" = i64, Path, description = "Like ID")),
    responses(
        (status = 200, description = "Removed"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_like(
    AuthUser { id: user_id, .. }: AuthUser,
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<()> {
    deleted::<Like>(state.repo.delete_like(id, user_id).await?, id)?;
    success("取消赞成功。", ())
}
