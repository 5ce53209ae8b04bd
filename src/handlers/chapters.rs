use axum::extract::State;

use super::{deleted, found};
use crate::{
    AppState,
    error::AppError,
    extract::{JsonBody, PathId, QueryParams},
    models::{
        AdminChapterDetail, Chapter, ChapterDetail, ChapterFilter, ChapterRecord, ChapterRequest,
        Paginated,
    },
    repository::RepositoryState,
    response::{ApiResult, created, success},
    validation,
};

/// get_chapter
///
/// [Public Route] The chapter, its course, the course owner and every sibling chapter.
///
/// The chapter id is resolved first so that an unknown id is a plain NotFound. A persisted
/// chapter whose course or owner is gone is an integrity fault, reported as an internal error.
/// The owner and sibling lookups only depend on the course and run concurrently.
#[utoipa::path(
    get,
    path = "/chapters/{id}",
    params(("id" = i64, Path, description = "Chapter ID")),
    responses(
        (status = 200, description = "Found", body = ChapterDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_chapter(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<ChapterDetail> {
    let chapter = found(state.repo.get_chapter(id).await?, id)?;

    let course = state.repo.get_course(chapter.course_id).await?.ok_or_else(|| {
        AppError::internal(format!("chapter {} references missing course {}", id, chapter.course_id))
    })?;

    let (user, chapters) = tokio::try_join!(
        state.repo.get_user(course.user_id),
        state.repo.list_course_chapters(chapter.course_id),
    )?;
    let user = user.ok_or_else(|| {
        AppError::internal(format!("course {} references missing user {}", course.id, course.user_id))
    })?;

    success(
        "查询章节成功。",
        ChapterDetail {
            course: (&course).into(),
            user: (&user).into(),
            chapter,
            chapters,
        },
    )
}

/// admin_list_chapters
///
/// [Admin Route] Chapters of one course. `courseId` is mandatory.
#[utoipa::path(
    get,
    path = "/admin/chapters",
    params(ChapterFilter),
    responses(
        (status = 200, description = "Chapters", body = Paginated<Chapter>),
        (status = 400, description = "courseId missing")
    )
)]
pub async fn admin_list_chapters(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<ChapterFilter>,
) -> ApiResult<Paginated<Chapter>> {
    if filter.course_id.is_none() {
        return Err(AppError::field("courseId", "课程ID不能为空。"));
    }
    let page = filter.page();
    let chapters = state.repo.list_chapters(&filter, page).await?;
    success("查询章节列表成功。", Paginated::new(chapters, page))
}

#[utoipa::path(
    get,
    path = "/admin/chapters/{id}",
    params(("id" = i64, Path, description = "Chapter ID")),
    responses((status = 200, description = "Found", body = AdminChapterDetail))
)]
pub async fn admin_get_chapter(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<AdminChapterDetail> {
    let chapter = found(state.repo.get_chapter(id).await?, id)?;
    let course = state
        .repo
        .get_course(chapter.course_id)
        .await?
        .ok_or_else(|| AppError::internal(format!("chapter {id} has no course")))?;
    success(
        "查询章节成功。",
        AdminChapterDetail {
            course: (&course).into(),
            chapter,
        },
    )
}

async fn ensure_course(repo: &RepositoryState, record: &ChapterRecord) -> Result<(), AppError> {
    if repo.get_course(record.course_id).await?.is_none() {
        return Err(AppError::field("courseId", "课程不存在。"));
    }
    Ok(())
}

#[utoipa::path(
    post,
    path = "/admin/chapters",
    request_body = ChapterRequest,
    responses(
        (status = 201, description = "Created", body = Chapter),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn admin_create_chapter(
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<ChapterRequest>,
) -> ApiResult<Chapter> {
    let record = validation::chapter(&payload)?;
    ensure_course(&state.repo, &record).await?;
    let chapter = state.repo.create_chapter(&record).await?;
    created("创建章节成功。", chapter)
}

#[utoipa::path(
    put,
    path = "/admin/chapters/{id}",
    params(("id" = i64, Path, description = "Chapter ID")),
    request_body = ChapterRequest,
    responses((status = 200, description = "Updated", body = Chapter))
)]
pub async fn admin_update_chapter(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(payload): JsonBody<ChapterRequest>,
) -> ApiResult<Chapter> {
    let current = found(state.repo.get_chapter(id).await?, id)?;
    let record = validation::chapter(&payload.merge(&current))?;
    ensure_course(&state.repo, &record).await?;
    let chapter = found(state.repo.update_chapter(id, &record).await?, id)?;
    success("更新章节成功。", chapter)
}

#[utoipa::path(
    delete,
    path = "/admin/chapters/{id}",
    params(("id" = i64, Path, description = "Chapter ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_chapter(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<()> {
    deleted::<Chapter>(state.repo.delete_chapter(id).await?, id)?;
    success("删除章节成功。", ())
}
