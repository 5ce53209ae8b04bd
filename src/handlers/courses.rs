use axum::extract::State;

use super::{deleted, found};
use crate::{
    AppState,
    auth::AdminUser,
    error::AppError,
    extract::{JsonBody, PathId, QueryParams},
    models::{
        AdminCourseDetail, Course, CourseDetail, CourseFilter, CourseRecord, CourseRequest,
        Paginated, SearchQuery,
    },
    repository::RepositoryState,
    response::{ApiResult, created, success},
    validation,
};

/// list_courses
///
/// [Public Route] Courses of one category, newest first. `categoryId` is mandatory.
#[utoipa::path(
    get,
    path = "/courses",
    params(CourseFilter),
    responses(
        (status = 200, description = "Courses", body = Paginated<Course>),
        (status = 400, description = "categoryId missing")
    )
)]
pub async fn list_courses(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<CourseFilter>,
) -> ApiResult<Paginated<Course>> {
    let Some(category_id) = query.category_id else {
        return Err(AppError::field("categoryId", "分类ID不能为空。"));
    };
    let page = query.page();
    let filter = CourseFilter {
        category_id: Some(category_id),
        ..CourseFilter::default()
    };
    let courses = state.repo.list_courses(&filter, page).await?;
    success("查询课程列表成功。", Paginated::new(courses, page))
}

/// get_course
///
/// [Public Route] The course with its category, owner and chapter list.
/// The three association lookups run concurrently once the course is known to exist.
#[utoipa::path(
    get,
    path = "/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Found", body = CourseDetail),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_course(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<CourseDetail> {
    let course = found(state.repo.get_course(id).await?, id)?;

    let (category, user, chapters) = tokio::try_join!(
        state.repo.get_category(course.category_id),
        state.repo.get_user(course.user_id),
        state.repo.list_course_chapters(course.id),
    )?;

    let category = category.ok_or_else(|| {
        AppError::internal(format!("course {} references missing category {}", id, course.category_id))
    })?;
    let user = user.ok_or_else(|| {
        AppError::internal(format!("course {} references missing user {}", id, course.user_id))
    })?;

    success(
        "查询课程成功。",
        CourseDetail {
            category: (&category).into(),
            user: (&user).into(),
            chapters,
            course,
        },
    )
}

/// search_courses
///
/// [Public Route] Courses whose name contains `name`, case-insensitively.
#[utoipa::path(
    get,
    path = "/search",
    params(SearchQuery),
    responses((status = 200, description = "Matching courses", body = Paginated<Course>))
)]
pub async fn search_courses(
    State(state): State<AppState>,
    QueryParams(query): QueryParams<SearchQuery>,
) -> ApiResult<Paginated<Course>> {
    let page = query.page();
    let filter = CourseFilter {
        name: query.name.filter(|n| !n.trim().is_empty()),
        ..CourseFilter::default()
    };
    let courses = state.repo.list_courses(&filter, page).await?;
    success("搜索课程成功。", Paginated::new(courses, page))
}

#[utoipa::path(
    get,
    path = "/admin/courses",
    params(CourseFilter),
    responses((status = 200, description = "Courses", body = Paginated<Course>))
)]
pub async fn admin_list_courses(
    State(state): State<AppState>,
    QueryParams(filter): QueryParams<CourseFilter>,
) -> ApiResult<Paginated<Course>> {
    let page = filter.page();
    let courses = state.repo.list_courses(&filter, page).await?;
    success("查询课程列表成功。", Paginated::new(courses, page))
}

#[utoipa::path(
    get,
    path = "/admin/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses((status = 200, description = "Found", body = AdminCourseDetail))
)]
pub async fn admin_get_course(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<AdminCourseDetail> {
    let course = found(state.repo.get_course(id).await?, id)?;
    let (category, user) = tokio::try_join!(
        state.repo.get_category(course.category_id),
        state.repo.get_user(course.user_id),
    )?;
    let category = category
        .ok_or_else(|| AppError::internal(format!("course {id} has no category")))?;
    let user = user.ok_or_else(|| AppError::internal(format!("course {id} has no owner")))?;

    success(
        "查询课程成功。",
        AdminCourseDetail {
            category: (&category).into(),
            user: (&user).into(),
            course,
        },
    )
}

/// Rejects a course whose category does not exist.
async fn ensure_category(repo: &RepositoryState, record: &CourseRecord) -> Result<(), AppError> {
    if repo.get_category(record.category_id).await?.is_none() {
        return Err(AppError::field("categoryId", "分类不存在。"));
    }
    Ok(())
}

/// admin_create_course
///
/// [Admin Route] The acting admin becomes the owner; a client-supplied owner is ignored.
#[utoipa::path(
    post,
    path = "/admin/courses",
    request_body = CourseRequest,
    responses(
        (status = 201, description = "Created", body = Course),
        (status = 400, description = "Validation failed")
    )
)]
pub async fn admin_create_course(
    AdminUser(admin): AdminUser,
    State(state): State<AppState>,
    JsonBody(payload): JsonBody<CourseRequest>,
) -> ApiResult<Course> {
    let record = validation::course(&payload, admin.id)?;
    ensure_category(&state.repo, &record).await?;
    let course = state.repo.create_course(&record).await?;
    created("创建课程成功。", course)
}

#[utoipa::path(
    put,
    path = "/admin/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    request_body = CourseRequest,
    responses((status = 200, description = "Updated", body = Course))
)]
pub async fn admin_update_course(
    State(state): State<AppState>,
    PathId(id): PathId,
    JsonBody(payload): JsonBody<CourseRequest>,
) -> ApiResult<Course> {
    let current = found(state.repo.get_course(id).await?, id)?;
    let owner = current.user_id;
    let record = validation::course(&payload.merge(&current), owner)?;
    ensure_category(&state.repo, &record).await?;
    let course = found(state.repo.update_course(id, &record).await?, id)?;
    success("更新课程成功。", course)
}

/// admin_delete_course
///
/// [Admin Route] Hard delete, refused while the course still has chapters.
#[utoipa::path(
    delete,
    path = "/admin/courses/{id}",
    params(("id" = i64, Path, description = "Course ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 400, description = "Course still has chapters"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn admin_delete_course(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> ApiResult<()> {
    found(state.repo.get_course(id).await?, id)?;
    if state.repo.count_chapters_in_course(id).await? > 0 {
        return Err(AppError::field("id", "当前课程有章节，无法删除。"));
    }
    deleted::<Course>(state.repo.delete_course(id).await?, id)?;
    success("删除课程成功。", ())
}
