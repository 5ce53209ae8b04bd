use axum::extract::State;

use crate::{
    AppState,
    models::{CourseFilter, HomePage, Page},
    response::{ApiResult, success},
};

/// Number of courses in each home page section.
const SECTION_SIZE: i64 = 10;

/// home
///
/// [Public Route] Recommended, latest and introductory courses, fetched concurrently.
#[utoipa::path(
    get,
    path = "/",
    responses((status = 200, description = "Home page sections", body = HomePage))
)]
pub async fn home(State(state): State<AppState>) -> ApiResult<HomePage> {
    let page = Page::new(Some(1), Some(SECTION_SIZE));
    let recommended = CourseFilter {
        recommended: Some(true),
        ..CourseFilter::default()
    };
    let introductory = CourseFilter {
        introductory: Some(true),
        ..CourseFilter::default()
    };
    let latest = CourseFilter::default();

    let (recommended, latest, introductory) = tokio::try_join!(
        state.repo.list_courses(&recommended, page),
        state.repo.list_courses(&latest, page),
        state.repo.list_courses(&introductory, page),
    )?;

    success(
        "获取首页数据成功。",
        HomePage {
            recommended_courses: recommended.items,
            latest_courses: latest.items,
            introductory_courses: introductory.items,
        },
    )
}
