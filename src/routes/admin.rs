use crate::{
    AppState,
    handlers::{articles, categories, chapters, charts, courses, settings, users},
};
use axum::{
    Router,
    routing::{get, post},
};

/// Admin Router Module
///
/// The management surface. `create_router` wraps this whole router in the `admin_auth`
/// route layer, so every handler below runs only for an admin principal.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        // --- Articles (soft delete, with trash and restore) ---
        .route(
            "/admin/articles",
            get(articles::admin_list_articles).post(articles::admin_create_article),
        )
        .route(
            "/admin/articles/{id}",
            get(articles::admin_get_article)
                .put(articles::admin_update_article)
                .delete(articles::admin_delete_article),
        )
        .route(
            "/admin/articles/{id}/restore",
            post(articles::admin_restore_article),
        )
        // --- Categories ---
        .route(
            "/admin/categories",
            get(categories::admin_list_categories).post(categories::admin_create_category),
        )
        .route(
            "/admin/categories/{id}",
            get(categories::admin_get_category)
                .put(categories::admin_update_category)
                .delete(categories::admin_delete_category),
        )
        // --- Users (soft delete) ---
        .route(
            "/admin/users",
            get(users::admin_list_users).post(users::admin_create_user),
        )
        .route(
            "/admin/users/{id}",
            get(users::admin_get_user)
                .put(users::admin_update_user)
                .delete(users::admin_delete_user),
        )
        // --- Courses ---
        .route(
            "/admin/courses",
            get(courses::admin_list_courses).post(courses::admin_create_course),
        )
        .route(
            "/admin/courses/{id}",
            get(courses::admin_get_course)
                .put(courses::admin_update_course)
                .delete(courses::admin_delete_course),
        )
        // --- Chapters ---
        .route(
            "/admin/chapters",
            get(chapters::admin_list_chapters).post(chapters::admin_create_chapter),
        )
        .route(
            "/admin/chapters/{id}",
            get(chapters::admin_get_chapter)
                .put(chapters::admin_update_chapter)
                .delete(chapters::admin_delete_chapter),
        )
        // --- Settings (singleton) ---
        .route(
            "/admin/settings",
            get(settings::admin_get_settings).put(settings::admin_update_settings),
        )
        // --- Charts ---
        .route("/admin/charts/sex", get(charts::sex_chart))
        .route("/admin/charts/user", get(charts::user_chart))
}
