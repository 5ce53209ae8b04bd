use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{get, post},
};

/// Public Router Module
///
/// Endpoints reachable without a credential: the storefront reads, the settings row,
/// search, registration and both sign-in endpoints.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        // Liveness probe for load balancers.
        .route("/health", get(|| async { "ok" }))
        // GET /
        // Home page sections (recommended, latest, introductory).
        .route("/", get(handlers::home::home))
        .route("/articles", get(handlers::articles::list_articles))
        .route("/articles/{id}", get(handlers::articles::get_article))
        .route("/categories", get(handlers::categories::list_categories))
        // GET /courses?categoryId=
        // The category filter is mandatory.
        .route("/courses", get(handlers::courses::list_courses))
        .route("/courses/{id}", get(handlers::courses::get_course))
        .route("/chapters/{id}", get(handlers::chapters::get_chapter))
        .route("/settings", get(handlers::settings::get_settings))
        .route("/search", get(handlers::courses::search_courses))
        // --- Identity ---
        .route("/auth/sign_up", post(handlers::auth::sign_up))
        .route("/auth/sign_in", post(handlers::auth::sign_in))
        // The admin sign-in must stay outside the Admin Auth layer.
        .route("/admin/auth/sign_in", post(handlers::auth::admin_sign_in))
}
