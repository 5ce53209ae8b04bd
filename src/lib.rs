use axum::{
    Router,
    extract::{FromRef, Request, State},
    http::{HeaderName, HeaderValue, header},
    middleware::{self, Next},
    response::{IntoResponse, Response},
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, RequestId, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

// Core application services and components.
pub mod auth;
pub mod config;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod models;
pub mod repository;
pub mod response;
pub mod validation;

// Module for routing segregation (Public, Authenticated, Admin).
pub mod routes;
use auth::{AdminUser, AuthUser};
use routes::{admin, authenticated, public};

// --- Public Re-exports ---

pub use config::AppConfig;
pub use error::AppError;
pub use repository::{MemoryRepository, PostgresRepository, RepositoryState};

/// ApiDoc
///
/// Aggregates every `#[utoipa::path]` handler and `ToSchema` model into the OpenAPI
/// document served at `/api-docs/openapi.json`.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::home::home,
        handlers::articles::list_articles, handlers::articles::get_article,
        handlers::categories::list_categories,
        handlers::courses::list_courses, handlers::courses::get_course,
        handlers::courses::search_courses,
        handlers::chapters::get_chapter,
        handlers::settings::get_settings,
        handlers::auth::sign_up, handlers::auth::sign_in, handlers::auth::admin_sign_in,
        handlers::users::get_me, handlers::users::update_info, handlers::users::update_account,
        handlers::likes::list_likes, handlers::likes::create_like, handlers::likes::delete_like,
        handlers::articles::admin_list_articles, handlers::articles::admin_get_article,
        handlers::articles::admin_create_article, handlers::articles::admin_update_article,
        handlers::articles::admin_delete_article, handlers::articles::admin_restore_article,
        handlers::categories::admin_list_categories, handlers::categories::admin_get_category,
        handlers::categories::admin_create_category, handlers::categories::admin_update_category,
        handlers::categories::admin_delete_category,
        handlers::users::admin_list_users, handlers::users::admin_get_user,
        handlers::users::admin_create_user, handlers::users::admin_update_user,
        handlers::users::admin_delete_user,
        handlers::courses::admin_list_courses, handlers::courses::admin_get_course,
        handlers::courses::admin_create_course, handlers::courses::admin_update_course,
        handlers::courses::admin_delete_course,
        handlers::chapters::admin_list_chapters, handlers::chapters::admin_get_chapter,
        handlers::chapters::admin_create_chapter, handlers::chapters::admin_update_chapter,
        handlers::chapters::admin_delete_chapter,
        handlers::settings::admin_get_settings, handlers::settings::admin_update_settings,
        handlers::charts::sex_chart, handlers::charts::user_chart,
    ),
    components(
        schemas(
            models::User, models::Article, models::Category, models::Course, models::Chapter,
            models::Setting, models::Like, models::Sex, models::Role,
            models::ChapterSummary, models::CourseBrief, models::UserBrief, models::CategoryBrief,
            models::ChapterDetail, models::CourseDetail, models::AdminCourseDetail,
            models::AdminChapterDetail, models::HomePage, models::SexChartEntry,
            models::MonthlyChart, models::TokenResponse, models::Pagination,
            models::ArticleRequest, models::CategoryRequest, models::CourseRequest,
            models::ChapterRequest, models::UserRequest, models::SignUpRequest,
            models::SignInRequest, models::UserInfoRequest, models::AccountRequest,
            models::LikeRequest, models::SettingRequest,
            error::ErrorBody, error::FieldError,
        )
    ),
    tags(
        (name = "course-platform", description = "Course platform API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, cloneable container shared by all requests: the persistence layer and the
/// immutable configuration.
#[derive(Clone)]
pub struct AppState {
    /// Repository Layer: Postgres in production, in-memory in tests.
    pub repo: RepositoryState,
    /// Configuration: The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for RepositoryState {
    fn from_ref(app_state: &AppState) -> RepositoryState {
        app_state.repo.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// user_auth
///
/// User Auth guard. If the `AuthUser` extractor rejects, the request ends here with 401.
/// On success the principal is attached to the request extensions for the handler.
async fn user_auth(user: AuthUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// admin_auth
///
/// Admin Auth guard: User Auth, then the admin role check (403 on failure).
async fn admin_auth(AdminUser(user): AdminUser, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(user);
    next.run(request).await
}

/// origin_guard
///
/// Refuses any request carrying an `Origin` header that is not on the configured allow-list.
/// Requests without an `Origin` header (same-origin, curl, server-to-server) pass through.
async fn origin_guard(State(config): State<AppConfig>, request: Request, next: Next) -> Response {
    if let Some(origin) = request.headers().get(header::ORIGIN) {
        let allowed = origin
            .to_str()
            .map(|o| config.allows_origin(o))
            .unwrap_or(false);
        if !allowed {
            tracing::warn!(?origin, "request from a foreign origin refused");
            return AppError::Forbidden("当前来源不被允许访问。".to_string()).into_response();
        }
    }
    next.run(request).await
}

/// create_router
///
/// Assembles the routing structure, applies the guards and the transport layers, and
/// registers the application state.
pub fn create_router(state: AppState) -> Router {
    // 1. CORS Configuration: only the configured origins receive allow headers.
    let origins: Vec<HeaderValue> = state
        .config
        .cors_origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(AllowOrigin::list(origins))
        .allow_headers(Any);

    // Header name constant for Request Correlation.
    let x_request_id = HeaderName::from_static("x-request-id");

    // 2. Base Router Assembly
    let base_router = Router::new()
        // Documentation: Serve the auto-generated Swagger UI.
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Public Routes: No guard applied.
        .merge(public::public_routes())
        // User Routes: Protected by User Auth.
        .merge(
            authenticated::authenticated_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), user_auth)),
        )
        // Admin Routes: Protected by Admin Auth.
        .merge(
            admin::admin_routes()
                .route_layer(middleware::from_fn_with_state(state.clone(), admin_auth)),
        )
        .with_state(state.clone());

    // 3. Observability and Correlation Layers
    base_router
        .layer(
            ServiceBuilder::new()
                // 3a. Request ID Generation: a UUID for every incoming request.
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                // 3b. Request Tracing: one span per request, carrying the request ID.
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                // 3c. Request ID Propagation: echo x-request-id back to the client.
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        // 4. CORS headers for allowed origins.
        .layer(cors)
        // 5. Origin allow-list, outermost so foreign preflights are refused as well.
        .layer(middleware::from_fn_with_state(state, origin_guard))
}

/// Span for one HTTP exchange. Fields: method, path, and the id assigned by `SetRequestIdLayer`.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let req_id = request
        .extensions()
        .get::<RequestId>()
        .and_then(|id| id.header_value().to_str().ok())
        .unwrap_or("-");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        req_id,
    )
}
