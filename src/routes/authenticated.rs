use crate::{AppState, handlers};
use axum::{
    Router,
    routing::{delete, get, put},
};

/// Authenticated Router Module
///
/// Self-service endpoints for any signed-in user. Every handler takes the user id from the
/// `AuthUser` principal; ids supplied by the client never select whose data is touched.
pub fn authenticated_routes() -> Router<AppState> {
    Router::<AppState>::new()
        // --- Profile & account ---
        .route("/users/me", get(handlers::users::get_me))
        .route("/users/info", put(handlers::users::update_info))
        .route("/users/account", put(handlers::users::update_account))
        // --- Likes ---
        // GET lists the liked courses, POST likes one (at most once per course).
        .route(
            "/likes",
            get(handlers::likes::list_likes).post(handlers::likes::create_like),
        )
        // DELETE /likes/{id}
        // Scoped by principal: deleting someone else's like is a 404.
        .route("/likes/{id}", delete(handlers::likes::delete_like))
}
