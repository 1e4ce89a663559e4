use crate::handlers;
use crate::state::AppState;
use axum::{extract::DefaultBodyLimit, routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/options", get(handlers::options))
        .route("/api/home", get(handlers::home))
        .route("/api/calendar", get(handlers::calendar))
        .route("/api/notifications", get(handlers::notifications))
        .route("/api/notifications/:id/read", post(handlers::mark_read))
        .route("/api/editor", get(handlers::editor))
        .route("/api/editor/new", post(handlers::editor_new))
        .route("/api/editor/edit/:id", post(handlers::editor_edit))
        .route("/api/editor/commit", post(handlers::editor_commit))
        .route("/api/editor/delete", post(handlers::editor_delete))
        .route("/api/editor/clear", post(handlers::editor_clear))
        .route("/api/editor/preset/:index", post(handlers::editor_preset))
        .route(
            "/api/editor/image",
            post(handlers::editor_image).layer(DefaultBodyLimit::max(handlers::MAX_IMAGE_BYTES)),
        )
        .with_state(state)
}
