pub mod health;

use axum::{
    routing::{delete, get, post, put},
    Router,
};

use crate::enhancement::handlers as enhancement;
use crate::generation::handlers as generation;
use crate::sessions::handlers as sessions;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Editor sessions
        .route("/api/v1/sessions", post(sessions::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(sessions::handle_get_session).delete(sessions::handle_delete_session),
        )
        .route("/api/v1/sessions/:id/prompt", put(sessions::handle_set_prompt))
        // Generation pipeline
        .route(
            "/api/v1/sessions/:id/generate",
            post(generation::handle_generate),
        )
        .route(
            "/api/v1/sessions/:id/answers",
            put(generation::handle_record_answer),
        )
        .route("/api/v1/sessions/:id/clarify", post(generation::handle_clarify))
        // Résumé record
        .route(
            "/api/v1/sessions/:id/resume",
            get(sessions::handle_get_resume).patch(sessions::handle_edit_resume),
        )
        .route(
            "/api/v1/sessions/:id/resume/:section/entries",
            post(sessions::handle_add_entry),
        )
        .route(
            "/api/v1/sessions/:id/resume/:section/entries/:index",
            delete(sessions::handle_remove_entry),
        )
        // Section enhancement
        .route("/api/v1/enhance", post(enhancement::handle_enhance))
        .with_state(state)
}
