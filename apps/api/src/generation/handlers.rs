//! Axum route handlers for the generation pipeline.
//!
//! Submissions return `202 Accepted` as soon as the session has entered
//! `generating`; the backend call runs on a spawned task and callers poll
//! `GET /api/v1/sessions/:id` for the outcome.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::generation::pipeline::{run_generation, SubmitKind, SubmitRejection};
use crate::sessions::SessionView;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct GenerateRequest {
    /// Replaces the session's prompt before submitting.
    #[serde(default)]
    pub prompt: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RecordAnswerRequest {
    pub field: String,
    #[serde(default)]
    pub value: String,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    /// `false` when a request was already in flight and this one was dropped.
    pub accepted: bool,
    pub session: SessionView,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions/:id/generate
///
/// Fresh submission of the session prompt. Clarification state starts over.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    request: Option<Json<GenerateRequest>>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    submit(&state, id, SubmitKind::Fresh, request.prompt).await
}

/// POST /api/v1/sessions/:id/clarify
///
/// Resubmits the prompt with extracted data, earlier answers and the
/// in-flight answers merged.
pub async fn handle_clarify(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    submit(&state, id, SubmitKind::Clarification, None).await
}

/// PUT /api/v1/sessions/:id/answers
pub async fn handle_record_answer(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<RecordAnswerRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.record_answer(request.field, request.value);
    Ok(Json(session.view(&state.display)))
}

async fn submit(
    state: &AppState,
    id: Uuid,
    kind: SubmitKind,
    prompt: Option<String>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let shared = state.sessions.get(id).await?;
    let mut session = shared.lock().await;

    let request = match session.begin_submit(kind, prompt) {
        Ok(request) => request,
        Err(SubmitRejection::Busy(status)) => {
            debug!("Session {id}: submit dropped while {status}");
            let view = session.view(&state.display);
            return Ok((
                StatusCode::ACCEPTED,
                Json(SubmitResponse {
                    accepted: false,
                    session: view,
                }),
            ));
        }
        Err(SubmitRejection::NoClarificationPending(status)) => {
            return Err(AppError::Conflict(format!(
                "No clarification questions are pending (status: {status})"
            )));
        }
    };

    info!("Session {id}: {kind:?} submission started");
    let view = session.view(&state.display);
    drop(session);

    tokio::spawn(run_generation(shared, state.generator.clone(), request));

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            accepted: true,
            session: view,
        }),
    ))
}
