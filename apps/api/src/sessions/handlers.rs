//! Axum route handlers for editor sessions and direct résumé edits.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::resume::{FieldEdit, ResumeRecord, Section};
use crate::sessions::SessionView;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetPromptRequest {
    pub prompt: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditResponse {
    pub resume: ResumeRecord,
    /// Inline message for the edited field; `None` when the value is valid.
    pub validation_error: Option<String>,
}

fn parse_section(key: &str) -> Result<Section, AppError> {
    Section::from_key(key).ok_or_else(|| AppError::Validation(format!("Unknown section '{key}'")))
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<SessionView>) {
    let session = state.sessions.create().await;
    let view = session.lock().await.view(&state.display);
    (StatusCode::CREATED, Json(view))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let view = session.lock().await.view(&state.display);
    Ok(Json(view))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.sessions.remove(id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /api/v1/sessions/:id/prompt
///
/// Editing the prompt after a failed generation clears the error.
pub async fn handle_set_prompt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SetPromptRequest>,
) -> Result<Json<SessionView>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.set_prompt(request.prompt);
    Ok(Json(session.view(&state.display)))
}

/// GET /api/v1/sessions/:id/resume
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ResumeRecord>, AppError> {
    let session = state.sessions.get(id).await?;
    let resume = session.lock().await.resume().clone();
    Ok(Json(resume))
}

/// PATCH /api/v1/sessions/:id/resume
///
/// Applies one field edit. The edit always lands; a failed field check is
/// reported back as `validationError`.
pub async fn handle_edit_resume(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(edit): Json<FieldEdit>,
) -> Result<Json<EditResponse>, AppError> {
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    let validation_error = session.apply_edit(&edit)?;
    Ok(Json(EditResponse {
        resume: session.resume().clone(),
        validation_error,
    }))
}

/// POST /api/v1/sessions/:id/resume/:section/entries
pub async fn handle_add_entry(
    State(state): State<AppState>,
    Path((id, section)): Path<(Uuid, String)>,
) -> Result<(StatusCode, Json<ResumeRecord>), AppError> {
    let section = parse_section(&section)?;
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.add_entry(section)?;
    Ok((StatusCode::CREATED, Json(session.resume().clone())))
}

/// DELETE /api/v1/sessions/:id/resume/:section/entries/:index
pub async fn handle_remove_entry(
    State(state): State<AppState>,
    Path((id, section, index)): Path<(Uuid, String, usize)>,
) -> Result<Json<ResumeRecord>, AppError> {
    let section = parse_section(&section)?;
    let session = state.sessions.get(id).await?;
    let mut session = session.lock().await;
    session.remove_entry(section, index)?;
    Ok(Json(session.resume().clone()))
}
