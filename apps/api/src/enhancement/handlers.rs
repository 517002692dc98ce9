use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::enhancement::enhance_section;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct EnhanceRequest {
    pub section: String,
    #[serde(default)]
    pub content: Value,
}

#[derive(Debug, Serialize)]
pub struct EnhanceResponse {
    pub section: String,
    pub content: Value,
}

/// POST /api/v1/enhance
///
/// Rewrites one section's content. The result carries every field of the
/// section's layout, ready to replace the edited entry.
pub async fn handle_enhance(
    State(state): State<AppState>,
    Json(request): Json<EnhanceRequest>,
) -> Result<Json<EnhanceResponse>, AppError> {
    let content = enhance_section(&state.llm, &request.section, &request.content).await?;
    Ok(Json(EnhanceResponse {
        section: request.section.to_lowercase(),
        content,
    }))
}
