use axum::{extract::State, Json};
use wizard_core::assist::{AssistRequest, TextAssistant};

use crate::error::AppError;
use crate::state::AppState;

/// POST /api/assist — generate a suggestion for the free-text step and
/// return it once complete. Nothing is persisted; the caller decides whether
/// to accept the text into a draft.
pub async fn suggest(
    State(app): State<AppState>,
    Json(request): Json<AssistRequest>,
) -> Result<Json<serde_json::Value>, AppError> {
    let text = app.assistant.generate(request).collect_text().await?;
    Ok(Json(serde_json::json!({ "text": text })))
}
