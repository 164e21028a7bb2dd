use axum::extract::State;
use axum::Json;

use crate::error::AppError;
use crate::state::AppState;

/// GET /api/state — completion flags, progress, and the application number.
pub async fn get_state(
    State(app): State<AppState>,
) -> Result<Json<wizard_core::session::WizardSnapshot>, AppError> {
    let session = app.session.clone();
    let snapshot = tokio::task::spawn_blocking(move || session.blocking_lock().snapshot())
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(snapshot))
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
