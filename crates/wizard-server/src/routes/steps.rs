use axum::{
    extract::{Path, State},
    Json,
};
use wizard_core::autosave::AutoSaveOutcome;
use wizard_core::{StepFields, StepKey, StepOutcome, WizardError};

use crate::error::AppError;
use crate::state::{AppState, WizardEvent};

fn into_fields(body: serde_json::Value) -> Result<StepFields, WizardError> {
    match body {
        serde_json::Value::Object(map) => Ok(map),
        _ => Err(WizardError::InvalidPayload),
    }
}

// ---------------------------------------------------------------------------
// Draft
// ---------------------------------------------------------------------------

/// PUT /api/steps/{step}/draft — feed a live edit to the auto-saver.
pub async fn save_draft(
    State(app): State<AppState>,
    Path(step): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<AutoSaveOutcome>, AppError> {
    let step: StepKey = step.parse()?;
    let fields = into_fields(body)?;
    let session = app.session.clone();
    let outcome = tokio::task::spawn_blocking(move || session.blocking_lock().draft(step, fields))
        .await
        .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;
    Ok(Json(outcome))
}

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

/// POST /api/steps/{step}/submit — persist and submit a step's data.
///
/// A rejected submission is still a 200: the outcome carries the error
/// descriptor. Locked steps are a 409 with the redirect target.
pub async fn submit_step(
    State(app): State<AppState>,
    Path(step): Path<String>,
    Json(body): Json<serde_json::Value>,
) -> Result<Json<StepOutcome>, AppError> {
    let step: StepKey = step.parse()?;
    let fields = into_fields(body)?;

    let outcome = app.session.lock().await.submit_step(step, fields).await?;

    let accepted = !matches!(outcome, StepOutcome::Failed(_));
    app.notify(WizardEvent::StepSubmitted { step, accepted });
    Ok(Json(outcome))
}
