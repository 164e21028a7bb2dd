use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::error::AppError;
use crate::state::{AppState, WizardEvent};

/// POST /api/navigation/{next|previous|reset} — move the progress indicator.
pub async fn navigate(
    State(app): State<AppState>,
    Path(action): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let session = app.session.clone();
    let progress = tokio::task::spawn_blocking(move || {
        let mut session = session.blocking_lock();
        let nav = session.navigation_mut();
        match action.as_str() {
            "next" => nav.next_step(),
            "previous" => nav.previous_step(),
            "reset" => nav.reset_wizard(),
            other => {
                return Err(AppError::not_found(format!(
                    "unknown navigation action '{other}'"
                )))
            }
        }
        Ok(nav.wizard_step())
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))??;

    app.notify(WizardEvent::Navigated { progress });
    Ok(Json(serde_json::json!({ "progress": progress })))
}

#[derive(Debug, Default, serde::Deserialize)]
pub struct ResetQuery {
    #[serde(default)]
    pub keep_answers: bool,
}

/// POST /api/reset — start a new application. `?keep_answers=true` only
/// clears completion and progress.
pub async fn start_new_application(
    State(app): State<AppState>,
    Query(query): Query<ResetQuery>,
) -> Result<Json<wizard_core::session::WizardSnapshot>, AppError> {
    let session = app.session.clone();
    let snapshot = tokio::task::spawn_blocking(move || {
        let mut session = session.blocking_lock();
        if query.keep_answers {
            session.restart_keeping_answers();
        } else {
            session.start_new_application();
        }
        session.snapshot()
    })
    .await
    .map_err(|e| AppError(anyhow::anyhow!("task join error: {e}")))?;

    app.notify(WizardEvent::ApplicationReset);
    Ok(Json(snapshot))
}
