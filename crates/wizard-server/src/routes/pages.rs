use axum::extract::State;
use axum::http::Uri;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use wizard_core::{Route, Visit};

use crate::error::AppError;
use crate::state::{AppState, WizardEvent};

/// GET `/`, `/step1`..`/step3`, `/summary` and every unmatched path.
///
/// Locked or unknown locations answer with a 307 to where the user belongs.
/// Reachable locations answer with the page model the form layer renders.
pub async fn page(State(app): State<AppState>, uri: Uri) -> Result<Response, AppError> {
    let location = Route::parse(uri.path());
    let mut session = app.session.lock().await;

    let route = match session.visit(&location) {
        Visit::Redirect(redirect) => {
            tracing::debug!(from = %location, to = %redirect.to, "page redirect");
            return Ok(Redirect::temporary(&redirect.to).into_response());
        }
        Visit::Page(route) => route,
    };

    if route == Route::Summary {
        let Some(number) = session.enter_summary() else {
            return Ok(Redirect::temporary(Route::Step1.path()).into_response());
        };
        let body = serde_json::json!({
            "route": route.path(),
            "applicationNumber": number,
            "data": session.store().load(),
            "state": session.snapshot(),
        });
        drop(session);
        app.notify(WizardEvent::SummaryEntered {
            application_number: number,
        });
        return Ok(Json(body).into_response());
    }

    let Some(step) = route.step() else {
        return Ok(Redirect::temporary(Route::Step1.path()).into_response());
    };
    let descriptor = session.peek(step).await;
    let fields = session.load_step(step);
    let completion = session.guard().get_step_completion(step);

    Ok(Json(serde_json::json!({
        "route": route.path(),
        "step": step,
        "title": step.title(),
        "descriptor": descriptor,
        "fields": fields,
        "completion": completion,
        "progress": session.navigation().wizard_step(),
    }))
    .into_response())
}
