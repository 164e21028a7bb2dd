use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use wizard_core::assist::AssistError;
use wizard_core::error::WizardError;

// ---------------------------------------------------------------------------
// Internal sentinel for explicit 404 Not Found errors
// ---------------------------------------------------------------------------

/// Private sentinel error type used to carry an explicit HTTP 404 through
/// the `anyhow::Error` chain without touching the `WizardError` enum.
#[derive(Debug)]
struct NotFoundError(String);

impl std::fmt::Display for NotFoundError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for NotFoundError {}

// ---------------------------------------------------------------------------
// AppError — unified error type for HTTP responses
// ---------------------------------------------------------------------------

/// Unified error type for HTTP responses.
#[derive(Debug)]
pub struct AppError(pub anyhow::Error);

impl AppError {
    /// Construct a 404 Not Found error.
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self(NotFoundError(msg.into()).into())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Some(n) = self.0.downcast_ref::<NotFoundError>() {
            let body = serde_json::json!({ "error": n.0.clone() });
            return (StatusCode::NOT_FOUND, axum::Json(body)).into_response();
        }
        if self.0.downcast_ref::<AssistError>().is_some() {
            let body = serde_json::json!({ "error": self.0.to_string() });
            return (StatusCode::BAD_GATEWAY, axum::Json(body)).into_response();
        }

        let status = if let Some(e) = self.0.downcast_ref::<WizardError>() {
            match e {
                WizardError::InvalidStep(_)
                | WizardError::InvalidStorageKey(_)
                | WizardError::InvalidPayload => StatusCode::BAD_REQUEST,
                WizardError::StepLocked { redirect, .. } => {
                    let body = serde_json::json!({
                        "error": e.to_string(),
                        "redirect": redirect,
                    });
                    return (StatusCode::CONFLICT, axum::Json(body)).into_response();
                }
                WizardError::Io(_) | WizardError::Yaml(_) | WizardError::Json(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        let body = serde_json::json!({ "error": self.0.to_string() });
        (status, axum::Json(body)).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}
