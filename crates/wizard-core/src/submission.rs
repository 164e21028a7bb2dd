use crate::types::{StepFields, StepKey};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Mutex;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub success: bool,
    pub message: String,
}

/// A rejected submission (network failure, service refusal, ...).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("{message}")]
pub struct SubmitError {
    pub message: String,
}

impl SubmitError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// The form submission collaborator each step's data is sent to.
pub trait SubmissionService: Send + Sync {
    fn submit(
        &self,
        step: StepKey,
        payload: &StepFields,
    ) -> impl Future<Output = Result<SubmitResponse, SubmitError>> + Send;
}

// ---------------------------------------------------------------------------
// SimulatedSubmission
// ---------------------------------------------------------------------------

/// Stand-in backend: waits `latency`, then accepts the payload or, when
/// configured, rejects every submission with a fixed message.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSubmission {
    latency: Duration,
    fail_with: Option<String>,
}

impl SimulatedSubmission {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            fail_with: None,
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            latency: Duration::ZERO,
            fail_with: Some(message.into()),
        }
    }
}

impl SubmissionService for SimulatedSubmission {
    async fn submit(
        &self,
        step: StepKey,
        payload: &StepFields,
    ) -> Result<SubmitResponse, SubmitError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if let Some(message) = &self.fail_with {
            tracing::info!(step = %step, "simulated submission rejected");
            return Err(SubmitError::new(message.clone()));
        }
        tracing::info!(step = %step, fields = payload.len(), "simulated submission accepted");
        Ok(SubmitResponse {
            success: true,
            message: format!("{} submitted successfully", step.title()),
        })
    }
}

// ---------------------------------------------------------------------------
// ScriptedSubmission
// ---------------------------------------------------------------------------

/// Replays queued outcomes in order and records every call. Once the script
/// runs out, submissions succeed.
#[derive(Debug, Default)]
pub struct ScriptedSubmission {
    script: Mutex<VecDeque<Result<SubmitResponse, SubmitError>>>,
    calls: Mutex<Vec<(StepKey, StepFields)>>,
}

impl ScriptedSubmission {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(self, outcome: Result<SubmitResponse, SubmitError>) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(outcome);
        self
    }

    pub fn calls(&self) -> Vec<(StepKey, StepFields)> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl SubmissionService for ScriptedSubmission {
    async fn submit(
        &self,
        step: StepKey,
        payload: &StepFields,
    ) -> Result<SubmitResponse, SubmitError> {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push((step, payload.clone()));
        let next = self
            .script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .pop_front();
        next.unwrap_or_else(|| {
            Ok(SubmitResponse {
                success: true,
                message: "ok".to_string(),
            })
        })
    }
}
