//! The resumable three-step submission protocol.
//!
//! A [`Sequencer`] suspends at each step waiting for the caller to resume it
//! with that step's data. The decision of what happens next lives in the pure
//! [`advance`] function; [`Sequencer::resume`] performs the effects
//! (persisting, calling the submission service, marking completion) and
//! feeds their outcome back into it.
//!
//! ```text
//! NotStarted ──resume──▶ AwaitingData(1) ──data ok──▶ AwaitingData(2) ──▶ AwaitingData(3) ──▶ Finished
//!                              │                          │                    │
//!                              └──── rejected ────────────┴────────────────────┴──▶ Finished (error yielded)
//! ```
//!
//! Steps are reached strictly in order within one instance. A failed
//! submission finishes the instance; retrying means creating a new one.

use crate::form_data::{WizardFormData, WizardStore};
use crate::guard::FlowGuard;
use crate::paths::PROGRESS_KEY;
use crate::submission::SubmissionService;
use crate::types::{StepFields, StepKey};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Descriptors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepDescriptor {
    pub step: u8,
    pub message: String,
    /// Whether this step was already submitted when the sequencer was created.
    pub is_complete: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorDescriptor {
    pub step: u8,
    pub is_complete: bool,
    pub has_error: bool,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletionResult {
    pub success: bool,
    pub all_data: WizardFormData,
    pub message: String,
}

fn step_message(step: StepKey) -> String {
    match step {
        StepKey::PersonalInfo => "Please provide your personal information".to_string(),
        StepKey::ProfessionalInfo => {
            "Please provide your family and financial information".to_string()
        }
        StepKey::AdditionalInfo => "Please describe your current situation".to_string(),
    }
}

fn describe(step: StepKey, saved_progress: u8) -> StepDescriptor {
    StepDescriptor {
        step: step.ordinal(),
        message: step_message(step),
        is_complete: saved_progress > step.ordinal() - 1,
    }
}

// ---------------------------------------------------------------------------
// State machine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    NotStarted,
    AwaitingData(StepKey),
    Finished,
}

/// What the driver observed since the last suspension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SequencerInput {
    /// Resumed without new data (or not yet started).
    Resume,
    /// The awaited step's data was persisted and accepted.
    Accepted,
    /// The awaited step's data was rejected by the submission service.
    Rejected(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    Yield(StepDescriptor),
    Fail(ErrorDescriptor),
    Complete,
    Exhausted,
}

/// Pure transition function of the step protocol.
pub fn advance(
    state: SequencerState,
    input: SequencerInput,
    saved_progress: u8,
) -> (SequencerState, Transition) {
    match (state, input) {
        (SequencerState::NotStarted, _) => (
            SequencerState::AwaitingData(StepKey::PersonalInfo),
            Transition::Yield(describe(StepKey::PersonalInfo, saved_progress)),
        ),
        (SequencerState::AwaitingData(step), SequencerInput::Rejected(error)) => (
            SequencerState::Finished,
            Transition::Fail(ErrorDescriptor {
                step: step.ordinal(),
                is_complete: false,
                has_error: true,
                error,
            }),
        ),
        (SequencerState::AwaitingData(step), _) => match step.next() {
            Some(next) => (
                SequencerState::AwaitingData(next),
                Transition::Yield(describe(next, saved_progress)),
            ),
            None => (SequencerState::Finished, Transition::Complete),
        },
        (SequencerState::Finished, _) => (SequencerState::Finished, Transition::Exhausted),
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Result of one [`Sequencer::resume`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum Resumed {
    Yielded(StepDescriptor),
    Failed(ErrorDescriptor),
    Returned(CompletionResult),
    /// The instance already finished; nothing more will be produced.
    Exhausted,
}

pub struct Sequencer<S> {
    id: Uuid,
    state: SequencerState,
    saved_progress: u8,
    store: WizardStore,
    guard: FlowGuard,
    service: Arc<S>,
}

impl<S: SubmissionService> Sequencer<S> {
    /// Rehydrate from persisted progress. Nothing runs until the first resume.
    pub fn new(store: WizardStore, service: Arc<S>) -> Self {
        let saved_progress = store
            .storage()
            .load_optional::<i64>(PROGRESS_KEY)
            .map(crate::navigation::clamp_progress)
            .unwrap_or(0);
        let guard = FlowGuard::new(store.clone());
        let id = Uuid::new_v4();
        tracing::debug!(sequencer = %id, saved_progress, "sequencer created");
        Self {
            id,
            state: SequencerState::NotStarted,
            saved_progress,
            store,
            guard,
            service,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SequencerState {
        self.state
    }

    /// Resume with the awaited step's data, or `None` to move on without
    /// writing or submitting anything.
    pub async fn resume(&mut self, payload: Option<StepFields>) -> Resumed {
        let input = match (self.state, payload) {
            (SequencerState::AwaitingData(step), Some(fields)) => self.submit(step, fields).await,
            _ => SequencerInput::Resume,
        };

        let (next, transition) = advance(self.state, input, self.saved_progress);
        self.state = next;

        match transition {
            Transition::Yield(descriptor) => Resumed::Yielded(descriptor),
            Transition::Fail(error) => {
                tracing::warn!(sequencer = %self.id, step = error.step, error = %error.error, "step submission failed");
                Resumed::Failed(error)
            }
            Transition::Complete => {
                tracing::info!(sequencer = %self.id, "all wizard steps submitted");
                Resumed::Returned(CompletionResult {
                    success: true,
                    all_data: self.store.load(),
                    message: "All steps completed successfully".to_string(),
                })
            }
            Transition::Exhausted => Resumed::Exhausted,
        }
    }

    async fn submit(&mut self, step: StepKey, fields: StepFields) -> SequencerInput {
        let record = self.store.set_step_data(step, fields);
        self.store
            .storage()
            .save(PROGRESS_KEY, &step.ordinal());

        match self.service.submit(step, &record.fields).await {
            Ok(response) if response.success => {
                self.guard.mark_step_completed(step);
                tracing::info!(sequencer = %self.id, step = %step, "step submitted");
                SequencerInput::Accepted
            }
            Ok(response) => SequencerInput::Rejected(response.message),
            Err(e) => SequencerInput::Rejected(e.message),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
