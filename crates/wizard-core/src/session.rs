//! One owner for everything a wizard user touches: storage handles, the
//! progress indicator, drafts, and at most one live [`Sequencer`].

use crate::autosave::{AutoSave, AutoSaveOutcome};
use crate::config::WizardConfig;
use crate::error::{Result, WizardError};
use crate::form_data::WizardStore;
use crate::guard::{FlowGuard, StepCompletion};
use crate::navigation::NavigationState;
use crate::sequencer::{CompletionResult, ErrorDescriptor, Resumed, Sequencer, StepDescriptor};
use crate::storage::Storage;
use crate::submission::SubmissionService;
use crate::summary::ApplicationSummary;
use crate::types::{Redirect, Route, StepFields, StepKey};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;

/// Outcome of submitting one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum StepOutcome {
    Next(StepDescriptor),
    Failed(ErrorDescriptor),
    Completed(CompletionResult),
}

/// What to do with a request for `location`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Visit {
    Page(Route),
    Redirect(Redirect),
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WizardSnapshot {
    pub progress: u8,
    pub steps: BTreeMap<StepKey, StepCompletion>,
    pub last_completed_step: u8,
    pub next_allowed_step: u8,
    pub all_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub application_number: Option<String>,
}

pub struct WizardSession<S> {
    store: WizardStore,
    guard: FlowGuard,
    navigation: NavigationState,
    autosave: AutoSave,
    summary: ApplicationSummary,
    service: Arc<S>,
    sequencer: Option<Sequencer<S>>,
}

impl<S: SubmissionService> WizardSession<S> {
    pub fn new(storage: Storage, service: Arc<S>, config: &WizardConfig) -> Self {
        let store = WizardStore::new(storage.clone());
        let guard = FlowGuard::new(store.clone());
        Self {
            navigation: NavigationState::load(storage.clone()),
            autosave: AutoSave::new(store.clone(), config.autosave_debounce()),
            summary: ApplicationSummary::new(
                storage,
                guard.clone(),
                config.application_prefix.clone(),
            ),
            store,
            guard,
            service,
            sequencer: None,
        }
    }

    pub fn store(&self) -> &WizardStore {
        &self.store
    }

    pub fn guard(&self) -> &FlowGuard {
        &self.guard
    }

    pub fn navigation(&self) -> &NavigationState {
        &self.navigation
    }

    pub fn navigation_mut(&mut self) -> &mut NavigationState {
        &mut self.navigation
    }

    pub fn summary(&self) -> &ApplicationSummary {
        &self.summary
    }

    // -----------------------------------------------------------------------
    // Sequencer lifecycle
    // -----------------------------------------------------------------------

    /// The live sequencer, created on first use.
    pub fn current(&mut self) -> &mut Sequencer<S> {
        let store = &self.store;
        let service = &self.service;
        self.sequencer
            .get_or_insert_with(|| Sequencer::new(store.clone(), service.clone()))
    }

    /// Discard any live sequencer and start a fresh one from storage.
    pub fn create(&mut self) -> &mut Sequencer<S> {
        self.sequencer = None;
        self.current()
    }

    pub fn reset(&mut self) {
        self.sequencer = None;
    }

    pub fn has_sequencer(&self) -> bool {
        self.sequencer.is_some()
    }

    /// Descriptor for `step` from a throwaway sequencer. Writes nothing.
    pub async fn peek(&self, step: StepKey) -> Option<StepDescriptor> {
        let mut seq = Sequencer::new(self.store.clone(), self.service.clone());
        fast_forward(&mut seq, step).await
    }

    /// Persist and submit `fields` for `step`.
    ///
    /// Locked steps are refused before anything is written. A fresh sequencer
    /// is fast-forwarded to `step`, resumed with the data, then dropped.
    pub async fn submit_step(&mut self, step: StepKey, fields: StepFields) -> Result<StepOutcome> {
        if let Some(redirect) = self.guard.redirect_to_appropriate_step(&step.route()) {
            return Err(WizardError::StepLocked {
                step: step.ordinal(),
                redirect: redirect.to,
            });
        }

        self.autosave.discard(step, fields.clone());

        let seq = self.create();
        if fast_forward(seq, step).await.is_none() {
            self.reset();
            return Err(WizardError::InvalidStep(step.to_string()));
        }
        let resumed = seq.resume(Some(fields)).await;
        self.reset();

        let outcome = match resumed {
            Resumed::Yielded(next) => StepOutcome::Next(next),
            Resumed::Returned(result) => StepOutcome::Completed(result),
            Resumed::Failed(error) => return Ok(StepOutcome::Failed(error)),
            Resumed::Exhausted => return Err(WizardError::InvalidStep(step.to_string())),
        };
        self.navigation.complete_step(step);
        Ok(outcome)
    }

    // -----------------------------------------------------------------------
    // Routing
    // -----------------------------------------------------------------------

    pub fn visit(&self, location: &Route) -> Visit {
        match location {
            Route::Root => {
                let target = self.guard.resolve_root(self.navigation.wizard_step());
                Visit::Redirect(Redirect {
                    to: target.path().to_string(),
                    replace: true,
                })
            }
            Route::Other(_) => Visit::Redirect(Redirect {
                to: Route::Step1.path().to_string(),
                replace: true,
            }),
            route => match self.guard.redirect_to_appropriate_step(route) {
                Some(redirect) => Visit::Redirect(redirect),
                None => Visit::Page(route.clone()),
            },
        }
    }

    /// Summary entry: issue (or reuse) the application number and point the
    /// progress indicator at the summary. The first entry also drops any
    /// pending drafts. `None` when not every step is complete.
    pub fn enter_summary(&mut self) -> Option<String> {
        let number = self.summary.ensure_application_number(&Route::Summary)?;
        self.navigation.set_step(crate::types::SUMMARY_INDEX);
        if self.summary.mark_completed_once() {
            self.autosave.cancel();
        }
        Some(number)
    }

    /// Forget everything about the current application.
    pub fn start_new_application(&mut self) {
        self.guard.reset_all_completions();
        self.store.clear_all();
        self.summary.clear();
        self.navigation.reset_wizard();
        self.autosave.cancel();
        self.sequencer = None;
        tracing::info!("started a new application");
    }

    /// Start over from step 1 but keep the entered answers.
    pub fn restart_keeping_answers(&mut self) {
        self.guard.reset_all_completions();
        self.summary.clear();
        self.navigation.reset_wizard();
        self.autosave.cancel();
        self.sequencer = None;
    }

    // -----------------------------------------------------------------------
    // Drafts
    // -----------------------------------------------------------------------

    pub fn load_step(&mut self, step: StepKey) -> StepFields {
        self.autosave.load(step)
    }

    pub fn draft(&mut self, step: StepKey, fields: StepFields) -> AutoSaveOutcome {
        self.autosave.on_change(step, fields, Instant::now())
    }

    pub fn tick(&mut self, now: Instant) -> Vec<StepKey> {
        self.autosave.tick(now)
    }

    pub fn flush_drafts(&mut self) -> Vec<StepKey> {
        self.autosave.flush()
    }

    pub fn next_draft_deadline(&self) -> Option<Instant> {
        self.autosave.next_deadline()
    }

    // -----------------------------------------------------------------------
    // Views
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> WizardSnapshot {
        let steps = StepKey::all()
            .iter()
            .map(|&step| (step, self.guard.get_step_completion(step)))
            .collect();
        WizardSnapshot {
            progress: self.navigation.wizard_step(),
            steps,
            last_completed_step: self.guard.get_last_completed_step(),
            next_allowed_step: self.guard.get_next_allowed_step(),
            all_completed: self.guard.are_all_steps_completed(),
            application_number: self.summary.application_number(),
        }
    }
}

/// Resume with no data until `step` is the awaited step.
async fn fast_forward<S: SubmissionService>(
    seq: &mut Sequencer<S>,
    step: StepKey,
) -> Option<StepDescriptor> {
    loop {
        match seq.resume(None).await {
            Resumed::Yielded(d) if d.step == step.ordinal() => return Some(d),
            Resumed::Yielded(_) => continue,
            _ => return None,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
