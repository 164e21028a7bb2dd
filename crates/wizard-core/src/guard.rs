//! Access control for wizard routes, derived from per-step completion.
//!
//! Completion must be contiguous from step 1: a step only counts toward the
//! furthest reachable route if every step before it is complete. Editing a
//! completed step invalidates it and everything after it.

use crate::form_data::WizardStore;
use crate::types::{Redirect, Route, StepKey, SUMMARY_INDEX};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;

/// ISO-8601 UTC timestamp with millisecond precision and a `Z` suffix.
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepCompletion {
    pub is_completed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

/// Ordinal a route requires, or `None` for routes the guard never gates.
fn required_ordinal(route: &Route) -> Option<u8> {
    match route {
        Route::Step1 => Some(1),
        Route::Step2 => Some(2),
        Route::Step3 => Some(3),
        Route::Summary => Some(SUMMARY_INDEX + 1),
        // Fail-open: the root and non-wizard routes are always reachable.
        Route::Root | Route::Other(_) => None,
    }
}

#[derive(Debug, Clone)]
pub struct FlowGuard {
    store: WizardStore,
}

impl FlowGuard {
    pub fn new(store: WizardStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &WizardStore {
        &self.store
    }

    pub fn get_step_completion(&self, step: StepKey) -> StepCompletion {
        let record = self.store.get_step_data(step);
        StepCompletion {
            is_completed: record.is_completed(),
            completed_at: record.completed_at,
        }
    }

    pub fn mark_step_completed(&self, step: StepKey) {
        let mut data = self.store.load();
        let record = data.entry(step);
        record.is_completed = Some(true);
        record.completed_at = Some(now_iso());
        self.store.save(&data);
        tracing::debug!(step = %step, "step marked completed");
    }

    /// Invalidate `step` and every later step.
    pub fn mark_step_incomplete(&self, step: StepKey) {
        let mut data = self.store.load();
        for &s in StepKey::all().iter().filter(|s| s.ordinal() >= step.ordinal()) {
            if let Some(record) = data.slot_mut(s).as_mut() {
                record.is_completed = Some(false);
                record.completed_at = None;
            }
        }
        self.store.save(&data);
        tracing::debug!(step = %step, "step and later steps marked incomplete");
    }

    /// Highest step reached by an unbroken run of completions from step 1.
    pub fn get_last_completed_step(&self) -> u8 {
        let data = self.store.load();
        let mut last = 0;
        for &step in StepKey::all() {
            if !data.get(step).is_some_and(|r| r.is_completed()) {
                break;
            }
            last = step.ordinal();
        }
        last
    }

    pub fn are_all_steps_completed(&self) -> bool {
        let data = self.store.load();
        StepKey::all()
            .iter()
            .all(|&s| data.get(s).is_some_and(|r| r.is_completed()))
    }

    pub fn get_next_allowed_step(&self) -> u8 {
        (self.get_last_completed_step() + 1).min(3)
    }

    pub fn can_access_route(&self, route: &Route) -> bool {
        match required_ordinal(route) {
            None | Some(1) => true,
            Some(n) if n > SUMMARY_INDEX => self.are_all_steps_completed(),
            Some(n) => n <= self.get_last_completed_step() + 1,
        }
    }

    /// Where to send a user standing on `location`, if they may not be there.
    pub fn redirect_to_appropriate_step(&self, location: &Route) -> Option<Redirect> {
        if self.can_access_route(location) {
            return None;
        }
        let target = Route::for_step(self.get_next_allowed_step());
        tracing::debug!(from = %location, to = %target, "redirecting locked route");
        Some(Redirect {
            to: target.path().to_string(),
            replace: true,
        })
    }

    /// Clear every completion flag while keeping field data.
    pub fn reset_all_completions(&self) {
        let mut data = self.store.load();
        for &step in StepKey::all() {
            let record = data.entry(step);
            record.is_completed = Some(false);
            record.completed_at = None;
        }
        self.store.save(&data);
    }

    pub fn should_generate_application_number(&self, location: &Route) -> bool {
        *location == Route::Summary && self.are_all_steps_completed()
    }

    /// Target for the root path. The navigation hint wins when the guard
    /// allows it; otherwise the furthest allowed step.
    pub fn resolve_root(&self, progress: u8) -> Route {
        let hinted = if progress >= SUMMARY_INDEX {
            Route::Summary
        } else {
            Route::for_step(progress + 1)
        };
        if self.can_access_route(&hinted) {
            return hinted;
        }
        if self.are_all_steps_completed() {
            return Route::Summary;
        }
        Route::for_step(self.get_next_allowed_step())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
