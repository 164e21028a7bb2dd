use crate::debounce::Debouncer;
use crate::form_data::{StepRecord, WizardStore};
use crate::guard::FlowGuard;
use crate::types::{StepFields, StepKey};
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::{Duration, Instant};

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(1000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AutoSaveOutcome {
    /// Nothing worth saving (all values blank).
    Ignored,
    /// Identical to the last snapshot.
    Unchanged,
    /// A write is pending; `invalidated` if the step had been completed.
    Scheduled { invalidated: bool },
}

fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        Value::Array(items) => items.iter().any(has_content),
        Value::Object(map) => map.values().any(has_content),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

/// Debounces live form edits into the wizard store.
///
/// Completion invalidation is immediate even though the write itself waits
/// for the quiet period.
#[derive(Debug)]
pub struct AutoSave {
    store: WizardStore,
    guard: FlowGuard,
    debouncer: Debouncer<StepKey, StepFields>,
    snapshots: HashMap<StepKey, StepFields>,
}

impl AutoSave {
    pub fn new(store: WizardStore, window: Duration) -> Self {
        let guard = FlowGuard::new(store.clone());
        Self {
            store,
            guard,
            debouncer: Debouncer::new(window),
            snapshots: HashMap::new(),
        }
    }

    /// Saved fields for `step`; also becomes the comparison snapshot.
    pub fn load(&mut self, step: StepKey) -> StepFields {
        let fields = self.store.get_step_data(step).fields;
        self.snapshots.insert(step, fields.clone());
        fields
    }

    pub fn on_change(&mut self, step: StepKey, fields: StepFields, now: Instant) -> AutoSaveOutcome {
        if !fields.values().any(has_content) {
            return AutoSaveOutcome::Ignored;
        }
        let unchanged = match self.snapshots.get(&step) {
            Some(snapshot) => *snapshot == fields,
            None => self.store.get_step_data(step).fields == fields,
        };
        if unchanged {
            self.snapshots.insert(step, fields);
            return AutoSaveOutcome::Unchanged;
        }

        self.snapshots.insert(step, fields.clone());
        self.debouncer.schedule(step, fields, now);

        let invalidated = self.guard.get_step_completion(step).is_completed;
        if invalidated {
            self.guard.mark_step_incomplete(step);
            tracing::info!(step = %step, "edited a completed step; later steps invalidated");
        }
        AutoSaveOutcome::Scheduled { invalidated }
    }

    /// Persist drafts whose quiet period has elapsed. Returns the steps written.
    pub fn tick(&mut self, now: Instant) -> Vec<StepKey> {
        let due = self.debouncer.take_due(now);
        self.write(due)
    }

    /// Persist every pending draft immediately.
    pub fn flush(&mut self) -> Vec<StepKey> {
        let pending = self.debouncer.drain();
        self.write(pending)
    }

    /// Drop pending drafts without writing them (view teardown).
    pub fn cancel(&mut self) {
        self.debouncer.cancel_all();
        self.snapshots.clear();
    }

    /// Drop the pending draft for one step because `submitted` is being
    /// written in its place. The submitted fields become the snapshot.
    pub fn discard(&mut self, step: StepKey, submitted: StepFields) {
        self.debouncer.cancel(&step);
        self.snapshots.insert(step, submitted);
    }

    pub fn has_pending(&self) -> bool {
        !self.debouncer.is_empty()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.next_deadline()
    }

    fn write(&self, drafts: Vec<(StepKey, StepFields)>) -> Vec<StepKey> {
        let mut written = Vec::with_capacity(drafts.len());
        for (step, fields) in drafts {
            // Keep whatever completion state the record has now; a submission
            // may have landed while the draft was pending.
            let current = self.store.get_step_data(step);
            let mut record = StepRecord::from_fields(fields);
            record.is_completed = current.is_completed;
            record.completed_at = current.completed_at;
            self.store.put_step_record(step, record);
            tracing::debug!(step = %step, "draft saved");
            written.push(step);
        }
        written
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
