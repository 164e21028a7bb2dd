use crate::paths::{LEGACY_CURRENT_STEP_KEY, PROGRESS_KEY};
use crate::storage::Storage;
use crate::types::{StepKey, SUMMARY_INDEX};

/// Last index reachable through `next_step`; the summary index is only set
/// explicitly.
const LAST_FORM_INDEX: u8 = 2;

/// Progress indicator (0 = step 1 … 3 = summary), stored in
/// `wizard-progress`.
///
/// Every read goes to storage, so writes made elsewhere (the sequencer, or
/// another process sharing the same store) are seen immediately. This is a
/// display and default-redirect hint only. The flow guard decides access.
#[derive(Debug, Clone)]
pub struct NavigationState {
    storage: Storage,
}

impl NavigationState {
    /// Initialize persisted progress if absent. An out-of-range stored value
    /// is clamped and written back.
    pub fn load(storage: Storage) -> Self {
        match read_raw(&storage) {
            None => storage.save(PROGRESS_KEY, &0u8),
            Some(raw) => {
                let clamped = clamp_progress(raw);
                if i64::from(clamped) != raw {
                    storage.save(PROGRESS_KEY, &clamped);
                }
            }
        }
        Self { storage }
    }

    /// Current index: `wizard-progress`, then the legacy current-step key,
    /// then 0.
    pub fn wizard_step(&self) -> u8 {
        read_raw(&self.storage).map(clamp_progress).unwrap_or(0)
    }

    pub fn next_step(&mut self) {
        let current = self.wizard_step();
        if current < LAST_FORM_INDEX {
            self.set(current + 1);
        }
    }

    pub fn previous_step(&mut self) {
        let current = self.wizard_step();
        if current > 0 {
            self.set(current - 1);
        }
    }

    pub fn reset_wizard(&mut self) {
        self.set(0);
    }

    /// Jump directly; the summary uses this to record index 3.
    pub fn set_step(&mut self, step: u8) {
        self.set(step.min(SUMMARY_INDEX));
    }

    /// Highlight the step after `step` once it has been submitted.
    pub fn complete_step(&mut self, step: StepKey) {
        self.set(step.ordinal().min(LAST_FORM_INDEX));
    }

    fn set(&mut self, step: u8) {
        self.storage.save(PROGRESS_KEY, &step);
    }
}

fn read_raw(storage: &Storage) -> Option<i64> {
    storage
        .load_optional::<i64>(PROGRESS_KEY)
        .or_else(|| storage.load_optional::<i64>(LEGACY_CURRENT_STEP_KEY))
}

/// Clamp a stored progress value into `[0, 3]`.
pub fn clamp_progress(raw: i64) -> u8 {
    if (0..=i64::from(SUMMARY_INDEX)).contains(&raw) {
        raw as u8
    } else {
        let clamped = raw.clamp(0, i64::from(SUMMARY_INDEX)) as u8;
        tracing::warn!(stored = raw, clamped, "wizard progress out of range");
        clamped
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
