use crate::paths::FORM_DATA_KEY;
use crate::storage::Storage;
use crate::types::{StepFields, StepKey};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const IS_COMPLETED_FIELD: &str = "isCompleted";
pub const COMPLETED_AT_FIELD: &str = "completedAt";

// ---------------------------------------------------------------------------
// StepRecord
// ---------------------------------------------------------------------------

/// One step's stored payload plus its completion metadata.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StepRecord {
    #[serde(flatten)]
    pub fields: StepFields,
    #[serde(rename = "isCompleted", skip_serializing_if = "Option::is_none")]
    pub is_completed: Option<bool>,
    #[serde(rename = "completedAt", skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<String>,
}

impl StepRecord {
    /// Build a record from submitted fields. Reserved completion keys in the
    /// payload are dropped; completion is only ever set by the flow guard.
    pub fn from_fields(mut fields: StepFields) -> Self {
        fields.remove(IS_COMPLETED_FIELD);
        fields.remove(COMPLETED_AT_FIELD);
        Self {
            fields,
            is_completed: None,
            completed_at: None,
        }
    }

    /// Coerce a stored JSON value. Non-objects are rejected; mistyped
    /// reserved fields are discarded.
    fn coerce(step: StepKey, value: Value) -> Option<Self> {
        let Value::Object(mut fields) = value else {
            tracing::warn!(step = %step, "dropping non-object step record from storage");
            return None;
        };

        let is_completed = match fields.remove(IS_COMPLETED_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::Bool(b)) => Some(b),
            Some(other) => {
                tracing::warn!(step = %step, value = %other, "discarding non-boolean isCompleted");
                None
            }
        };
        let completed_at = match fields.remove(COMPLETED_AT_FIELD) {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(other) => {
                tracing::warn!(step = %step, value = %other, "discarding non-string completedAt");
                None
            }
        };

        Some(Self {
            fields,
            is_completed,
            completed_at,
        })
    }

    pub fn is_completed(&self) -> bool {
        self.is_completed.unwrap_or(false)
    }
}

// ---------------------------------------------------------------------------
// WizardFormData
// ---------------------------------------------------------------------------

/// The whole `wizard-form-data` record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "Value")]
pub struct WizardFormData {
    #[serde(rename = "personalInfo", skip_serializing_if = "Option::is_none")]
    pub personal_info: Option<StepRecord>,
    #[serde(rename = "professionalInfo", skip_serializing_if = "Option::is_none")]
    pub professional_info: Option<StepRecord>,
    #[serde(rename = "additionalInfo", skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<StepRecord>,
}

impl From<Value> for WizardFormData {
    fn from(value: Value) -> Self {
        let Value::Object(mut root) = value else {
            tracing::warn!("stored wizard form data is not an object; starting empty");
            return Self::default();
        };

        let mut data = Self::default();
        for &step in StepKey::all() {
            if let Some(raw) = root.remove(step.as_str()) {
                *data.slot_mut(step) = StepRecord::coerce(step, raw);
            }
        }
        for key in root.keys() {
            tracing::debug!(key = %key, "ignoring unknown key in wizard form data");
        }
        data
    }
}

impl WizardFormData {
    pub fn get(&self, step: StepKey) -> Option<&StepRecord> {
        match step {
            StepKey::PersonalInfo => self.personal_info.as_ref(),
            StepKey::ProfessionalInfo => self.professional_info.as_ref(),
            StepKey::AdditionalInfo => self.additional_info.as_ref(),
        }
    }

    pub fn slot_mut(&mut self, step: StepKey) -> &mut Option<StepRecord> {
        match step {
            StepKey::PersonalInfo => &mut self.personal_info,
            StepKey::ProfessionalInfo => &mut self.professional_info,
            StepKey::AdditionalInfo => &mut self.additional_info,
        }
    }

    /// Existing record for `step`, created empty if absent.
    pub fn entry(&mut self, step: StepKey) -> &mut StepRecord {
        self.slot_mut(step).get_or_insert_with(StepRecord::default)
    }

    pub fn set(&mut self, step: StepKey, record: StepRecord) {
        *self.slot_mut(step) = Some(record);
    }

    pub fn is_empty(&self) -> bool {
        StepKey::all().iter().all(|&s| self.get(s).is_none())
    }
}

// ---------------------------------------------------------------------------
// WizardStore
// ---------------------------------------------------------------------------

/// Typed access to `wizard-form-data`. Every call re-reads storage, so
/// writers never work from a stale copy.
#[derive(Debug, Clone)]
pub struct WizardStore {
    storage: Storage,
}

impl WizardStore {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    pub fn load(&self) -> WizardFormData {
        self.storage.load(FORM_DATA_KEY, WizardFormData::default())
    }

    pub fn save(&self, data: &WizardFormData) {
        self.storage.save(FORM_DATA_KEY, data);
    }

    /// Stored record for `step`, or an empty one.
    pub fn get_step_data(&self, step: StepKey) -> StepRecord {
        self.load().get(step).cloned().unwrap_or_default()
    }

    /// Replace `step`'s whole value with `fields` and persist the record.
    pub fn set_step_data(&self, step: StepKey, fields: StepFields) -> StepRecord {
        let record = StepRecord::from_fields(fields);
        self.put_step_record(step, record.clone());
        record
    }

    pub fn put_step_record(&self, step: StepKey, record: StepRecord) {
        let mut data = self.load();
        data.set(step, record);
        self.save(&data);
    }

    pub fn clear_all(&self) {
        self.storage.remove(FORM_DATA_KEY);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
