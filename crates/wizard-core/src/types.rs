use serde::{Deserialize, Serialize};
use std::fmt;

/// Free-form field values for one step, as submitted by the form layer.
pub type StepFields = serde_json::Map<String, serde_json::Value>;

/// Highest wizard step index; 3 means the summary was reached.
pub const SUMMARY_INDEX: u8 = 3;

// ---------------------------------------------------------------------------
// StepKey
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum StepKey {
    #[serde(rename = "personalInfo")]
    PersonalInfo,
    #[serde(rename = "professionalInfo")]
    ProfessionalInfo,
    #[serde(rename = "additionalInfo")]
    AdditionalInfo,
}

impl StepKey {
    pub fn all() -> &'static [StepKey] {
        &[
            StepKey::PersonalInfo,
            StepKey::ProfessionalInfo,
            StepKey::AdditionalInfo,
        ]
    }

    /// 1-based position in the wizard.
    pub fn ordinal(self) -> u8 {
        match self {
            StepKey::PersonalInfo => 1,
            StepKey::ProfessionalInfo => 2,
            StepKey::AdditionalInfo => 3,
        }
    }

    pub fn from_ordinal(ordinal: u8) -> Option<StepKey> {
        match ordinal {
            1 => Some(StepKey::PersonalInfo),
            2 => Some(StepKey::ProfessionalInfo),
            3 => Some(StepKey::AdditionalInfo),
            _ => None,
        }
    }

    pub fn next(self) -> Option<StepKey> {
        StepKey::from_ordinal(self.ordinal() + 1)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            StepKey::PersonalInfo => "personalInfo",
            StepKey::ProfessionalInfo => "professionalInfo",
            StepKey::AdditionalInfo => "additionalInfo",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            StepKey::PersonalInfo => "Personal Information",
            StepKey::ProfessionalInfo => "Family & Financial Information",
            StepKey::AdditionalInfo => "Situation Descriptions",
        }
    }

    pub fn route(self) -> Route {
        match self {
            StepKey::PersonalInfo => Route::Step1,
            StepKey::ProfessionalInfo => Route::Step2,
            StepKey::AdditionalInfo => Route::Step3,
        }
    }
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StepKey {
    type Err = crate::error::WizardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "personalInfo" | "personal-info" | "1" | "step1" => Ok(StepKey::PersonalInfo),
            "professionalInfo" | "professional-info" | "2" | "step2" => {
                Ok(StepKey::ProfessionalInfo)
            }
            "additionalInfo" | "additional-info" | "3" | "step3" => Ok(StepKey::AdditionalInfo),
            _ => Err(crate::error::WizardError::InvalidStep(s.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Route
// ---------------------------------------------------------------------------

/// Client-side route surface of the wizard.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Route {
    Root,
    Step1,
    Step2,
    Step3,
    Summary,
    /// Anything outside the wizard; never gated.
    Other(String),
}

impl Route {
    pub fn parse(path: &str) -> Route {
        let trimmed = path.split(['?', '#']).next().unwrap_or("");
        let trimmed = trimmed.trim_end_matches('/');
        match trimmed {
            "" => Route::Root,
            "/step1" => Route::Step1,
            "/step2" => Route::Step2,
            "/step3" => Route::Step3,
            "/summary" => Route::Summary,
            other => Route::Other(other.to_string()),
        }
    }

    /// Route for `step{n}`; anything past step 3 falls back to step 1.
    pub fn for_step(ordinal: u8) -> Route {
        StepKey::from_ordinal(ordinal)
            .map(StepKey::route)
            .unwrap_or(Route::Step1)
    }

    pub fn path(&self) -> &str {
        match self {
            Route::Root => "/",
            Route::Step1 => "/step1",
            Route::Step2 => "/step2",
            Route::Step3 => "/step3",
            Route::Summary => "/summary",
            Route::Other(p) => p.as_str(),
        }
    }

    pub fn step(&self) -> Option<StepKey> {
        match self {
            Route::Step1 => Some(StepKey::PersonalInfo),
            Route::Step2 => Some(StepKey::ProfessionalInfo),
            Route::Step3 => Some(StepKey::AdditionalInfo),
            _ => None,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A navigation the caller must perform. `replace` means the current history
/// entry is overwritten rather than a new one pushed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub to: String,
    pub replace: bool,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
