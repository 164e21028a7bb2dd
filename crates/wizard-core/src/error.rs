use thiserror::Error;

#[derive(Debug, Error)]
pub enum WizardError {
    #[error("invalid step '{0}': expected personalInfo, professionalInfo, additionalInfo or 1-3")]
    InvalidStep(String),

    #[error("invalid storage key '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidStorageKey(String),

    #[error("step {step} is locked: complete the earlier steps first (go to {redirect})")]
    StepLocked { step: u8, redirect: String },

    #[error("step payload must be a JSON object")]
    InvalidPayload,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, WizardError>;
