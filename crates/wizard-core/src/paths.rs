use crate::error::{Result, WizardError};
use regex::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// ---------------------------------------------------------------------------
// Directory constants
// ---------------------------------------------------------------------------

pub const WIZARD_DIR: &str = ".wizard";
pub const STORAGE_DIR: &str = ".wizard/storage";
pub const CONFIG_FILE: &str = ".wizard/config.yaml";

// ---------------------------------------------------------------------------
// Storage keys
// ---------------------------------------------------------------------------

pub const FORM_DATA_KEY: &str = "wizard-form-data";
pub const PROGRESS_KEY: &str = "wizard-progress";
pub const LEGACY_CURRENT_STEP_KEY: &str = "wizard-current-step";
pub const APPLICATION_NUMBER_KEY: &str = "application-number";
pub const COMPLETED_FLAG_KEY: &str = "wizard-completed";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn wizard_dir(root: &Path) -> PathBuf {
    root.join(WIZARD_DIR)
}

pub fn storage_dir(root: &Path) -> PathBuf {
    root.join(STORAGE_DIR)
}

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

/// File backing a single storage key. The key is validated so it can never
/// escape the storage directory.
pub fn storage_entry(dir: &Path, key: &str) -> Result<PathBuf> {
    validate_key(key)?;
    Ok(dir.join(key))
}

// ---------------------------------------------------------------------------
// Key validation
// ---------------------------------------------------------------------------

static KEY_RE: OnceLock<Regex> = OnceLock::new();

fn key_re() -> &'static Regex {
    KEY_RE.get_or_init(|| Regex::new(r"^[a-z0-9][a-z0-9\-]*[a-z0-9]$|^[a-z0-9]$").unwrap())
}

pub fn validate_key(key: &str) -> Result<()> {
    if key.is_empty() || key.len() > 64 || !key_re().is_match(key) {
        return Err(WizardError::InvalidStorageKey(key.to_string()));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
