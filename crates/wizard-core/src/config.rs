use crate::error::Result;
use crate::paths;
use crate::submission::SimulatedSubmission;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// SubmissionConfig
// ---------------------------------------------------------------------------

/// Settings for the simulated submission backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionConfig {
    #[serde(default = "default_latency_ms")]
    pub latency_ms: u64,
    /// When set, every submission is rejected with this message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_with: Option<String>,
}

fn default_latency_ms() -> u64 {
    500
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            latency_ms: default_latency_ms(),
            fail_with: None,
        }
    }
}

impl SubmissionConfig {
    pub fn service(&self) -> SimulatedSubmission {
        match &self.fail_with {
            Some(message) => SimulatedSubmission::failing(message.clone()),
            None => SimulatedSubmission::new(Duration::from_millis(self.latency_ms)),
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// WizardConfig
// ---------------------------------------------------------------------------

/// `.wizard/config.yaml`. Every field has a default, so a missing or partial
/// file is fine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WizardConfig {
    #[serde(default = "default_prefix")]
    pub application_prefix: String,
    #[serde(default = "default_debounce_ms")]
    pub autosave_debounce_ms: u64,
    #[serde(default)]
    pub submission: SubmissionConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

fn default_prefix() -> String {
    crate::summary::DEFAULT_PREFIX.to_string()
}

fn default_debounce_ms() -> u64 {
    1000
}

impl Default for WizardConfig {
    fn default() -> Self {
        Self {
            application_prefix: default_prefix(),
            autosave_debounce_ms: default_debounce_ms(),
            submission: SubmissionConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl WizardConfig {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: WizardConfig = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// Write the default config unless one exists. Returns true if written.
    pub fn write_default_if_missing(root: &Path) -> Result<bool> {
        let data = serde_yaml::to_string(&Self::default())?;
        crate::io::write_if_missing(&paths::config_path(root), data.as_bytes())
    }

    pub fn autosave_debounce(&self) -> Duration {
        Duration::from_millis(self.autosave_debounce_ms)
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let prefix_ok = self
            .application_prefix
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase())
            && self
                .application_prefix
                .chars()
                .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if !prefix_ok {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "application_prefix '{}' must be uppercase letters and digits, starting with a letter",
                    self.application_prefix
                ),
            });
        }

        if self.autosave_debounce_ms == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "autosave_debounce_ms is 0; every keystroke will be written".to_string(),
            });
        }

        if self.server.port == 0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "server.port is 0; an ephemeral port will be chosen".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
