pub mod check;
pub mod init;
pub mod nav;
pub mod next;
pub mod reset;
pub mod serve;
pub mod state;
pub mod step;
pub mod summary;

use crate::root::require_initialized;
use anyhow::Context;
use std::path::Path;
use std::sync::Arc;
use wizard_core::config::WizardConfig;
use wizard_core::submission::SimulatedSubmission;
use wizard_core::{Storage, WizardSession};

pub type Session = WizardSession<SimulatedSubmission>;

pub fn load_config(root: &Path) -> anyhow::Result<WizardConfig> {
    WizardConfig::load(root).context("failed to load .wizard/config.yaml")
}

/// Open the on-disk session for `root` with the configured submission backend.
pub fn open_session(root: &Path) -> anyhow::Result<Session> {
    require_initialized(root)?;
    let config = load_config(root)?;
    let service = Arc::new(config.submission.service());
    Ok(WizardSession::new(Storage::on_disk(root), service, &config))
}

pub fn runtime() -> anyhow::Result<tokio::runtime::Runtime> {
    tokio::runtime::Runtime::new().context("failed to start async runtime")
}
