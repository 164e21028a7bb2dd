use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, Mutex};
use wizard_core::assist::CannedAssistant;
use wizard_core::config::WizardConfig;
use wizard_core::submission::SimulatedSubmission;
use wizard_core::{StepKey, Storage, WizardSession};

pub type Session = WizardSession<SimulatedSubmission>;

/// Broadcast to SSE subscribers whenever persisted wizard state changes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WizardEvent {
    DraftsSaved { steps: Vec<StepKey> },
    StepSubmitted { step: StepKey, accepted: bool },
    Navigated { progress: u8 },
    SummaryEntered { application_number: String },
    ApplicationReset,
}

const AUTOSAVE_TICK: Duration = Duration::from_millis(250);

/// Shared application state passed to all route handlers.
#[derive(Clone)]
pub struct AppState {
    pub root: PathBuf,
    pub config: Arc<WizardConfig>,
    pub session: Arc<Mutex<Session>>,
    pub assistant: Arc<CannedAssistant>,
    pub event_tx: broadcast::Sender<WizardEvent>,
}

impl AppState {
    /// Load `.wizard/config.yaml` (defaults if absent or unreadable) and open
    /// the on-disk session under `root`.
    pub fn new(root: PathBuf) -> Self {
        let config = WizardConfig::load(&root).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to load wizard config; using defaults");
            WizardConfig::default()
        });
        Self::with_config(root, config)
    }

    pub fn with_config(root: PathBuf, config: WizardConfig) -> Self {
        for warning in config.validate() {
            tracing::warn!(level = ?warning.level, "{}", warning.message);
        }

        let storage = Storage::on_disk(&root);
        let service = Arc::new(config.submission.service());
        let session = WizardSession::new(storage, service, &config);
        let (tx, _) = broadcast::channel(64);

        let state = Self {
            root,
            config: Arc::new(config),
            session: Arc::new(Mutex::new(session)),
            assistant: Arc::new(CannedAssistant::new(Duration::from_millis(20))),
            event_tx: tx,
        };

        // Drive the auto-save debouncer and broadcast when drafts land.
        // Guard: only spawn if inside a Tokio runtime (skipped in sync unit tests).
        if tokio::runtime::Handle::try_current().is_ok() {
            let session = Arc::downgrade(&state.session);
            let tx = state.event_tx.clone();
            tokio::spawn(async move {
                loop {
                    tokio::time::sleep(AUTOSAVE_TICK).await;
                    let Some(session) = session.upgrade() else {
                        break;
                    };
                    let written = session.lock().await.tick(Instant::now());
                    if !written.is_empty() {
                        let _ = tx.send(WizardEvent::DraftsSaved { steps: written });
                    }
                }
            });
        }

        state
    }

    /// Tell SSE subscribers that wizard state changed.
    pub fn notify(&self, event: WizardEvent) {
        let _ = self.event_tx.send(event);
    }
}
