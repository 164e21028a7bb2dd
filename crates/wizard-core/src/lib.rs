pub mod assist;
pub mod autosave;
pub mod config;
pub mod debounce;
pub mod error;
pub mod form_data;
pub mod guard;
pub mod io;
pub mod navigation;
pub mod paths;
pub mod sequencer;
pub mod session;
pub mod storage;
pub mod submission;
pub mod summary;
pub mod types;

pub use error::{Result, WizardError};
pub use session::{StepOutcome, Visit, WizardSession};
pub use storage::Storage;
pub use types::{Route, StepFields, StepKey};
