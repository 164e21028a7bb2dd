use crate::guard::FlowGuard;
use crate::paths::{APPLICATION_NUMBER_KEY, COMPLETED_FLAG_KEY};
use crate::storage::Storage;
use crate::types::Route;
use chrono::{Local, NaiveDate};
use rand::Rng;
use regex::Regex;
use std::sync::OnceLock;

pub const DEFAULT_PREFIX: &str = "SSA";

static NUMBER_RE: OnceLock<Regex> = OnceLock::new();

fn number_re() -> &'static Regex {
    NUMBER_RE.get_or_init(|| Regex::new(r"^[A-Z][A-Z0-9]*-\d{8}-\d{4}$").unwrap())
}

/// `PREFIX-YYYYMMDD-NNNN`.
pub fn is_valid_application_number(number: &str) -> bool {
    number_re().is_match(number)
}

pub fn generate_application_number<R: Rng + ?Sized>(
    prefix: &str,
    date: NaiveDate,
    rng: &mut R,
) -> String {
    let serial: u16 = rng.gen_range(0..10_000);
    format!("{prefix}-{}-{serial:04}", date.format("%Y%m%d"))
}

/// Issues the application reference number once the summary is reached.
#[derive(Debug, Clone)]
pub struct ApplicationSummary {
    storage: Storage,
    guard: FlowGuard,
    prefix: String,
}

impl ApplicationSummary {
    pub fn new(storage: Storage, guard: FlowGuard, prefix: impl Into<String>) -> Self {
        Self {
            storage,
            guard,
            prefix: prefix.into(),
        }
    }

    /// Stored number, if present and well-formed.
    pub fn application_number(&self) -> Option<String> {
        self.storage
            .load_optional::<String>(APPLICATION_NUMBER_KEY)
            .filter(|n| is_valid_application_number(n))
    }

    /// Number for a viewer standing on `location`. `None` unless the guard
    /// allows issuing one there; otherwise the stored number is reused, or a
    /// new one is issued and persisted.
    pub fn ensure_application_number(&self, location: &Route) -> Option<String> {
        if !self.guard.should_generate_application_number(location) {
            return None;
        }
        if let Some(existing) = self.application_number() {
            return Some(existing);
        }

        let number = generate_application_number(
            &self.prefix,
            Local::now().date_naive(),
            &mut rand::thread_rng(),
        );
        self.storage.save(APPLICATION_NUMBER_KEY, &number);
        tracing::info!(application_number = %number, "application number issued");
        Some(number)
    }

    /// Set the completion flag. Returns true only the first time, so one-off
    /// cleanup can hang off it.
    pub fn mark_completed_once(&self) -> bool {
        if self.storage.load(COMPLETED_FLAG_KEY, false) {
            return false;
        }
        self.storage.save(COMPLETED_FLAG_KEY, &true);
        true
    }

    pub fn is_completed(&self) -> bool {
        self.storage.load(COMPLETED_FLAG_KEY, false)
    }

    /// Forget the number and completion flag ("start new application").
    pub fn clear(&self) {
        self.storage.remove(APPLICATION_NUMBER_KEY);
        self.storage.remove(COMPLETED_FLAG_KEY);
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
