//! Fail-soft JSON persistence over a synchronous key/value backend.
//!
//! [`Storage`] is the only place persistence failures are absorbed. Every
//! operation logs and swallows backend or (de)serialization errors, so the
//! rest of the crate can treat save/load as infallible and degrade to
//! "empty/default" when storage is unavailable.

use crate::error::Result;
use crate::paths;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

// ---------------------------------------------------------------------------
// Backend
// ---------------------------------------------------------------------------

/// Raw text storage, shaped after the browser's synchronous local storage.
pub trait KeyValueBackend: Send + Sync {
    fn get_item(&self, key: &str) -> Result<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> Result<()>;
    fn remove_item(&self, key: &str) -> Result<()>;
    fn clear(&self) -> Result<()>;
}

/// One file per key under a directory (normally `.wizard/storage/`).
#[derive(Debug, Clone)]
pub struct FileBackend {
    dir: PathBuf,
}

impl FileBackend {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl KeyValueBackend for FileBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        let path = paths::storage_entry(&self.dir, key)?;
        match std::fs::read_to_string(&path) {
            Ok(text) => Ok(Some(text)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let path = paths::storage_entry(&self.dir, key)?;
        crate::io::atomic_write(&path, value.as_bytes())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        let path = paths::storage_entry(&self.dir, key)?;
        crate::io::remove_if_exists(&path)
    }

    fn clear(&self) -> Result<()> {
        if !self.dir.exists() {
            return Ok(());
        }
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            // Only entries that look like keys; stray tempfiles are left alone.
            if entry.file_type()?.is_file() && paths::validate_key(&name).is_ok() {
                crate::io::remove_if_exists(&entry.path())?;
            }
        }
        Ok(())
    }
}

/// Process-local backend. Failures can be injected to exercise the fail-soft
/// contract.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    items: Mutex<HashMap<String, String>>,
    fail_writes: AtomicBool,
    fail_reads: AtomicBool,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a raw text value, bypassing serialization.
    pub fn with_item(self, key: &str, raw: &str) -> Self {
        self.items().insert(key.to_string(), raw.to_string());
        self
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    fn items(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.items.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn quota_exceeded() -> crate::error::WizardError {
        std::io::Error::other("storage quota exceeded").into()
    }
}

impl KeyValueBackend for MemoryBackend {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(std::io::Error::other("storage disabled").into());
        }
        Ok(self.items().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::quota_exceeded());
        }
        self.items().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::quota_exceeded());
        }
        self.items().remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(Self::quota_exceeded());
        }
        self.items().clear();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Storage adapter
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct Storage {
    backend: Arc<dyn KeyValueBackend>,
}

impl std::fmt::Debug for Storage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Storage").finish_non_exhaustive()
    }
}

impl Storage {
    pub fn new(backend: Arc<dyn KeyValueBackend>) -> Self {
        Self { backend }
    }

    /// File-backed storage rooted at `<root>/.wizard/storage`.
    pub fn on_disk(root: &Path) -> Self {
        Self::new(Arc::new(FileBackend::new(paths::storage_dir(root))))
    }

    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryBackend::new()))
    }

    /// Serialize and write. Failures are logged, never returned.
    pub fn save<T: Serialize + ?Sized>(&self, key: &str, value: &T) {
        let text = match serde_json::to_string(value) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to serialize value for storage");
                return;
            }
        };
        if let Err(e) = self.backend.set_item(key, &text) {
            tracing::error!(key, error = %e, "failed to save to storage");
        }
    }

    /// Read and parse, returning `default` when the key is absent, unreadable
    /// or unparseable.
    pub fn load<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load_optional(key).unwrap_or(default)
    }

    /// Like [`Storage::load`] but distinguishes "nothing usable" as `None`.
    pub fn load_optional<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let text = self.raw(key)?;
        match serde_json::from_str(&text) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(key, error = %e, "failed to parse stored value");
                None
            }
        }
    }

    /// Raw stored text, if any.
    pub fn raw(&self, key: &str) -> Option<String> {
        match self.backend.get_item(key) {
            Ok(text) => text,
            Err(e) => {
                tracing::error!(key, error = %e, "failed to load from storage");
                None
            }
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.raw(key).is_some()
    }

    pub fn remove(&self, key: &str) {
        if let Err(e) = self.backend.remove_item(key) {
            tracing::error!(key, error = %e, "failed to remove from storage");
        }
    }

    pub fn clear(&self) {
        if let Err(e) = self.backend.clear() {
            tracing::error!(error = %e, "failed to clear storage");
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
