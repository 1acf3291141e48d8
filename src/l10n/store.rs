//! Durable slot holding the visitor's selected locale.

use std::collections::BTreeMap;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::{
    Mutex,
    PoisonError,
};

use serde_json::Value;

use crate::l10n::error::StoreError;
use crate::types::LocaleId;

/// Persisted locale preference.
///
/// Callers treat a failed `set` as non-fatal: the page stays usable even if
/// the preference is not remembered.
pub trait LocaleStore: Send + Sync {
    /// Stored locale, or `None` when nothing usable is stored.
    fn get(&self) -> Option<LocaleId>;

    /// # Errors
    /// Returns an error when the slot cannot be written.
    fn set(&self, locale: &LocaleId) -> Result<(), StoreError>;
}

/// Slot that lives only as long as the process.
#[derive(Debug, Default)]
pub struct MemoryLocaleStore {
    /// Current preference
    slot: Mutex<Option<LocaleId>>,
}

impl MemoryLocaleStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_locale(locale: LocaleId) -> Self {
        Self { slot: Mutex::new(Some(locale)) }
    }
}

impl LocaleStore for MemoryLocaleStore {
    fn get(&self) -> Option<LocaleId> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    fn set(&self, locale: &LocaleId) -> Result<(), StoreError> {
        *self.slot.lock().unwrap_or_else(PoisonError::into_inner) = Some(locale.clone());
        Ok(())
    }
}

/// A JSON key/value file standing in for origin-scoped browser storage.
///
/// Only the entry under `key` is touched. Other entries are written back
/// as they were read, whatever their JSON type.
#[derive(Debug, Clone)]
pub struct FileLocaleStore {
    /// Storage file
    path: PathBuf,
    /// Entry holding the preference
    key: String,
}

impl FileLocaleStore {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, key: impl Into<String>) -> Self {
        Self { path: path.into(), key: key.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Top-level entries of the file. Missing or unreadable files read as empty.
    fn read_entries(&self) -> BTreeMap<String, Value> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return BTreeMap::new(),
            Err(e) => {
                tracing::warn!("Failed to read locale store {:?}: {}", self.path, e);
                return BTreeMap::new();
            }
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!("Ignoring malformed locale store {:?}: {}", self.path, e);
            BTreeMap::new()
        })
    }
}

impl LocaleStore for FileLocaleStore {
    fn get(&self) -> Option<LocaleId> {
        match self.read_entries().remove(&self.key) {
            Some(Value::String(locale)) if !locale.is_empty() => Some(LocaleId::from(locale)),
            _ => None,
        }
    }

    fn set(&self, locale: &LocaleId) -> Result<(), StoreError> {
        let mut entries = self.read_entries();
        entries.insert(self.key.clone(), Value::String(locale.to_string()));
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, serde_json::to_string_pretty(&entries)?)?;
        tracing::debug!(locale = %locale, path = ?self.path, "Persisted locale preference");
        Ok(())
    }
}
