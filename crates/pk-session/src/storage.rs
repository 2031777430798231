// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Local key-value stores
//!
//! The session keeps two of them: a persistent *local* store (shortcut
//! bindings, per-pattern view state, default tab) and a *session* store that
//! only needs to survive a reload (last viewed pattern, active tab).

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use pk_domain_types::PatternId;

use crate::error::StoreError;

/// Well-known keys
pub mod keys {
    use pk_domain_types::PatternId;

    pub const SHORTCUT_BINDINGS: &str = "shortcutBindings";
    pub const DEFAULT_TAB: &str = "defaultTab";
    pub const VIEWING_PATTERN_ID: &str = "viewingPatternId";
    pub const ACTIVE_TAB: &str = "activeTab";

    pub fn view_state(pattern_id: PatternId) -> String {
        format!("viewState:{}", pattern_id)
    }
}

pub trait KeyValueStore: Send {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&mut self, key: &str) -> Result<(), StoreError>;
}

/// In-process store; clones share the same entries
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<BTreeMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_entry(self, key: &str, value: &str) -> Self {
        self.lock().insert(key.to_string(), value.to_string());
        self
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, BTreeMap<String, String>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.lock().get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        self.lock().remove(key);
        Ok(())
    }
}

/// One JSON object file, rewritten through a temporary file on every change
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    entries: BTreeMap<String, String>,
}

impl FileStore {
    /// Open `path`, starting empty when it is missing or unreadable as JSON
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let entries = match fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<BTreeMap<String, String>>(&text) {
                Ok(entries) => entries,
                Err(err) => {
                    tracing::warn!(path = %path.display(), error = %err, "discarding corrupt store file");
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(source) => return Err(StoreError::Io { path, source }),
        };
        Ok(Self { path, entries })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<(), StoreError> {
        let io_err = |source| StoreError::Io {
            path: self.path.clone(),
            source,
        };
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let text = serde_json::to_string_pretty(&self.entries)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, text).map_err(io_err)?;
        fs::rename(&tmp, &self.path).map_err(io_err)
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.entries.get(key).map(String::as_str) == Some(value) {
            return Ok(());
        }
        self.entries.insert(key.to_string(), value.to_string());
        self.persist()
    }

    fn remove(&mut self, key: &str) -> Result<(), StoreError> {
        if self.entries.remove(key).is_some() {
            self.persist()?;
        }
        Ok(())
    }
}

/// Read a pattern id marker written by the session
pub fn read_pattern_marker(store: &dyn KeyValueStore, key: &str) -> Option<PatternId> {
    store.get(key)?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn memory_store_clones_share_entries() {
        let store = MemoryStore::new();
        let mut handle = store.clone();
        handle.set("activeTab", "settings").expect("set");
        assert_eq!(store.get("activeTab").as_deref(), Some("settings"));
        handle.remove("activeTab").expect("remove");
        assert!(store.is_empty());
    }

    #[test]
    fn file_store_persists_across_reopen() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("local.json");

        let mut store = FileStore::open(&path).expect("open");
        store.set(&keys::view_state(42), r#"{"zoomMode":"fit"}"#).expect("set");
        store.set(keys::DEFAULT_TAB, "projects").expect("set");
        store.remove(keys::DEFAULT_TAB).expect("remove");

        let reopened = FileStore::open(&path).expect("reopen");
        assert_eq!(
            reopened.get("viewState:42").as_deref(),
            Some(r#"{"zoomMode":"fit"}"#)
        );
        assert_eq!(reopened.get(keys::DEFAULT_TAB), None);
        assert!(!path.with_extension("json.tmp").exists());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{ not json").expect("write");

        let store = FileStore::open(&path).expect("open");
        assert_eq!(store.get("anything"), None);
    }

    #[test]
    fn pattern_marker_ignores_garbage() {
        let store = MemoryStore::new()
            .with_entry(keys::VIEWING_PATTERN_ID, "42")
            .with_entry("other", "abc");
        assert_eq!(read_pattern_marker(&store, keys::VIEWING_PATTERN_ID), Some(42));
        assert_eq!(read_pattern_marker(&store, "other"), None);
        assert_eq!(read_pattern_marker(&store, "missing"), None);
    }
}
