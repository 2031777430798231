// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! State shared by every session component
//!
//! Components own their own state and receive `&mut SessionContext` for the
//! collaborators and the shared resources (scheduler, write queue, stores).

use std::sync::Arc;

use pk_client_api::{Beacon, LibraryApi};
use pk_config::SessionConfig;
use pk_domain_types::{Pattern, PatternId, Tab};

use crate::history::{BrowserHistory, MemoryHistory};
use crate::media::{MediaKeepAlive, SilentKeepAlive};
use crate::renderer::{PageRenderer, PlaceholderRenderer};
use crate::scheduler::Scheduler;
use crate::settings::ShortcutTable;
use crate::storage::{keys, KeyValueStore, MemoryStore};
use crate::view_model::sync::{PendingWrite, SyncQueue, WriteReport};
use crate::view_model::view_state::ViewStateStore;
use crate::view_model::Session;

pub struct SessionContext {
    pub config: SessionConfig,
    pub api: Arc<dyn LibraryApi>,
    pub beacon: Arc<dyn Beacon>,
    /// Persistent preferences
    pub local: Box<dyn KeyValueStore>,
    /// Survives reloads only
    pub session_store: Box<dyn KeyValueStore>,
    pub history: Box<dyn BrowserHistory>,
    pub renderer: Box<dyn PageRenderer>,
    pub media: Box<dyn MediaKeepAlive>,
    pub scheduler: Scheduler,
    pub sync: SyncQueue,
    pub shortcuts: ShortcutTable,
    pub view_states: ViewStateStore,
    /// Pattern shown by the viewer, if any
    pub open_pattern: Option<Pattern>,
}

impl SessionContext {
    pub fn open_pattern_id(&self) -> Option<PatternId> {
        self.open_pattern.as_ref().map(|p| p.id)
    }

    pub fn enqueue(&mut self, write: PendingWrite) {
        self.sync.enqueue(write, &mut self.scheduler);
    }

    /// Send every queued write now
    pub async fn flush_writes(&mut self) -> Vec<WriteReport> {
        let api = Arc::clone(&self.api);
        self.sync.flush(api.as_ref(), &mut self.scheduler).await
    }

    /// Tab shown when nothing more specific applies
    pub fn default_tab(&self) -> Tab {
        self.local
            .get(keys::DEFAULT_TAB)
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(self.config.default_tab)
    }

    /// Write a session-store marker; failures are logged only
    pub fn remember(&mut self, key: &str, value: &str) {
        if let Err(err) = self.session_store.set(key, value) {
            tracing::warn!(key, error = %err, "failed to write session marker");
        }
    }

    pub fn forget(&mut self, key: &str) {
        if let Err(err) = self.session_store.remove(key) {
            tracing::warn!(key, error = %err, "failed to clear session marker");
        }
    }

    pub fn save_shortcuts(&mut self) {
        if let Err(err) = self.shortcuts.save(self.local.as_mut()) {
            tracing::warn!(error = %err, "failed to persist shortcut bindings");
        }
    }
}

/// Assembles a [`SessionContext`]
///
/// Collaborators that are not supplied default to in-memory implementations.
pub struct SessionBuilder {
    config: SessionConfig,
    api: Arc<dyn LibraryApi>,
    beacon: Arc<dyn Beacon>,
    local: Option<Box<dyn KeyValueStore>>,
    session_store: Option<Box<dyn KeyValueStore>>,
    history: Option<Box<dyn BrowserHistory>>,
    renderer: Option<Box<dyn PageRenderer>>,
    media: Option<Box<dyn MediaKeepAlive>>,
}

impl SessionBuilder {
    pub fn new(config: SessionConfig, api: Arc<dyn LibraryApi>, beacon: Arc<dyn Beacon>) -> Self {
        Self {
            config,
            api,
            beacon,
            local: None,
            session_store: None,
            history: None,
            renderer: None,
            media: None,
        }
    }

    pub fn local_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.local = Some(Box::new(store));
        self
    }

    pub fn session_store(mut self, store: impl KeyValueStore + 'static) -> Self {
        self.session_store = Some(Box::new(store));
        self
    }

    pub fn history(mut self, history: impl BrowserHistory + 'static) -> Self {
        self.history = Some(Box::new(history));
        self
    }

    pub fn renderer(mut self, renderer: impl PageRenderer + 'static) -> Self {
        self.renderer = Some(Box::new(renderer));
        self
    }

    pub fn media(mut self, media: impl MediaKeepAlive + 'static) -> Self {
        self.media = Some(Box::new(media));
        self
    }

    /// Assemble the context and the session on top of it
    pub fn build(self) -> Session {
        Session::new(self.build_context())
    }

    pub fn build_context(self) -> SessionContext {
        let local = self.local.unwrap_or_else(|| Box::new(MemoryStore::new()));
        let shortcuts = ShortcutTable::load(local.as_ref());
        let view_states = ViewStateStore::new(&self.config.default_zoom);
        let sync = SyncQueue::new(self.config.save_debounce());

        SessionContext {
            api: self.api,
            beacon: self.beacon,
            local,
            session_store: self
                .session_store
                .unwrap_or_else(|| Box::new(MemoryStore::new())),
            history: self.history.unwrap_or_else(|| Box::new(MemoryHistory::new())),
            renderer: self
                .renderer
                .unwrap_or_else(|| Box::new(PlaceholderRenderer::default())),
            media: self.media.unwrap_or_else(|| Box::new(SilentKeepAlive::new())),
            scheduler: Scheduler::new(),
            sync,
            shortcuts,
            view_states,
            open_pattern: None,
            config: self.config,
        }
    }
}
