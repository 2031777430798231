// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Shared fixtures for session scenario tests

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use pk_config::SessionConfig;
use pk_domain_types::{Counter, CounterId, Pattern, PatternId, Project, ProjectId};
use pk_rest_mock_client::MockLibraryClient;
use pk_session::view_model::RawInput;
use pk_session::{
    MediaKeepAlive, MemoryHistory, MemoryStore, NavigationType, PlaceholderRenderer, Session,
    SessionBuilder, SilentKeepAlive,
};

pub fn pattern(id: PatternId, slug: &str) -> Pattern {
    Pattern {
        id,
        slug: slug.to_string(),
        name: slug.replace('-', " "),
        kind: Default::default(),
        current_page: 1,
        timer_seconds: 0,
        in_progress: false,
    }
}

pub fn counter(id: CounterId, pattern_id: PatternId, name: &str, value: i64, position: i32) -> Counter {
    Counter {
        id,
        pattern_id,
        name: name.to_string(),
        value,
        position,
    }
}

pub fn project(id: ProjectId, name: &str, pattern_ids: &[PatternId]) -> Project {
    Project {
        id,
        name: name.to_string(),
        pattern_ids: pattern_ids.to_vec(),
    }
}

/// A session wired to in-memory collaborators, with handles to inspect them
pub struct Harness {
    pub session: Session,
    pub api: MockLibraryClient,
    pub local: MemoryStore,
    pub session_store: MemoryStore,
    pub history: MemoryHistory,
    pub renderer: PlaceholderRenderer,
    pub media: SilentKeepAlive,
}

pub struct HarnessBuilder {
    config: SessionConfig,
    api: MockLibraryClient,
    local: MemoryStore,
    session_store: MemoryStore,
    history: MemoryHistory,
    renderer: PlaceholderRenderer,
}

impl HarnessBuilder {
    pub fn new(api: MockLibraryClient) -> Self {
        Self {
            config: SessionConfig::default(),
            api,
            local: MemoryStore::new(),
            session_store: MemoryStore::new(),
            history: MemoryHistory::new(),
            renderer: PlaceholderRenderer::new(12),
        }
    }

    pub fn config(mut self, apply: impl FnOnce(&mut SessionConfig)) -> Self {
        apply(&mut self.config);
        self
    }

    pub fn local(mut self, store: MemoryStore) -> Self {
        self.local = store;
        self
    }

    pub fn session_store(mut self, store: MemoryStore) -> Self {
        self.session_store = store;
        self
    }

    pub fn history(mut self, fragment: &str, navigation_type: NavigationType) -> Self {
        self.history = MemoryHistory::starting_at(fragment, navigation_type);
        self
    }

    pub fn renderer(mut self, renderer: PlaceholderRenderer) -> Self {
        self.renderer = renderer;
        self
    }

    pub fn build(self) -> Harness {
        let media = SilentKeepAlive::new();
        let session = SessionBuilder::new(
            self.config,
            Arc::new(self.api.clone()),
            Arc::new(self.api.clone()),
        )
        .local_store(self.local.clone())
        .session_store(self.session_store.clone())
        .history(self.history.clone())
        .renderer(self.renderer.clone())
        .media(media.clone())
        .build();

        Harness {
            session,
            api: self.api,
            local: self.local,
            session_store: self.session_store,
            history: self.history,
            renderer: self.renderer,
            media,
        }
    }
}

impl Harness {
    pub fn new(api: MockLibraryClient) -> Self {
        HarnessBuilder::new(api).build()
    }

    pub async fn key(&mut self, key: &str) {
        let _ = self.session.handle_input(RawInput::key(key)).await;
    }

    pub fn media_playing(&self) -> bool {
        self.media.is_playing()
    }

    /// Advance the paused clock one second at a time, firing due slots
    pub async fn advance_secs(&mut self, seconds: u64) {
        for _ in 0..seconds {
            tokio::time::advance(Duration::from_secs(1)).await;
            self.session.run_due().await;
        }
    }

    /// Advance past the save debounce so queued writes reach the mock
    pub async fn settle(&mut self) {
        let debounce = self.session.ctx().config.save_debounce();
        tokio::time::advance(debounce + Duration::from_millis(1)).await;
        self.session.run_due().await;
    }
}
