// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Per-pattern zoom and scroll persistence

use pk_config::DefaultZoom;
use pk_domain_types::{PatternId, ViewState};

use crate::error::StoreError;
use crate::storage::{keys, KeyValueStore};

/// Reads and writes `viewState:<patternId>` entries of the local store
///
/// Entries are never evicted.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewStateStore {
    fallback: ViewState,
}

impl ViewStateStore {
    pub fn new(default_zoom: &DefaultZoom) -> Self {
        Self {
            fallback: ViewState {
                zoom_mode: default_zoom.mode(),
                zoom_scale: default_zoom.scale(),
                ..ViewState::default()
            },
        }
    }

    /// State used for a pattern that has never been opened
    pub fn fallback(&self) -> ViewState {
        self.fallback
    }

    pub fn load(&self, store: &dyn KeyValueStore, pattern_id: PatternId) -> ViewState {
        let Some(raw) = store.get(&keys::view_state(pattern_id)) else {
            return self.fallback;
        };
        match serde_json::from_str::<ViewState>(&raw) {
            Ok(state) if state.zoom_scale.is_finite() && state.zoom_scale > 0.0 => state,
            Ok(_) | Err(_) => {
                tracing::warn!(pattern_id, "ignoring unreadable stored view state");
                self.fallback
            }
        }
    }

    pub fn save(
        &self,
        store: &mut dyn KeyValueStore,
        pattern_id: PatternId,
        state: &ViewState,
    ) -> Result<(), StoreError> {
        let raw = serde_json::to_string(state)?;
        store.set(&keys::view_state(pattern_id), &raw)
    }
}
