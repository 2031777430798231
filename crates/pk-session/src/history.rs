// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Browser-style history with URL fragments

use std::sync::{Arc, Mutex, MutexGuard};

/// How the current document was reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NavigationType {
    #[default]
    Navigate,
    Reload,
    BackForward,
}

pub trait BrowserHistory: Send {
    fn push_state(&mut self, fragment: &str);
    fn replace_state(&mut self, fragment: &str);
    fn current_fragment(&self) -> Option<String>;
    fn navigation_type(&self) -> NavigationType;
}

#[derive(Debug, Default)]
struct HistoryState {
    entries: Vec<String>,
    index: usize,
    navigation_type: NavigationType,
    pushes: usize,
    replaces: usize,
}

/// In-process history stack; clones share the same stack
///
/// [`MemoryHistory::back`] and [`MemoryHistory::forward`] move the cursor and
/// return the fragment that a pop-state event would carry.
#[derive(Debug, Clone, Default)]
pub struct MemoryHistory {
    state: Arc<Mutex<HistoryState>>,
}

impl MemoryHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start at `fragment`, as if the document was opened with that URL
    pub fn starting_at(fragment: &str, navigation_type: NavigationType) -> Self {
        let history = Self::default();
        {
            let mut state = history.lock();
            state.entries.push(fragment.trim_start_matches('#').to_string());
            state.navigation_type = navigation_type;
        }
        history
    }

    pub fn back(&self) -> Option<String> {
        let mut state = self.lock();
        if state.index == 0 || state.entries.is_empty() {
            return None;
        }
        state.index -= 1;
        state.entries.get(state.index).cloned()
    }

    pub fn forward(&self) -> Option<String> {
        let mut state = self.lock();
        if state.index + 1 >= state.entries.len() {
            return None;
        }
        state.index += 1;
        state.entries.get(state.index).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().entries.is_empty()
    }

    pub fn entries(&self) -> Vec<String> {
        self.lock().entries.clone()
    }

    pub fn push_count(&self) -> usize {
        self.lock().pushes
    }

    pub fn replace_count(&self) -> usize {
        self.lock().replaces
    }

    fn lock(&self) -> MutexGuard<'_, HistoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl BrowserHistory for MemoryHistory {
    fn push_state(&mut self, fragment: &str) {
        let mut state = self.lock();
        if state.entries.is_empty() {
            state.entries.push(fragment.to_string());
            state.index = 0;
        } else {
            let keep = state.index + 1;
            state.entries.truncate(keep);
            state.entries.push(fragment.to_string());
            state.index = keep;
        }
        state.pushes += 1;
    }

    fn replace_state(&mut self, fragment: &str) {
        let mut state = self.lock();
        let index = state.index;
        match state.entries.get_mut(index) {
            Some(entry) => *entry = fragment.to_string(),
            None => state.entries.push(fragment.to_string()),
        }
        state.replaces += 1;
    }

    fn current_fragment(&self) -> Option<String> {
        let state = self.lock();
        state.entries.get(state.index).filter(|f| !f.is_empty()).cloned()
    }

    fn navigation_type(&self) -> NavigationType {
        self.lock().navigation_type
    }
}
