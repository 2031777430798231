// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Page rendering collaborator
//!
//! The session never looks inside a document. It asks the renderer how many
//! pages there are, what scale `Fit`/`FitWidth` resolve to in the current
//! viewport, and to draw a page at a scale.

use std::sync::{Arc, Mutex, MutexGuard};

use pk_domain_types::{Pattern, PatternId, ZoomMode};

pub trait PageRenderer: Send {
    /// Load the document of `pattern`, returning its page count
    fn load(&mut self, pattern: &Pattern) -> u32;

    fn page_count(&self) -> u32;

    fn render(&mut self, page: u32, scale: f64);

    /// Transient scale applied on top of the last render, used while pinching
    fn preview(&mut self, scale: f64);

    /// Scale that a non-manual zoom mode resolves to; `Manual` yields 1.0
    fn fit_scale(&self, mode: ZoomMode) -> f64;

    fn unload(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderCall {
    pub pattern_id: PatternId,
    pub page: u32,
    pub scale: f64,
}

#[derive(Debug)]
struct PlaceholderState {
    loaded: Option<PatternId>,
    page_count: u32,
    fit: f64,
    fit_width: f64,
    renders: Vec<RenderCall>,
    preview: Option<f64>,
}

/// Renderer that draws nothing and records what it was asked to draw
///
/// Clones share state. Used by the terminal viewer, which shows a textual
/// placeholder for the page, and by tests.
#[derive(Debug, Clone)]
pub struct PlaceholderRenderer {
    state: Arc<Mutex<PlaceholderState>>,
}

impl Default for PlaceholderRenderer {
    fn default() -> Self {
        Self::new(1)
    }
}

impl PlaceholderRenderer {
    pub fn new(page_count: u32) -> Self {
        Self {
            state: Arc::new(Mutex::new(PlaceholderState {
                loaded: None,
                page_count: page_count.max(1),
                fit: 1.0,
                fit_width: 1.0,
                renders: Vec::new(),
                preview: None,
            })),
        }
    }

    pub fn with_fit_scales(self, fit: f64, fit_width: f64) -> Self {
        {
            let mut state = self.lock();
            state.fit = fit;
            state.fit_width = fit_width;
        }
        self
    }

    pub fn renders(&self) -> Vec<RenderCall> {
        self.lock().renders.clone()
    }

    pub fn last_render(&self) -> Option<RenderCall> {
        self.lock().renders.last().copied()
    }

    pub fn preview_scale(&self) -> Option<f64> {
        self.lock().preview
    }

    pub fn loaded(&self) -> Option<PatternId> {
        self.lock().loaded
    }

    fn lock(&self) -> MutexGuard<'_, PlaceholderState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PageRenderer for PlaceholderRenderer {
    fn load(&mut self, pattern: &Pattern) -> u32 {
        let mut state = self.lock();
        state.loaded = Some(pattern.id);
        state.preview = None;
        state.page_count
    }

    fn page_count(&self) -> u32 {
        self.lock().page_count
    }

    fn render(&mut self, page: u32, scale: f64) {
        let mut state = self.lock();
        let Some(pattern_id) = state.loaded else {
            return;
        };
        state.preview = None;
        state.renders.push(RenderCall {
            pattern_id,
            page,
            scale,
        });
    }

    fn preview(&mut self, scale: f64) {
        self.lock().preview = Some(scale);
    }

    fn fit_scale(&self, mode: ZoomMode) -> f64 {
        let state = self.lock();
        match mode {
            ZoomMode::Fit => state.fit,
            ZoomMode::FitWidth => state.fit_width,
            ZoomMode::Manual => 1.0,
        }
    }

    fn unload(&mut self) {
        let mut state = self.lock();
        state.loaded = None;
        state.preview = None;
    }
}
