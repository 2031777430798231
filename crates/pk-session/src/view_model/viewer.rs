// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Page and zoom state of the open pattern

use pk_domain_types::{Pattern, PatternId, ViewState, ZoomMode};
use tracing::{debug, warn};

use crate::context::SessionContext;
use crate::view_model::sync::PendingWrite;

pub const ZOOM_STEP: f64 = 0.10;
pub const MIN_ZOOM: f64 = 0.25;
pub const MAX_ZOOM: f64 = 5.0;

/// Clamp to the supported range and round to two decimals
pub fn normalize_scale(scale: f64) -> f64 {
    let clamped = scale.clamp(MIN_ZOOM, MAX_ZOOM);
    (clamped * 100.0).round() / 100.0
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Pinch {
    start_scale: f64,
    start_distance: f64,
    preview: f64,
}

#[derive(Debug)]
pub struct PatternViewer {
    pattern_id: PatternId,
    page: u32,
    page_count: u32,
    view_state: ViewState,
    pinch: Option<Pinch>,
}

impl PatternViewer {
    /// Load the document, restore its view state and draw the current page
    pub fn open(ctx: &mut SessionContext, pattern: &Pattern) -> Self {
        let page_count = ctx.renderer.load(pattern).max(1);
        let view_state = ctx.view_states.load(ctx.local.as_ref(), pattern.id);
        let mut viewer = Self {
            pattern_id: pattern.id,
            page: pattern.current_page.clamp(1, page_count),
            page_count,
            view_state,
            pinch: None,
        };
        viewer.save_view_state(ctx);
        viewer.render(ctx);
        viewer
    }

    pub fn pattern_id(&self) -> PatternId {
        self.pattern_id
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_count(&self) -> u32 {
        self.page_count
    }

    pub fn view_state(&self) -> ViewState {
        self.view_state
    }

    pub fn is_pinching(&self) -> bool {
        self.pinch.is_some()
    }

    /// Scale the page is drawn at, resolving fit modes through the renderer
    pub fn effective_scale(&self, ctx: &SessionContext) -> f64 {
        match self.view_state.zoom_mode {
            ZoomMode::Manual => self.view_state.zoom_scale,
            mode => ctx.renderer.fit_scale(mode),
        }
    }

    pub fn next_page(&mut self, ctx: &mut SessionContext) -> bool {
        self.go_to_page(ctx, self.page.saturating_add(1))
    }

    pub fn prev_page(&mut self, ctx: &mut SessionContext) -> bool {
        self.go_to_page(ctx, self.page.saturating_sub(1))
    }

    /// Returns false when `page` clamps to the current page
    pub fn go_to_page(&mut self, ctx: &mut SessionContext, page: u32) -> bool {
        let page = page.clamp(1, self.page_count);
        if page == self.page {
            return false;
        }
        self.page = page;
        if let Some(pattern) = ctx.open_pattern.as_mut().filter(|p| p.id == self.pattern_id) {
            pattern.current_page = page;
        }
        ctx.enqueue(PendingWrite::Page {
            pattern_id: self.pattern_id,
            page,
        });
        self.render(ctx);
        true
    }

    pub fn zoom_in(&mut self, ctx: &mut SessionContext) -> f64 {
        self.zoom_by(ctx, ZOOM_STEP)
    }

    pub fn zoom_out(&mut self, ctx: &mut SessionContext) -> f64 {
        self.zoom_by(ctx, -ZOOM_STEP)
    }

    fn zoom_by(&mut self, ctx: &mut SessionContext, step: f64) -> f64 {
        let scale = normalize_scale(self.effective_scale(ctx) + step);
        self.set_manual_scale(ctx, scale);
        scale
    }

    pub fn set_zoom_mode(&mut self, ctx: &mut SessionContext, mode: ZoomMode) {
        self.view_state.zoom_mode = mode;
        if mode != ZoomMode::Manual {
            self.view_state.zoom_scale = ctx.renderer.fit_scale(mode);
        }
        self.save_view_state(ctx);
        self.render(ctx);
    }

    fn set_manual_scale(&mut self, ctx: &mut SessionContext, scale: f64) {
        self.view_state.zoom_mode = ZoomMode::Manual;
        self.view_state.zoom_scale = scale;
        debug!(pattern_id = self.pattern_id, scale, "zoom changed");
        self.save_view_state(ctx);
        self.render(ctx);
    }

    pub fn scroll_to(&mut self, ctx: &mut SessionContext, x: f64, y: f64) {
        let (x, y) = (x.max(0.0), y.max(0.0));
        if self.view_state.scroll_x == x && self.view_state.scroll_y == y {
            return;
        }
        self.view_state.scroll_x = x;
        self.view_state.scroll_y = y;
        self.save_view_state(ctx);
    }

    pub fn scroll_by(&mut self, ctx: &mut SessionContext, dx: f64, dy: f64) {
        let state = self.view_state;
        self.scroll_to(ctx, state.scroll_x + dx, state.scroll_y + dy);
    }

    pub fn pinch_start(&mut self, ctx: &SessionContext, distance: f64) {
        if distance <= 0.0 {
            return;
        }
        let start_scale = self.effective_scale(ctx);
        self.pinch = Some(Pinch {
            start_scale,
            start_distance: distance,
            preview: start_scale,
        });
    }

    /// Preview the pinch without re-rendering; returns the preview scale
    pub fn pinch_move(&mut self, ctx: &mut SessionContext, distance: f64) -> Option<f64> {
        let pinch = self.pinch.as_mut()?;
        if distance <= 0.0 {
            return Some(pinch.preview);
        }
        let scale = (pinch.start_scale * distance / pinch.start_distance).clamp(MIN_ZOOM, MAX_ZOOM);
        pinch.preview = scale;
        ctx.renderer.preview(scale);
        Some(scale)
    }

    /// Commit the previewed scale with a full render
    pub fn pinch_end(&mut self, ctx: &mut SessionContext) -> Option<f64> {
        let pinch = self.pinch.take()?;
        let scale = normalize_scale(pinch.preview);
        self.set_manual_scale(ctx, scale);
        Some(scale)
    }

    pub fn render(&self, ctx: &mut SessionContext) {
        let scale = self.effective_scale(ctx);
        ctx.renderer.render(self.page, scale);
    }

    /// Persist the view state and release the document
    pub fn close(mut self, ctx: &mut SessionContext) -> ViewState {
        self.pinch = None;
        self.save_view_state(ctx);
        ctx.renderer.unload();
        self.view_state
    }

    pub fn save_view_state(&self, ctx: &mut SessionContext) {
        if let Err(err) = ctx
            .view_states
            .save(ctx.local.as_mut(), self.pattern_id, &self.view_state)
        {
            warn!(pattern_id = self.pattern_id, error = %err, "failed to persist view state");
        }
    }
}
