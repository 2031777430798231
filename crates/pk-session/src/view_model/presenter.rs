// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Derived toolbar state for the desktop and mobile surfaces
//!
//! One [`ToolbarViewModel`] is built per refresh and handed to both surfaces,
//! so they cannot disagree. Each surface keeps only its own transient
//! affordances.

use pk_domain_types::{CounterId, Project, SessionView, ZoomMode};

use crate::context::SessionContext;
use crate::view_model::counters::CounterRegistry;
use crate::view_model::input::CaptureTarget;
use crate::view_model::navigation::NavigationRouter;
use crate::view_model::timer::{TimerController, TimerStatus};
use crate::view_model::viewer::PatternViewer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerIndicator {
    Stopped,
    Running,
    Paused,
}

impl From<TimerStatus> for TimerIndicator {
    fn from(status: TimerStatus) -> Self {
        match status {
            TimerStatus::Stopped => TimerIndicator::Stopped,
            TimerStatus::Running => TimerIndicator::Running,
            TimerStatus::AutoPaused => TimerIndicator::Paused,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CounterChip {
    pub id: CounterId,
    pub name: String,
    pub value: i64,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ToolbarViewModel {
    pub view: SessionView,
    pub title: String,
    pub page: Option<(u32, u32)>,
    pub zoom_label: Option<String>,
    pub counters: Vec<CounterChip>,
    pub timer_text: String,
    pub timer: TimerIndicator,
    pub reset_confirm: bool,
    pub sync_warning: bool,
    pub capture_hint: Option<String>,
    pub can_go_back: bool,
}

impl ToolbarViewModel {
    pub fn build(
        router: &NavigationRouter,
        timer: &TimerController,
        counters: &CounterRegistry,
        viewer: Option<&PatternViewer>,
        project: Option<&Project>,
        ctx: &SessionContext,
        capture: Option<CaptureTarget>,
    ) -> Self {
        let view = router.current().clone();
        let title = match (&view, ctx.open_pattern.as_ref()) {
            (SessionView::Pattern { .. }, Some(pattern)) => pattern.name.clone(),
            (SessionView::Pattern { slug, .. }, None) => slug.clone(),
            (SessionView::Tab(tab), _) => capitalize(&tab.to_string()),
            (SessionView::Project(id), _) => project
                .filter(|p| p.id == *id)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| format!("Project {}", id)),
            (SessionView::SettingsSection(section), _) => format!("Settings / {}", section),
        };
        let zoom_label = viewer.map(|v| match v.view_state().zoom_mode {
            ZoomMode::Fit => "Fit".to_string(),
            ZoomMode::FitWidth => "Width".to_string(),
            ZoomMode::Manual => format!("{:.0}%", v.view_state().zoom_scale * 100.0),
        });
        let active = counters.active();

        Self {
            title,
            page: viewer.map(|v| (v.page(), v.page_count())),
            zoom_label,
            counters: counters
                .counters()
                .iter()
                .map(|c| CounterChip {
                    id: c.id,
                    name: c.name.clone(),
                    value: c.value,
                    active: Some(c.id) == active,
                })
                .collect(),
            timer_text: format_elapsed(timer.elapsed_seconds()),
            timer: timer.status().into(),
            reset_confirm: timer.reset_armed(),
            sync_warning: ctx.sync.has_warning(),
            capture_hint: capture.map(|t| format!("Press a key for \"{}\" (Esc cancels)", t.action.label())),
            can_go_back: router.depth() > 0,
            view,
        }
    }

    pub fn active_counter(&self) -> Option<&CounterChip> {
        self.counters.iter().find(|c| c.active)
    }

    pub fn shows_viewer(&self) -> bool {
        self.page.is_some()
    }
}

/// `MM:SS`, or `H:MM:SS` from one hour on
pub fn format_elapsed(seconds: u64) -> String {
    let (h, m, s) = (seconds / 3600, (seconds / 60) % 60, seconds % 60);
    if h > 0 {
        format!("{}:{:02}:{:02}", h, m, s)
    } else {
        format!("{:02}:{:02}", m, s)
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceKind {
    Desktop,
    Mobile,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Surface {
    pub kind: SurfaceKind,
    pub model: Option<ToolbarViewModel>,
    pub renders: u64,
    /// Counter strip entry kept in view (mobile only)
    pub scrolled_counter: Option<CounterId>,
}

impl Surface {
    fn new(kind: SurfaceKind) -> Self {
        Self {
            kind,
            model: None,
            renders: 0,
            scrolled_counter: None,
        }
    }

    fn present(&mut self, model: ToolbarViewModel) {
        if self.kind == SurfaceKind::Mobile {
            self.scrolled_counter = model.active_counter().map(|c| c.id);
        }
        self.model = Some(model);
        self.renders += 1;
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DualSurfacePresenter {
    desktop: Surface,
    mobile: Surface,
}

impl Default for DualSurfacePresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl DualSurfacePresenter {
    pub fn new() -> Self {
        Self {
            desktop: Surface::new(SurfaceKind::Desktop),
            mobile: Surface::new(SurfaceKind::Mobile),
        }
    }

    pub fn present(&mut self, model: ToolbarViewModel) {
        self.desktop.present(model.clone());
        self.mobile.present(model);
    }

    pub fn desktop(&self) -> &Surface {
        &self.desktop
    }

    pub fn mobile(&self) -> &Surface {
        &self.mobile
    }

    pub fn surface(&self, kind: SurfaceKind) -> &Surface {
        match kind {
            SurfaceKind::Desktop => &self.desktop,
            SurfaceKind::Mobile => &self.mobile,
        }
    }

    /// Both surfaces show the same derived state
    pub fn is_consistent(&self) -> bool {
        self.desktop.model == self.mobile.model
    }
}
