// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Screens the application can show and the per-pattern view state

use serde::{Deserialize, Serialize};
use strum::EnumIter;

use crate::pattern::{PatternId, ProjectId};

/// Top-level tabs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "lowercase")]
pub enum Tab {
    Current,
    Library,
    Projects,
    Settings,
}

impl std::fmt::Display for Tab {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tab::Current => write!(f, "current"),
            Tab::Library => write!(f, "library"),
            Tab::Projects => write!(f, "projects"),
            Tab::Settings => write!(f, "settings"),
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "current" => Ok(Tab::Current),
            "library" => Ok(Tab::Library),
            "projects" => Ok(Tab::Projects),
            "settings" => Ok(Tab::Settings),
            _ => Err(format!("Unknown tab: {}", s)),
        }
    }
}

/// Exactly one of these is on screen at any time
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SessionView {
    Tab(Tab),
    Pattern { id: PatternId, slug: String },
    Project(ProjectId),
    SettingsSection(String),
}

impl SessionView {
    /// The tab this view visually belongs to
    pub fn owning_tab(&self) -> Tab {
        match self {
            SessionView::Tab(tab) => *tab,
            SessionView::Pattern { .. } => Tab::Current,
            SessionView::Project(_) => Tab::Projects,
            SessionView::SettingsSection(_) => Tab::Settings,
        }
    }

    /// URL fragment for this view, without the leading `#`
    pub fn fragment(&self) -> String {
        match self {
            SessionView::Tab(tab) => tab.to_string(),
            SessionView::Pattern { slug, .. } => format!("pattern/{}", slug),
            SessionView::Project(id) => format!("project/{}", id),
            SessionView::SettingsSection(section) => format!("settings/{}", section),
        }
    }

    pub fn is_pattern(&self) -> bool {
        matches!(self, SessionView::Pattern { .. })
    }

    pub fn pattern_id(&self) -> Option<PatternId> {
        match self {
            SessionView::Pattern { id, .. } => Some(*id),
            _ => None,
        }
    }

    /// Settings and its sections collapse into one back-stack entry
    pub fn same_family(&self, other: &SessionView) -> bool {
        let is_settings =
            |v: &SessionView| matches!(v, SessionView::Tab(Tab::Settings) | SessionView::SettingsSection(_));
        is_settings(self) && is_settings(other)
    }
}

/// How a rendered page is scaled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomMode {
    #[default]
    Fit,
    FitWidth,
    Manual,
}

/// Persisted zoom and scroll state of one pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    pub zoom_mode: ZoomMode,
    pub zoom_scale: f64,
    #[serde(default)]
    pub scroll_x: f64,
    #[serde(default)]
    pub scroll_y: f64,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            zoom_mode: ZoomMode::Fit,
            zoom_scale: 1.0,
            scroll_x: 0.0,
            scroll_y: 0.0,
        }
    }
}
