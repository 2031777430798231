// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Settings consumed by the viewing session

use pk_domain_types::{Tab, ZoomMode};
use serde::{Deserialize, Serialize};
use serde_json::Value as J;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::{extract, load_all, paths, ConfigResult, Paths};

/// Named zoom defaults
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ZoomPreset {
    Fit,
    FitWidth,
}

/// Zoom applied to a pattern that has no saved view state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultZoom {
    Preset(ZoomPreset),
    Scale(f64),
}

impl Default for DefaultZoom {
    fn default() -> Self {
        DefaultZoom::Preset(ZoomPreset::Fit)
    }
}

impl DefaultZoom {
    pub fn mode(&self) -> ZoomMode {
        match self {
            DefaultZoom::Preset(ZoomPreset::Fit) => ZoomMode::Fit,
            DefaultZoom::Preset(ZoomPreset::FitWidth) => ZoomMode::FitWidth,
            DefaultZoom::Scale(_) => ZoomMode::Manual,
        }
    }

    /// Explicit scale, or 1.0 for presets whose scale is computed at render time
    pub fn scale(&self) -> f64 {
        match self {
            DefaultZoom::Scale(scale) => *scale,
            DefaultZoom::Preset(_) => 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "kebab-case", default)]
pub struct SessionConfig {
    #[validate(url)]
    pub server_url: Option<String>,
    /// Start the timer when a pattern opens
    pub auto_timer: bool,
    pub auto_mark_in_progress: bool,
    pub default_zoom: DefaultZoom,
    pub default_tab: Tab,
    /// Route OS media keys through the shortcut table
    pub media_keys: bool,
    #[validate(range(min = 1))]
    pub inactivity_timeout_secs: u64,
    #[validate(range(min = 1))]
    pub timer_save_every_ticks: u32,
    pub save_debounce_ms: u64,
    pub data_dir: Option<PathBuf>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            server_url: None,
            auto_timer: false,
            auto_mark_in_progress: true,
            default_zoom: DefaultZoom::default(),
            default_tab: Tab::Library,
            media_keys: false,
            inactivity_timeout_secs: 300,
            timer_save_every_ticks: 30,
            save_debounce_ms: 750,
            data_dir: None,
        }
    }
}

impl SessionConfig {
    /// Load every layer and extract a validated config
    pub fn load(paths: &Paths, flag_sets: &[(&str, &str)]) -> ConfigResult<Self> {
        let json = load_all(paths, flag_sets)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &J) -> ConfigResult<Self> {
        let config: SessionConfig = extract::get(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn inactivity_timeout(&self) -> Duration {
        Duration::from_secs(self.inactivity_timeout_secs)
    }

    pub fn save_debounce(&self) -> Duration {
        Duration::from_millis(self.save_debounce_ms)
    }

    pub fn data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(paths::default_data_dir)
    }
}
