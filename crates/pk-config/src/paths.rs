// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration file discovery

use std::path::{Path, PathBuf};

pub const APP_DIR: &str = "patternkeep";

/// Files that take part in a configuration load
#[derive(Debug, Clone, Default)]
pub struct Paths {
    pub user: Option<PathBuf>,
    pub cli_config: Option<PathBuf>,
}

impl Paths {
    /// Standard user file plus an optional explicit `--config` file
    pub fn discover(cli_config: Option<&Path>) -> Self {
        Self {
            user: user_config_path(),
            cli_config: cli_config.map(Path::to_path_buf),
        }
    }
}

/// `$PK_HOME/config.toml`, else `$XDG_CONFIG_HOME/patternkeep/config.toml`,
/// else the platform config directory
pub fn user_config_path() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("PK_HOME") {
        return Some(PathBuf::from(home).join("config.toml"));
    }
    if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
        return Some(PathBuf::from(xdg).join(APP_DIR).join("config.toml"));
    }
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

/// Where the local and session stores live when `data-dir` is not configured
pub fn default_data_dir() -> PathBuf {
    if let Ok(home) = std::env::var("PK_HOME") {
        return PathBuf::from(home).join("data");
    }
    dirs::data_dir().unwrap_or_else(std::env::temp_dir).join(APP_DIR)
}
