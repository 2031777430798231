// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered configuration for patternkeep
//!
//! Layers are parsed into `serde_json::Value`, merged in precedence order and
//! only then extracted into typed structs. Precedence, lowest first:
//! built-in defaults < user file < `--config` file < `PK_*` environment < `--set` flags.

pub mod env;
pub mod extract;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod session;

pub use paths::Paths;
pub use session::{DefaultZoom, SessionConfig, ZoomPreset};

use serde_json::Value as J;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading config file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing config file {path:?}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("reading PK_* environment: {0}")]
    Env(#[from] config::ConfigError),

    #[error("JSON conversion failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid value at '{path}': {message}")]
    Extract { path: String, message: String },

    #[error("missing config section: {0}")]
    MissingPath(String),

    #[error("invalid --set flag '{0}', expected key=value")]
    InvalidFlag(String),

    #[error("config validation failed: {0}")]
    Invalid(#[from] validator::ValidationErrors),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Which layer a value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Scope {
    User,
    CliConfig,
    Env,
    Flags,
}

/// Merge every layer into one JSON document
///
/// A missing user file is skipped silently. An explicitly requested
/// `--config` file that is missing or malformed is an error.
pub fn load_all(paths: &Paths, flag_sets: &[(&str, &str)]) -> ConfigResult<J> {
    let mut json = serde_json::json!({});

    let user_layer = match paths.user.as_ref().filter(|p| p.exists()) {
        Some(path) => Some(loader::read_layer_from_file(path, Scope::User)?),
        None => None,
    };
    let cli_layer = match paths.cli_config.as_ref() {
        Some(path) => Some(loader::read_layer_from_file(path, Scope::CliConfig)?),
        None => None,
    };
    let env_layer = loader::Layer {
        scope: Scope::Env,
        json: env::env_overlay()?,
    };
    let flags_layer = loader::Layer {
        scope: Scope::Flags,
        json: env::flags_overlay(flag_sets),
    };

    for layer in [user_layer, cli_layer, Some(env_layer), Some(flags_layer)]
        .into_iter()
        .flatten()
    {
        tracing::trace!(scope = ?layer.scope, "merging config layer");
        merge::merge_two_json(&mut json, layer.json);
    }

    Ok(json)
}

/// Split `key=value` strings as given to `--set`
pub fn parse_flag_sets(raw: &[String]) -> ConfigResult<Vec<(String, String)>> {
    raw.iter()
        .map(|entry| {
            entry
                .split_once('=')
                .filter(|(k, _)| !k.trim().is_empty())
                .map(|(k, v)| (k.trim().to_string(), v.trim().to_string()))
                .ok_or_else(|| ConfigError::InvalidFlag(entry.clone()))
        })
        .collect()
}
