// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! TOML file loading

use serde_json::Value as J;
use std::path::Path;

use crate::{ConfigError, ConfigResult, Scope};

/// One parsed configuration layer
#[derive(Debug, Clone)]
pub struct Layer {
    pub scope: Scope,
    pub json: J,
}

pub fn parse_toml_to_json(toml_str: &str) -> Result<J, toml::de::Error> {
    let table: toml::Table = toml_str.parse()?;
    // TOML has no null and only finite floats in practice; the conversion is total
    Ok(serde_json::to_value(table).unwrap_or_else(|_| J::Object(Default::default())))
}

pub fn read_layer_from_file(path: &Path, scope: Scope) -> ConfigResult<Layer> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let json = parse_toml_to_json(&content).map_err(|source| ConfigError::Toml {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Layer { scope, json })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toml_tables_become_json_objects() {
        let json = parse_toml_to_json(
            r#"
            server-url = "http://localhost:8080"
            [viewer]
            zoom = 1.5
            "#,
        )
        .expect("parse");
        assert_eq!(json["server-url"], "http://localhost:8080");
        assert_eq!(json["viewer"]["zoom"], 1.5);
    }

    #[test]
    fn broken_toml_is_rejected() {
        assert!(parse_toml_to_json("auto-timer = ").is_err());
    }
}
