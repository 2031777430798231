// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed extraction from the merged document

use serde::de::DeserializeOwned;
use serde_json::Value as J;

use crate::{ConfigError, ConfigResult};

/// Extract the whole document as `T`
pub fn get<T: DeserializeOwned>(root: &J) -> ConfigResult<T> {
    deserialize_at(root.clone(), "")
}

/// Extract the section at a dotted path as `T`
pub fn get_at<T: DeserializeOwned>(root: &J, dotted: &str) -> ConfigResult<T> {
    let mut cur = root;
    for p in dotted.split('.') {
        cur = cur
            .get(p)
            .ok_or_else(|| ConfigError::MissingPath(dotted.to_string()))?;
    }
    deserialize_at(cur.clone(), dotted)
}

fn deserialize_at<T: DeserializeOwned>(value: J, prefix: &str) -> ConfigResult<T> {
    serde_path_to_error::deserialize(value).map_err(|e| {
        let inner = e.path().to_string();
        let path = match (prefix.is_empty(), inner.as_str()) {
            (true, _) => inner.clone(),
            (false, ".") => prefix.to_string(),
            (false, _) => format!("{}.{}", prefix, inner),
        };
        ConfigError::Extract {
            path,
            message: e.into_inner().to_string(),
        }
    })
}
