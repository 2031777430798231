// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Environment and command-line overlays

use serde_json::Value as J;

use crate::ConfigResult;

/// Overlay built from the process `PK_*` variables
pub fn env_overlay() -> ConfigResult<J> {
    env_overlay_from(None)
}

/// Overlay built from an explicit variable map, or the process environment
/// when `vars` is `None`
///
/// `PK_INACTIVITY_TIMEOUT_SECS=60` becomes `{"inactivity-timeout-secs": 60}`.
pub fn env_overlay_from(vars: Option<config::Map<String, String>>) -> ConfigResult<J> {
    let built = config::Config::builder()
        .add_source(
            config::Environment::with_prefix("PK")
                .prefix_separator("_")
                .convert_case(config::Case::Kebab)
                .try_parsing(true)
                .source(vars),
        )
        .build()?;

    Ok(serde_json::to_value(
        built.try_deserialize::<serde_json::Map<String, J>>()?,
    )?)
}

/// Overlay built from `--set key=value` pairs
///
/// Values that read as JSON booleans or numbers keep that type; everything
/// else is a string.
pub fn flags_overlay(kv_pairs: &[(&str, &str)]) -> J {
    let mut root = serde_json::json!({});
    for (k, v) in kv_pairs {
        crate::merge::insert_dotted(&mut root, k, scalar_from_flag(v));
    }
    root
}

fn scalar_from_flag(raw: &str) -> J {
    match serde_json::from_str::<J>(raw) {
        Ok(v @ (J::Bool(_) | J::Number(_))) => v,
        _ => J::String(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_names_become_kebab_keys() {
        let vars: config::Map<String, String> = [
            ("PK_AUTO_TIMER".to_string(), "true".to_string()),
            ("PK_INACTIVITY_TIMEOUT_SECS".to_string(), "60".to_string()),
            ("OTHER_VAR".to_string(), "x".to_string()),
        ]
        .into_iter()
        .collect();

        let overlay = env_overlay_from(Some(vars)).expect("overlay");
        assert_eq!(overlay["auto-timer"], true);
        assert_eq!(overlay["inactivity-timeout-secs"], 60);
        assert!(overlay.get("other-var").is_none());
    }

    #[test]
    fn flag_values_keep_scalar_types() {
        let overlay = flags_overlay(&[
            ("media-keys", "true"),
            ("save-debounce-ms", "250"),
            ("default-zoom", "fit-width"),
        ]);
        assert_eq!(overlay["media-keys"], true);
        assert_eq!(overlay["save-debounce-ms"], 250);
        assert_eq!(overlay["default-zoom"], "fit-width");
    }
}
