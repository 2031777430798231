// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Remappable viewer shortcuts
//!
//! Each [`ShortcutAction`] owns an ordered list of at most
//! [`MAX_BINDINGS_PER_ACTION`] key identifiers. A key identifier belongs to at
//! most one action; binding it elsewhere takes it away from its previous owner.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use strum::{EnumIter, IntoEnumIterator};

use crate::error::{ShortcutError, StoreError};
use crate::storage::{keys, KeyValueStore};

pub const MAX_BINDINGS_PER_ACTION: usize = 3;

/// Abstract viewer actions that input sources resolve to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, EnumIter)]
#[serde(rename_all = "camelCase")]
pub enum ShortcutAction {
    PageNext,
    PagePrev,
    CounterIncrease,
    CounterDecrease,
    ToggleTimer,
    NextCounter,
    ZoomIn,
    ZoomOut,
    ExitViewer,
}

impl ShortcutAction {
    /// Name used in the persisted bindings object
    pub fn stored_name(&self) -> &'static str {
        match self {
            ShortcutAction::PageNext => "pageNext",
            ShortcutAction::PagePrev => "pagePrev",
            ShortcutAction::CounterIncrease => "counterIncrease",
            ShortcutAction::CounterDecrease => "counterDecrease",
            ShortcutAction::ToggleTimer => "toggleTimer",
            ShortcutAction::NextCounter => "nextCounter",
            ShortcutAction::ZoomIn => "zoomIn",
            ShortcutAction::ZoomOut => "zoomOut",
            ShortcutAction::ExitViewer => "exitViewer",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ShortcutAction::PageNext => "Next page",
            ShortcutAction::PagePrev => "Previous page",
            ShortcutAction::CounterIncrease => "Increase counter",
            ShortcutAction::CounterDecrease => "Decrease counter",
            ShortcutAction::ToggleTimer => "Start/stop timer",
            ShortcutAction::NextCounter => "Next counter",
            ShortcutAction::ZoomIn => "Zoom in",
            ShortcutAction::ZoomOut => "Zoom out",
            ShortcutAction::ExitViewer => "Close viewer",
        }
    }

    /// Compiled-in bindings
    pub fn default_keys(&self) -> &'static [&'static str] {
        match self {
            ShortcutAction::PageNext => &["ArrowRight", "PageDown"],
            ShortcutAction::PagePrev => &["ArrowLeft", "PageUp"],
            ShortcutAction::CounterIncrease => &["ArrowUp", "MediaTrackNext"],
            ShortcutAction::CounterDecrease => &["ArrowDown", "MediaTrackPrevious"],
            ShortcutAction::ToggleTimer => &["t", "MediaPlayPause"],
            ShortcutAction::NextCounter => &["Tab"],
            ShortcutAction::ZoomIn => &["+", "="],
            ShortcutAction::ZoomOut => &["-"],
            ShortcutAction::ExitViewer => &["Escape", "MediaStop"],
        }
    }
}

impl std::fmt::Display for ShortcutAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.stored_name())
    }
}

impl std::str::FromStr for ShortcutAction {
    type Err = ShortcutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Short forms appear in older saved settings
        match s {
            "counterInc" => return Ok(ShortcutAction::CounterIncrease),
            "counterDec" => return Ok(ShortcutAction::CounterDecrease),
            "timerToggle" => return Ok(ShortcutAction::ToggleTimer),
            _ => {}
        }
        ShortcutAction::iter()
            .find(|action| action.stored_name() == s)
            .ok_or_else(|| ShortcutError::UnknownAction(s.to_string()))
    }
}

/// Normalized physical key identifier
///
/// Keyboard keys use DOM-style names (`ArrowUp`, `PageDown`, `t`, `+`);
/// OS media keys use synthetic `Media*` tokens. Single letters compare
/// case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct KeyId(String);

impl KeyId {
    pub fn new(raw: &str) -> Self {
        let mut chars = raw.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_alphabetic() => KeyId(c.to_lowercase().collect()),
            _ => KeyId(raw.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Keys that only modify other keys are never bound
    pub fn is_modifier_only(&self) -> bool {
        matches!(
            self.0.as_str(),
            "Shift" | "Control" | "Alt" | "Meta" | "AltGraph" | "CapsLock" | "Super" | "Hyper"
        )
    }

    pub fn is_media(&self) -> bool {
        self.0.starts_with("Media")
    }

    /// Short form for toolbar hints
    pub fn display(&self) -> String {
        match self.0.as_str() {
            "ArrowUp" => "↑".to_string(),
            "ArrowDown" => "↓".to_string(),
            "ArrowLeft" => "←".to_string(),
            "ArrowRight" => "→".to_string(),
            "Escape" => "Esc".to_string(),
            " " => "Space".to_string(),
            other => other.to_string(),
        }
    }
}

impl From<String> for KeyId {
    fn from(raw: String) -> Self {
        KeyId::new(&raw)
    }
}

impl From<&str> for KeyId {
    fn from(raw: &str) -> Self {
        KeyId::new(raw)
    }
}

impl From<KeyId> for String {
    fn from(key: KeyId) -> Self {
        key.0
    }
}

impl std::fmt::Display for KeyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of a successful bind
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindOutcome {
    /// Action the key was taken from, if it was bound elsewhere
    pub stolen_from: Option<ShortcutAction>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortcutTable {
    bindings: HashMap<ShortcutAction, Vec<KeyId>>,
}

impl Default for ShortcutTable {
    fn default() -> Self {
        let bindings = ShortcutAction::iter()
            .map(|action| {
                let keys = action.default_keys().iter().map(|k| KeyId::new(k)).collect();
                (action, keys)
            })
            .collect();
        Self { bindings }
    }
}

impl ShortcutTable {
    /// Parse a persisted bindings object over the defaults
    ///
    /// Unknown actions, non-array values and non-string keys are skipped
    /// individually; unparseable JSON leaves the defaults untouched.
    pub fn from_stored_json(raw: Option<&str>) -> Self {
        let mut table = Self::default();
        let Some(raw) = raw else {
            return table;
        };
        let object = match serde_json::from_str::<serde_json::Value>(raw) {
            Ok(serde_json::Value::Object(object)) => object,
            Ok(_) | Err(_) => {
                tracing::warn!("stored shortcut bindings are not a JSON object, using defaults");
                return table;
            }
        };

        for (name, value) in object {
            let Ok(action) = name.parse::<ShortcutAction>() else {
                tracing::debug!(%name, "skipping unknown stored shortcut action");
                continue;
            };
            let Some(items) = value.as_array() else {
                continue;
            };
            let keys: Vec<KeyId> = items
                .iter()
                .filter_map(|item| item.as_str())
                .map(KeyId::new)
                .filter(|key| !key.is_modifier_only())
                .take(MAX_BINDINGS_PER_ACTION)
                .collect();
            table.replace_action(action, keys);
        }
        table
    }

    pub fn load(store: &dyn KeyValueStore) -> Self {
        Self::from_stored_json(store.get(keys::SHORTCUT_BINDINGS).as_deref())
    }

    pub fn save(&self, store: &mut dyn KeyValueStore) -> Result<(), StoreError> {
        store.set(keys::SHORTCUT_BINDINGS, &self.to_json().to_string())
    }

    pub fn to_json(&self) -> serde_json::Value {
        let object = ShortcutAction::iter()
            .map(|action| {
                let keys = self
                    .bindings(action)
                    .iter()
                    .map(|k| serde_json::Value::String(k.to_string()))
                    .collect();
                (action.stored_name().to_string(), serde_json::Value::Array(keys))
            })
            .collect();
        serde_json::Value::Object(object)
    }

    pub fn bindings(&self, action: ShortcutAction) -> &[KeyId] {
        self.bindings.get(&action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Whether `key` appears anywhere in the binding list of `action`
    pub fn matches(&self, action: ShortcutAction, key: &KeyId) -> bool {
        self.bindings(action).contains(key)
    }

    pub fn action_for(&self, key: &KeyId) -> Option<ShortcutAction> {
        ShortcutAction::iter().find(|action| self.matches(*action, key))
    }

    /// Bind `key` into `slot` of `action`, taking it from any other holder
    ///
    /// A slot past the end of the current list appends.
    pub fn bind(
        &mut self,
        action: ShortcutAction,
        slot: usize,
        key: KeyId,
    ) -> Result<BindOutcome, ShortcutError> {
        if slot >= MAX_BINDINGS_PER_ACTION {
            return Err(ShortcutError::SlotOutOfRange {
                slot,
                max: MAX_BINDINGS_PER_ACTION,
            });
        }
        if key.is_modifier_only() {
            return Err(ShortcutError::NotBindable(key.to_string()));
        }

        let own_index = self
            .bindings
            .get(&action)
            .and_then(|list| list.iter().position(|k| *k == key));
        if let (Some(old), Some(list)) = (own_index, self.bindings.get_mut(&action)) {
            // Overwrite the target slot first so the old occurrence's removal
            // cannot shift it.
            if slot < list.len() {
                if old != slot {
                    list[slot] = key;
                    list.remove(old);
                }
            } else {
                list.remove(old);
                list.push(key);
            }
            return Ok(BindOutcome { stolen_from: None });
        }

        let stolen_from = self.release(&key);

        let list = self.bindings.entry(action).or_default();
        if slot < list.len() {
            list[slot] = key;
        } else {
            list.push(key);
        }
        if let Some(previous) = stolen_from {
            tracing::debug!(from = %previous, to = %action, "shortcut key reassigned");
        }
        Ok(BindOutcome { stolen_from })
    }

    /// Remove the key at `slot` of `action`
    pub fn unbind(&mut self, action: ShortcutAction, slot: usize) -> Option<KeyId> {
        let list = self.bindings.get_mut(&action)?;
        (slot < list.len()).then(|| list.remove(slot))
    }

    pub fn reset_action(&mut self, action: ShortcutAction) {
        let keys = action.default_keys().iter().map(|k| KeyId::new(k)).collect();
        self.replace_action(action, keys);
    }

    pub fn reset_all(&mut self) {
        *self = Self::default();
    }

    fn replace_action(&mut self, action: ShortcutAction, keys: Vec<KeyId>) {
        let mut unique: Vec<KeyId> = Vec::with_capacity(keys.len());
        for key in keys {
            if !unique.contains(&key) {
                self.release(&key);
                unique.push(key);
            }
        }
        self.bindings.insert(action, unique);
    }

    /// Drop `key` from whichever action holds it
    fn release(&mut self, key: &KeyId) -> Option<ShortcutAction> {
        let mut holder = None;
        for (action, list) in self.bindings.iter_mut() {
            if let Some(pos) = list.iter().position(|k| k == key) {
                list.remove(pos);
                holder = Some(*action);
            }
        }
        holder
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    #[test]
    fn defaults_resolve_keys() {
        let table = ShortcutTable::default();
        assert_eq!(
            table.action_for(&KeyId::new("ArrowUp")),
            Some(ShortcutAction::CounterIncrease)
        );
        assert_eq!(
            table.action_for(&KeyId::new("MediaPlayPause")),
            Some(ShortcutAction::ToggleTimer)
        );
        assert_eq!(table.action_for(&KeyId::new("x")), None);
    }

    #[test]
    fn letters_match_case_insensitively() {
        let table = ShortcutTable::default();
        assert_eq!(
            table.action_for(&KeyId::new("T")),
            Some(ShortcutAction::ToggleTimer)
        );
    }

    #[test]
    fn binding_steals_from_previous_holder() {
        let mut table = ShortcutTable::default();
        let outcome = table
            .bind(ShortcutAction::CounterDecrease, 0, KeyId::new("ArrowUp"))
            .expect("bind");

        assert_eq!(outcome.stolen_from, Some(ShortcutAction::CounterIncrease));
        assert!(!table.matches(ShortcutAction::CounterIncrease, &KeyId::new("ArrowUp")));
        assert_eq!(
            table.bindings(ShortcutAction::CounterDecrease)[0],
            KeyId::new("ArrowUp")
        );
        assert_eq!(
            table.bindings(ShortcutAction::CounterIncrease),
            &[KeyId::new("MediaTrackNext")]
        );
    }

    #[test]
    fn rebinding_within_an_action_moves_the_key() {
        let mut table = ShortcutTable::default();
        let outcome = table
            .bind(ShortcutAction::PageNext, 1, KeyId::new("ArrowRight"))
            .expect("bind");
        assert_eq!(outcome.stolen_from, None);
        assert_eq!(table.bindings(ShortcutAction::PageNext), &[KeyId::new("ArrowRight")]);
    }

    #[test]
    fn moving_a_key_to_an_earlier_slot_replaces_that_slot() {
        let mut table = ShortcutTable::default();
        table
            .bind(ShortcutAction::ZoomIn, 2, KeyId::new("z"))
            .expect("bind third slot");
        assert_eq!(
            table.bindings(ShortcutAction::ZoomIn),
            &[KeyId::new("+"), KeyId::new("="), KeyId::new("z")]
        );

        table
            .bind(ShortcutAction::ZoomIn, 0, KeyId::new("z"))
            .expect("move to first slot");
        assert_eq!(
            table.bindings(ShortcutAction::ZoomIn),
            &[KeyId::new("z"), KeyId::new("=")]
        );
    }

    #[test]
    fn binding_a_key_to_its_current_slot_is_a_no_op() {
        let mut table = ShortcutTable::default();
        let outcome = table
            .bind(ShortcutAction::PagePrev, 1, KeyId::new("PageUp"))
            .expect("bind");
        assert_eq!(outcome.stolen_from, None);
        assert_eq!(
            table.bindings(ShortcutAction::PagePrev),
            &[KeyId::new("ArrowLeft"), KeyId::new("PageUp")]
        );
    }

    #[test]
    fn slot_and_modifier_limits() {
        let mut table = ShortcutTable::default();
        assert_eq!(
            table.bind(ShortcutAction::ZoomIn, 3, KeyId::new("z")),
            Err(ShortcutError::SlotOutOfRange { slot: 3, max: 3 })
        );
        assert!(matches!(
            table.bind(ShortcutAction::ZoomIn, 0, KeyId::new("Shift")),
            Err(ShortcutError::NotBindable(_))
        ));
        table.bind(ShortcutAction::ZoomIn, 2, KeyId::new("z")).expect("third slot");
        assert_eq!(table.bindings(ShortcutAction::ZoomIn).len(), 3);
    }

    #[test]
    fn corrupt_entries_merge_over_defaults() {
        let raw = r#"{
            "pageNext": ["n", 4, "N"],
            "zoomOut": "not-a-list",
            "teleport": ["x"],
            "counterInc": ["ArrowRight"]
        }"#;
        let table = ShortcutTable::from_stored_json(Some(raw));

        assert_eq!(table.bindings(ShortcutAction::PageNext), &[KeyId::new("n")]);
        assert_eq!(table.bindings(ShortcutAction::ZoomOut), &[KeyId::new("-")]);
        assert_eq!(
            table.action_for(&KeyId::new("ArrowRight")),
            Some(ShortcutAction::CounterIncrease)
        );
        assert_eq!(
            table.bindings(ShortcutAction::PagePrev),
            &[KeyId::new("ArrowLeft"), KeyId::new("PageUp")]
        );
    }

    #[test]
    fn unparseable_json_falls_back_to_defaults() {
        assert_eq!(
            ShortcutTable::from_stored_json(Some("{not json")),
            ShortcutTable::default()
        );
    }

    #[test]
    fn saved_table_round_trips_through_store() {
        let mut store = MemoryStore::new();
        let mut table = ShortcutTable::default();
        table.bind(ShortcutAction::ToggleTimer, 0, KeyId::new(" ")).expect("bind");
        table.save(&mut store).expect("save");

        let reloaded = ShortcutTable::load(&store);
        assert_eq!(reloaded, table);
    }
}
