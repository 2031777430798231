// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Row and stitch counters attached to a pattern

use serde::{Deserialize, Serialize};

use crate::pattern::PatternId;

/// Numeric identifier of a counter row
pub type CounterId = i64;

/// Name given to the counter created for a pattern that has none
pub const DEFAULT_COUNTER_NAME: &str = "Counter";

/// A single counter. The value is signed and may go negative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counter {
    pub id: CounterId,
    pub pattern_id: PatternId,
    pub name: String,
    pub value: i64,
    /// Display and cycle order, ascending
    pub position: i32,
}
