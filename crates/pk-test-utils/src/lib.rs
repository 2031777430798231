// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Test helpers shared across the patternkeep workspace
//!
//! Every scenario test writes its full trace to a unique file under
//! `target/test-logs/<date>/`, and prints only the path when it fails.

pub mod logging;

pub use logging::{create_unique_test_log, TestLogError, TestLogger};
