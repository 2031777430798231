// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the patternkeep pattern library
//!
//! These types are shared by the REST contract, the client crates and the
//! interactive viewing session. They carry no UI or transport concerns.

pub mod counter;
pub mod pattern;
pub mod view;

pub use counter::*;
pub use pattern::*;
pub use view::*;
