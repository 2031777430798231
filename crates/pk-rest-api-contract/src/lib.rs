// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! patternkeep REST API contract types and validation
//!
//! These types describe the narrow JSON surface the viewing session consumes:
//! pattern and project lookup, page and timer updates, and counter CRUD.
//! They are shared by the HTTP client and the in-memory mock client.

pub mod error;
pub mod types;
pub mod validation;

pub use error::*;
pub use types::*;
