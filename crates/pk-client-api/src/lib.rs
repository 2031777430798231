// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Backend access abstraction for the viewing session
//!
//! The session never talks HTTP directly. It holds an `Arc<dyn LibraryApi>`
//! for ordinary asynchronous requests and an `Arc<dyn Beacon>` for the one
//! write that must leave the process synchronously while it shuts down.
//! `pk-rest-client` implements both over HTTP, `pk-rest-mock-client` in memory.

use async_trait::async_trait;
use pk_domain_types::{Counter, CounterId, Pattern, PatternId, Project, ProjectId};
use pk_rest_api_contract::{ProblemDetails, TimerBeacon, UpdateCounterRequest};
use thiserror::Error;

/// Errors surfaced by a backend implementation
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ClientApiError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("server error: {0}")]
    Server(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ProblemDetails> for ClientApiError {
    fn from(problem: ProblemDetails) -> Self {
        match problem.status {
            Some(404) => ClientApiError::NotFound(problem.to_string()),
            Some(400) | Some(422) => ClientApiError::InvalidRequest(problem.to_string()),
            _ => ClientApiError::Server(problem.to_string()),
        }
    }
}

pub type ClientApiResult<T> = Result<T, ClientApiError>;

/// The narrow REST surface of the pattern library
#[async_trait]
pub trait LibraryApi: Send + Sync {
    /// Fetch a pattern; `Ok(None)` when the id does not exist
    async fn get_pattern(&self, id: PatternId) -> ClientApiResult<Option<Pattern>>;

    /// Fetch a pattern by slug; `Ok(None)` when the slug does not exist
    async fn get_pattern_by_slug(&self, slug: &str) -> ClientApiResult<Option<Pattern>>;

    /// Fetch a project; `Ok(None)` when the id does not exist
    async fn get_project(&self, id: ProjectId) -> ClientApiResult<Option<Project>>;

    async fn update_current_page(&self, pattern_id: PatternId, page: u32) -> ClientApiResult<()>;

    async fn update_timer(&self, pattern_id: PatternId, seconds: u64) -> ClientApiResult<()>;

    async fn mark_in_progress(&self, pattern_id: PatternId) -> ClientApiResult<()>;

    async fn list_counters(&self, pattern_id: PatternId) -> ClientApiResult<Vec<Counter>>;

    async fn create_counter(&self, pattern_id: PatternId, name: &str) -> ClientApiResult<Counter>;

    async fn update_counter(
        &self,
        counter_id: CounterId,
        update: &UpdateCounterRequest,
    ) -> ClientApiResult<Counter>;

    async fn increment_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter>;

    async fn decrement_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter>;

    async fn reset_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter>;

    async fn delete_counter(&self, counter_id: CounterId) -> ClientApiResult<()>;
}

/// Fire-and-forget delivery used while the session is shutting down
///
/// Implementations must not await anything on the session's runtime and
/// must return promptly; the return value only reports whether the payload
/// was handed off.
pub trait Beacon: Send + Sync {
    fn send_timer(&self, payload: &TimerBeacon) -> bool;
}
