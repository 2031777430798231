// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP client for the patternkeep library service
//!
//! [`RestClient`] speaks the JSON REST surface and implements
//! [`pk_client_api::LibraryApi`]; [`HttpBeacon`] implements the blocking
//! unload-time delivery used when the viewer shuts down.

pub mod beacon;
pub mod client;
pub mod error;

pub use beacon::*;
pub use client::*;
pub use error::*;

use async_trait::async_trait;
use pk_client_api::{ClientApiResult, LibraryApi};
use pk_domain_types::{Counter, CounterId, Pattern, PatternId, Project, ProjectId};
use pk_rest_api_contract::UpdateCounterRequest;

#[async_trait]
impl LibraryApi for client::RestClient {
    async fn get_pattern(&self, id: PatternId) -> ClientApiResult<Option<Pattern>> {
        Ok(not_found_as_none(self.get_pattern(id).await)?)
    }

    async fn get_pattern_by_slug(&self, slug: &str) -> ClientApiResult<Option<Pattern>> {
        Ok(not_found_as_none(self.get_pattern_by_slug(slug).await)?)
    }

    async fn get_project(&self, id: ProjectId) -> ClientApiResult<Option<Project>> {
        Ok(not_found_as_none(self.get_project(id).await)?)
    }

    async fn update_current_page(&self, pattern_id: PatternId, page: u32) -> ClientApiResult<()> {
        Ok(self.update_current_page(pattern_id, page).await?)
    }

    async fn update_timer(&self, pattern_id: PatternId, seconds: u64) -> ClientApiResult<()> {
        Ok(self.update_timer(pattern_id, seconds).await?)
    }

    async fn mark_in_progress(&self, pattern_id: PatternId) -> ClientApiResult<()> {
        Ok(self.mark_in_progress(pattern_id).await?)
    }

    async fn list_counters(&self, pattern_id: PatternId) -> ClientApiResult<Vec<Counter>> {
        Ok(self.list_counters(pattern_id).await?)
    }

    async fn create_counter(&self, pattern_id: PatternId, name: &str) -> ClientApiResult<Counter> {
        Ok(self.create_counter(pattern_id, name).await?)
    }

    async fn update_counter(
        &self,
        counter_id: CounterId,
        update: &UpdateCounterRequest,
    ) -> ClientApiResult<Counter> {
        Ok(self.update_counter(counter_id, update).await?)
    }

    async fn increment_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter> {
        Ok(self.counter_action(counter_id, CounterAction::Increment).await?)
    }

    async fn decrement_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter> {
        Ok(self.counter_action(counter_id, CounterAction::Decrement).await?)
    }

    async fn reset_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter> {
        Ok(self.counter_action(counter_id, CounterAction::Reset).await?)
    }

    async fn delete_counter(&self, counter_id: CounterId) -> ClientApiResult<()> {
        Ok(self.delete_counter(counter_id).await?)
    }
}

fn not_found_as_none<T>(result: RestClientResult<T>) -> RestClientResult<Option<T>> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(err) if err.is_not_found() => Ok(None),
        Err(err) => Err(err),
    }
}
