// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory pattern library for tests
//!
//! [`MockLibraryClient`] keeps patterns, projects and counters in a shared
//! map, records every call it receives, and can be told to fail upcoming
//! writes or to go offline entirely. Clones share state, so a test can hand
//! one clone to the session and inspect the other.

use async_trait::async_trait;
use pk_client_api::{Beacon, ClientApiError, ClientApiResult, LibraryApi};
use pk_domain_types::{Counter, CounterId, Pattern, PatternId, Project, ProjectId};
use pk_rest_api_contract::{validation::normalize_counter_name, TimerBeacon, UpdateCounterRequest};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// One request as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub enum MockCall {
    GetPattern(PatternId),
    GetPatternBySlug(String),
    GetProject(ProjectId),
    UpdatePage { pattern_id: PatternId, page: u32 },
    UpdateTimer { pattern_id: PatternId, seconds: u64 },
    MarkInProgress(PatternId),
    ListCounters(PatternId),
    CreateCounter { pattern_id: PatternId, name: String },
    UpdateCounter { counter_id: CounterId, update: UpdateCounterRequest },
    Increment(CounterId),
    Decrement(CounterId),
    Reset(CounterId),
    Delete(CounterId),
}

impl MockCall {
    pub fn is_write(&self) -> bool {
        !matches!(
            self,
            MockCall::GetPattern(_)
                | MockCall::GetPatternBySlug(_)
                | MockCall::GetProject(_)
                | MockCall::ListCounters(_)
        )
    }
}

#[derive(Debug, Default)]
struct LibraryState {
    patterns: HashMap<PatternId, Pattern>,
    projects: HashMap<ProjectId, Project>,
    counters: BTreeMap<CounterId, Counter>,
    next_counter_id: CounterId,
    calls: Vec<MockCall>,
    beacons: Vec<TimerBeacon>,
}

#[derive(Debug, Clone, Default)]
pub struct MockLibraryClient {
    state: Arc<Mutex<LibraryState>>,
    fail_next_writes: Arc<AtomicUsize>,
    offline: Arc<AtomicBool>,
    beacon_refuses: Arc<AtomicBool>,
    delay: Option<Duration>,
}

impl MockLibraryClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call sleeps `delay` on the tokio clock before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_pattern(self, pattern: Pattern) -> Self {
        self.lock().patterns.insert(pattern.id, pattern);
        self
    }

    pub fn with_project(self, project: Project) -> Self {
        self.lock().projects.insert(project.id, project);
        self
    }

    pub fn with_counter(self, counter: Counter) -> Self {
        {
            let mut state = self.lock();
            state.next_counter_id = state.next_counter_id.max(counter.id);
            state.counters.insert(counter.id, counter);
        }
        self
    }

    /// Make the next `count` write calls fail with a server error
    pub fn fail_next_writes(&self, count: usize) {
        self.fail_next_writes.store(count, Ordering::SeqCst);
    }

    /// While offline every call fails with a network error
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn set_beacon_refuses(&self, refuses: bool) {
        self.beacon_refuses.store(refuses, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn write_calls(&self) -> Vec<MockCall> {
        self.lock().calls.iter().filter(|c| c.is_write()).cloned().collect()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn beacons(&self) -> Vec<TimerBeacon> {
        self.lock().beacons.clone()
    }

    pub fn pattern(&self, id: PatternId) -> Option<Pattern> {
        self.lock().patterns.get(&id).cloned()
    }

    pub fn counter(&self, id: CounterId) -> Option<Counter> {
        self.lock().counters.get(&id).cloned()
    }

    /// Counters of a pattern in position order
    pub fn counters_for(&self, pattern_id: PatternId) -> Vec<Counter> {
        let state = self.lock();
        sorted_counters(&state, pattern_id)
    }

    fn lock(&self) -> MutexGuard<'_, LibraryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record the call, then apply delay and failure injection
    async fn enter(&self, call: MockCall) -> ClientApiResult<()> {
        let is_write = call.is_write();
        tracing::trace!(?call, "mock library call");
        self.lock().calls.push(call);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if self.offline.load(Ordering::SeqCst) {
            return Err(ClientApiError::Network("mock library is offline".to_string()));
        }
        if is_write {
            let injected = self
                .fail_next_writes
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if injected {
                return Err(ClientApiError::Server("injected write failure".to_string()));
            }
        }
        Ok(())
    }

    fn with_counter_mut(
        &self,
        counter_id: CounterId,
        apply: impl FnOnce(&mut Counter),
    ) -> ClientApiResult<Counter> {
        let mut state = self.lock();
        let counter = state
            .counters
            .get_mut(&counter_id)
            .ok_or_else(|| ClientApiError::NotFound(format!("counter {}", counter_id)))?;
        apply(counter);
        Ok(counter.clone())
    }

    fn with_pattern_mut(
        &self,
        pattern_id: PatternId,
        apply: impl FnOnce(&mut Pattern),
    ) -> ClientApiResult<()> {
        let mut state = self.lock();
        let pattern = state
            .patterns
            .get_mut(&pattern_id)
            .ok_or_else(|| ClientApiError::NotFound(format!("pattern {}", pattern_id)))?;
        apply(pattern);
        Ok(())
    }
}

fn sorted_counters(state: &LibraryState, pattern_id: PatternId) -> Vec<Counter> {
    let mut counters: Vec<Counter> = state
        .counters
        .values()
        .filter(|c| c.pattern_id == pattern_id)
        .cloned()
        .collect();
    counters.sort_by_key(|c| (c.position, c.id));
    counters
}

#[async_trait]
impl LibraryApi for MockLibraryClient {
    async fn get_pattern(&self, id: PatternId) -> ClientApiResult<Option<Pattern>> {
        self.enter(MockCall::GetPattern(id)).await?;
        Ok(self.pattern(id))
    }

    async fn get_pattern_by_slug(&self, slug: &str) -> ClientApiResult<Option<Pattern>> {
        self.enter(MockCall::GetPatternBySlug(slug.to_string())).await?;
        Ok(self.lock().patterns.values().find(|p| p.slug == slug).cloned())
    }

    async fn get_project(&self, id: ProjectId) -> ClientApiResult<Option<Project>> {
        self.enter(MockCall::GetProject(id)).await?;
        Ok(self.lock().projects.get(&id).cloned())
    }

    async fn update_current_page(&self, pattern_id: PatternId, page: u32) -> ClientApiResult<()> {
        self.enter(MockCall::UpdatePage { pattern_id, page }).await?;
        if page == 0 {
            return Err(ClientApiError::InvalidRequest("page must be >= 1".to_string()));
        }
        self.with_pattern_mut(pattern_id, |p| p.current_page = page)
    }

    async fn update_timer(&self, pattern_id: PatternId, seconds: u64) -> ClientApiResult<()> {
        self.enter(MockCall::UpdateTimer { pattern_id, seconds }).await?;
        self.with_pattern_mut(pattern_id, |p| p.timer_seconds = seconds)
    }

    async fn mark_in_progress(&self, pattern_id: PatternId) -> ClientApiResult<()> {
        self.enter(MockCall::MarkInProgress(pattern_id)).await?;
        self.with_pattern_mut(pattern_id, |p| p.in_progress = true)
    }

    async fn list_counters(&self, pattern_id: PatternId) -> ClientApiResult<Vec<Counter>> {
        self.enter(MockCall::ListCounters(pattern_id)).await?;
        Ok(self.counters_for(pattern_id))
    }

    async fn create_counter(&self, pattern_id: PatternId, name: &str) -> ClientApiResult<Counter> {
        self.enter(MockCall::CreateCounter {
            pattern_id,
            name: name.to_string(),
        })
        .await?;
        let name =
            normalize_counter_name(name).map_err(|e| ClientApiError::InvalidRequest(e.to_string()))?;

        let mut state = self.lock();
        let position = sorted_counters(&state, pattern_id)
            .last()
            .map(|c| c.position + 1)
            .unwrap_or(0);
        state.next_counter_id += 1;
        let counter = Counter {
            id: state.next_counter_id,
            pattern_id,
            name,
            value: 0,
            position,
        };
        state.counters.insert(counter.id, counter.clone());
        Ok(counter)
    }

    async fn update_counter(
        &self,
        counter_id: CounterId,
        update: &UpdateCounterRequest,
    ) -> ClientApiResult<Counter> {
        self.enter(MockCall::UpdateCounter {
            counter_id,
            update: update.clone(),
        })
        .await?;
        let name = match &update.name {
            Some(name) => Some(
                normalize_counter_name(name)
                    .map_err(|e| ClientApiError::InvalidRequest(e.to_string()))?,
            ),
            None => None,
        };
        self.with_counter_mut(counter_id, |c| {
            if let Some(name) = name {
                c.name = name;
            }
            if let Some(value) = update.value {
                c.value = value;
            }
        })
    }

    async fn increment_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter> {
        self.enter(MockCall::Increment(counter_id)).await?;
        self.with_counter_mut(counter_id, |c| c.value += 1)
    }

    async fn decrement_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter> {
        self.enter(MockCall::Decrement(counter_id)).await?;
        self.with_counter_mut(counter_id, |c| c.value -= 1)
    }

    async fn reset_counter(&self, counter_id: CounterId) -> ClientApiResult<Counter> {
        self.enter(MockCall::Reset(counter_id)).await?;
        self.with_counter_mut(counter_id, |c| c.value = 0)
    }

    async fn delete_counter(&self, counter_id: CounterId) -> ClientApiResult<()> {
        self.enter(MockCall::Delete(counter_id)).await?;
        self.lock()
            .counters
            .remove(&counter_id)
            .map(|_| ())
            .ok_or_else(|| ClientApiError::NotFound(format!("counter {}", counter_id)))
    }
}

impl Beacon for MockLibraryClient {
    fn send_timer(&self, payload: &TimerBeacon) -> bool {
        if self.beacon_refuses.load(Ordering::SeqCst) || self.offline.load(Ordering::SeqCst) {
            return false;
        }
        let mut state = self.lock();
        state.beacons.push(payload.clone());
        if let Some(pattern) = state.patterns.get_mut(&payload.pattern_id) {
            pattern.timer_seconds = payload.timer_seconds;
        }
        true
    }
}
