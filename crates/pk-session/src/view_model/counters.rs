// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Ordered counters of the open pattern
//!
//! Value changes are applied locally and persisted as absolute values through
//! the write queue. Structural changes (create, rename, delete, reset) are
//! awaited and only touch local state once the backend accepted them.

use pk_domain_types::{Counter, CounterId, PatternId, DEFAULT_COUNTER_NAME};
use pk_rest_api_contract::validation::normalize_counter_name;
use pk_rest_api_contract::UpdateCounterRequest;
use pk_client_api::ClientApiError;
use tracing::{debug, info};

use crate::context::SessionContext;
use crate::error::{SessionError, SessionResult};
use crate::view_model::sync::{PendingWrite, WriteKey, WriteOutcome, WriteReport};

#[derive(Debug, Default)]
pub struct CounterRegistry {
    pattern_id: Option<PatternId>,
    counters: Vec<Counter>,
    active: Option<CounterId>,
}

impl CounterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the counters of `pattern_id`, creating the default one if none exist
    pub async fn load(&mut self, ctx: &mut SessionContext, pattern_id: PatternId) -> SessionResult<()> {
        self.clear();
        let mut counters = ctx.api.list_counters(pattern_id).await?;
        if counters.is_empty() {
            let created = ctx.api.create_counter(pattern_id, DEFAULT_COUNTER_NAME).await?;
            debug!(pattern_id, counter_id = created.id, "created default counter");
            counters.push(created);
        }
        self.pattern_id = Some(pattern_id);
        self.counters = counters;
        self.sort();
        self.active = self.counters.first().map(|c| c.id);
        Ok(())
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn pattern_id(&self) -> Option<PatternId> {
        self.pattern_id
    }

    /// Counters in position order
    pub fn counters(&self) -> &[Counter] {
        &self.counters
    }

    pub fn get(&self, id: CounterId) -> Option<&Counter> {
        self.counters.iter().find(|c| c.id == id)
    }

    pub fn active(&self) -> Option<CounterId> {
        self.active
    }

    pub fn active_counter(&self) -> Option<&Counter> {
        self.active.and_then(|id| self.get(id))
    }

    pub fn select(&mut self, id: CounterId) -> SessionResult<()> {
        if self.get(id).is_none() {
            return Err(SessionError::UnknownCounter(id));
        }
        self.active = Some(id);
        Ok(())
    }

    /// Move the active marker to the next counter by position, wrapping
    pub fn select_next(&mut self) -> Option<CounterId> {
        let next = match self.active.and_then(|id| self.index_of(id)) {
            Some(index) => self.counters.get((index + 1) % self.counters.len()),
            None => self.counters.first(),
        };
        self.active = next.map(|c| c.id);
        self.active
    }

    pub fn increment(&mut self, ctx: &mut SessionContext, id: CounterId) -> SessionResult<i64> {
        self.adjust(ctx, id, 1)
    }

    pub fn decrement(&mut self, ctx: &mut SessionContext, id: CounterId) -> SessionResult<i64> {
        self.adjust(ctx, id, -1)
    }

    /// Adjust the active counter; no-op without one
    pub fn adjust_active(&mut self, ctx: &mut SessionContext, delta: i64) -> SessionResult<Option<i64>> {
        match self.active {
            Some(id) => self.adjust(ctx, id, delta).map(Some),
            None => Ok(None),
        }
    }

    fn adjust(&mut self, ctx: &mut SessionContext, id: CounterId, delta: i64) -> SessionResult<i64> {
        let counter = self
            .counters
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(SessionError::UnknownCounter(id))?;
        counter.value = counter.value.saturating_add(delta);
        let value = counter.value;
        self.active = Some(id);
        ctx.enqueue(PendingWrite::CounterValue {
            counter_id: id,
            value,
        });
        Ok(value)
    }

    pub async fn add(&mut self, ctx: &mut SessionContext, name: &str) -> SessionResult<CounterId> {
        let pattern_id = self.pattern_id.ok_or(SessionError::NoPatternOpen)?;
        let name = if name.trim().is_empty() {
            DEFAULT_COUNTER_NAME.to_string()
        } else {
            normalize_counter_name(name).map_err(invalid_request)?
        };
        let created = ctx.api.create_counter(pattern_id, &name).await?;
        let id = created.id;
        self.counters.push(created);
        self.sort();
        if self.active.is_none() {
            self.active = Some(id);
        }
        info!(pattern_id, counter_id = id, "counter added");
        Ok(id)
    }

    /// Blank names are ignored; returns whether a rename happened
    pub async fn rename(&mut self, ctx: &mut SessionContext, id: CounterId, name: &str) -> SessionResult<bool> {
        if name.trim().is_empty() {
            return Ok(false);
        }
        if self.get(id).is_none() {
            return Err(SessionError::UnknownCounter(id));
        }
        let name = normalize_counter_name(name).map_err(invalid_request)?;
        let updated = ctx
            .api
            .update_counter(id, &UpdateCounterRequest::name(name))
            .await?;
        if let Some(counter) = self.counters.iter_mut().find(|c| c.id == id) {
            counter.name = updated.name;
        }
        Ok(true)
    }

    pub async fn remove(&mut self, ctx: &mut SessionContext, id: CounterId) -> SessionResult<()> {
        if self.get(id).is_none() {
            return Err(SessionError::UnknownCounter(id));
        }
        ctx.api.delete_counter(id).await?;
        ctx.sync.discard(WriteKey::CounterValue(id));
        self.counters.retain(|c| c.id != id);
        if self.active == Some(id) {
            self.active = self.counters.first().map(|c| c.id);
        }
        info!(counter_id = id, "counter removed");
        Ok(())
    }

    /// Zero a counter on the backend, superseding any queued value
    pub async fn reset_value(&mut self, ctx: &mut SessionContext, id: CounterId) -> SessionResult<()> {
        if self.get(id).is_none() {
            return Err(SessionError::UnknownCounter(id));
        }
        let server = ctx.api.reset_counter(id).await?;
        ctx.sync.discard(WriteKey::CounterValue(id));
        if let Some(counter) = self.counters.iter_mut().find(|c| c.id == id) {
            counter.value = server.value;
        }
        Ok(())
    }

    /// Adopt the server copy of a counter unless a newer local value is queued
    pub fn reconcile(&mut self, ctx: &SessionContext, report: &WriteReport) {
        if report.outcome != WriteOutcome::Ok {
            return;
        }
        let Some(server) = report.counter.as_ref() else {
            return;
        };
        if ctx.sync.is_pending(WriteKey::CounterValue(server.id)) {
            return;
        }
        if let Some(local) = self.counters.iter_mut().find(|c| c.id == server.id) {
            if local.value != server.value {
                debug!(counter_id = server.id, local = local.value, server = server.value, "adopting server counter value");
            }
            local.value = server.value;
            local.name = server.name.clone();
        }
    }

    fn index_of(&self, id: CounterId) -> Option<usize> {
        self.counters.iter().position(|c| c.id == id)
    }

    fn sort(&mut self) {
        self.counters.sort_by_key(|c| (c.position, c.id));
    }
}

fn invalid_request(err: pk_rest_api_contract::ApiContractError) -> SessionError {
    SessionError::Api(ClientApiError::InvalidRequest(err.to_string()))
}
