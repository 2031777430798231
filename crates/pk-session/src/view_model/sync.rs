// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Write-behind queue for absolute-value backend writes
//!
//! Local state is updated first; the queue then persists the newest value per
//! key. Writes are sent one at a time in enqueue order, so two writes for the
//! same row are never in flight together. Failures keep the write queued and
//! retry with exponential backoff until [`MAX_ATTEMPTS`] is reached.

use std::time::Duration;

use pk_client_api::LibraryApi;
use pk_domain_types::{Counter, CounterId, PatternId};
use pk_rest_api_contract::UpdateCounterRequest;
use tracing::{debug, error, warn};

use crate::scheduler::{Scheduler, Slot};

pub const MAX_ATTEMPTS: u32 = 6;
const BACKOFF_BASE: Duration = Duration::from_secs(1);
const BACKOFF_CAP: Duration = Duration::from_secs(30);

/// Identity of a backend row; one pending write per key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WriteKey {
    Timer(PatternId),
    CounterValue(CounterId),
    Page(PatternId),
    InProgress(PatternId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingWrite {
    Timer { pattern_id: PatternId, seconds: u64 },
    CounterValue { counter_id: CounterId, value: i64 },
    Page { pattern_id: PatternId, page: u32 },
    InProgress { pattern_id: PatternId },
}

impl PendingWrite {
    pub fn key(&self) -> WriteKey {
        match *self {
            PendingWrite::Timer { pattern_id, .. } => WriteKey::Timer(pattern_id),
            PendingWrite::CounterValue { counter_id, .. } => WriteKey::CounterValue(counter_id),
            PendingWrite::Page { pattern_id, .. } => WriteKey::Page(pattern_id),
            PendingWrite::InProgress { pattern_id } => WriteKey::InProgress(pattern_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteOutcome {
    Ok,
    Failed(String),
}

/// What happened to one write during a flush
#[derive(Debug, Clone, PartialEq)]
pub struct WriteReport {
    pub key: WriteKey,
    pub outcome: WriteOutcome,
    /// Server copy of the counter after a successful counter write
    pub counter: Option<Counter>,
    /// The write was given up on after repeated failures
    pub dropped: bool,
}

#[derive(Debug, Clone)]
struct Entry {
    write: PendingWrite,
    attempts: u32,
}

#[derive(Debug)]
pub struct SyncQueue {
    entries: Vec<Entry>,
    debounce: Duration,
    warning: bool,
}

impl SyncQueue {
    pub fn new(debounce: Duration) -> Self {
        Self {
            entries: Vec::new(),
            debounce,
            warning: false,
        }
    }

    /// Queue `write`, replacing any older value for the same key in place
    pub fn enqueue(&mut self, write: PendingWrite, scheduler: &mut Scheduler) {
        let key = write.key();
        match self.entries.iter_mut().find(|e| e.write.key() == key) {
            Some(entry) => {
                entry.write = write;
                entry.attempts = 0;
            }
            None => self.entries.push(Entry { write, attempts: 0 }),
        }
        debug!(?write, "write queued");
        // a pending retry carries every queued write; only flush_now overrides it
        if !scheduler.is_armed(Slot::SyncRetry) {
            scheduler.arm(Slot::SaveDebounce, self.debounce);
        }
    }

    /// Forget a queued write that was delivered through another channel
    pub fn discard(&mut self, key: WriteKey) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.write.key() != key);
        before != self.entries.len()
    }

    pub fn is_pending(&self, key: WriteKey) -> bool {
        self.entries.iter().any(|e| e.write.key() == key)
    }

    pub fn has_pending(&self) -> bool {
        !self.entries.is_empty()
    }

    pub fn pending(&self) -> Vec<PendingWrite> {
        self.entries.iter().map(|e| e.write).collect()
    }

    /// A write was dropped and nothing has succeeded since
    pub fn has_warning(&self) -> bool {
        self.warning
    }

    /// Send queued writes in order, stopping at the first failure
    pub async fn flush(&mut self, api: &dyn LibraryApi, scheduler: &mut Scheduler) -> Vec<WriteReport> {
        scheduler.disarm(Slot::SaveDebounce);
        scheduler.disarm(Slot::SyncRetry);

        let mut reports = Vec::new();
        while let Some(entry) = self.entries.first().cloned() {
            let key = entry.write.key();
            match send(api, &entry.write).await {
                Ok(counter) => {
                    self.entries.remove(0);
                    self.warning = false;
                    debug!(?key, "write delivered");
                    reports.push(WriteReport {
                        key,
                        outcome: WriteOutcome::Ok,
                        counter,
                        dropped: false,
                    });
                }
                Err(reason) => {
                    let attempts = entry.attempts + 1;
                    if attempts >= MAX_ATTEMPTS {
                        self.entries.remove(0);
                        self.warning = true;
                        error!(?key, attempts, %reason, "giving up on write");
                    } else {
                        if let Some(head) = self.entries.first_mut() {
                            head.attempts = attempts;
                        }
                        let delay = backoff(attempts);
                        warn!(?key, attempts, retry_in = ?delay, %reason, "write failed");
                    }
                    reports.push(WriteReport {
                        key,
                        outcome: WriteOutcome::Failed(reason),
                        counter: None,
                        dropped: attempts >= MAX_ATTEMPTS,
                    });
                    if let Some(head) = self.entries.first() {
                        scheduler.arm(Slot::SyncRetry, backoff(head.attempts.max(1)));
                    }
                    break;
                }
            }
        }
        reports
    }
}

/// Delay before retry number `attempts` (1-based)
pub fn backoff(attempts: u32) -> Duration {
    let exponent = attempts.saturating_sub(1).min(16);
    BACKOFF_BASE.saturating_mul(1u32 << exponent).min(BACKOFF_CAP)
}

async fn send(api: &dyn LibraryApi, write: &PendingWrite) -> Result<Option<Counter>, String> {
    let result = match *write {
        PendingWrite::Timer {
            pattern_id,
            seconds,
        } => api.update_timer(pattern_id, seconds).await.map(|_| None),
        PendingWrite::CounterValue { counter_id, value } => api
            .update_counter(counter_id, &UpdateCounterRequest::value(value))
            .await
            .map(Some),
        PendingWrite::Page { pattern_id, page } => {
            api.update_current_page(pattern_id, page).await.map(|_| None)
        }
        PendingWrite::InProgress { pattern_id } => {
            api.mark_in_progress(pattern_id).await.map(|_| None)
        }
    };
    result.map_err(|e| e.to_string())
}
