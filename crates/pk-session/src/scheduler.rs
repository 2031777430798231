// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Named deadline slots driven by the session loop
//!
//! Every delayed or periodic behaviour of the session (timer ticks, the
//! inactivity countdown, the reset confirmation window, debounced saves and
//! sync retries) is one [`Slot`]. Arming a slot replaces its previous
//! deadline, so a slot can never be armed twice.

use std::collections::BTreeMap;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Slot {
    TimerTick,
    Inactivity,
    ResetConfirm,
    SaveDebounce,
    SyncRetry,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Armed {
    deadline: Instant,
    period: Duration,
    repeating: bool,
}

#[derive(Debug, Default)]
pub struct Scheduler {
    slots: BTreeMap<Slot, Armed>,
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire `slot` once, `after` from now
    pub fn arm(&mut self, slot: Slot, after: Duration) {
        self.slots.insert(
            slot,
            Armed {
                deadline: Instant::now() + after,
                period: after,
                repeating: false,
            },
        );
    }

    /// Fire `slot` every `period`, first time one period from now
    pub fn arm_repeating(&mut self, slot: Slot, period: Duration) {
        self.slots.insert(
            slot,
            Armed {
                deadline: Instant::now() + period,
                period,
                repeating: true,
            },
        );
    }

    pub fn disarm(&mut self, slot: Slot) -> bool {
        self.slots.remove(&slot).is_some()
    }

    /// Push an armed slot's deadline out by its full duration again
    ///
    /// Returns false when the slot was not armed.
    pub fn reset(&mut self, slot: Slot) -> bool {
        match self.slots.get_mut(&slot) {
            Some(armed) => {
                armed.deadline = Instant::now() + armed.period;
                true
            }
            None => false,
        }
    }

    pub fn is_armed(&self, slot: Slot) -> bool {
        self.slots.contains_key(&slot)
    }

    pub fn deadline(&self, slot: Slot) -> Option<Instant> {
        self.slots.get(&slot).map(|armed| armed.deadline)
    }

    pub fn armed_count(&self) -> usize {
        self.slots.len()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.values().map(|armed| armed.deadline).min()
    }

    /// Take the earliest slot whose deadline is at or before `now`
    ///
    /// One-shot slots are disarmed; repeating slots move one period forward
    /// from their previous deadline so ticks do not drift.
    pub fn pop_due(&mut self, now: Instant) -> Option<Slot> {
        let (slot, armed) = self
            .slots
            .iter()
            .filter(|(_, armed)| armed.deadline <= now)
            .min_by_key(|(slot, armed)| (armed.deadline, **slot))
            .map(|(slot, armed)| (*slot, *armed))?;

        if armed.repeating {
            if let Some(entry) = self.slots.get_mut(&slot) {
                entry.deadline = armed.deadline + armed.period;
            }
        } else {
            self.slots.remove(&slot);
        }
        Some(slot)
    }
}
