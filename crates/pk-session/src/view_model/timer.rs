// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Elapsed-time clock of the open pattern
//!
//! While running, exactly two scheduler slots belong to the timer: the 1 Hz
//! [`Slot::TimerTick`] and the [`Slot::Inactivity`] countdown. Both are armed
//! on start and disarmed on every kind of stop.

use std::time::Duration;

use pk_domain_types::{Pattern, PatternId};
use pk_rest_api_contract::TimerBeacon;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::context::SessionContext;
use crate::scheduler::Slot;
use crate::view_model::sync::{PendingWrite, WriteKey};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);
pub const RESET_CONFIRM_WINDOW: Duration = Duration::from_secs(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimerStatus {
    #[default]
    Stopped,
    Running,
    /// Stopped by the inactivity countdown; resumes on the next activity
    AutoPaused,
}

/// Result of a reset request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetStep {
    /// Confirmation window opened
    Armed,
    /// Elapsed time zeroed; the caller flushes writes immediately
    Done,
    Ignored,
}

#[derive(Debug, Default)]
pub struct TimerController {
    pattern_id: Option<PatternId>,
    elapsed_seconds: u64,
    status: TimerStatus,
    ticks_since_save: u32,
    last_tick_at: Option<Instant>,
    reset_armed: bool,
    /// Activity restarted an auto-paused clock and no tick has passed since
    resumed_by_activity: bool,
}

impl TimerController {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the timer to a freshly opened pattern
    pub fn attach(&mut self, pattern: &Pattern) {
        *self = Self {
            pattern_id: Some(pattern.id),
            elapsed_seconds: pattern.timer_seconds,
            ..Self::default()
        };
    }

    /// Forget the pattern; the caller stops the timer first
    pub fn detach(&mut self, ctx: &mut SessionContext) {
        ctx.scheduler.disarm(Slot::ResetConfirm);
        *self = Self::default();
    }

    pub fn pattern_id(&self) -> Option<PatternId> {
        self.pattern_id
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.elapsed_seconds
    }

    pub fn status(&self) -> TimerStatus {
        self.status
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }

    pub fn last_tick_at(&self) -> Option<Instant> {
        self.last_tick_at
    }

    pub fn reset_armed(&self) -> bool {
        self.reset_armed
    }

    /// Returns false when already running or no pattern is open
    pub fn start(&mut self, ctx: &mut SessionContext) -> bool {
        if self.is_running() {
            return false;
        }
        let Some(pattern_id) = self.pattern_id.filter(|id| ctx.open_pattern_id() == Some(*id)) else {
            return false;
        };

        self.status = TimerStatus::Running;
        ctx.scheduler.arm_repeating(Slot::TimerTick, TICK_PERIOD);
        ctx.scheduler.arm(Slot::Inactivity, ctx.config.inactivity_timeout());
        debug!(pattern_id, elapsed = self.elapsed_seconds, "timer started");

        if ctx.config.auto_mark_in_progress {
            let needs_flag = ctx.open_pattern.as_ref().is_some_and(|p| !p.in_progress);
            if needs_flag {
                if let Some(pattern) = ctx.open_pattern.as_mut() {
                    pattern.in_progress = true;
                }
                ctx.enqueue(PendingWrite::InProgress { pattern_id });
            }
        }
        true
    }

    /// Halt the clock and persist the elapsed time
    ///
    /// With `flush_sync` the value leaves through the beacon immediately,
    /// otherwise it joins the debounced write queue.
    pub fn stop(&mut self, ctx: &mut SessionContext, flush_sync: bool) {
        ctx.scheduler.disarm(Slot::TimerTick);
        ctx.scheduler.disarm(Slot::Inactivity);
        let was_active = self.status != TimerStatus::Stopped;
        self.status = TimerStatus::Stopped;
        self.resumed_by_activity = false;
        self.ticks_since_save = 0;

        let Some(pattern_id) = self.pattern_id else {
            return;
        };
        if !was_active && !ctx.sync.is_pending(WriteKey::Timer(pattern_id)) {
            return;
        }
        debug!(pattern_id, elapsed = self.elapsed_seconds, flush_sync, "timer stopped");

        if flush_sync {
            let payload = TimerBeacon {
                pattern_id,
                timer_seconds: self.elapsed_seconds,
            };
            if ctx.beacon.send_timer(&payload) {
                ctx.sync.discard(WriteKey::Timer(pattern_id));
                return;
            }
            warn!(pattern_id, "timer beacon refused, falling back to queued write");
        }
        ctx.enqueue(PendingWrite::Timer {
            pattern_id,
            seconds: self.elapsed_seconds,
        });
    }

    pub fn toggle(&mut self, ctx: &mut SessionContext) {
        if self.is_running() && self.resumed_by_activity {
            // the activity was the press that issued this toggle
            self.resumed_by_activity = false;
            debug!(pattern_id = ?self.pattern_id, "toggle absorbed by activity resume");
            return;
        }
        if self.is_running() {
            self.stop(ctx, false);
        } else {
            self.start(ctx);
        }
    }

    pub fn tick(&mut self, ctx: &mut SessionContext) {
        if !self.is_running() {
            return;
        }
        self.elapsed_seconds += 1;
        self.resumed_by_activity = false;
        self.last_tick_at = Some(Instant::now());
        self.ticks_since_save += 1;

        if self.ticks_since_save >= ctx.config.timer_save_every_ticks {
            self.ticks_since_save = 0;
            if let Some(pattern_id) = self.pattern_id {
                ctx.enqueue(PendingWrite::Timer {
                    pattern_id,
                    seconds: self.elapsed_seconds,
                });
            }
        }
    }

    /// Any qualifying user activity
    pub fn note_activity(&mut self, ctx: &mut SessionContext) {
        match self.status {
            TimerStatus::Running => {
                ctx.scheduler.reset(Slot::Inactivity);
            }
            TimerStatus::AutoPaused => {
                info!(pattern_id = ?self.pattern_id, "activity resumed auto-paused timer");
                self.resumed_by_activity = self.start(ctx);
            }
            TimerStatus::Stopped => {}
        }
    }

    pub fn inactivity_expired(&mut self, ctx: &mut SessionContext) {
        if !self.is_running() {
            return;
        }
        info!(pattern_id = ?self.pattern_id, elapsed = self.elapsed_seconds, "timer auto-paused after inactivity");
        self.stop(ctx, false);
        self.status = TimerStatus::AutoPaused;
    }

    /// First call arms the confirmation window, a second call inside it resets
    pub fn request_reset(&mut self, ctx: &mut SessionContext) -> ResetStep {
        let Some(pattern_id) = self.pattern_id else {
            return ResetStep::Ignored;
        };
        if !self.reset_armed {
            self.reset_armed = true;
            ctx.scheduler.arm(Slot::ResetConfirm, RESET_CONFIRM_WINDOW);
            return ResetStep::Armed;
        }

        self.reset_armed = false;
        ctx.scheduler.disarm(Slot::ResetConfirm);
        self.elapsed_seconds = 0;
        self.ticks_since_save = 0;
        ctx.enqueue(PendingWrite::Timer {
            pattern_id,
            seconds: 0,
        });
        info!(pattern_id, "timer reset");
        ResetStep::Done
    }

    pub fn reset_window_expired(&mut self) {
        self.reset_armed = false;
    }
}
