// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! View models of the viewing session
//!
//! Everything here runs headless: no terminal, no real clock. Time-driven
//! behaviour goes through the [`crate::scheduler::Scheduler`] and tokio's
//! clock, so tests drive it with `start_paused` and `time::advance`.
//!
//! Components, leaves first:
//!
//! - [`view_state::ViewStateStore`] persists zoom and scroll per pattern
//! - [`sync::SyncQueue`] persists absolute values write-behind
//! - [`counters::CounterRegistry`] owns the counters of the open pattern
//! - [`timer::TimerController`] owns the elapsed-time clock
//! - [`viewer::PatternViewer`] owns page and zoom of the open pattern
//! - [`input::InputDispatcher`] turns raw input into dispatches
//! - [`navigation::NavigationRouter`] owns the current view and back stack
//! - [`presenter::DualSurfacePresenter`] mirrors derived state onto both surfaces
//! - [`session::Session`] ties them together

pub mod counters;
pub mod input;
pub mod navigation;
pub mod presenter;
pub mod session;
pub mod sync;
pub mod timer;
pub mod view_state;
pub mod viewer;

pub use counters::CounterRegistry;
pub use input::{Command, Dispatch, InputDispatcher, RawInput, TouchPoint};
pub use navigation::{parse_fragment, NavTarget, NavigationRouter, TransitionOrigin};
pub use presenter::{DualSurfacePresenter, SurfaceKind, TimerIndicator, ToolbarViewModel};
pub use session::Session;
pub use sync::{PendingWrite, SyncQueue, WriteKey, WriteOutcome, WriteReport};
pub use timer::{ResetStep, TimerController, TimerStatus};
pub use view_state::ViewStateStore;
pub use viewer::PatternViewer;
