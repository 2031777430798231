// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Terminal setup and restoration for the viewer binary

use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, MouseEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use std::io;
use std::panic;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::view_model::input::{key_event_to_input, RawInput};

static CLEANUP_DONE: AtomicBool = AtomicBool::new(false);
static RAW_MODE_ENABLED: AtomicBool = AtomicBool::new(false);
static ALTERNATE_SCREEN_ACTIVE: AtomicBool = AtomicBool::new(false);
static MOUSE_CAPTURE_ENABLED: AtomicBool = AtomicBool::new(false);

/// Lines moved per mouse wheel notch, in page pixels
const WHEEL_STEP: f64 = 40.0;

/// Raw mode, alternate screen and mouse capture, restored on panic
pub fn setup_terminal() -> io::Result<()> {
    let mut stdout = io::stdout();

    crossterm::terminal::enable_raw_mode()?;
    RAW_MODE_ENABLED.store(true, Ordering::SeqCst);

    stdout.execute(EnterAlternateScreen)?;
    ALTERNATE_SCREEN_ACTIVE.store(true, Ordering::SeqCst);

    stdout.execute(EnableMouseCapture)?;
    MOUSE_CAPTURE_ENABLED.store(true, Ordering::SeqCst);

    let default_panic = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        cleanup_terminal();
        default_panic(panic_info);
    }));
    Ok(())
}

pub fn cleanup_terminal() {
    if CLEANUP_DONE.swap(true, Ordering::SeqCst) {
        return;
    }
    let mut stdout = io::stdout();

    if MOUSE_CAPTURE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = stdout.execute(DisableMouseCapture);
    }
    if RAW_MODE_ENABLED.swap(false, Ordering::SeqCst) {
        let _ = crossterm::terminal::disable_raw_mode();
    }
    if ALTERNATE_SCREEN_ACTIVE.swap(false, Ordering::SeqCst) {
        let _ = stdout.execute(LeaveAlternateScreen);
    }
}

/// Map a terminal event to session input
pub fn event_to_input(event: &Event) -> Option<RawInput> {
    match event {
        Event::Key(key) => key_event_to_input(key),
        Event::Mouse(mouse) => match mouse.kind {
            MouseEventKind::ScrollDown => Some(RawInput::ScrollBy {
                dx: 0.0,
                dy: WHEEL_STEP,
            }),
            MouseEventKind::ScrollUp => Some(RawInput::ScrollBy {
                dx: 0.0,
                dy: -WHEEL_STEP,
            }),
            MouseEventKind::ScrollRight => Some(RawInput::ScrollBy {
                dx: WHEEL_STEP,
                dy: 0.0,
            }),
            MouseEventKind::ScrollLeft => Some(RawInput::ScrollBy {
                dx: -WHEEL_STEP,
                dy: 0.0,
            }),
            _ => Some(RawInput::Pointer),
        },
        _ => None,
    }
}
