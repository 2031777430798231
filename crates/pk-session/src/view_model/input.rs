// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Raw input normalization
//!
//! Keyboard keys, OS media actions and touch gestures are reduced to a
//! [`Dispatch`] that names at most one owning component. The dispatcher owns
//! only gesture tracking and the shortcut capture state.

use std::time::Duration;

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MediaKeyCode, ModifierKeyCode};
use pk_domain_types::{CounterId, Tab, ZoomMode};
use tokio::time::Instant;
use tracing::debug;

use crate::context::SessionContext;
use crate::media::MediaAction;
use crate::settings::{KeyId, ShortcutAction};
use crate::view_model::navigation::NavTarget;

pub const SWIPE_MIN_DISTANCE: f64 = 50.0;
pub const SWIPE_MAX_DURATION: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchPoint {
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    fn distance_to(&self, other: &TouchPoint) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Input as delivered by the platform
#[derive(Debug, Clone, PartialEq)]
pub enum RawInput {
    Key { key: KeyId, in_text_field: bool },
    Media(MediaAction),
    TouchStart(Vec<TouchPoint>),
    TouchMove(Vec<TouchPoint>),
    /// `point` is where the lifted finger was; `remaining` touches stay down
    TouchEnd { point: Option<TouchPoint>, remaining: usize },
    Scroll { x: f64, y: f64 },
    /// Relative scroll, e.g. a mouse wheel
    ScrollBy { dx: f64, dy: f64 },
    /// Pointer movement or press
    Pointer,
}

impl RawInput {
    pub fn key(key: &str) -> Self {
        RawInput::Key {
            key: KeyId::new(key),
            in_text_field: false,
        }
    }

    /// Events that postpone the inactivity countdown
    pub fn is_activity(&self) -> bool {
        matches!(
            self,
            RawInput::Key { .. }
                | RawInput::TouchStart(_)
                | RawInput::Scroll { .. }
                | RawInput::ScrollBy { .. }
                | RawInput::Pointer
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PinchPhase {
    Start { distance: f64 },
    Move { distance: f64 },
    End,
}

/// Where one raw input goes
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    Ignored,
    Action(ShortcutAction),
    Pinch(PinchPhase),
    Scroll { x: f64, y: f64 },
    ScrollBy { dx: f64, dy: f64 },
    Captured {
        action: ShortcutAction,
        key: KeyId,
        stolen_from: Option<ShortcutAction>,
    },
    CaptureCancelled,
}

/// Shortcut slot waiting for its next key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTarget {
    pub action: ShortcutAction,
    pub slot: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Gesture {
    Idle,
    Swipe { start: TouchPoint, started_at: Instant },
    Pinch,
}

#[derive(Debug)]
pub struct InputDispatcher {
    capture: Option<CaptureTarget>,
    gesture: Gesture,
}

impl Default for InputDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl InputDispatcher {
    pub fn new() -> Self {
        Self {
            capture: None,
            gesture: Gesture::Idle,
        }
    }

    pub fn begin_capture(&mut self, action: ShortcutAction, slot: usize) {
        debug!(%action, slot, "listening for shortcut key");
        self.capture = Some(CaptureTarget { action, slot });
    }

    pub fn cancel_capture(&mut self) -> bool {
        self.capture.take().is_some()
    }

    pub fn capture_target(&self) -> Option<CaptureTarget> {
        self.capture
    }

    pub fn dispatch(&mut self, input: RawInput, ctx: &mut SessionContext, viewer_open: bool) -> Dispatch {
        match input {
            RawInput::Key { key, in_text_field } => {
                if self.capture.is_some() {
                    return self.capture_key(key, ctx);
                }
                if !viewer_open || in_text_field {
                    return Dispatch::Ignored;
                }
                resolve(ctx, &key)
            }
            RawInput::Media(action) => {
                let key = action.key_id();
                if self.capture.is_some() {
                    return self.capture_key(key, ctx);
                }
                if !viewer_open || !ctx.config.media_keys || !ctx.media.is_playing() {
                    return Dispatch::Ignored;
                }
                resolve(ctx, &key)
            }
            RawInput::TouchStart(points) => {
                self.touch_start(&points);
                match (self.gesture, points.as_slice()) {
                    (Gesture::Pinch, [a, b, ..]) if viewer_open => Dispatch::Pinch(PinchPhase::Start {
                        distance: a.distance_to(b),
                    }),
                    _ => Dispatch::Ignored,
                }
            }
            RawInput::TouchMove(points) => match (self.gesture, points.as_slice()) {
                (Gesture::Pinch, [a, b, ..]) if viewer_open => Dispatch::Pinch(PinchPhase::Move {
                    distance: a.distance_to(b),
                }),
                _ => Dispatch::Ignored,
            },
            RawInput::TouchEnd { point, remaining } => self.touch_end(point, remaining, viewer_open),
            RawInput::Scroll { x, y } if viewer_open => Dispatch::Scroll { x, y },
            RawInput::ScrollBy { dx, dy } if viewer_open => Dispatch::ScrollBy { dx, dy },
            RawInput::Scroll { .. } | RawInput::ScrollBy { .. } | RawInput::Pointer => Dispatch::Ignored,
        }
    }

    fn capture_key(&mut self, key: KeyId, ctx: &mut SessionContext) -> Dispatch {
        if key.as_str() == "Escape" {
            self.capture = None;
            return Dispatch::CaptureCancelled;
        }
        if key.is_modifier_only() {
            return Dispatch::Ignored;
        }
        let Some(target) = self.capture.take() else {
            return Dispatch::Ignored;
        };
        match ctx.shortcuts.bind(target.action, target.slot, key.clone()) {
            Ok(outcome) => {
                ctx.save_shortcuts();
                Dispatch::Captured {
                    action: target.action,
                    key,
                    stolen_from: outcome.stolen_from,
                }
            }
            Err(err) => {
                debug!(error = %err, "shortcut capture rejected");
                Dispatch::CaptureCancelled
            }
        }
    }

    fn touch_start(&mut self, points: &[TouchPoint]) {
        self.gesture = match (self.gesture, points) {
            (_, [_, _, ..]) => Gesture::Pinch,
            // a second finger joining later keeps the pinch
            (Gesture::Pinch, _) => Gesture::Pinch,
            (_, [start]) => Gesture::Swipe {
                start: *start,
                started_at: Instant::now(),
            },
            (_, []) => Gesture::Idle,
        };
    }

    fn touch_end(&mut self, point: Option<TouchPoint>, remaining: usize, viewer_open: bool) -> Dispatch {
        match self.gesture {
            Gesture::Pinch => {
                if remaining >= 2 {
                    return Dispatch::Ignored;
                }
                // leftover finger must not turn into a swipe
                if remaining == 0 {
                    self.gesture = Gesture::Idle;
                }
                if viewer_open {
                    Dispatch::Pinch(PinchPhase::End)
                } else {
                    Dispatch::Ignored
                }
            }
            Gesture::Swipe { start, started_at } => {
                self.gesture = Gesture::Idle;
                match (point, viewer_open) {
                    (Some(end), true) => classify_swipe(start, end, started_at.elapsed())
                        .map(Dispatch::Action)
                        .unwrap_or(Dispatch::Ignored),
                    _ => Dispatch::Ignored,
                }
            }
            Gesture::Idle => Dispatch::Ignored,
        }
    }
}

fn resolve(ctx: &SessionContext, key: &KeyId) -> Dispatch {
    ctx.shortcuts
        .action_for(key)
        .map(Dispatch::Action)
        .unwrap_or(Dispatch::Ignored)
}

/// Swipe direction to action; screen y grows downwards
pub fn classify_swipe(start: TouchPoint, end: TouchPoint, elapsed: Duration) -> Option<ShortcutAction> {
    if elapsed >= SWIPE_MAX_DURATION {
        return None;
    }
    let dx = end.x - start.x;
    let dy = end.y - start.y;
    if dx.abs() >= dy.abs() {
        if dx.abs() <= SWIPE_MIN_DISTANCE {
            return None;
        }
        Some(if dx < 0.0 {
            ShortcutAction::PageNext
        } else {
            ShortcutAction::PagePrev
        })
    } else {
        if dy.abs() <= SWIPE_MIN_DISTANCE {
            return None;
        }
        Some(if dy < 0.0 {
            ShortcutAction::CounterIncrease
        } else {
            ShortcutAction::CounterDecrease
        })
    }
}

/// Map a terminal key event to session input
///
/// Media keys become [`RawInput::Media`] so they stay behind the opt-in.
pub fn key_event_to_input(event: &KeyEvent) -> Option<RawInput> {
    if event.kind == KeyEventKind::Release {
        return None;
    }
    let key = match event.code {
        KeyCode::Media(media) => {
            let action = match media {
                MediaKeyCode::Play => MediaAction::Play,
                MediaKeyCode::Pause => MediaAction::Pause,
                MediaKeyCode::PlayPause => MediaAction::PlayPause,
                MediaKeyCode::TrackNext => MediaAction::NextTrack,
                MediaKeyCode::TrackPrevious => MediaAction::PreviousTrack,
                MediaKeyCode::Stop => MediaAction::Stop,
                _ => return None,
            };
            return Some(RawInput::Media(action));
        }
        KeyCode::Modifier(modifier) => match modifier {
            ModifierKeyCode::LeftShift | ModifierKeyCode::RightShift => "Shift".to_string(),
            ModifierKeyCode::LeftControl | ModifierKeyCode::RightControl => "Control".to_string(),
            ModifierKeyCode::LeftAlt | ModifierKeyCode::RightAlt => "Alt".to_string(),
            _ => "Meta".to_string(),
        },
        KeyCode::Up => "ArrowUp".to_string(),
        KeyCode::Down => "ArrowDown".to_string(),
        KeyCode::Left => "ArrowLeft".to_string(),
        KeyCode::Right => "ArrowRight".to_string(),
        KeyCode::PageUp => "PageUp".to_string(),
        KeyCode::PageDown => "PageDown".to_string(),
        KeyCode::Home => "Home".to_string(),
        KeyCode::End => "End".to_string(),
        KeyCode::Tab => "Tab".to_string(),
        KeyCode::Esc => "Escape".to_string(),
        KeyCode::Enter => "Enter".to_string(),
        KeyCode::Backspace => "Backspace".to_string(),
        KeyCode::Delete => "Delete".to_string(),
        KeyCode::F(n) => format!("F{}", n),
        KeyCode::Char(c) if event.modifiers.contains(KeyModifiers::CONTROL) => {
            format!("Control+{}", c.to_ascii_lowercase())
        }
        KeyCode::Char(c) => c.to_string(),
        _ => return None,
    };
    Some(RawInput::Key {
        key: KeyId::new(&key),
        in_text_field: false,
    })
}

/// Typed session commands
///
/// Shortcut actions convert into commands; everything the surfaces can do
/// beyond shortcuts is expressed here as well.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    PageNext,
    PagePrev,
    GoToPage(u32),
    CounterIncrease,
    CounterDecrease,
    ToggleTimer,
    NextCounter,
    ZoomIn,
    ZoomOut,
    SetZoomMode(ZoomMode),
    ExitViewer,
    StartTimer,
    StopTimer,
    ResetTimer,
    SelectCounter(CounterId),
    IncrementCounter(CounterId),
    DecrementCounter(CounterId),
    ResetCounter(CounterId),
    AddCounter(String),
    RenameCounter(CounterId, String),
    RemoveCounter(CounterId),
    Navigate(NavTarget),
    GoBack,
    SetDefaultTab(Tab),
    BeginShortcutCapture { action: ShortcutAction, slot: usize },
    CancelShortcutCapture,
    UnbindShortcut { action: ShortcutAction, slot: usize },
    ResetShortcuts,
    SetMediaKeys(bool),
}

impl From<ShortcutAction> for Command {
    fn from(action: ShortcutAction) -> Self {
        match action {
            ShortcutAction::PageNext => Command::PageNext,
            ShortcutAction::PagePrev => Command::PagePrev,
            ShortcutAction::CounterIncrease => Command::CounterIncrease,
            ShortcutAction::CounterDecrease => Command::CounterDecrease,
            ShortcutAction::ToggleTimer => Command::ToggleTimer,
            ShortcutAction::NextCounter => Command::NextCounter,
            ShortcutAction::ZoomIn => Command::ZoomIn,
            ShortcutAction::ZoomOut => Command::ZoomOut,
            ShortcutAction::ExitViewer => Command::ExitViewer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn swipe_directions() {
        let origin = TouchPoint::new(200.0, 200.0);
        let quick = Duration::from_millis(200);
        assert_eq!(
            classify_swipe(origin, TouchPoint::new(100.0, 210.0), quick),
            Some(ShortcutAction::PageNext)
        );
        assert_eq!(
            classify_swipe(origin, TouchPoint::new(300.0, 190.0), quick),
            Some(ShortcutAction::PagePrev)
        );
        assert_eq!(
            classify_swipe(origin, TouchPoint::new(210.0, 100.0), quick),
            Some(ShortcutAction::CounterIncrease)
        );
        assert_eq!(
            classify_swipe(origin, TouchPoint::new(190.0, 300.0), quick),
            Some(ShortcutAction::CounterDecrease)
        );
    }

    #[test]
    fn short_or_slow_swipes_are_ignored() {
        let origin = TouchPoint::new(0.0, 0.0);
        assert_eq!(
            classify_swipe(origin, TouchPoint::new(-50.0, 0.0), Duration::from_millis(100)),
            None
        );
        assert_eq!(
            classify_swipe(origin, TouchPoint::new(-200.0, 0.0), Duration::from_millis(500)),
            None
        );
    }

    #[test]
    fn terminal_keys_use_dom_names() {
        let to_key = |code| match key_event_to_input(&KeyEvent::new(code, KeyModifiers::NONE)) {
            Some(RawInput::Key { key, .. }) => Some(key.to_string()),
            _ => None,
        };
        assert_eq!(to_key(KeyCode::Up).as_deref(), Some("ArrowUp"));
        assert_eq!(to_key(KeyCode::Esc).as_deref(), Some("Escape"));
        assert_eq!(to_key(KeyCode::Char('T')).as_deref(), Some("t"));
        assert_eq!(to_key(KeyCode::Char('+')).as_deref(), Some("+"));
        assert_eq!(
            key_event_to_input(&KeyEvent::new(
                KeyCode::Media(MediaKeyCode::TrackNext),
                KeyModifiers::NONE
            )),
            Some(RawInput::Media(MediaAction::NextTrack))
        );
    }

    #[test]
    fn actions_become_commands() {
        assert_eq!(Command::from(ShortcutAction::ExitViewer), Command::ExitViewer);
        assert_eq!(Command::from(ShortcutAction::NextCounter), Command::NextCounter);
    }
}
