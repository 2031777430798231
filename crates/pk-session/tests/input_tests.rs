// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Keyboard shortcuts, shortcut capture, media keys and touch gestures

mod common;

use std::time::Duration;

use common::{counter, pattern, Harness, HarnessBuilder};
use pk_domain_types::{PatternRef, Tab, ZoomMode};
use pk_rest_mock_client::MockLibraryClient;
use pk_session::view_model::{Command, NavTarget, RawInput, TouchPoint};
use pk_session::{
    KeyId, KeyValueStore, MediaAction, MemoryStore, SessionError, ShortcutAction, ShortcutError,
};

fn library() -> MockLibraryClient {
    MockLibraryClient::new()
        .with_pattern(pattern(42, "cabled-socks"))
        .with_counter(counter(1, 42, "Row", 5, 0))
}

async fn open_in(mut h: Harness) -> Harness {
    h.session.resolve_initial_view().await;
    h.session.navigate(NavTarget::Pattern(PatternRef::Id(42))).await;
    h
}

fn page(h: &Harness) -> u32 {
    h.session.viewer().map(|v| v.page()).unwrap_or(0)
}

fn row(h: &Harness) -> i64 {
    h.session.counters().get(1).map(|c| c.value).unwrap_or(i64::MIN)
}

fn keys(raw: &[&str]) -> Vec<KeyId> {
    raw.iter().map(|k| KeyId::new(k)).collect()
}

#[tokio::test(start_paused = true)]
async fn default_bindings_drive_the_viewer() {
    let mut h = open_in(Harness::new(library())).await;

    h.key("ArrowRight").await;
    h.key("PageDown").await;
    assert_eq!(page(&h), 3);
    h.key("PageUp").await;
    assert_eq!(page(&h), 2);

    h.key("ArrowUp").await;
    assert_eq!(row(&h), 6);

    h.key("=").await;
    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!(state.zoom_mode, ZoomMode::Manual);
    assert_eq!(state.zoom_scale, 1.1);

    // letter bindings ignore case
    h.key("T").await;
    assert!(h.session.timer().is_running());
}

#[tokio::test(start_paused = true)]
async fn keys_are_ignored_outside_the_viewer_and_in_text_fields() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    h.key("t").await;
    assert!(!h.session.timer().is_running());

    h.session.navigate(NavTarget::Pattern(PatternRef::Id(42))).await;
    h.session
        .handle_input(RawInput::Key {
            key: KeyId::new("ArrowRight"),
            in_text_field: true,
        })
        .await
        .unwrap();
    assert_eq!(page(&h), 1);
}

#[tokio::test(start_paused = true)]
async fn escape_leaves_the_viewer() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    h.session.navigate(NavTarget::Tab(Tab::Projects)).await;
    h.session.navigate(NavTarget::Pattern(PatternRef::Id(42))).await;

    h.key("Escape").await;

    assert_eq!(
        h.session.current_view(),
        &pk_domain_types::SessionView::Tab(Tab::Projects)
    );
    assert!(h.session.viewer().is_none());
}

#[tokio::test(start_paused = true)]
async fn captured_key_moves_between_actions() {
    let local = MemoryStore::new();
    let mut h = HarnessBuilder::new(library()).local(local.clone()).build();
    h.session.resolve_initial_view().await;
    h.session.navigate(NavTarget::Tab(Tab::Settings)).await;

    h.session
        .execute(Command::BeginShortcutCapture {
            action: ShortcutAction::PageNext,
            slot: 2,
        })
        .await
        .unwrap();
    let hint = h
        .session
        .presenter()
        .desktop()
        .model
        .as_ref()
        .and_then(|m| m.capture_hint.clone());
    assert!(hint.is_some());

    // modifiers alone never bind
    h.key("Shift").await;
    assert!(h.session.input().capture_target().is_some());

    h.key("ArrowUp").await;
    assert!(h.session.input().capture_target().is_none());

    let shortcuts = &h.session.ctx().shortcuts;
    assert_eq!(
        shortcuts.bindings(ShortcutAction::PageNext),
        keys(&["ArrowRight", "PageDown", "ArrowUp"]).as_slice()
    );
    assert_eq!(
        shortcuts.bindings(ShortcutAction::CounterIncrease),
        keys(&["MediaTrackNext"]).as_slice()
    );
    assert!(local.get("shortcutBindings").is_some());

    h.session.navigate(NavTarget::Pattern(PatternRef::Id(42))).await;
    h.key("ArrowUp").await;
    assert_eq!(page(&h), 2);
    assert_eq!(row(&h), 5);

    // a later session reads the saved bindings
    let h2 = HarnessBuilder::new(library()).local(local).build();
    assert_eq!(
        h2.session.ctx().shortcuts.action_for(&KeyId::new("ArrowUp")),
        Some(ShortcutAction::PageNext)
    );
}

#[tokio::test(start_paused = true)]
async fn escape_cancels_capture() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    h.session
        .execute(Command::BeginShortcutCapture {
            action: ShortcutAction::ZoomOut,
            slot: 0,
        })
        .await
        .unwrap();

    h.key("Escape").await;

    assert!(h.session.input().capture_target().is_none());
    assert_eq!(
        h.session.ctx().shortcuts.bindings(ShortcutAction::ZoomOut),
        keys(&["-"]).as_slice()
    );
}

#[tokio::test(start_paused = true)]
async fn capture_slot_must_exist() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;

    let result = h
        .session
        .execute(Command::BeginShortcutCapture {
            action: ShortcutAction::ZoomIn,
            slot: 3,
        })
        .await;

    assert!(matches!(
        result,
        Err(SessionError::Shortcut(ShortcutError::SlotOutOfRange { slot: 3, max: 3 }))
    ));
    assert!(h.session.input().capture_target().is_none());
}

#[tokio::test(start_paused = true)]
async fn unbind_and_reset_shortcuts() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;

    h.session
        .execute(Command::UnbindShortcut {
            action: ShortcutAction::PagePrev,
            slot: 0,
        })
        .await
        .unwrap();
    assert_eq!(
        h.session.ctx().shortcuts.bindings(ShortcutAction::PagePrev),
        keys(&["PageUp"]).as_slice()
    );

    h.session.execute(Command::ResetShortcuts).await.unwrap();
    assert_eq!(
        h.session.ctx().shortcuts.bindings(ShortcutAction::PagePrev),
        keys(&["ArrowLeft", "PageUp"]).as_slice()
    );
}

#[tokio::test(start_paused = true)]
async fn media_keys_need_opt_in() {
    let mut h = open_in(Harness::new(library())).await;
    h.session
        .handle_input(RawInput::Media(MediaAction::NextTrack))
        .await
        .unwrap();
    assert_eq!(row(&h), 5);
    assert!(!h.media_playing());

    let mut h = open_in(HarnessBuilder::new(library()).config(|c| c.media_keys = true).build()).await;
    assert!(h.media_playing());
    h.session
        .handle_input(RawInput::Media(MediaAction::NextTrack))
        .await
        .unwrap();
    h.session
        .handle_input(RawInput::Media(MediaAction::PlayPause))
        .await
        .unwrap();
    assert_eq!(row(&h), 6);
    assert!(h.session.timer().is_running());

    h.session.execute(Command::SetMediaKeys(false)).await.unwrap();
    assert!(!h.media_playing());
    h.session
        .handle_input(RawInput::Media(MediaAction::NextTrack))
        .await
        .unwrap();
    assert_eq!(row(&h), 6);
}

#[tokio::test(start_paused = true)]
async fn swipes_turn_pages_and_count() {
    let mut h = open_in(Harness::new(library())).await;

    swipe(&mut h, (300.0, 400.0), (150.0, 410.0)).await;
    assert_eq!(page(&h), 2);
    swipe(&mut h, (150.0, 400.0), (300.0, 390.0)).await;
    assert_eq!(page(&h), 1);
    swipe(&mut h, (200.0, 400.0), (205.0, 300.0)).await;
    assert_eq!(row(&h), 6);
    swipe(&mut h, (200.0, 300.0), (195.0, 400.0)).await;
    assert_eq!(row(&h), 5);

    // too short
    swipe(&mut h, (200.0, 400.0), (240.0, 400.0)).await;
    assert_eq!(page(&h), 1);
}

#[tokio::test(start_paused = true)]
async fn slow_swipe_is_ignored() {
    let mut h = open_in(Harness::new(library())).await;

    touch_start(&mut h, &[(300.0, 400.0)]).await;
    tokio::time::advance(Duration::from_millis(600)).await;
    touch_end(&mut h, Some((100.0, 400.0)), 0).await;

    assert_eq!(page(&h), 1);
}

#[tokio::test(start_paused = true)]
async fn pinch_previews_then_commits_manual_zoom() {
    let mut h = open_in(Harness::new(library())).await;
    let renders_before = h.renderer.renders().len();

    touch_start(&mut h, &[(100.0, 100.0), (200.0, 100.0)]).await;
    assert!(h.session.viewer().is_some_and(|v| v.is_pinching()));
    h.session
        .handle_input(RawInput::TouchMove(vec![
            TouchPoint::new(100.0, 100.0),
            TouchPoint::new(300.0, 100.0),
        ]))
        .await
        .unwrap();
    assert_eq!(h.renderer.preview_scale(), Some(2.0));
    assert_eq!(h.renderer.renders().len(), renders_before, "preview does not re-render");

    // lifting one finger ends the pinch without a swipe
    touch_end(&mut h, Some((300.0, 100.0)), 1).await;
    touch_end(&mut h, Some((100.0, 100.0)), 0).await;

    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!(state.zoom_mode, ZoomMode::Manual);
    assert_eq!(state.zoom_scale, 2.0);
    assert_eq!(h.renderer.last_render().map(|r| r.scale), Some(2.0));
    assert_eq!(page(&h), 1);
}

#[tokio::test(start_paused = true)]
async fn scrolling_is_kept_in_view_state() {
    let local = MemoryStore::new();
    let mut h = open_in(HarnessBuilder::new(library()).local(local.clone()).build()).await;

    h.session
        .handle_input(RawInput::Scroll { x: 0.0, y: 480.0 })
        .await
        .unwrap();
    h.session
        .handle_input(RawInput::ScrollBy { dx: 0.0, dy: 40.0 })
        .await
        .unwrap();

    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!(state.scroll_y, 520.0);
    let stored: serde_json::Value =
        serde_json::from_str(&local.get("viewState:42").unwrap()).unwrap();
    assert_eq!(stored["scrollY"], 520.0);
}

async fn touch_start(h: &mut Harness, points: &[(f64, f64)]) {
    let points = points.iter().map(|(x, y)| TouchPoint::new(*x, *y)).collect();
    h.session
        .handle_input(RawInput::TouchStart(points))
        .await
        .unwrap();
}

async fn touch_end(h: &mut Harness, point: Option<(f64, f64)>, remaining: usize) {
    h.session
        .handle_input(RawInput::TouchEnd {
            point: point.map(|(x, y)| TouchPoint::new(x, y)),
            remaining,
        })
        .await
        .unwrap();
}

async fn swipe(h: &mut Harness, from: (f64, f64), to: (f64, f64)) {
    touch_start(h, &[from]).await;
    tokio::time::advance(Duration::from_millis(120)).await;
    touch_end(h, Some(to), 0).await;
}
