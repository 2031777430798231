// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Pattern viewer: pages, zoom and per-pattern view state

mod common;

use common::{pattern, Harness, HarnessBuilder};
use pk_config::DefaultZoom;
use pk_domain_types::{Pattern, PatternRef, Tab, ZoomMode};
use pk_rest_mock_client::{MockCall, MockLibraryClient};
use pk_session::view_model::{Command, NavTarget};
use pk_session::{KeyValueStore, MemoryStore, PlaceholderRenderer};

fn library() -> MockLibraryClient {
    MockLibraryClient::new()
        .with_pattern(Pattern {
            current_page: 5,
            ..pattern(42, "cabled-socks")
        })
        .with_pattern(pattern(43, "lace-shawl"))
}

async fn open(h: &mut Harness, id: i64) {
    h.session.navigate(NavTarget::Pattern(PatternRef::Id(id))).await;
}

fn page_writes(api: &MockLibraryClient) -> Vec<u32> {
    api.write_calls()
        .into_iter()
        .filter_map(|call| match call {
            MockCall::UpdatePage { page, .. } => Some(page),
            _ => None,
        })
        .collect()
}

#[tokio::test(start_paused = true)]
async fn opens_at_saved_page_and_renders_it() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    open(&mut h, 42).await;

    let viewer = h.session.viewer().unwrap();
    assert_eq!((viewer.page(), viewer.page_count()), (5, 12));
    assert_eq!(h.renderer.loaded(), Some(42));
    let last = h.renderer.last_render().unwrap();
    assert_eq!((last.pattern_id, last.page, last.scale), (42, 5, 1.0));
}

#[tokio::test(start_paused = true)]
async fn page_changes_are_clamped_and_coalesced() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    open(&mut h, 42).await;

    h.session.execute(Command::PageNext).await.unwrap();
    h.session.execute(Command::PageNext).await.unwrap();
    h.session.execute(Command::PagePrev).await.unwrap();
    h.settle().await;
    assert_eq!(page_writes(&h.api), vec![6]);
    assert_eq!(h.api.pattern(42).map(|p| p.current_page), Some(6));
    assert_eq!(h.session.ctx().open_pattern.as_ref().map(|p| p.current_page), Some(6));

    h.session.execute(Command::GoToPage(99)).await.unwrap();
    assert_eq!(h.session.viewer().map(|v| v.page()), Some(12));
    h.session.execute(Command::PageNext).await.unwrap();
    h.settle().await;
    assert_eq!(page_writes(&h.api), vec![6, 12]);

    h.session.execute(Command::GoToPage(0)).await.unwrap();
    assert_eq!(h.session.viewer().map(|v| v.page()), Some(1));
}

#[tokio::test(start_paused = true)]
async fn zoom_survives_closing_and_reopening() {
    let local = MemoryStore::new();
    let mut h = HarnessBuilder::new(library()).local(local.clone()).build();
    h.session.resolve_initial_view().await;
    open(&mut h, 42).await;

    h.session.execute(Command::ZoomIn).await.unwrap();
    h.session.execute(Command::ZoomIn).await.unwrap();
    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!((state.zoom_mode, state.zoom_scale), (ZoomMode::Manual, 1.2));

    h.session.navigate(NavTarget::Tab(Tab::Library)).await;
    open(&mut h, 43).await;
    let other = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!(other.zoom_mode, ZoomMode::Fit);

    open(&mut h, 42).await;
    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!((state.zoom_mode, state.zoom_scale), (ZoomMode::Manual, 1.2));
    assert_eq!(h.renderer.last_render().map(|r| r.scale), Some(1.2));

    let stored: serde_json::Value =
        serde_json::from_str(&local.get("viewState:42").unwrap()).unwrap();
    assert_eq!(stored["zoomMode"], "manual");
    assert_eq!(stored["zoomScale"], 1.2);
}

#[tokio::test(start_paused = true)]
async fn zoom_is_bounded() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    open(&mut h, 42).await;

    for _ in 0..20 {
        h.session.execute(Command::ZoomOut).await.unwrap();
    }
    assert_eq!(h.session.viewer().map(|v| v.view_state().zoom_scale), Some(0.25));

    for _ in 0..60 {
        h.session.execute(Command::ZoomIn).await.unwrap();
    }
    assert_eq!(h.session.viewer().map(|v| v.view_state().zoom_scale), Some(5.0));
}

#[tokio::test(start_paused = true)]
async fn fit_modes_resolve_through_renderer() {
    let mut h = HarnessBuilder::new(library())
        .renderer(PlaceholderRenderer::new(3).with_fit_scales(0.8, 1.4))
        .build();
    h.session.resolve_initial_view().await;
    open(&mut h, 43).await;
    assert_eq!(h.renderer.last_render().map(|r| r.scale), Some(0.8));

    h.session
        .execute(Command::SetZoomMode(ZoomMode::FitWidth))
        .await
        .unwrap();
    assert_eq!(h.renderer.last_render().map(|r| r.scale), Some(1.4));

    // zooming from a fit mode starts at the fitted scale
    h.session.execute(Command::ZoomIn).await.unwrap();
    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!((state.zoom_mode, state.zoom_scale), (ZoomMode::Manual, 1.5));
}

#[tokio::test(start_paused = true)]
async fn configured_default_zoom_applies_to_new_patterns() {
    let mut h = HarnessBuilder::new(library())
        .config(|c| c.default_zoom = DefaultZoom::Scale(1.5))
        .build();
    h.session.resolve_initial_view().await;
    open(&mut h, 43).await;

    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!((state.zoom_mode, state.zoom_scale), (ZoomMode::Manual, 1.5));
}

#[tokio::test(start_paused = true)]
async fn corrupt_view_state_falls_back_to_default() {
    let local = MemoryStore::new().with_entry("viewState:43", "{not json");
    let mut h = HarnessBuilder::new(library()).local(local).build();
    h.session.resolve_initial_view().await;
    open(&mut h, 43).await;

    let state = h.session.viewer().map(|v| v.view_state()).unwrap();
    assert_eq!(state.zoom_mode, ZoomMode::Fit);
    assert_eq!(state.scroll_y, 0.0);
}

#[tokio::test(start_paused = true)]
async fn closing_unloads_the_document() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    open(&mut h, 42).await;

    h.session.navigate(NavTarget::Tab(Tab::Projects)).await;

    assert_eq!(h.renderer.loaded(), None);
    assert_eq!(h.session.ctx().open_pattern_id(), None);
    assert!(h.session.counters().counters().is_empty());
}
