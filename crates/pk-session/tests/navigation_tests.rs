// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Navigation router scenarios: initial view resolution, back stack and
//! browser history integration

mod common;

use common::{pattern, project, Harness, HarnessBuilder};
use pk_domain_types::{PatternRef, SessionView, Tab};
use pk_rest_mock_client::{MockCall, MockLibraryClient};
use pk_session::view_model::NavTarget;
use pk_session::{KeyValueStore, MemoryStore, NavigationType};
use pk_test_utils::TestLogger;

fn library() -> MockLibraryClient {
    MockLibraryClient::new()
        .with_pattern(pattern(42, "cabled-socks"))
        .with_pattern(pattern(7, "2024"))
        .with_project(project(3, "Winter", &[42]))
}

fn pattern_view(id: i64, slug: &str) -> SessionView {
    SessionView::Pattern {
        id,
        slug: slug.to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn fresh_start_shows_default_tab() {
    let mut h = Harness::new(library());
    let view = h.session.resolve_initial_view().await;

    assert_eq!(view, SessionView::Tab(Tab::Library));
    assert_eq!(h.session.router().depth(), 0);
    assert!(h.session.viewer().is_none());
    assert_eq!(h.history.push_count(), 0);
    assert_eq!(h.session_store.get("activeTab").as_deref(), Some("library"));
}

#[tokio::test(start_paused = true)]
async fn back_stack_grows_per_navigation_and_shrinks_per_back() {
    let logger = TestLogger::new("back_stack_grows_per_navigation_and_shrinks_per_back").unwrap();
    let _guard = logger.capture_tracing();

    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;

    h.session.navigate(NavTarget::Tab(Tab::Projects)).await;
    h.session.navigate(NavTarget::Pattern(PatternRef::Id(42))).await;
    h.session.navigate(NavTarget::Tab(Tab::Settings)).await;
    // settings sections share one back-stack entry with the settings tab
    h.session
        .navigate(NavTarget::SettingsSection("shortcuts".to_string()))
        .await;

    assert_eq!(h.session.router().depth(), 3);
    assert_eq!(h.history.push_count(), 4);
    assert!(h.session.viewer().is_none(), "leaving the pattern closes the viewer");

    let view = h.session.go_back().await;
    assert_eq!(view, pattern_view(42, "cabled-socks"));
    assert_eq!(h.session.router().depth(), 2);
    assert_eq!(h.session.viewer().map(|v| v.pattern_id()), Some(42));

    let view = h.session.go_back().await;
    assert_eq!(view, SessionView::Tab(Tab::Projects));
    assert_eq!(h.session.router().depth(), 1);
    assert!(h.session.viewer().is_none());

    // back navigation replaces history entries instead of pushing
    assert_eq!(h.history.push_count(), 4);
    logger.finish_success().unwrap();
}

#[tokio::test(start_paused = true)]
async fn back_with_empty_stack_lands_on_default_tab() {
    let mut h = HarnessBuilder::new(library())
        .history("#projects", NavigationType::Navigate)
        .build();
    assert_eq!(
        h.session.resolve_initial_view().await,
        SessionView::Tab(Tab::Projects)
    );

    let view = h.session.go_back().await;
    assert_eq!(view, SessionView::Tab(Tab::Library));
    assert_eq!(h.session.router().depth(), 0);
}

#[tokio::test(start_paused = true)]
async fn reload_restores_open_pattern_from_marker() {
    let mut h = HarnessBuilder::new(library())
        .session_store(MemoryStore::new().with_entry("viewingPatternId", "42"))
        .history("", NavigationType::Reload)
        .build();

    let view = h.session.resolve_initial_view().await;

    assert_eq!(view, pattern_view(42, "cabled-socks"));
    assert_eq!(h.session.viewer().map(|v| v.pattern_id()), Some(42));
    assert_eq!(h.session.ctx().open_pattern_id(), Some(42));
    assert_eq!(h.session.router().depth(), 0);
    assert_eq!(h.history.entries(), vec!["pattern/cabled-socks".to_string()]);
}

#[tokio::test(start_paused = true)]
async fn marker_is_ignored_on_plain_navigation() {
    let mut h = HarnessBuilder::new(library())
        .session_store(MemoryStore::new().with_entry("viewingPatternId", "42"))
        .history("", NavigationType::Navigate)
        .build();

    assert_eq!(
        h.session.resolve_initial_view().await,
        SessionView::Tab(Tab::Library)
    );
    assert!(h.session.viewer().is_none());
}

#[tokio::test(start_paused = true)]
async fn reload_without_pattern_restores_active_tab() {
    let mut h = HarnessBuilder::new(library())
        .session_store(MemoryStore::new().with_entry("activeTab", "projects"))
        .history("", NavigationType::Reload)
        .build();

    assert_eq!(
        h.session.resolve_initial_view().await,
        SessionView::Tab(Tab::Projects)
    );
}

#[tokio::test(start_paused = true)]
async fn fragment_wins_over_reload_marker() {
    let mut h = HarnessBuilder::new(library())
        .session_store(MemoryStore::new().with_entry("viewingPatternId", "42"))
        .history("#project/3", NavigationType::Reload)
        .build();

    assert_eq!(h.session.resolve_initial_view().await, SessionView::Project(3));
    assert_eq!(h.session.open_project().map(|p| p.name.as_str()), Some("Winter"));
    assert!(h.session.viewer().is_none());
}

#[tokio::test(start_paused = true)]
async fn unknown_slug_falls_back_to_default_tab() {
    let mut h = HarnessBuilder::new(library())
        .history("#pattern/no-such-pattern", NavigationType::Navigate)
        .build();
    assert_eq!(
        h.session.resolve_initial_view().await,
        SessionView::Tab(Tab::Library)
    );

    h.session.navigate(NavTarget::Tab(Tab::Projects)).await;
    let view = h
        .session
        .navigate(NavTarget::Pattern(PatternRef::Slug("missing".to_string())))
        .await;
    assert_eq!(view, SessionView::Tab(Tab::Library));
    assert!(h.session.viewer().is_none());
}

#[tokio::test(start_paused = true)]
async fn numeric_reference_falls_back_to_slug_lookup() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;

    let view = h.session.navigate(NavTarget::Pattern(PatternRef::Id(2024))).await;

    assert_eq!(view, pattern_view(7, "2024"));
    let lookups: Vec<MockCall> = h
        .api
        .calls()
        .into_iter()
        .filter(|c| matches!(c, MockCall::GetPattern(_) | MockCall::GetPatternBySlug(_)))
        .collect();
    assert_eq!(
        lookups,
        vec![
            MockCall::GetPattern(2024),
            MockCall::GetPatternBySlug("2024".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn browser_back_pops_matching_entry() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    h.session.navigate(NavTarget::Tab(Tab::Projects)).await;
    h.session.navigate(NavTarget::Pattern(PatternRef::Id(42))).await;
    assert_eq!(h.session.router().depth(), 2);
    assert_eq!(h.session_store.get("viewingPatternId").as_deref(), Some("42"));

    let fragment = h.history.back().unwrap();
    assert_eq!(fragment, "projects");
    let view = h.session.pop_state(&fragment).await;

    assert_eq!(view, SessionView::Tab(Tab::Projects));
    assert_eq!(h.session.router().depth(), 1);
    assert!(h.session.viewer().is_none());
    assert_eq!(h.session_store.get("viewingPatternId"), None);
    assert_eq!(h.session_store.get("activeTab").as_deref(), Some("projects"));
    // pop-state never writes history itself
    assert_eq!(h.history.push_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn navigating_to_current_view_is_a_no_op() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    h.session.navigate(NavTarget::Pattern(PatternRef::Id(42))).await;
    let renders = h.renderer.renders().len();

    h.session
        .navigate(NavTarget::Pattern(PatternRef::Slug("cabled-socks".to_string())))
        .await;

    assert_eq!(h.session.router().depth(), 1);
    assert_eq!(h.history.push_count(), 1);
    assert_eq!(h.renderer.renders().len(), renders, "viewer was not reopened");
}
