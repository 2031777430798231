// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session loop: message handling, deadline firing and unload

mod common;

use std::time::Duration;

use common::{pattern, Harness};
use pk_domain_types::{PatternRef, SessionView, Tab};
use pk_rest_api_contract::TimerBeacon;
use pk_rest_mock_client::MockLibraryClient;
use pk_session::view_model::{Command, NavTarget, RawInput};
use pk_session::{run_session_loop, LoopMsg};
use tokio::sync::mpsc;

fn library() -> MockLibraryClient {
    MockLibraryClient::new().with_pattern(pattern(42, "cabled-socks"))
}

#[tokio::test(start_paused = true)]
async fn loop_fires_ticks_until_unload() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    let (tx, rx) = mpsc::unbounded_channel();

    tx.send(LoopMsg::Command(Command::Navigate(NavTarget::Pattern(PatternRef::Id(42)))))
        .unwrap();
    tx.send(LoopMsg::Input(RawInput::key("t"))).unwrap();

    let mut updates = 0;
    let sender = async move {
        tokio::time::sleep(Duration::from_millis(5_500)).await;
        tx.send(LoopMsg::Unload).unwrap();
    };
    let session_loop = run_session_loop(&mut h.session, rx, |_| {
        updates += 1;
        true
    });
    tokio::join!(session_loop, sender);

    assert!(h.session.is_unloaded());
    assert!(updates >= 7, "two messages and five ticks, got {updates}");
    assert_eq!(
        h.api.beacons(),
        vec![TimerBeacon {
            pattern_id: 42,
            timer_seconds: 5,
        }]
    );
}

#[tokio::test(start_paused = true)]
async fn closed_channel_unloads() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(LoopMsg::Command(Command::Navigate(NavTarget::Tab(Tab::Projects))))
        .unwrap();
    tx.send(LoopMsg::PopState("library".to_string())).unwrap();
    drop(tx);

    run_session_loop(&mut h.session, rx, |_| true).await;

    assert!(h.session.is_unloaded());
    assert_eq!(h.session.current_view(), &SessionView::Tab(Tab::Library));
    assert_eq!(h.session.router().depth(), 0);
}

#[tokio::test(start_paused = true)]
async fn update_callback_can_stop_the_loop() {
    let mut h = Harness::new(library());
    h.session.resolve_initial_view().await;
    let (tx, rx) = mpsc::unbounded_channel();
    tx.send(LoopMsg::Command(Command::Navigate(NavTarget::Tab(Tab::Settings))))
        .unwrap();
    tx.send(LoopMsg::Command(Command::Navigate(NavTarget::Tab(Tab::Projects))))
        .unwrap();

    run_session_loop(&mut h.session, rx, |_| false).await;

    assert!(h.session.is_unloaded());
    assert_eq!(h.session.current_view(), &SessionView::Tab(Tab::Settings));
    drop(tx);
}
