// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Session event loop and the UI thread harness
//!
//! One task owns the [`Session`]. It waits on the inbound message channel and
//! on the earliest armed scheduler deadline, whichever comes first.

use std::thread;

use tokio::runtime::Builder;
use tokio::sync::mpsc;
use tokio::task::LocalSet;
use tracing::{debug, info, warn};

use crate::view_model::input::{Command, RawInput};
use crate::view_model::Session;

/// Messages delivered to the session loop
#[derive(Debug, Clone, PartialEq)]
pub enum LoopMsg {
    Input(RawInput),
    /// Application-level command issued outside the shortcut table
    Command(Command),
    /// Browser back/forward arrived at this fragment
    PopState(String),
    Unload,
}

/// Drive `session` until [`LoopMsg::Unload`] arrives or every sender is gone
///
/// `on_update` runs after each handled message or fired deadline batch, and
/// may return `false` to request an unload.
pub async fn run_session_loop<F>(
    session: &mut Session,
    mut rx: mpsc::UnboundedReceiver<LoopMsg>,
    mut on_update: F,
) where
    F: FnMut(&Session) -> bool,
{
    info!("session loop started");
    loop {
        let deadline = session.next_deadline();
        let msg = tokio::select! {
            msg = rx.recv() => msg,
            _ = async {
                match deadline {
                    Some(deadline) => tokio::time::sleep_until(deadline).await,
                    None => std::future::pending::<()>().await,
                }
            } => {
                session.run_due().await;
                if !on_update(session) {
                    break;
                }
                continue;
            }
        };

        match msg {
            Some(LoopMsg::Input(input)) => {
                if let Err(err) = session.handle_input(input).await {
                    warn!(error = %err, "input handling failed");
                }
            }
            Some(LoopMsg::Command(command)) => {
                let _ = session.execute(command).await;
            }
            Some(LoopMsg::PopState(fragment)) => {
                debug!(%fragment, "pop state");
                session.pop_state(&fragment).await;
            }
            Some(LoopMsg::Unload) | None => break,
        }
        if !on_update(session) {
            break;
        }
    }
    session.unload().await;
    info!("session loop finished");
}

pub struct UiRuntime;

impl UiRuntime {
    /// Run `fut` on a dedicated UI thread with a current-thread runtime and a LocalSet
    pub fn run<F>(fut: F) -> anyhow::Result<()>
    where
        F: std::future::Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let handle = thread::Builder::new().name("pk-ui".into()).spawn(|| {
            let rt = Builder::new_current_thread().enable_all().build()?;
            let local = LocalSet::new();
            local.block_on(&rt, fut)
        })?;

        handle.join().map_err(|e| anyhow::anyhow!("ui thread panicked: {:?}", e))?
    }
}
