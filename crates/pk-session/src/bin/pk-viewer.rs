// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Terminal pattern viewer
//!
//! Opens a viewing session against a patternkeep server and draws the
//! desktop toolbar and the mobile bar of the session in the terminal.

use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use clap::Parser;
use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use pk_config::{Paths, SessionConfig};
use pk_domain_types::Tab;
use pk_rest_client::{HttpBeacon, RestClient};
use pk_session::terminal::{cleanup_terminal, event_to_input, setup_terminal};
use pk_session::view_model::{Command, NavTarget};
use pk_session::{
    render_session, run_session_loop, FileStore, LoopMsg, MemoryHistory, NavigationType,
    PlaceholderRenderer, SessionBuilder, SurfaceSelection, Theme, UiRuntime,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tracing::{debug, info};
use url::Url;

#[derive(Debug, Parser)]
#[command(name = "pk-viewer", about = "View a knitting pattern with timer and counters")]
struct Args {
    /// Server base URL, overrides `server-url` from the config
    #[arg(long)]
    server: Option<String>,

    /// Pattern id or slug to open
    #[arg(long)]
    pattern: Option<String>,

    /// Which surfaces to draw
    #[arg(long, value_enum, default_value_t = SurfaceSelection::Both)]
    surface: SurfaceSelection,

    /// Config file replacing the user config
    #[arg(long)]
    config: Option<PathBuf>,

    /// Config overrides as `key=value`, repeatable
    #[arg(long = "set")]
    set: Vec<String>,

    #[command(flatten)]
    logging: pk_logging::CliLoggingArgs,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    args.logging.clone().init("pk-viewer", true)?;

    let flag_sets = pk_config::parse_flag_sets(&args.set)?;
    let flag_refs: Vec<(&str, &str)> =
        flag_sets.iter().map(|(k, v)| (k.as_str(), v.as_str())).collect();
    let paths = Paths::discover(args.config.as_deref());
    let config = SessionConfig::load(&paths, &flag_refs).context("failed to load config")?;

    let server = args
        .server
        .clone()
        .or_else(|| config.server_url.clone())
        .context("no server URL: pass --server or set server-url")?;
    let base_url = Url::parse(&server).with_context(|| format!("invalid server URL {server}"))?;
    let api = RestClient::new(base_url.clone()).context("failed to create REST client")?;
    let beacon = HttpBeacon::new(base_url);

    let data_dir = config.data_dir();
    let local = FileStore::open(data_dir.join("local.json"))?;
    let session_store = FileStore::open(data_dir.join("session.json"))?;
    let (history, nav_type) = match &args.pattern {
        Some(reference) => (format!("pattern/{reference}"), NavigationType::Navigate),
        None => (String::new(), NavigationType::Reload),
    };

    let mut session = SessionBuilder::new(config, Arc::new(api), Arc::new(beacon))
        .local_store(local)
        .session_store(session_store)
        .history(MemoryHistory::starting_at(&history, nav_type))
        .renderer(PlaceholderRenderer::default())
        .build();
    let surfaces = args.surface;

    let (tx, rx) = mpsc::unbounded_channel();
    setup_terminal()?;
    spawn_input_thread(tx);

    let result = UiRuntime::run(async move {
        let backend = CrosstermBackend::new(std::io::stdout());
        let mut terminal = Terminal::new(backend)?;
        let theme = Theme::default();

        let view = session.resolve_initial_view().await;
        info!(?view, "initial view");

        terminal.draw(|frame| render_session(frame, &session, surfaces, &theme))?;
        run_session_loop(&mut session, rx, |session| {
            terminal
                .draw(|frame| render_session(frame, session, surfaces, &theme))
                .is_ok()
        })
        .await;
        Ok(())
    });

    cleanup_terminal();
    result
}

/// Forward terminal events until the session loop stops listening
fn spawn_input_thread(tx: mpsc::UnboundedSender<LoopMsg>) {
    let spawned = thread::Builder::new().name("pk-input".into()).spawn(move || {
        while let Ok(event) = event::read() {
            let msg = match app_message(&event) {
                Some(msg) => msg,
                None => match event_to_input(&event) {
                    Some(input) => LoopMsg::Input(input),
                    None => continue,
                },
            };
            let unload = msg == LoopMsg::Unload;
            if tx.send(msg).is_err() || unload {
                break;
            }
        }
        debug!("input thread finished");
    });
    if let Err(err) = spawned {
        tracing::error!(error = %err, "failed to spawn input thread");
    }
}

/// Keys handled by the terminal application itself
///
/// F1 to F4 switch tabs and Alt+Left goes back.
fn app_message(event: &Event) -> Option<LoopMsg> {
    let Event::Key(key) = event else {
        return None;
    };
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    let tab = |tab| Some(LoopMsg::Command(Command::Navigate(NavTarget::Tab(tab))));
    match key.code {
        KeyCode::Char('c') | KeyCode::Char('q') if ctrl => Some(LoopMsg::Unload),
        KeyCode::F(1) => tab(Tab::Current),
        KeyCode::F(2) => tab(Tab::Library),
        KeyCode::F(3) => tab(Tab::Projects),
        KeyCode::F(4) => tab(Tab::Settings),
        KeyCode::Left if key.modifiers.contains(KeyModifiers::ALT) => {
            Some(LoopMsg::Command(Command::GoBack))
        }
        _ => None,
    }
}
