// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Interactive pattern-viewing session for patternkeep
//!
//! The session decides what is on screen, keeps the elapsed-time clock and
//! the counters of the open pattern, persists per-pattern view state and
//! turns keyboard, touch and media-key input into typed commands. Backend
//! access goes through [`pk_client_api::LibraryApi`]; the history, stores,
//! renderer and media keep-alive are traits with in-memory implementations.

pub mod context;
pub mod error;
pub mod history;
pub mod media;
pub mod renderer;
pub mod runtime;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod terminal;
pub mod view;
pub mod view_model;

pub use context::{SessionBuilder, SessionContext};
pub use error::{SessionError, SessionResult, ShortcutError, StoreError};
pub use history::{BrowserHistory, MemoryHistory, NavigationType};
pub use media::{MediaAction, MediaKeepAlive, SilentKeepAlive};
pub use renderer::{PageRenderer, PlaceholderRenderer, RenderCall};
pub use runtime::{run_session_loop, LoopMsg, UiRuntime};
pub use scheduler::{Scheduler, Slot};
pub use settings::{KeyId, ShortcutAction, ShortcutTable, MAX_BINDINGS_PER_ACTION};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use view::{render_session, SurfaceSelection, Theme};
pub use view_model::Session;

use ratatui::{backend::TestBackend, Terminal};

/// Deterministic terminal for rendering tests
pub fn create_test_terminal(width: u16, height: u16) -> std::io::Result<Terminal<TestBackend>> {
    Terminal::new(TestBackend::new(width, height))
}

/// Concatenated cell symbols of a test terminal's buffer
pub fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
    terminal
        .backend()
        .buffer()
        .content()
        .iter()
        .map(|cell| cell.symbol())
        .collect()
}
