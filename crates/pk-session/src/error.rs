// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use pk_client_api::ClientApiError;
use std::path::PathBuf;
use thiserror::Error;

/// Failures of the local key-value stores
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}

/// Rejected shortcut table edits
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShortcutError {
    #[error("binding slot {slot} is out of range, an action holds at most {max} keys")]
    SlotOutOfRange { slot: usize, max: usize },

    #[error("'{0}' cannot be bound on its own")]
    NotBindable(String),

    #[error("unknown shortcut action '{0}'")]
    UnknownAction(String),
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Api(#[from] ClientApiError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Shortcut(#[from] ShortcutError),

    #[error("no pattern is open")]
    NoPatternOpen,

    #[error("unknown counter {0}")]
    UnknownCounter(i64),
}

pub type SessionResult<T> = Result<T, SessionError>;
