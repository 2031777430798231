// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! OS media-session integration
//!
//! Hardware remotes only reach the session while something is "playing", so
//! opting in to media keys starts a keep-alive. Media actions are turned into
//! synthetic key identifiers and resolved through the shortcut table like any
//! other key.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::settings::KeyId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaAction {
    Play,
    Pause,
    PlayPause,
    NextTrack,
    PreviousTrack,
    Stop,
}

impl MediaAction {
    /// Media-session action names
    pub fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "play" => Some(MediaAction::Play),
            "pause" => Some(MediaAction::Pause),
            "playpause" => Some(MediaAction::PlayPause),
            "nexttrack" => Some(MediaAction::NextTrack),
            "previoustrack" => Some(MediaAction::PreviousTrack),
            "stop" => Some(MediaAction::Stop),
            _ => None,
        }
    }

    /// Play and pause both toggle, matching remotes that only send one of them
    pub fn key_id(&self) -> KeyId {
        let token = match self {
            MediaAction::Play | MediaAction::Pause | MediaAction::PlayPause => "MediaPlayPause",
            MediaAction::NextTrack => "MediaTrackNext",
            MediaAction::PreviousTrack => "MediaTrackPrevious",
            MediaAction::Stop => "MediaStop",
        };
        KeyId::new(token)
    }
}

pub trait MediaKeepAlive: Send {
    fn start(&mut self);
    fn stop(&mut self);
    fn is_playing(&self) -> bool;
}

/// Keep-alive without audio output; clones share the playing flag
#[derive(Debug, Clone, Default)]
pub struct SilentKeepAlive {
    playing: Arc<AtomicBool>,
}

impl SilentKeepAlive {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MediaKeepAlive for SilentKeepAlive {
    fn start(&mut self) {
        if !self.playing.swap(true, Ordering::SeqCst) {
            tracing::debug!("media keep-alive started");
        }
    }

    fn stop(&mut self) {
        if self.playing.swap(false, Ordering::SeqCst) {
            tracing::debug!("media keep-alive stopped");
        }
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn media_actions_map_to_tokens() {
        assert_eq!(
            MediaAction::parse("nexttrack").map(|a| a.key_id()),
            Some(KeyId::new("MediaTrackNext"))
        );
        assert_eq!(
            MediaAction::parse("pause").map(|a| a.key_id()),
            Some(KeyId::new("MediaPlayPause"))
        );
        assert_eq!(MediaAction::parse("seekforward"), None);
    }
}
