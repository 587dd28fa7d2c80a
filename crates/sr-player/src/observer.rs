// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Observable playback state
//
// Each clock owns its observer list; there is no process-wide state, so any
// number of playback sessions can run side by side.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;

use crate::source::{ReadyState, RecordingDuration};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackStatus {
    Paused,
    Playing,
    /// Reached the end of a recording with a known duration
    Ended,
}

impl fmt::Display for PlaybackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlaybackStatus::Paused => write!(f, "paused"),
            PlaybackStatus::Playing => write!(f, "playing"),
            PlaybackStatus::Ended => write!(f, "ended"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlaybackState {
    pub ready: ReadyState,
    pub status: PlaybackStatus,
    pub time: u64,
    pub duration: RecordingDuration,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            ready: ReadyState::Waiting,
            status: PlaybackStatus::Paused,
            time: 0,
            duration: RecordingDuration::Unknown,
        }
    }
}

/// Receives every change of a clock's [`PlaybackState`]
pub trait PlaybackObserver: Send + Sync {
    fn on_state(&self, state: &PlaybackState);
}

/// Publishes playback state into a tokio `watch` channel
pub struct WatchObserver {
    sender: watch::Sender<PlaybackState>,
}

impl WatchObserver {
    /// Observer plus a receiver starting at the default state
    pub fn channel() -> (Arc<Self>, watch::Receiver<PlaybackState>) {
        let (sender, receiver) = watch::channel(PlaybackState::default());
        (Arc::new(Self { sender }), receiver)
    }
}

impl PlaybackObserver for WatchObserver {
    fn on_state(&self, state: &PlaybackState) {
        self.sender.send_replace(*state);
    }
}
