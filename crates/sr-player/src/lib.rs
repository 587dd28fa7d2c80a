// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Recording sources and the playback clock
//!
//! A [`Source`] delivers a complete, time-ordered event list; a
//! [`PlaybackClock`] turns it into [`Frame`]s at arbitrary times, either on
//! demand through `seek` or continuously while playing.

pub mod auto;
pub mod checkpoint;
pub mod clock;
pub mod config;
pub mod error;
pub mod frame;
pub mod network;
pub mod observer;
pub mod resources;
pub mod shared;
pub mod source;
pub mod time;

pub use auto::AutoAdvance;
pub use checkpoint::{Checkpoint, CheckpointStore};
pub use clock::PlaybackClock;
pub use config::{PlayerConfig, SPEED_RANGE, check_speed};
pub use error::{PlaybackError, SourceError};
pub use frame::Frame;
pub use network::{NetworkExchange, NetworkLedger, WsFrameRecord};
pub use observer::{PlaybackObserver, PlaybackState, PlaybackStatus, WatchObserver};
pub use resources::ResourceMap;
pub use shared::SharedClock;
pub use source::{
    BlobSource, FileSource, LiveSource, ReadyState, RecordingDuration, Source, SourceMetadata,
    SourceObserver,
};
pub use time::{ManualTime, MonotonicTime, TimeSource};
