// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::path::PathBuf;
use std::sync::Arc;

use sr_format::CodecError;
use sr_vtree::PatchError;
use thiserror::Error;

use crate::source::ReadyState;

/// Failures of a recording source
///
/// Cloneable so a failed source can keep reporting the error that failed it.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("recording could not be decoded: {0}")]
    Decode(#[source] Arc<CodecError>),

    #[error("event rejected: {0}")]
    Invalid(#[source] Arc<CodecError>),

    #[error("failed to read recording {}: {message}", path.display())]
    Read { path: PathBuf, message: String },

    #[error("decode task failed: {0}")]
    Task(String),

    #[error("source already settled as {state}")]
    Settled { state: ReadyState },

    #[error("live source is already finished")]
    Finished,

    #[error("event at {time}ms precedes the previous event at {previous}ms")]
    OutOfOrder { previous: u64, time: u64 },
}

impl From<CodecError> for SourceError {
    fn from(err: CodecError) -> Self {
        SourceError::Decode(Arc::new(err))
    }
}

/// Failures surfaced by the playback clock
#[derive(Debug, Clone, Error)]
pub enum PlaybackError {
    #[error("no source attached to the clock")]
    NoSource,

    #[error("source is {state}, not ready")]
    SourceNotReady { state: ReadyState },

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("patch #{index} at {time}ms failed: {source}")]
    Patch {
        index: usize,
        time: u64,
        #[source]
        source: PatchError,
    },

    #[error("event #{index} at {time}ms is older than the already applied {previous}ms")]
    OutOfOrder { index: usize, previous: u64, time: u64 },

    #[error("playback speed {speed} is not a finite rate within 0.0625..=16")]
    InvalidSpeed { speed: f64 },

    #[error("seek to {target}ms was superseded by a newer request")]
    Superseded { target: u64 },

    #[error("playback has failed and needs a new source: {0}")]
    Failed(Box<PlaybackError>),
}

impl PlaybackError {
    /// Whether this error moved the clock into its failed state
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            PlaybackError::Patch { .. } | PlaybackError::OutOfOrder { .. } | PlaybackError::Failed(_)
        )
    }
}
