// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;

use sr_domain_types::SourceEvent;
use sr_format::decode_recording;
use tracing::debug;

use super::{ReadyState, RecordingDuration, Source, SourceCell, SourceMetadata, SourceObserver};
use crate::error::SourceError;

/// Source backed by an in-memory recording buffer, raw or compressed
pub struct BlobSource {
    cell: SourceCell,
}

impl Default for BlobSource {
    fn default() -> Self {
        Self::new()
    }
}

impl BlobSource {
    /// A waiting source; call [`load`](Self::load) to settle it
    pub fn new() -> Self {
        Self {
            cell: SourceCell::new(),
        }
    }

    /// Decode `bytes` synchronously; the state reflects the outcome
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let source = Self::new();
        // The outcome is recorded in the source state
        let _ = source.load(bytes);
        source
    }

    /// Decode a recording buffer and settle the source
    ///
    /// Any codec error fails the source; nothing is exposed until the
    /// whole buffer decoded.
    pub fn load(&self, bytes: &[u8]) -> Result<(), SourceError> {
        let state = self.cell.ready_state();
        if state.is_settled() {
            return Err(SourceError::Settled { state });
        }
        debug!(byte_len = bytes.len(), "Decoding recording blob");
        self.settle(decode_recording(bytes).map_err(SourceError::from))
    }

    /// Decode on the blocking pool, keeping the async caller responsive
    pub async fn load_async(&self, bytes: Vec<u8>) -> Result<(), SourceError> {
        let state = self.cell.ready_state();
        if state.is_settled() {
            return Err(SourceError::Settled { state });
        }
        let decoded = tokio::task::spawn_blocking(move || decode_recording(&bytes))
            .await
            .map_err(|err| SourceError::Task(err.to_string()))
            .and_then(|result| result.map_err(SourceError::from));
        self.settle(decoded)
    }

    pub(crate) fn fail(&self, error: SourceError) {
        self.cell.fail(error);
    }

    fn settle(&self, decoded: Result<Vec<SourceEvent>, SourceError>) -> Result<(), SourceError> {
        match decoded {
            Ok(events) => {
                let duration = RecordingDuration::of(&events);
                self.cell.resolve(events.into(), duration)
            }
            Err(err) => {
                self.cell.fail(err.clone());
                Err(err)
            }
        }
    }
}

impl Source for BlobSource {
    fn ready_state(&self) -> ReadyState {
        self.cell.ready_state()
    }

    fn events(&self) -> Option<Arc<[SourceEvent]>> {
        self.cell.events()
    }

    fn metadata(&self) -> SourceMetadata {
        self.cell.metadata()
    }

    fn failure(&self) -> Option<SourceError> {
        self.cell.failure()
    }

    fn subscribe(&self, observer: Arc<dyn SourceObserver>) {
        self.cell.subscribe(observer);
    }
}
