// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::path::{Path, PathBuf};
use std::sync::Arc;

use sr_domain_types::SourceEvent;
use tracing::debug;

use super::{BlobSource, ReadyState, Source, SourceMetadata, SourceObserver};
use crate::error::SourceError;

/// Source reading a recording file through tokio
pub struct FileSource {
    path: PathBuf,
    blob: BlobSource,
}

impl FileSource {
    /// A waiting source for `path`; nothing is read until [`load`](Self::load)
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            blob: BlobSource::new(),
        }
    }

    /// Create and load in one step; the state reflects the outcome
    pub async fn open(path: impl AsRef<Path>) -> Self {
        let source = Self::new(path);
        // The outcome is recorded in the source state
        let _ = source.load().await;
        source
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the file and decode it off the runtime threads
    pub async fn load(&self) -> Result<(), SourceError> {
        let state = self.blob.ready_state();
        if state.is_settled() {
            return Err(SourceError::Settled { state });
        }
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) => {
                let error = SourceError::Read {
                    path: self.path.clone(),
                    message: err.to_string(),
                };
                self.blob.fail(error.clone());
                return Err(error);
            }
        };
        debug!(path = ?self.path, byte_len = bytes.len(), "Read recording file");
        self.blob.load_async(bytes).await
    }
}

impl Source for FileSource {
    fn ready_state(&self) -> ReadyState {
        self.blob.ready_state()
    }

    fn events(&self) -> Option<Arc<[SourceEvent]>> {
        self.blob.events()
    }

    fn metadata(&self) -> SourceMetadata {
        self.blob.metadata()
    }

    fn failure(&self) -> Option<SourceError> {
        self.blob.failure()
    }

    fn subscribe(&self, observer: Arc<dyn SourceObserver>) {
        self.blob.subscribe(observer);
    }
}
