// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Recording writer
//
// Accumulates validated events in a `List` and writes the container, raw
// or inside the Brotli envelope, when finished. The record count prefix
// is only final once every event is known, so nothing reaches the file
// before `finish`.

use anyhow::{Context, Result};
use sr_domain_types::SourceEvent;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, trace, warn};

use crate::compression::{DEFAULT_BROTLI_QUALITY, compress};
use crate::error::CodecError;
use crate::list::List;

/// Configuration for the recording writer
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Brotli compression quality (0-11)
    pub brotli_quality: u32,
    /// Wrap the container in the `SRZ1` envelope
    pub compress: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            brotli_quality: DEFAULT_BROTLI_QUALITY,
            compress: true,
        }
    }
}

impl WriterConfig {
    pub fn with_brotli_quality(mut self, quality: u32) -> Self {
        self.brotli_quality = quality.min(11);
        self
    }

    pub fn with_compression(mut self, compress: bool) -> Self {
        self.compress = compress;
        self
    }
}

/// Writer for recording files
pub struct RecordingWriter {
    file: File,
    path: PathBuf,
    config: WriterConfig,
    events: List<SourceEvent>,
    last_time: Option<u64>,
    finalized: bool,
}

impl RecordingWriter {
    /// Create a new writer with the given file path and config
    pub fn create<P: AsRef<Path>>(path: P, config: WriterConfig) -> Result<Self> {
        let file = File::create(path.as_ref()).context("Failed to create recording file")?;

        debug!(
            path = ?path.as_ref(),
            brotli_quality = config.brotli_quality,
            compress = config.compress,
            "Created recording writer"
        );

        Ok(Self {
            file,
            path: path.as_ref().to_path_buf(),
            config,
            events: List::new(),
            last_time: None,
            finalized: false,
        })
    }

    /// Validate and append one event
    ///
    /// Events must arrive in non-decreasing time order.
    pub fn append(&mut self, event: &SourceEvent) -> Result<()> {
        if self.finalized {
            anyhow::bail!("Cannot append to finalized writer");
        }
        if let Some(last) = self.last_time {
            if event.time < last {
                anyhow::bail!(
                    "Event at {}ms precedes previously written event at {}ms",
                    event.time,
                    last
                );
            }
        }

        self.events
            .append(event)
            .with_context(|| format!("Failed to encode {} event at {}ms", event.kind(), event.time))?;
        self.last_time = Some(event.time);

        trace!(
            record_count = self.events.len(),
            kind = %event.kind(),
            time = event.time,
            "Appended event"
        );
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the container and sync the file; returns the bytes written
    pub fn finish(mut self) -> Result<u64> {
        let written = self.write_out()?;
        self.finalized = true;
        Ok(written)
    }

    fn write_out(&mut self) -> Result<u64> {
        let bytes = encode_container(self.events.as_bytes(), &self.config)
            .context("Failed to compress recording")?;
        self.file.write_all(&bytes).context("Failed to write recording")?;
        self.file.sync_all().context("Failed to sync file")?;

        debug!(
            record_count = self.events.len(),
            raw_len = self.events.as_bytes().len(),
            written_len = bytes.len(),
            compressed = self.config.compress,
            "Finished recording"
        );
        Ok(bytes.len() as u64)
    }
}

impl Drop for RecordingWriter {
    fn drop(&mut self) {
        if !self.finalized {
            self.finalized = true;
            // Best-effort flush on drop
            if let Err(e) = self.write_out() {
                warn!(error = %format!("{:#}", e), "Failed to flush recording writer on drop");
            }
        }
    }
}

fn encode_container(raw: &[u8], config: &WriterConfig) -> Result<Vec<u8>, CodecError> {
    if config.compress {
        compress(raw, config.brotli_quality)
    } else {
        Ok(raw.to_vec())
    }
}

/// Encode `events` as an in-memory recording
pub fn encode_recording(events: &[SourceEvent], config: &WriterConfig) -> Result<Vec<u8>, CodecError> {
    let mut list = List::<SourceEvent>::new();
    for event in events {
        list.append(event)?;
    }
    encode_container(list.as_bytes(), config)
}
