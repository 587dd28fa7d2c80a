// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Recording reader
//
// Unwraps the optional Brotli envelope, frame-scans the container and
// checks that event times never decrease. Any failure rejects the whole
// recording.

use std::fs;
use std::io;
use std::path::Path;

use sr_domain_types::SourceEvent;
use tracing::debug;

use crate::compression::unwrap_envelope;
use crate::error::{CodecError, Mismatch};
use crate::list::List;

/// Decode a recording buffer into its lazily decoded record list
pub fn decode_list(bytes: &[u8]) -> Result<List<SourceEvent>, CodecError> {
    let raw = unwrap_envelope(bytes)?;
    List::from_bytes(&raw)
}

/// Decode every event of a recording buffer, enforcing time order
pub fn decode_recording(bytes: &[u8]) -> Result<Vec<SourceEvent>, CodecError> {
    let list = decode_list(bytes)?;
    let mut events = Vec::with_capacity(list.len());
    let mut previous: Option<u64> = None;
    for (index, event) in list.iter().enumerate() {
        let event = event?;
        if let Some(previous) = previous {
            if event.time < previous {
                return Err(CodecError::SchemaMismatch {
                    offset: list.record_offset(index).unwrap_or_default(),
                    reason: Mismatch::OutOfOrder {
                        previous,
                        time: event.time,
                    },
                });
            }
        }
        previous = Some(event.time);
        events.push(event);
    }
    debug!(
        event_count = events.len(),
        duration_ms = previous.unwrap_or_default(),
        "Decoded recording"
    );
    Ok(events)
}

/// Recording file reader
pub struct RecordingReader {
    bytes: Vec<u8>,
}

impl RecordingReader {
    /// Read the whole recording file into memory
    pub fn open<P: AsRef<Path>>(path: P) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        Ok(Self { bytes })
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Records without decoding them
    pub fn list(&self) -> Result<List<SourceEvent>, CodecError> {
        decode_list(&self.bytes)
    }

    /// Read all events from the recording in chronological order
    pub fn read_all_events(&self) -> Result<Vec<SourceEvent>, CodecError> {
        decode_recording(&self.bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::writer::{RecordingWriter, WriterConfig, encode_recording};
    use sr_domain_types::DomPatch;
    use tempfile::NamedTempFile;

    #[sr_test_utils::logged_test]
    fn test_reads_back_written_file() -> anyhow::Result<()> {
        let temp = NamedTempFile::new()?;
        let events = vec![
            SourceEvent::new(0, DomPatch::remove(1u64)),
            SourceEvent::new(0, DomPatch::remove(2u64)),
            SourceEvent::new(7, DomPatch::set_text(3u64, "x")),
        ];
        let mut writer = RecordingWriter::create(temp.path(), WriterConfig::default())?;
        for event in &events {
            writer.append(event)?;
        }
        writer.finish()?;

        let reader = RecordingReader::open(temp.path())?;
        assert_eq!(reader.read_all_events()?, events);
        assert_eq!(reader.list()?.len(), 3);
        Ok(())
    }

    #[sr_test_utils::logged_test]
    fn test_empty_recording() {
        let bytes = encode_recording(&[], &WriterConfig::default().with_compression(false)).unwrap();
        assert_eq!(bytes, vec![0, 0, 0, 0]);
        assert!(decode_recording(&bytes).unwrap().is_empty());
    }

    #[sr_test_utils::logged_test]
    fn test_out_of_order_recording_is_rejected() {
        // A well-formed container that was not produced by the writer
        let mut list = List::<SourceEvent>::new();
        list.append(&SourceEvent::new(5, DomPatch::remove(1u64))).unwrap();
        list.append(&SourceEvent::new(4, DomPatch::remove(2u64))).unwrap();

        let err = decode_recording(list.as_bytes()).unwrap_err();
        match err {
            CodecError::SchemaMismatch { offset, reason } => {
                assert_eq!(offset, list.record_offset(1).unwrap());
                assert_eq!(
                    reason,
                    Mismatch::OutOfOrder {
                        previous: 5,
                        time: 4
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
