// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Brotli envelope for recording containers
//
// A compressed recording is the 4-byte magic `SRZ1` followed by a Brotli
// stream of the raw container. Raw containers start with their record
// count, so readers accept either form.

use std::borrow::Cow;
use std::io;

use brotli::enc::BrotliEncoderParams;
use tracing::debug;

use crate::error::CodecError;

pub const MAGIC: &[u8; 4] = b"SRZ1";

/// Default Brotli quality level (q=4 for fast/compact balance)
pub const DEFAULT_BROTLI_QUALITY: u32 = 4;

const DECODER_BUFFER_SIZE: usize = 4096;

pub fn is_compressed(bytes: &[u8]) -> bool {
    bytes.starts_with(MAGIC)
}

/// Wrap a raw container in the compressed envelope
pub fn compress(raw: &[u8], quality: u32) -> Result<Vec<u8>, CodecError> {
    let params = BrotliEncoderParams {
        quality: quality.min(11) as i32,
        ..Default::default()
    };
    let mut out = MAGIC.to_vec();
    brotli::BrotliCompress(&mut &raw[..], &mut out, &params)?;
    debug!(
        uncompressed_len = raw.len(),
        compressed_len = out.len(),
        ratio = (out.len() as f64 / raw.len().max(1) as f64),
        "Compressed recording"
    );
    Ok(out)
}

/// Unwrap a compressed envelope
pub fn decompress(bytes: &[u8]) -> Result<Vec<u8>, CodecError> {
    let Some(stream) = bytes.strip_prefix(MAGIC.as_slice()) else {
        return Err(CodecError::Compression(io::Error::new(
            io::ErrorKind::InvalidData,
            "missing SRZ1 magic",
        )));
    };
    let mut decompressed = Vec::with_capacity(stream.len() * 4);
    let mut decoder = brotli::Decompressor::new(stream, DECODER_BUFFER_SIZE);
    io::copy(&mut decoder, &mut decompressed)?;
    debug!(
        compressed_len = bytes.len(),
        uncompressed_len = decompressed.len(),
        "Decompressed recording"
    );
    Ok(decompressed)
}

/// Raw container bytes, decompressing only when the envelope is present
pub fn unwrap_envelope(bytes: &[u8]) -> Result<Cow<'_, [u8]>, CodecError> {
    if is_compressed(bytes) {
        Ok(Cow::Owned(decompress(bytes)?))
    } else {
        Ok(Cow::Borrowed(bytes))
    }
}
