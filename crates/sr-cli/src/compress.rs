// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use sr_format::{WriterConfig, encode_recording};
use tracing::info;

use crate::read_events;

#[derive(clap::Args, Debug, Clone)]
pub struct CompressArgs {
    pub input: PathBuf,
    pub output: PathBuf,

    /// Brotli quality, 0 to 11
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=11))]
    pub quality: u32,

    /// Write the raw container instead
    #[arg(long)]
    pub decompress: bool,
}

impl CompressArgs {
    pub fn run(self, out: &mut dyn Write) -> Result<()> {
        // Decoding first guarantees the output is a valid recording
        let events = read_events(&self.input)?;
        let config = WriterConfig::default()
            .with_compression(!self.decompress)
            .with_brotli_quality(self.quality);
        let bytes = encode_recording(&events, &config).context("Failed to encode recording")?;
        std::fs::write(&self.output, &bytes)
            .with_context(|| format!("Failed to write {}", self.output.display()))?;

        info!(
            input = %self.input.display(),
            output = %self.output.display(),
            events = events.len(),
            bytes = bytes.len(),
            "Rewrote recording"
        );
        writeln!(out, "{} events, {} bytes -> {}", events.len(), bytes.len(), self.output.display())?;
        Ok(())
    }
}
