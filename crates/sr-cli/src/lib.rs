// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;
use sr_domain_types::SourceEvent;
use sr_format::RecordingReader;
use sr_logging::CliLoggingArgs;

pub mod compress;
pub mod inspect;
pub mod replay;
pub mod stats;

pub use clap::Parser;

#[derive(clap::Parser)]
#[command(
    name = "sr",
    about = "Inspect and replay session recordings",
    version,
    propagate_version = true
)]
pub struct Cli {
    #[command(flatten)]
    pub logging: CliLoggingArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print every event as one JSON object per line
    Inspect(inspect::InspectArgs),
    /// Materialize the document at a point in time
    Replay(replay::ReplayArgs),
    /// Summarize a recording
    Stats(stats::StatsArgs),
    /// Rewrite a recording with or without the Brotli envelope
    Compress(compress::CompressArgs),
}

impl Commands {
    pub async fn run(self, out: &mut dyn Write) -> Result<()> {
        match self {
            Commands::Inspect(args) => args.run(out),
            Commands::Replay(args) => args.run(out).await,
            Commands::Stats(args) => args.run(out),
            Commands::Compress(args) => args.run(out),
        }
    }
}

/// Read and fully decode a recording file
pub(crate) fn read_events(path: &Path) -> Result<Vec<SourceEvent>> {
    let reader = RecordingReader::open(path)
        .with_context(|| format!("Failed to read recording {}", path.display()))?;
    reader
        .read_all_events()
        .with_context(|| format!("Failed to decode recording {}", path.display()))
}
