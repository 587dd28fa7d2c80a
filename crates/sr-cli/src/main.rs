// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::{self, Write};

use anyhow::Result;
use sr_cli::{Cli, Parser};
use sr_logging::CliLogLevel;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    cli.logging.init_with_default_level("sr-cli", CliLogLevel::Warn)?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    cli.command.run(&mut out).await?;
    out.flush()?;
    Ok(())
}
