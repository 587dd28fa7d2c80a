// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;
use sr_domain_types::{EventData, SourceEvent};
use tracing::debug;

use crate::read_events;

#[derive(clap::Args, Debug, Clone)]
pub struct InspectArgs {
    /// Recording file, raw or compressed
    pub path: PathBuf,

    /// Only print events of this kind
    #[arg(long, value_parser = ["dom", "interaction", "network", "console"])]
    pub kind: Option<String>,

    /// Skip events before this time (ms)
    #[arg(long)]
    pub from: Option<u64>,

    /// Skip events after this time (ms)
    #[arg(long)]
    pub to: Option<u64>,
}

#[derive(Serialize)]
struct Line<'a> {
    index: usize,
    time: u64,
    kind: &'static str,
    data: &'a EventData,
}

impl InspectArgs {
    fn selects(&self, event: &SourceEvent) -> bool {
        self.kind.as_deref().map_or(true, |kind| kind == event.kind().as_str())
            && self.from.map_or(true, |from| event.time >= from)
            && self.to.map_or(true, |to| event.time <= to)
    }

    pub fn run(self, out: &mut dyn Write) -> Result<()> {
        let events = read_events(&self.path)?;
        let mut printed = 0;
        for (index, event) in events.iter().enumerate().filter(|(_, event)| self.selects(event)) {
            let line = Line {
                index,
                time: event.time,
                kind: event.kind().as_str(),
                data: &event.data,
            };
            serde_json::to_writer(&mut *out, &line)?;
            writeln!(out)?;
            printed += 1;
        }
        debug!(total = events.len(), printed, "Inspected recording");
        Ok(())
    }
}
