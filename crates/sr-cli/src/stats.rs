// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use indexmap::IndexMap;
use serde::Serialize;
use sr_domain_types::SourceEvent;
use sr_format::is_compressed;
use sr_vtree::VTree;

use crate::read_events;

#[derive(clap::Args, Debug, Clone)]
pub struct StatsArgs {
    pub path: PathBuf,

    /// Print JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct RecordingStats {
    pub bytes: u64,
    pub compressed: bool,
    pub events: usize,
    pub duration_ms: u64,
    pub kinds: IndexMap<&'static str, usize>,
    pub patches: IndexMap<&'static str, usize>,
    /// Live nodes after replaying every patch
    pub final_nodes: usize,
    /// First patch the tree rejected, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub broken_at: Option<String>,
}

impl RecordingStats {
    pub fn collect(events: &[SourceEvent], bytes: u64, compressed: bool) -> Self {
        let mut kinds = IndexMap::new();
        let mut patches = IndexMap::new();
        let mut tree = VTree::new();
        let mut broken_at = None;

        for (index, event) in events.iter().enumerate() {
            *kinds.entry(event.kind().as_str()).or_insert(0) += 1;
            let Some(patch) = event.as_patch() else {
                continue;
            };
            *patches.entry(patch.kind().as_str()).or_insert(0) += 1;
            if broken_at.is_none() {
                if let Err(err) = tree.apply(patch) {
                    broken_at = Some(format!("event #{} at {}ms: {}", index, event.time, err));
                }
            }
        }

        Self {
            bytes,
            compressed,
            events: events.len(),
            duration_ms: events.last().map(|event| event.time).unwrap_or_default(),
            kinds,
            patches,
            final_nodes: tree.len(),
            broken_at,
        }
    }
}

impl StatsArgs {
    pub fn run(self, out: &mut dyn Write) -> Result<()> {
        let raw = std::fs::read(&self.path)
            .with_context(|| format!("Failed to read recording {}", self.path.display()))?;
        let events = read_events(&self.path)?;
        let stats = RecordingStats::collect(&events, raw.len() as u64, is_compressed(&raw));

        if self.json {
            serde_json::to_writer_pretty(&mut *out, &stats)?;
            writeln!(out)?;
            return Ok(());
        }

        writeln!(out, "file:        {}", self.path.display())?;
        writeln!(
            out,
            "size:        {} bytes{}",
            stats.bytes,
            if stats.compressed { " (brotli)" } else { "" }
        )?;
        writeln!(out, "events:      {}", stats.events)?;
        writeln!(out, "duration:    {} ms", stats.duration_ms)?;
        for (kind, count) in &stats.kinds {
            writeln!(out, "  {:<12}{}", kind, count)?;
        }
        for (kind, count) in &stats.patches {
            writeln!(out, "  patch {:<6}{}", kind, count)?;
        }
        writeln!(out, "final nodes: {}", stats.final_nodes)?;
        if let Some(broken) = &stats.broken_at {
            writeln!(out, "broken at:   {}", broken)?;
        }
        Ok(())
    }
}
