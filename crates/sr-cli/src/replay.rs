// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow};
use serde::Serialize;
use sr_domain_types::SourceEvent;
use sr_player::{
    FileSource, NetworkExchange, PlaybackClock, PlayerConfig, ReadyState, RecordingDuration,
    ResourceMap, Source,
};
use sr_vtree::RenderNode;
use tracing::debug;
use url::Url;

#[derive(clap::Args, Debug, Clone)]
pub struct ReplayArgs {
    pub path: PathBuf,

    /// Playback time to materialize (ms); clamped to the recording length
    #[arg(long, default_value_t = 0)]
    pub at: u64,

    /// Player configuration file (TOML); `SR_PLAYER__*` variables override it
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// JSON object mapping resource keys to locations
    #[arg(long)]
    pub resources: Option<PathBuf>,

    /// Base URL for relative resource locations
    #[arg(long, requires = "resources")]
    pub base_url: Option<Url>,

    /// Print the document as HTML instead of JSON
    #[arg(long)]
    pub html: bool,
}

#[derive(Serialize)]
struct ReplayOutput<'a> {
    time: u64,
    duration: RecordingDuration,
    nodes: usize,
    resources: usize,
    document: Option<RenderNode>,
    window: &'a [SourceEvent],
    network: Vec<&'a NetworkExchange>,
}

impl ReplayArgs {
    fn load_resources(&self) -> Result<ResourceMap> {
        let Some(path) = &self.resources else {
            return Ok(ResourceMap::new());
        };
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read resource map {}", path.display()))?;
        ResourceMap::from_json(&json, self.base_url.clone())
            .with_context(|| format!("Invalid resource map {}", path.display()))
    }

    pub async fn run(self, out: &mut dyn Write) -> Result<()> {
        let config = PlayerConfig::load(self.config.as_deref())?;
        let source = FileSource::open(&self.path).await;
        if source.ready_state() != ReadyState::Ready {
            let reason = source
                .failure()
                .map(|err| err.to_string())
                .unwrap_or_else(|| "source did not settle".to_string());
            return Err(anyhow!("Failed to load {}: {}", self.path.display(), reason));
        }

        let mut clock = PlaybackClock::new(config);
        clock.set_resources(self.load_resources()?);
        clock.attach(Arc::new(source)).context("Failed to start playback")?;
        let frame = clock
            .seek(self.at)
            .with_context(|| format!("Failed to replay to {}ms", self.at))?;
        debug!(requested = self.at, time = frame.time, nodes = frame.tree.len(), "Replayed");

        if self.html {
            let html = frame.to_render_tree().map(|node| node.to_html()).unwrap_or_default();
            writeln!(out, "{}", html)?;
            return Ok(());
        }

        let network = frame.network();
        let output = ReplayOutput {
            time: frame.time,
            duration: clock.duration(),
            nodes: frame.tree.len(),
            resources: frame.resources.len(),
            document: frame.to_render_tree(),
            window: &frame.window,
            network: network.iter().collect(),
        };
        serde_json::to_writer_pretty(&mut *out, &output)?;
        writeln!(out)?;
        Ok(())
    }
}
