// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::sync::Arc;

use sr_domain_types::{ConsoleEvent, EventData, SourceEvent};
use sr_vtree::{RenderNode, VTree};

use crate::network::NetworkLedger;
use crate::resources::ResourceMap;

/// Read-only snapshot handed to renderers
///
/// The tree is a copy-on-write handle: later patches applied by the clock
/// never show through a frame that was already handed out.
#[derive(Debug, Clone)]
pub struct Frame {
    pub time: u64,
    pub tree: VTree,
    /// Auxiliary events inside the visible window ending at `time`
    pub window: Vec<SourceEvent>,
    /// Auxiliary events crossed since the previous frame; empty after a rewind
    pub crossed: Vec<SourceEvent>,
    pub resources: Arc<ResourceMap>,
    events: Arc<[SourceEvent]>,
    /// `events[..end]` are at or before `time`
    end: usize,
}

impl Frame {
    pub(crate) fn empty(resources: Arc<ResourceMap>) -> Self {
        Self {
            time: 0,
            tree: VTree::new(),
            window: Vec::new(),
            crossed: Vec::new(),
            resources,
            events: Arc::from(Vec::new()),
            end: 0,
        }
    }

    pub(crate) fn new(
        time: u64,
        tree: VTree,
        events: Arc<[SourceEvent]>,
        aux_window_ms: u64,
        crossed: Vec<SourceEvent>,
        resources: Arc<ResourceMap>,
    ) -> Self {
        let end = events.partition_point(|event| event.time <= time);
        let start = events[..end].partition_point(|event| event.time.saturating_add(aux_window_ms) <= time);
        let window = events[start..end]
            .iter()
            .filter(|event| !event.is_dom())
            .cloned()
            .collect();
        Self {
            time,
            tree,
            window,
            crossed,
            resources,
            events,
            end,
        }
    }

    pub fn to_render_tree(&self) -> Option<RenderNode> {
        self.tree.to_render_tree()
    }

    /// Network exchanges as of this frame's time
    pub fn network(&self) -> NetworkLedger {
        NetworkLedger::from_events(&self.events[..self.end])
    }

    /// Console output inside the visible window
    pub fn console(&self) -> impl Iterator<Item = (u64, &ConsoleEvent)> {
        self.window.iter().filter_map(|event| match &event.data {
            EventData::Console(console) => Some((event.time, console)),
            _ => None,
        })
    }
}
