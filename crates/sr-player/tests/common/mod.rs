// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

#![allow(dead_code)]

use std::sync::Arc;

use sr_domain_types::{
    ConsoleEvent, ConsoleLevel, DomPatch, ElementData, HttpRequest, HttpResponse, NetworkEvent,
    NodeData, SnapshotNode, SourceEvent, SyntheticId, new_correlation_id,
};
use sr_format::{WriterConfig, encode_recording};
use sr_player::{BlobSource, PlaybackClock, PlayerConfig, Source};
use sr_vtree::VTree;

pub fn id(raw: u64) -> SyntheticId {
    SyntheticId::new(raw)
}

/// Snapshot `#1 Document -> [#2 <div>]`, then text `#3` inserted and edited
pub fn text_edit_session() -> Vec<SourceEvent> {
    vec![
        SourceEvent::new(
            0,
            DomPatch::snapshot(
                1u64,
                vec![
                    SnapshotNode::document(1u64, vec![id(2)]),
                    SnapshotNode::element(2u64, ElementData::new("div"), vec![]),
                ],
            ),
        ),
        SourceEvent::new(100, DomPatch::insert(2u64, 3u64, 0, NodeData::text("hi"))),
        SourceEvent::new(200, DomPatch::set_text(3u64, "bye")),
    ]
}

/// DOM edits interleaved with console output and one HTTP exchange
pub fn busy_session() -> Vec<SourceEvent> {
    let request = new_correlation_id();
    let mut events = text_edit_session();
    events.extend([
        SourceEvent::new(
            210,
            NetworkEvent::Request(HttpRequest {
                correlation_id: request.clone(),
                method: "POST".to_string(),
                url: "/api/save".to_string(),
            }),
        ),
        SourceEvent::new(220, ConsoleEvent::text(ConsoleLevel::Log, "saving")),
        SourceEvent::new(250, DomPatch::set_attribute(2u64, "class", "saved")),
        SourceEvent::new(
            300,
            NetworkEvent::Response(HttpResponse {
                correlation_id: request,
                status: 201,
                duration_ms: 90,
            }),
        ),
        SourceEvent::new(400, ConsoleEvent::text(ConsoleLevel::Warn, "slow save")),
    ]);
    events
}

pub fn blob(events: &[SourceEvent]) -> Arc<dyn Source> {
    let bytes = encode_recording(events, &WriterConfig::default()).unwrap();
    Arc::new(BlobSource::from_bytes(&bytes))
}

pub fn attached(events: &[SourceEvent], config: PlayerConfig) -> PlaybackClock {
    let mut clock = PlaybackClock::new(config);
    clock.attach(blob(events)).unwrap();
    clock
}

/// Tree obtained by applying every DOM patch at or before `time` to an
/// empty tree
pub fn replay_from_scratch(events: &[SourceEvent], time: u64) -> VTree {
    let mut tree = VTree::new();
    for event in events.iter().take_while(|event| event.time <= time) {
        if let Some(patch) = event.as_patch() {
            tree.apply(patch).unwrap();
        }
    }
    tree
}
