// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

#![allow(dead_code)]

use sr_domain_types::{
    ConsoleEvent, ConsoleLevel, DocTypeData, DomPatch, ElementData, HttpRequest, HttpResponse,
    Interaction, NetworkEvent, NodeData, PointerAction, PointerEvent, SnapshotNode, SourceEvent,
    new_correlation_id,
};

/// `#1 Document -> [#2 doctype, #3 <html> -> [#4 <body>]]`
pub fn snapshot_event(time: u64) -> SourceEvent {
    SourceEvent::new(
        time,
        DomPatch::snapshot(
            1u64,
            vec![
                SnapshotNode::document(1u64, vec![2u64.into(), 3u64.into()]),
                SnapshotNode::doctype(2u64, DocTypeData::html5()),
                SnapshotNode::element(3u64, ElementData::new("html"), vec![4u64.into()]),
                SnapshotNode::element(4u64, ElementData::new("body"), vec![]),
            ],
        ),
    )
}

/// Ten events of mixed kinds in time order
pub fn mixed_session() -> Vec<SourceEvent> {
    let request_id = new_correlation_id();
    vec![
        snapshot_event(0),
        SourceEvent::new(10, DomPatch::insert(4u64, 5u64, 0, NodeData::text("hello"))),
        SourceEvent::new(
            12,
            Interaction::Pointer(PointerEvent {
                action: PointerAction::Move,
                x: 10,
                y: 20,
                target: None,
            }),
        ),
        SourceEvent::new(
            15,
            NetworkEvent::Request(HttpRequest {
                correlation_id: request_id.clone(),
                method: "GET".to_string(),
                url: "https://example.com/api".to_string(),
            }),
        ),
        SourceEvent::new(20, DomPatch::set_text(5u64, "hello, world")),
        SourceEvent::new(20, DomPatch::set_attribute(4u64, "class", "dark")),
        SourceEvent::new(
            31,
            NetworkEvent::Response(HttpResponse {
                correlation_id: request_id,
                status: 200,
                duration_ms: 16,
            }),
        ),
        SourceEvent::new(40, ConsoleEvent::text(ConsoleLevel::Log, "rendered")),
        SourceEvent::new(
            45,
            DomPatch::insert(4u64, 6u64, 1, NodeData::Element(ElementData::new("p"))),
        ),
        SourceEvent::new(50, DomPatch::remove(5u64)),
    ]
}
