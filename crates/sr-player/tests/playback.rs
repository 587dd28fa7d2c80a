// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

mod common;

use std::sync::Arc;
use std::time::Duration;

use common::{attached, blob, busy_session, id, replay_from_scratch, text_edit_session};
use proptest::prelude::*;
use sr_domain_types::{DomPatch, ElementData, NodeData, SnapshotNode, SourceEvent};
use sr_format::{RecordingWriter, WriterConfig};
use sr_player::{
    AutoAdvance, FileSource, ManualTime, PlaybackClock, PlaybackError, PlaybackStatus,
    PlayerConfig, ReadyState, RecordingDuration, ResourceMap, SharedClock, Source, WatchObserver,
};
use sr_vtree::{RenderNode, VTree};
use tempfile::TempDir;

#[sr_test_utils::logged_test]
fn backward_seek_restores_initial_document() {
    let mut clock = attached(&text_edit_session(), PlayerConfig::default());
    let start = clock.seek(0).unwrap();
    assert!(start.tree.children(id(2)).is_empty());

    let end = clock.seek(200).unwrap();
    assert_eq!(end.tree.children(id(2)), &[id(3)]);
    assert_eq!(end.tree.text_content(id(3)), "bye");

    let rewound = clock.seek(0).unwrap();
    assert_eq!(rewound.tree, start.tree);
    assert!(!rewound.tree.contains(id(3)));
}

#[sr_test_utils::logged_test]
fn seeking_twice_is_idempotent() {
    let mut clock = attached(&busy_session(), PlayerConfig::default());
    for target in [150, 0, 260, 260, 90] {
        let first = clock.seek(target).unwrap();
        let second = clock.seek(target).unwrap();
        assert_eq!(first.tree, second.tree);
        assert_eq!(first.time, second.time);
        assert_eq!(first.window, second.window);
    }
}

#[sr_test_utils::logged_test]
fn equal_timestamps_apply_in_recorded_order() {
    let events = vec![
        SourceEvent::new(
            0,
            DomPatch::snapshot(1u64, vec![SnapshotNode::document(1u64, vec![])]),
        ),
        SourceEvent::new(50, DomPatch::insert(1u64, 2u64, 0, NodeData::element("ul"))),
        SourceEvent::new(50, DomPatch::insert(2u64, 3u64, 0, NodeData::element("li"))),
        SourceEvent::new(50, DomPatch::set_attribute(3u64, "id", "first")),
    ];
    let mut clock = attached(&events, PlayerConfig::default());
    assert_eq!(clock.seek(49).unwrap().tree.len(), 1);

    let frame = clock.seek(50).unwrap();
    assert_eq!(frame.tree.children(id(2)), &[id(3)]);
    let li = frame.tree.get(id(3)).and_then(|node| node.element()).unwrap();
    assert_eq!(li.attributes.get("id").map(String::as_str), Some("first"));
}

#[sr_test_utils::logged_test]
fn frames_report_aux_window_and_network() {
    let mut clock = attached(&busy_session(), PlayerConfig::default().with_aux_window_ms(150));
    let frame = clock.seek(260).unwrap();
    assert_eq!(frame.window.len(), 2);
    assert_eq!(frame.crossed.len(), 2);
    assert_eq!(frame.console().map(|(time, _)| time).collect::<Vec<_>>(), vec![220]);

    let network = frame.network();
    assert_eq!(network.len(), 1);
    assert_eq!(network.pending().count(), 1);

    let frame = clock.seek(400).unwrap();
    assert_eq!(frame.crossed.len(), 2);
    let network = frame.network();
    let exchange = network.iter().next().unwrap();
    assert_eq!(exchange.status, Some(201));
    assert_eq!(exchange.completed_at, Some(300));

    // Rewinding reports the window but no crossed events
    let frame = clock.seek(230).unwrap();
    assert!(frame.crossed.is_empty());
    assert_eq!(frame.window.len(), 2);
}

#[sr_test_utils::logged_test]
fn render_tree_reflects_frame() {
    let mut clock = attached(&busy_session(), PlayerConfig::default());
    let frame = clock.seek(250).unwrap();
    let render = frame.to_render_tree();
    let Some(RenderNode::Document { children, .. }) = &render else {
        panic!("expected a document");
    };
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].to_html(), r#"<div class="saved">bye</div>"#);
}

#[sr_test_utils::logged_test]
fn frames_carry_resource_map() {
    let mut clock = PlaybackClock::new(PlayerConfig::default());
    let resources: ResourceMap = [("logo", "https://cdn.example.com/logo.png")].into_iter().collect();
    clock.set_resources(resources);
    clock.attach(blob(&text_edit_session())).unwrap();

    let frame = clock.seek(100).unwrap();
    assert_eq!(
        frame.resources.resolve("logo").map(|url| url.to_string()),
        Some("https://cdn.example.com/logo.png".to_string())
    );
}

#[sr_test_utils::logged_test]
fn failure_freezes_last_good_frame() {
    let mut events = busy_session();
    events.push(SourceEvent::new(500, DomPatch::set_text(2u64, "not a text node")));
    let mut clock = attached(&events, PlayerConfig::default());
    let good = clock.seek(450).unwrap();

    let err = clock.seek(600).unwrap_err();
    assert!(matches!(err, PlaybackError::Patch { time: 500, .. }));
    assert_eq!(clock.state().ready, ReadyState::Failed);
    assert_eq!(clock.frame().tree, good.tree);
    assert!(matches!(clock.play(), Err(PlaybackError::Failed(_))));
}

#[sr_test_utils::logged_test]
fn attaching_a_new_source_resets_the_clock() {
    let mut clock = attached(&busy_session(), PlayerConfig::default());
    clock.seek(400).unwrap();

    let replacement = vec![SourceEvent::new(
        0,
        DomPatch::snapshot(
            7u64,
            vec![
                SnapshotNode::document(7u64, vec![id(8)]),
                SnapshotNode::element(8u64, ElementData::new("main"), vec![]),
            ],
        ),
    )];
    let frame = clock.attach(blob(&replacement)).unwrap();
    assert_eq!(frame.time, 0);
    assert_eq!(frame.tree.root(), Some(id(7)));
    assert_eq!(clock.duration(), RecordingDuration::Known(0));
    assert!(clock.checkpoints().is_empty());
}

#[sr_test_utils::logged_tokio_test]
async fn file_source_feeds_the_clock() -> anyhow::Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("session.srz");
    let mut writer = RecordingWriter::create(&path, WriterConfig::default())?;
    for event in busy_session() {
        writer.append(&event)?;
    }
    writer.finish()?;

    let source = Arc::new(FileSource::open(&path).await);
    assert_eq!(source.ready_state(), ReadyState::Ready);

    let mut clock = PlaybackClock::new(PlayerConfig::default());
    clock.attach(source)?;
    let frame = clock.seek(200)?;
    assert_eq!(frame.tree.text_content(id(2)), "bye");
    Ok(())
}

#[sr_test_utils::logged_tokio_test(start_paused = true)]
async fn auto_advance_plays_to_the_end() {
    let time = Arc::new(ManualTime::new());
    let mut clock = PlaybackClock::with_time_source(PlayerConfig::default(), time.clone());
    let (observer, mut states) = WatchObserver::channel();
    clock.subscribe(observer);
    clock.attach(blob(&busy_session())).unwrap();

    let shared = SharedClock::new(clock);
    let auto = AutoAdvance::spawn(shared.clone(), Duration::from_millis(16));
    shared.play().unwrap();

    time.advance(120);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert_eq!(shared.state().time, 120);
    assert_eq!(shared.frame().tree.text_content(id(2)), "hi");

    time.advance(10_000);
    tokio::time::sleep(Duration::from_millis(40)).await;
    let state = *states.borrow_and_update();
    assert_eq!(state.status, PlaybackStatus::Ended);
    assert_eq!(state.time, 400);

    auto.stop().await;
}

#[sr_test_utils::logged_tokio_test(start_paused = true)]
async fn auto_advance_stops_on_failure() {
    let time = Arc::new(ManualTime::new());
    let mut events = text_edit_session();
    events.push(SourceEvent::new(300, DomPatch::remove(1u64)));
    let mut clock = PlaybackClock::with_time_source(PlayerConfig::default(), time.clone());
    clock.attach(blob(&events)).unwrap();

    let shared = SharedClock::new(clock);
    let auto = AutoAdvance::start(shared.clone());
    shared.play().unwrap();
    time.advance(250);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(!auto.is_finished());

    time.advance(1_000);
    tokio::time::sleep(Duration::from_millis(40)).await;
    assert!(auto.is_finished());
    assert_eq!(shared.state().ready, ReadyState::Failed);
    assert_eq!(shared.state().status, PlaybackStatus::Paused);
    assert_eq!(shared.frame().tree.text_content(id(2)), "bye");
    auto.stop().await;
}

/// Build a session of valid patches out of arbitrary choices, dropping the
/// ones the tree rejects
fn generated_session(choices: &[(u8, u16, u16, u8)]) -> Vec<SourceEvent> {
    let snapshot = DomPatch::snapshot(
        1u64,
        vec![
            SnapshotNode::document(1u64, vec![id(2)]),
            SnapshotNode::element(2u64, ElementData::new("body"), vec![]),
        ],
    );
    let mut model = VTree::new();
    model.apply(&snapshot).unwrap();
    let mut events = vec![SourceEvent::new(0, snapshot)];
    let mut time = 0;
    let mut next_id: u64 = 10;

    for &(op, a, b, dt) in choices {
        let mut ids: Vec<_> = model.nodes().map(|node| node.id()).collect();
        ids.sort();
        let pick = |choice: u16| ids[usize::from(choice) % ids.len()];
        let patch = match op % 5 {
            0 | 1 => {
                next_id += 1;
                let data = if op % 2 == 0 {
                    NodeData::element("div")
                } else {
                    NodeData::text("t")
                };
                DomPatch::insert(pick(a), next_id, u32::from(b % 4), data)
            }
            2 => DomPatch::remove(pick(a)),
            3 => DomPatch::move_to(pick(a), pick(b), 0),
            _ => DomPatch::set_attribute(pick(a), "data-n", b.to_string()),
        };
        if model.apply(&patch).is_ok() {
            time += u64::from(dt % 3);
            events.push(SourceEvent::new(time, patch));
        }
    }
    events
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn checkpoints_do_not_change_frames(
        choices in prop::collection::vec((any::<u8>(), any::<u16>(), any::<u16>(), any::<u8>()), 1..80),
        seeks in prop::collection::vec(0u64..200, 1..12),
    ) {
        let events = generated_session(&choices);
        let mut with = attached(&events, PlayerConfig::default().with_checkpoints(3, 4));
        let mut without = attached(&events, PlayerConfig::default().with_checkpoints(0, 1));
        prop_assert!(!without.checkpoints().is_enabled());

        for target in seeks {
            let a = with.seek(target).unwrap();
            let b = without.seek(target).unwrap();
            prop_assert_eq!(&a.tree, &b.tree);
            prop_assert_eq!(&a.tree, &replay_from_scratch(&events, a.time));
        }
        prop_assert!(with.checkpoints().len() <= 4);
    }
}
