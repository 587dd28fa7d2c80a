// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

mod common;

use sr_domain_types::SourceEvent;
use sr_format::{CodecError, List, Mismatch};

fn encoded_session() -> List<SourceEvent> {
    let mut list = List::new();
    for event in common::mixed_session() {
        list.append(&event).unwrap();
    }
    list
}

#[sr_test_utils::logged_test]
fn truncated_mid_record_leaves_target_untouched() {
    let list = encoded_session();
    assert_eq!(list.len(), 10);

    // cut the buffer halfway through the tenth record
    let tenth = list.record_offset(9).unwrap();
    let tenth_len = list.raw(9).unwrap().len();
    let cut = tenth + tenth_len / 2;
    let truncated = &list.as_bytes()[..cut];

    let mut target = List::<SourceEvent>::new();
    target.append(&common::snapshot_event(0)).unwrap();
    let before = target.as_bytes().to_vec();

    let err = List::unpack_into(truncated, &mut target).unwrap_err();
    assert!(
        matches!(err, CodecError::TruncatedBuffer { .. }),
        "expected truncation, got {err}"
    );
    assert_eq!(target.len(), 1);
    assert_eq!(target.as_bytes(), before.as_slice());
}

#[sr_test_utils::logged_test]
fn unknown_event_kind_fails_unpack() {
    let list = encoded_session();
    let mut bytes = list.as_bytes().to_vec();
    let third = list.record_offset(2).unwrap();
    bytes[third] = 0x7f;

    let mut target = List::<SourceEvent>::new();
    let err = List::unpack_into(&bytes, &mut target).unwrap_err();
    match err {
        CodecError::SchemaMismatch { offset, reason } => {
            assert_eq!(offset, third);
            assert_eq!(
                reason,
                Mismatch::UnknownDiscriminant {
                    type_name: "EventKind",
                    value: 0x7f
                }
            );
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(target.is_empty());
}

#[sr_test_utils::logged_test]
fn unpacked_list_decodes_lazily_and_in_order() {
    let session = common::mixed_session();
    let list = encoded_session();
    let unpacked = List::<SourceEvent>::from_bytes(list.as_bytes()).unwrap();

    assert_eq!(unpacked.get(4).unwrap().unwrap(), session[4]);
    let first_pass: Vec<_> = unpacked.iter().map(Result::unwrap).collect();
    let second_pass: Vec<_> = unpacked.iter().map(Result::unwrap).collect();
    assert_eq!(first_pass, session);
    assert_eq!(second_pass, session);
}

#[sr_test_utils::logged_test]
fn huge_declared_count_is_truncation() {
    let bytes = [0xff, 0xff, 0xff, 0x7f, 1, 0, 0, 0];
    let err = List::<SourceEvent>::from_bytes(&bytes).unwrap_err();
    assert!(matches!(err, CodecError::TruncatedBuffer { offset: 4, .. }));
}

#[sr_test_utils::logged_test]
fn invalid_append_leaves_list_unchanged() {
    let mut list = encoded_session();
    let before = list.as_bytes().to_vec();
    let invalid = SourceEvent::new(60, sr_domain_types::DomPatch::set_attribute(4u64, "", "x"));
    let err = list.append(&invalid).unwrap_err();
    assert!(matches!(err, CodecError::SchemaValidation(_)));
    assert_eq!(list.len(), 10);
    assert_eq!(list.as_bytes(), before.as_slice());
}
