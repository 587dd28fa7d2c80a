// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for recorded browser sessions
//!
//! These are the in-memory shapes of everything a recording can contain:
//! the synthetic node identity, DOM patches, and the auxiliary interaction,
//! network and console payloads. They carry authoring rules (via the
//! `validator` derive) but know nothing about the binary wire format, which
//! lives in `sr-format`.

pub mod console;
pub mod event;
pub mod id;
pub mod interaction;
pub mod network;
pub mod node;
pub mod patch;

pub use console::{ConsoleEvent, ConsoleLevel, ConsolePart};
pub use event::{EventData, EventKind, SourceEvent};
pub use id::SyntheticId;
pub use interaction::{
    Interaction, KeyAction, KeyEvent, PointerAction, PointerEvent, ScrollEvent, ViewportResize,
};
pub use network::{
    CORRELATION_ID_LEN, HttpRequest, HttpResponse, NetworkEvent, WebSocketFrame, WsDirection,
    new_correlation_id, validate_correlation_id,
};
pub use node::{DocTypeData, ElementData, NodeData, SnapshotNode, SnapshotNodeData, TextData};
pub use patch::{
    DomPatch, FullSnapshot, InsertNode, MoveNode, PatchKind, RemoveAttribute, RemoveNode,
    SetAttribute, SetText,
};
