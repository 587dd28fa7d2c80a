// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The timestamped event envelope
//!
//! Every record in a recording is a [`SourceEvent`]: a millisecond offset
//! from the start of the session plus one payload from a closed set of
//! kinds. Within a recording, `time` never decreases.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::console::ConsoleEvent;
use crate::interaction::Interaction;
use crate::network::NetworkEvent;
use crate::patch::DomPatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum EventData {
    Dom(DomPatch),
    Interaction(Interaction),
    Network(NetworkEvent),
    Console(ConsoleEvent),
}

/// Event-kind discriminant, also the first byte of every encoded record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    Dom,
    Interaction,
    Network,
    Console,
}

impl EventKind {
    pub const ALL: [EventKind; 4] = [
        EventKind::Dom,
        EventKind::Interaction,
        EventKind::Network,
        EventKind::Console,
    ];

    pub fn tag(self) -> u8 {
        match self {
            EventKind::Dom => 0,
            EventKind::Interaction => 1,
            EventKind::Network => 2,
            EventKind::Console => 3,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(EventKind::Dom),
            1 => Some(EventKind::Interaction),
            2 => Some(EventKind::Network),
            3 => Some(EventKind::Console),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Dom => "dom",
            EventKind::Interaction => "interaction",
            EventKind::Network => "network",
            EventKind::Console => "console",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceEvent {
    /// Offset from the start of the recording, in milliseconds
    pub time: u64,
    pub data: EventData,
}

impl SourceEvent {
    pub fn new(time: u64, data: impl Into<EventData>) -> Self {
        Self {
            time,
            data: data.into(),
        }
    }

    pub fn kind(&self) -> EventKind {
        match self.data {
            EventData::Dom(_) => EventKind::Dom,
            EventData::Interaction(_) => EventKind::Interaction,
            EventData::Network(_) => EventKind::Network,
            EventData::Console(_) => EventKind::Console,
        }
    }

    pub fn as_patch(&self) -> Option<&DomPatch> {
        match &self.data {
            EventData::Dom(patch) => Some(patch),
            _ => None,
        }
    }

    /// Whether this event changes the virtual tree when replayed
    pub fn is_dom(&self) -> bool {
        matches!(self.data, EventData::Dom(_))
    }
}

impl From<DomPatch> for EventData {
    fn from(patch: DomPatch) -> Self {
        EventData::Dom(patch)
    }
}

impl From<Interaction> for EventData {
    fn from(interaction: Interaction) -> Self {
        EventData::Interaction(interaction)
    }
}

impl From<NetworkEvent> for EventData {
    fn from(event: NetworkEvent) -> Self {
        EventData::Network(event)
    }
}

impl From<ConsoleEvent> for EventData {
    fn from(event: ConsoleEvent) -> Self {
        EventData::Console(event)
    }
}
