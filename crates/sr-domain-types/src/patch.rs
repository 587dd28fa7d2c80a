// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! DOM patch events
//!
//! The closed set of mutations a recording can apply to a virtual tree.
//! Every variant names its targets by [`SyntheticId`]; positions are child
//! indices that the patch engine clamps into range.

use serde::{Deserialize, Serialize};
use std::fmt;
use validator::Validate;

use crate::id::SyntheticId;
use crate::node::{NodeData, SnapshotNode};

/// Complete tree state; the only patch allowed on an empty tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct FullSnapshot {
    pub root: SyntheticId,
    #[validate(length(min = 1, message = "snapshot must contain at least the document node"))]
    pub nodes: Vec<SnapshotNode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct InsertNode {
    pub parent: SyntheticId,
    pub id: SyntheticId,
    pub index: u32,
    pub node: NodeData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RemoveNode {
    pub id: SyntheticId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct MoveNode {
    pub id: SyntheticId,
    pub new_parent: SyntheticId,
    pub index: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetText {
    pub id: SyntheticId,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SetAttribute {
    pub id: SyntheticId,
    #[validate(length(min = 1, max = 256, message = "attribute names must be 1..=256 bytes"))]
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct RemoveAttribute {
    pub id: SyntheticId,
    #[validate(length(min = 1, max = 256, message = "attribute names must be 1..=256 bytes"))]
    pub name: String,
}

/// A single structural or content mutation of the virtual tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum DomPatch {
    Snapshot(FullSnapshot),
    Insert(InsertNode),
    Remove(RemoveNode),
    Move(MoveNode),
    SetText(SetText),
    SetAttribute(SetAttribute),
    RemoveAttribute(RemoveAttribute),
}

/// Discriminant-only view of [`DomPatch`], handy for logging and errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PatchKind {
    Snapshot,
    Insert,
    Remove,
    Move,
    SetText,
    SetAttribute,
    RemoveAttribute,
}

impl PatchKind {
    pub fn as_str(self) -> &'static str {
        match self {
            PatchKind::Snapshot => "snapshot",
            PatchKind::Insert => "insert",
            PatchKind::Remove => "remove",
            PatchKind::Move => "move",
            PatchKind::SetText => "set_text",
            PatchKind::SetAttribute => "set_attribute",
            PatchKind::RemoveAttribute => "remove_attribute",
        }
    }
}

impl fmt::Display for PatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl DomPatch {
    pub fn kind(&self) -> PatchKind {
        match self {
            DomPatch::Snapshot(_) => PatchKind::Snapshot,
            DomPatch::Insert(_) => PatchKind::Insert,
            DomPatch::Remove(_) => PatchKind::Remove,
            DomPatch::Move(_) => PatchKind::Move,
            DomPatch::SetText(_) => PatchKind::SetText,
            DomPatch::SetAttribute(_) => PatchKind::SetAttribute,
            DomPatch::RemoveAttribute(_) => PatchKind::RemoveAttribute,
        }
    }

    /// The node this patch primarily acts on (`None` for snapshots)
    pub fn target(&self) -> Option<SyntheticId> {
        match self {
            DomPatch::Snapshot(_) => None,
            DomPatch::Insert(p) => Some(p.id),
            DomPatch::Remove(p) => Some(p.id),
            DomPatch::Move(p) => Some(p.id),
            DomPatch::SetText(p) => Some(p.id),
            DomPatch::SetAttribute(p) => Some(p.id),
            DomPatch::RemoveAttribute(p) => Some(p.id),
        }
    }

    pub fn insert(
        parent: impl Into<SyntheticId>,
        id: impl Into<SyntheticId>,
        index: u32,
        node: NodeData,
    ) -> Self {
        DomPatch::Insert(InsertNode {
            parent: parent.into(),
            id: id.into(),
            index,
            node,
        })
    }

    pub fn remove(id: impl Into<SyntheticId>) -> Self {
        DomPatch::Remove(RemoveNode { id: id.into() })
    }

    pub fn move_to(id: impl Into<SyntheticId>, new_parent: impl Into<SyntheticId>, index: u32) -> Self {
        DomPatch::Move(MoveNode {
            id: id.into(),
            new_parent: new_parent.into(),
            index,
        })
    }

    pub fn set_text(id: impl Into<SyntheticId>, value: impl Into<String>) -> Self {
        DomPatch::SetText(SetText {
            id: id.into(),
            value: value.into(),
        })
    }

    pub fn set_attribute(
        id: impl Into<SyntheticId>,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        DomPatch::SetAttribute(SetAttribute {
            id: id.into(),
            name: name.into(),
            value: value.into(),
        })
    }

    pub fn remove_attribute(id: impl Into<SyntheticId>, name: impl Into<String>) -> Self {
        DomPatch::RemoveAttribute(RemoveAttribute {
            id: id.into(),
            name: name.into(),
        })
    }

    pub fn snapshot(root: impl Into<SyntheticId>, nodes: Vec<SnapshotNode>) -> Self {
        DomPatch::Snapshot(FullSnapshot {
            root: root.into(),
            nodes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sr_test_utils::logged_test]
    fn test_patch_kind_and_target() {
        let patch = DomPatch::insert(1, 2, 0, NodeData::text("hi"));
        assert_eq!(patch.kind(), PatchKind::Insert);
        assert_eq!(patch.target(), Some(SyntheticId(2)));

        let snapshot = DomPatch::snapshot(1, vec![SnapshotNode::document(1, vec![])]);
        assert_eq!(snapshot.kind().as_str(), "snapshot");
        assert_eq!(snapshot.target(), None);
    }

    #[sr_test_utils::logged_test]
    fn test_patch_serde_is_tagged() {
        let patch = DomPatch::set_attribute(7, "class", "active");
        let json = serde_json::to_string(&patch).unwrap();
        assert!(json.contains("\"op\":\"set_attribute\""));
        let back: DomPatch = serde_json::from_str(&json).unwrap();
        assert_eq!(back, patch);
    }
}
