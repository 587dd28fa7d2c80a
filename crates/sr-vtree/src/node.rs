// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use sr_domain_types::{DocTypeData, ElementData, NodeData, SnapshotNode, SnapshotNodeData, SyntheticId};

/// A node of the virtual tree
///
/// Container variants own the ordered ids of their children; the children
/// themselves live in the tree's node map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VNode {
    Document {
        id: SyntheticId,
        children: Vec<SyntheticId>,
    },
    DocType {
        id: SyntheticId,
        doctype: DocTypeData,
    },
    Element {
        id: SyntheticId,
        element: ElementData,
        children: Vec<SyntheticId>,
    },
    Text {
        id: SyntheticId,
        value: String,
    },
}

impl VNode {
    /// Node created by an insert patch; containers start empty
    pub fn from_insert(id: SyntheticId, data: &NodeData) -> Self {
        match data {
            NodeData::DocType(doctype) => VNode::DocType {
                id,
                doctype: doctype.clone(),
            },
            NodeData::Element(element) => VNode::Element {
                id,
                element: element.clone(),
                children: Vec::new(),
            },
            NodeData::Text(text) => VNode::Text {
                id,
                value: text.value.clone(),
            },
        }
    }

    pub fn from_snapshot(node: &SnapshotNode) -> Self {
        let id = node.id;
        match &node.data {
            SnapshotNodeData::Document { children } => VNode::Document {
                id,
                children: children.clone(),
            },
            SnapshotNodeData::DocType(doctype) => VNode::DocType {
                id,
                doctype: doctype.clone(),
            },
            SnapshotNodeData::Element { element, children } => VNode::Element {
                id,
                element: element.clone(),
                children: children.clone(),
            },
            SnapshotNodeData::Text(text) => VNode::Text {
                id,
                value: text.value.clone(),
            },
        }
    }

    pub fn id(&self) -> SyntheticId {
        match self {
            VNode::Document { id, .. }
            | VNode::DocType { id, .. }
            | VNode::Element { id, .. }
            | VNode::Text { id, .. } => *id,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            VNode::Document { .. } => "document",
            VNode::DocType { .. } => "doctype",
            VNode::Element { .. } => "element",
            VNode::Text { .. } => "text",
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, VNode::Document { .. })
    }

    /// Whether the node can hold children
    pub fn is_container(&self) -> bool {
        matches!(self, VNode::Document { .. } | VNode::Element { .. })
    }

    pub fn children(&self) -> &[SyntheticId] {
        match self {
            VNode::Document { children, .. } | VNode::Element { children, .. } => children,
            VNode::DocType { .. } | VNode::Text { .. } => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<SyntheticId>> {
        match self {
            VNode::Document { children, .. } | VNode::Element { children, .. } => Some(children),
            VNode::DocType { .. } | VNode::Text { .. } => None,
        }
    }

    pub fn element(&self) -> Option<&ElementData> {
        match self {
            VNode::Element { element, .. } => Some(element),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&str> {
        match self {
            VNode::Text { value, .. } => Some(value),
            _ => None,
        }
    }
}
