// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Node payloads carried by DOM patches
//!
//! `NodeData` is what an insert creates: a node without children, since
//! children always arrive through their own inserts. `SnapshotNodeData`
//! is the full-snapshot form, where container nodes list their children
//! by id.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::id::SyntheticId;

/// Upper bound on tag and attribute name lengths accepted at authoring time
pub const MAX_NAME_LEN: u64 = 256;

/// `<!DOCTYPE name public system>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct DocTypeData {
    #[validate(length(min = 1, max = 256, message = "doctype name must be 1..=256 bytes"))]
    pub name: String,
    pub public_id: String,
    pub system_id: String,
}

impl DocTypeData {
    pub fn html5() -> Self {
        Self {
            name: "html".to_string(),
            public_id: String::new(),
            system_id: String::new(),
        }
    }
}

/// Element tag with its ordered attributes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ElementData {
    #[validate(length(min = 1, max = 128, message = "tag name must be 1..=128 bytes"))]
    pub tag: String,
    #[validate(custom(function = "validate_attribute_names"))]
    pub attributes: IndexMap<String, String>,
}

impl ElementData {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: IndexMap::new(),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct TextData {
    pub value: String,
}

impl TextData {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

/// Payload of a node created by an insert patch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeData {
    DocType(DocTypeData),
    Element(ElementData),
    Text(TextData),
}

impl NodeData {
    pub fn element(tag: impl Into<String>) -> Self {
        Self::Element(ElementData::new(tag))
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(TextData::new(value))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            NodeData::DocType(_) => "doctype",
            NodeData::Element(_) => "element",
            NodeData::Text(_) => "text",
        }
    }
}

/// Node payload as it appears inside a full snapshot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SnapshotNodeData {
    Document {
        children: Vec<SyntheticId>,
    },
    DocType(DocTypeData),
    Element {
        element: ElementData,
        children: Vec<SyntheticId>,
    },
    Text(TextData),
}

impl SnapshotNodeData {
    pub fn children(&self) -> &[SyntheticId] {
        match self {
            SnapshotNodeData::Document { children } | SnapshotNodeData::Element { children, .. } => {
                children
            }
            SnapshotNodeData::DocType(_) | SnapshotNodeData::Text(_) => &[],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotNode {
    pub id: SyntheticId,
    pub data: SnapshotNodeData,
}

impl SnapshotNode {
    pub fn document(id: impl Into<SyntheticId>, children: Vec<SyntheticId>) -> Self {
        Self {
            id: id.into(),
            data: SnapshotNodeData::Document { children },
        }
    }

    pub fn element(
        id: impl Into<SyntheticId>,
        element: ElementData,
        children: Vec<SyntheticId>,
    ) -> Self {
        Self {
            id: id.into(),
            data: SnapshotNodeData::Element { element, children },
        }
    }

    pub fn text(id: impl Into<SyntheticId>, value: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            data: SnapshotNodeData::Text(TextData::new(value)),
        }
    }

    pub fn doctype(id: impl Into<SyntheticId>, doctype: DocTypeData) -> Self {
        Self {
            id: id.into(),
            data: SnapshotNodeData::DocType(doctype),
        }
    }
}

fn validate_attribute_names(attributes: &IndexMap<String, String>) -> Result<(), ValidationError> {
    for name in attributes.keys() {
        if name.is_empty() || name.len() as u64 > MAX_NAME_LEN {
            let mut error = ValidationError::new("attribute_name");
            error.message = Some("attribute names must be 1..=256 bytes".into());
            error.add_param("name".into(), name);
            return Err(error);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sr_test_utils::logged_test]
    fn test_element_rejects_empty_tag_and_attribute_name() {
        let element = ElementData::new("").with_attribute("", "x");
        let errors = element.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("tag"));
        assert!(fields.contains_key("attributes"));
    }

    #[sr_test_utils::logged_test]
    fn test_attributes_keep_insertion_order() {
        let element = ElementData::new("a")
            .with_attribute("href", "/x")
            .with_attribute("class", "link")
            .with_attribute("id", "first");
        let names: Vec<_> = element.attributes.keys().map(String::as_str).collect();
        assert_eq!(names, ["href", "class", "id"]);
    }

    #[sr_test_utils::logged_test]
    fn test_snapshot_children_accessor() {
        let doc = SnapshotNode::document(1, vec![SyntheticId(2), SyntheticId(3)]);
        assert_eq!(doc.data.children(), &[SyntheticId(2), SyntheticId(3)]);
        let text = SnapshotNode::text(4, "hi");
        assert!(text.data.children().is_empty());
    }
}
