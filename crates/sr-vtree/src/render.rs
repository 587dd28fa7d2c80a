// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Owned, nested rendering of a tree for renderers and JSON dumps

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use sr_domain_types::SyntheticId;

use crate::node::VNode;
use crate::tree::VTree;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RenderNode {
    Document {
        id: SyntheticId,
        children: Vec<RenderNode>,
    },
    Doctype {
        id: SyntheticId,
        name: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        public_id: String,
        #[serde(default, skip_serializing_if = "String::is_empty")]
        system_id: String,
    },
    Element {
        id: SyntheticId,
        tag: String,
        #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
        attributes: IndexMap<String, String>,
        children: Vec<RenderNode>,
    },
    Text {
        id: SyntheticId,
        value: String,
    },
}

impl RenderNode {
    /// Serialize back to markup; text and attribute values are escaped
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        enum Step<'a> {
            Open(&'a RenderNode),
            Close(&'a str),
        }

        let mut stack = vec![Step::Open(self)];
        while let Some(step) = stack.pop() {
            let node = match step {
                Step::Open(node) => node,
                Step::Close(tag) => {
                    out.push_str("</");
                    out.push_str(tag);
                    out.push('>');
                    continue;
                }
            };
            match node {
                RenderNode::Document { children, .. } => {
                    stack.extend(children.iter().rev().map(Step::Open));
                }
                RenderNode::Doctype { name, .. } => {
                    out.push_str("<!DOCTYPE ");
                    out.push_str(name);
                    out.push('>');
                }
                RenderNode::Element {
                    tag,
                    attributes,
                    children,
                    ..
                } => {
                    out.push('<');
                    out.push_str(tag);
                    for (name, value) in attributes {
                        out.push(' ');
                        out.push_str(name);
                        out.push_str("=\"");
                        escape_into(value, out);
                        out.push('"');
                    }
                    out.push('>');
                    stack.push(Step::Close(tag));
                    stack.extend(children.iter().rev().map(Step::Open));
                }
                RenderNode::Text { value, .. } => escape_into(value, out),
            }
        }
    }

    fn children_mut(&mut self) -> Option<&mut Vec<RenderNode>> {
        match self {
            RenderNode::Document { children, .. } | RenderNode::Element { children, .. } => Some(children),
            RenderNode::Doctype { .. } | RenderNode::Text { .. } => None,
        }
    }
}

// Deeply nested documents would otherwise be dropped one stack frame per level
impl Drop for RenderNode {
    fn drop(&mut self) {
        let Some(children) = self.children_mut() else {
            return;
        };
        let mut pending = std::mem::take(children);
        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children_mut() {
                pending.append(children);
            }
        }
    }
}

fn escape_into(value: &str, out: &mut String) {
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            other => out.push(other),
        }
    }
}

impl VTree {
    /// Nested copy of the tree, or `None` before hydration
    pub fn to_render_tree(&self) -> Option<RenderNode> {
        self.root().and_then(|root| self.render_node(root))
    }

    fn render_node(&self, root: SyntheticId) -> Option<RenderNode> {
        struct Pending<'a> {
            node: &'a VNode,
            next: usize,
            children: Vec<RenderNode>,
        }

        let mut stack = vec![Pending {
            node: self.get(root)?,
            next: 0,
            children: Vec::new(),
        }];
        loop {
            let top = stack.last_mut()?;
            if let Some(child) = top.node.children().get(top.next).copied() {
                top.next += 1;
                if let Some(node) = self.get(child) {
                    stack.push(Pending {
                        node,
                        next: 0,
                        children: Vec::new(),
                    });
                }
                continue;
            }

            let done = stack.pop()?;
            let rendered = render_one(done.node, done.children);
            match stack.last_mut() {
                Some(parent) => parent.children.push(rendered),
                None => return Some(rendered),
            }
        }
    }
}

fn render_one(node: &VNode, children: Vec<RenderNode>) -> RenderNode {
    match node {
        VNode::Document { id, .. } => RenderNode::Document { id: *id, children },
        VNode::DocType { id, doctype } => RenderNode::Doctype {
            id: *id,
            name: doctype.name.clone(),
            public_id: doctype.public_id.clone(),
            system_id: doctype.system_id.clone(),
        },
        VNode::Element { id, element, .. } => RenderNode::Element {
            id: *id,
            tag: element.tag.clone(),
            attributes: element.attributes.clone(),
            children,
        },
        VNode::Text { id, value } => RenderNode::Text {
            id: *id,
            value: value.clone(),
        },
    }
}
