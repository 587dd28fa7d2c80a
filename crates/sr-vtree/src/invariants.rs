// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Structural invariants of a hydrated tree
//!
//! A hydrated tree has exactly one document node, which is the root and has
//! no parent. Every child reference resolves, every non-root node has exactly
//! one parent and is reachable from the root, and no live node carries a
//! retired id. Snapshots are checked against these rules before they replace
//! the current tree; patches preserve them by construction.

use std::collections::HashSet;

use sr_domain_types::SyntheticId;

use crate::error::PatchError;
use crate::tree::{TreeState, VTree};

/// Check every structural invariant of `tree`
pub fn verify(tree: &VTree) -> Result<(), PatchError> {
    verify_state(tree.state())
}

pub(crate) fn verify_state(state: &TreeState) -> Result<(), PatchError> {
    let Some(root) = state.root else {
        if state.nodes.is_empty() {
            return Ok(());
        }
        return Err(PatchError::invalid_snapshot("nodes present without a root"));
    };

    let root_node = state
        .nodes
        .get(&root)
        .ok_or_else(|| PatchError::invalid_snapshot(format!("root {} is not among the nodes", root)))?;
    if !root_node.is_document() {
        return Err(PatchError::invalid_snapshot(format!(
            "root {} is a {} node, expected document",
            root,
            root_node.kind_name()
        )));
    }
    if let Some(parent) = state.parents.get(&root) {
        return Err(PatchError::invalid_snapshot(format!(
            "root {} is listed as a child of {}",
            root, parent
        )));
    }
    let documents = state.nodes.values().filter(|node| node.is_document()).count();
    if documents != 1 {
        return Err(PatchError::invalid_snapshot(format!(
            "expected exactly one document node, found {}",
            documents
        )));
    }

    let mut reached: HashSet<SyntheticId> = HashSet::with_capacity(state.nodes.len());
    reached.insert(root);
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        let Some(node) = state.nodes.get(&id) else {
            continue;
        };
        for child in node.children() {
            if !state.nodes.contains_key(child) {
                return Err(PatchError::DanglingChild {
                    parent: id,
                    child: *child,
                });
            }
            if state.parents.get(child) != Some(&id) {
                return Err(PatchError::invalid_snapshot(format!(
                    "parent index of {} disagrees with {}",
                    child, id
                )));
            }
            if !reached.insert(*child) {
                return Err(PatchError::invalid_snapshot(format!("node {} is reachable twice", child)));
            }
            stack.push(*child);
        }
    }

    if reached.len() != state.nodes.len() {
        return Err(PatchError::invalid_snapshot(format!(
            "{} node(s) are not reachable from root {}",
            state.nodes.len() - reached.len(),
            root
        )));
    }
    if state.parents.len() + 1 != state.nodes.len() {
        return Err(PatchError::invalid_snapshot("parent index is out of sync with the nodes"));
    }
    if let Some(id) = state.nodes.keys().find(|id| state.retired.contains(id)) {
        return Err(PatchError::RetiredId { id: *id });
    }
    Ok(())
}
