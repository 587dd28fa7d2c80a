// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Copy-on-write virtual tree and patch engine
//
// A `VTree` is a cheap handle onto shared state. Cloning it (to publish a
// frame or store a checkpoint) copies a pointer; the first mutation after a
// clone copies the node index while node payloads stay shared until they are
// edited. Every operation validates completely before touching the state, so
// a failed patch leaves the tree exactly as it was.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use sr_domain_types::{DomPatch, FullSnapshot, NodeData, PatchKind, SyntheticId};
use tracing::{debug, trace};

use crate::error::PatchError;
use crate::node::VNode;

#[derive(Debug, Clone, Default)]
pub(crate) struct TreeState {
    pub(crate) root: Option<SyntheticId>,
    pub(crate) nodes: HashMap<SyntheticId, Arc<VNode>>,
    pub(crate) parents: HashMap<SyntheticId, SyntheticId>,
    /// Ids removed earlier in the recording; they may never come back
    pub(crate) retired: HashSet<SyntheticId>,
}

/// What a successfully applied patch did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchEffect {
    Hydrated { nodes: usize },
    Inserted,
    Removed { count: usize },
    Moved,
    Updated,
}

#[derive(Debug, Clone, Default)]
pub struct VTree {
    state: Arc<TreeState>,
}

/// Apply `patch` to a copy of `tree`, leaving `tree` untouched
pub fn apply_patch(tree: &VTree, patch: &DomPatch) -> Result<VTree, PatchError> {
    let mut next = tree.clone();
    next.apply(patch)?;
    Ok(next)
}

impl VTree {
    /// An uninitialized tree; only a full snapshot can hydrate it
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_hydrated(&self) -> bool {
        self.state.root.is_some()
    }

    pub fn root(&self) -> Option<SyntheticId> {
        self.state.root
    }

    pub fn root_node(&self) -> Option<&VNode> {
        self.state.root.and_then(|root| self.get(root))
    }

    pub fn get(&self, id: SyntheticId) -> Option<&VNode> {
        self.state.nodes.get(&id).map(|node| node.as_ref())
    }

    pub fn contains(&self, id: SyntheticId) -> bool {
        self.state.nodes.contains_key(&id)
    }

    pub fn parent(&self, id: SyntheticId) -> Option<SyntheticId> {
        self.state.parents.get(&id).copied()
    }

    /// Child ids of `id`; empty for leaves and unknown ids
    pub fn children(&self, id: SyntheticId) -> &[SyntheticId] {
        self.get(id).map(VNode::children).unwrap_or(&[])
    }

    pub fn len(&self) -> usize {
        self.state.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.nodes.is_empty()
    }

    pub fn is_retired(&self, id: SyntheticId) -> bool {
        self.state.retired.contains(&id)
    }

    pub fn retired_count(&self) -> usize {
        self.state.retired.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &VNode> {
        self.state.nodes.values().map(|node| node.as_ref())
    }

    /// True when both handles point at the same underlying state
    pub fn shares_storage_with(&self, other: &VTree) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    /// `id` and every descendant, in pre-order
    pub fn subtree_ids(&self, id: SyntheticId) -> Vec<SyntheticId> {
        let mut ids = Vec::new();
        if !self.contains(id) {
            return ids;
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            ids.push(current);
            stack.extend(self.children(current).iter().rev().copied());
        }
        ids
    }

    /// Concatenated text of every text node below `id`
    pub fn text_content(&self, id: SyntheticId) -> String {
        self.subtree_ids(id)
            .into_iter()
            .filter_map(|id| self.get(id).and_then(VNode::text))
            .collect()
    }

    pub(crate) fn state(&self) -> &TreeState {
        &self.state
    }

    /// Apply one patch in place
    pub fn apply(&mut self, patch: &DomPatch) -> Result<PatchEffect, PatchError> {
        trace!(kind = %patch.kind(), target = ?patch.target(), "Applying patch");
        match patch {
            DomPatch::Snapshot(snapshot) => {
                let nodes = self.hydrate(snapshot)?;
                Ok(PatchEffect::Hydrated { nodes })
            }
            DomPatch::Insert(p) => {
                self.insert(p.parent, p.id, p.index, &p.node)?;
                Ok(PatchEffect::Inserted)
            }
            DomPatch::Remove(p) => {
                let count = self.remove(p.id)?;
                Ok(PatchEffect::Removed { count })
            }
            DomPatch::Move(p) => {
                self.move_node(p.id, p.new_parent, p.index)?;
                Ok(PatchEffect::Moved)
            }
            DomPatch::SetText(p) => {
                self.set_text(p.id, &p.value)?;
                Ok(PatchEffect::Updated)
            }
            DomPatch::SetAttribute(p) => {
                self.set_attribute(p.id, &p.name, &p.value)?;
                Ok(PatchEffect::Updated)
            }
            DomPatch::RemoveAttribute(p) => {
                self.remove_attribute(p.id, &p.name)?;
                Ok(PatchEffect::Updated)
            }
        }
    }

    /// Replace the whole tree with a validated full snapshot
    ///
    /// Ids present before but absent from the snapshot become retired.
    pub fn hydrate(&mut self, snapshot: &FullSnapshot) -> Result<usize, PatchError> {
        let next = build_snapshot_state(&self.state, snapshot)?;
        let count = next.nodes.len();
        debug!(
            root = %snapshot.root,
            nodes = count,
            retired = next.retired.len(),
            "Hydrated tree from snapshot"
        );
        self.state = Arc::new(next);
        Ok(count)
    }

    pub fn insert(
        &mut self,
        parent: SyntheticId,
        id: SyntheticId,
        index: u32,
        node: &NodeData,
    ) -> Result<(), PatchError> {
        self.require_hydrated(PatchKind::Insert)?;
        let parent_node = self.get(parent).ok_or(PatchError::UnknownParent { parent })?;
        if self.contains(id) {
            return Err(PatchError::DuplicateId { id });
        }
        if self.is_retired(id) {
            return Err(PatchError::RetiredId { id });
        }
        if !parent_node.is_container() {
            return Err(incompatible(parent_node, PatchKind::Insert));
        }

        let state = Arc::make_mut(&mut self.state);
        attach(state, parent, id, index)?;
        state.nodes.insert(id, Arc::new(VNode::from_insert(id, node)));
        Ok(())
    }

    /// Remove `id` and its whole subtree; returns how many nodes were removed
    pub fn remove(&mut self, id: SyntheticId) -> Result<usize, PatchError> {
        let root = self.require_hydrated(PatchKind::Remove)?;
        if !self.contains(id) {
            return Err(PatchError::UnknownNode { id });
        }
        if id == root {
            return Err(PatchError::RootMutation { id });
        }

        let doomed = self.subtree_ids(id);
        let state = Arc::make_mut(&mut self.state);
        detach(state, id)?;
        for removed in &doomed {
            state.nodes.remove(removed);
            state.parents.remove(removed);
            state.retired.insert(*removed);
        }
        Ok(doomed.len())
    }

    /// Detach `id` and re-attach it under `new_parent`, subtree intact
    pub fn move_node(
        &mut self,
        id: SyntheticId,
        new_parent: SyntheticId,
        index: u32,
    ) -> Result<(), PatchError> {
        let root = self.require_hydrated(PatchKind::Move)?;
        if !self.contains(id) {
            return Err(PatchError::UnknownNode { id });
        }
        if id == root {
            return Err(PatchError::RootMutation { id });
        }
        let target = self
            .get(new_parent)
            .ok_or(PatchError::UnknownParent { parent: new_parent })?;
        if !target.is_container() {
            return Err(incompatible(target, PatchKind::Move));
        }
        let mut ancestor = Some(new_parent);
        while let Some(current) = ancestor {
            if current == id {
                return Err(PatchError::Cycle { id, new_parent });
            }
            ancestor = self.parent(current);
        }

        let state = Arc::make_mut(&mut self.state);
        detach(state, id)?;
        attach(state, new_parent, id, index)
    }

    pub fn set_text(&mut self, id: SyntheticId, value: &str) -> Result<(), PatchError> {
        self.edit(id, PatchKind::SetText, |node| match node {
            VNode::Text { value: current, .. } => {
                *current = value.to_string();
                true
            }
            _ => false,
        })
    }

    pub fn set_attribute(&mut self, id: SyntheticId, name: &str, value: &str) -> Result<(), PatchError> {
        self.edit(id, PatchKind::SetAttribute, |node| match node {
            VNode::Element { element, .. } => {
                element.attributes.insert(name.to_string(), value.to_string());
                true
            }
            _ => false,
        })
    }

    /// Removing an attribute the element does not carry is a no-op
    pub fn remove_attribute(&mut self, id: SyntheticId, name: &str) -> Result<(), PatchError> {
        self.edit(id, PatchKind::RemoveAttribute, |node| match node {
            VNode::Element { element, .. } => {
                element.attributes.shift_remove(name);
                true
            }
            _ => false,
        })
    }

    fn require_hydrated(&self, kind: PatchKind) -> Result<SyntheticId, PatchError> {
        self.state
            .root
            .ok_or(PatchError::PatchBeforeSnapshot { kind })
    }

    /// In-place edit of one node; `apply` returns false when the variant does not fit
    fn edit<F>(&mut self, id: SyntheticId, op: PatchKind, apply: F) -> Result<(), PatchError>
    where
        F: FnOnce(&mut VNode) -> bool,
    {
        self.require_hydrated(op)?;
        let node = self.get(id).ok_or(PatchError::UnknownNode { id })?;
        let mut edited = node.clone();
        if !apply(&mut edited) {
            return Err(incompatible(node, op));
        }
        Arc::make_mut(&mut self.state)
            .nodes
            .insert(id, Arc::new(edited));
        Ok(())
    }
}

impl PartialEq for VTree {
    /// Structural equality: same root and same nodes. Retired ids are history,
    /// not structure, and are not compared.
    fn eq(&self, other: &Self) -> bool {
        self.shares_storage_with(other)
            || (self.state.root == other.state.root && self.state.nodes == other.state.nodes)
    }
}

impl Eq for VTree {}

fn incompatible(node: &VNode, op: PatchKind) -> PatchError {
    PatchError::IncompatibleNode {
        id: node.id(),
        node_kind: node.kind_name(),
        op,
    }
}

fn children_of(state: &mut TreeState, id: SyntheticId) -> Result<&mut Vec<SyntheticId>, PatchError> {
    let node = state
        .nodes
        .get_mut(&id)
        .ok_or(PatchError::UnknownParent { parent: id })?;
    Arc::make_mut(node)
        .children_mut()
        .ok_or_else(|| PatchError::invalid_snapshot(format!("{} cannot hold children", id)))
}

/// Insert `id` into `parent`'s children at `index`, clamped to the child count
fn attach(state: &mut TreeState, parent: SyntheticId, id: SyntheticId, index: u32) -> Result<(), PatchError> {
    let children = children_of(state, parent)?;
    let at = usize::try_from(index).unwrap_or(usize::MAX).min(children.len());
    children.insert(at, id);
    state.parents.insert(id, parent);
    Ok(())
}

/// Unlink `id` from its parent's child list
fn detach(state: &mut TreeState, id: SyntheticId) -> Result<(), PatchError> {
    if let Some(parent) = state.parents.remove(&id) {
        children_of(state, parent)?.retain(|child| *child != id);
    }
    Ok(())
}

fn build_snapshot_state(current: &TreeState, snapshot: &FullSnapshot) -> Result<TreeState, PatchError> {
    let mut nodes = HashMap::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        if current.retired.contains(&node.id) {
            return Err(PatchError::RetiredId { id: node.id });
        }
        if nodes
            .insert(node.id, Arc::new(VNode::from_snapshot(node)))
            .is_some()
        {
            return Err(PatchError::DuplicateId { id: node.id });
        }
    }

    let mut parents = HashMap::with_capacity(snapshot.nodes.len());
    for node in &snapshot.nodes {
        for child in node.data.children() {
            if !nodes.contains_key(child) {
                return Err(PatchError::DanglingChild {
                    parent: node.id,
                    child: *child,
                });
            }
            if let Some(previous) = parents.insert(*child, node.id) {
                return Err(PatchError::invalid_snapshot(format!(
                    "node {} is listed as a child of both {} and {}",
                    child, previous, node.id
                )));
            }
        }
    }

    let mut retired = current.retired.clone();
    retired.extend(current.nodes.keys().filter(|id| !nodes.contains_key(id)));

    let next = TreeState {
        root: Some(snapshot.root),
        nodes,
        parents,
        retired,
    };
    crate::invariants::verify_state(&next)?;
    Ok(next)
}
