// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use sr_domain_types::{PatchKind, SyntheticId};
use thiserror::Error;

/// Structural violations raised while applying a patch
///
/// Any of these leaves the tree unchanged. A playback session treats them
/// as fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatchError {
    #[error("{kind} patch applied before the first full snapshot")]
    PatchBeforeSnapshot { kind: PatchKind },

    #[error("parent {parent} does not exist")]
    UnknownParent { parent: SyntheticId },

    #[error("node {id} does not exist")]
    UnknownNode { id: SyntheticId },

    #[error("node {id} already exists")]
    DuplicateId { id: SyntheticId },

    #[error("node {id} was removed earlier in this recording")]
    RetiredId { id: SyntheticId },

    #[error("{op} is not supported on {node_kind} node {id}")]
    IncompatibleNode {
        id: SyntheticId,
        node_kind: &'static str,
        op: PatchKind,
    },

    #[error("moving {id} under {new_parent} would create a cycle")]
    Cycle {
        id: SyntheticId,
        new_parent: SyntheticId,
    },

    #[error("{parent} references missing child {child}")]
    DanglingChild {
        parent: SyntheticId,
        child: SyntheticId,
    },

    #[error("invalid snapshot: {reason}")]
    InvalidSnapshot { reason: String },

    #[error("document root {id} cannot be removed or moved")]
    RootMutation { id: SyntheticId },
}

impl PatchError {
    pub(crate) fn invalid_snapshot(reason: impl Into<String>) -> Self {
        PatchError::InvalidSnapshot {
            reason: reason.into(),
        }
    }
}
