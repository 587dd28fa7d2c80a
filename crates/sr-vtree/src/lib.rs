// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Virtual DOM tree for session replay
//!
//! [`VTree`] is hydrated by a full snapshot and then evolved one
//! [`DomPatch`](sr_domain_types::DomPatch) at a time. Patches are atomic:
//! they either apply completely or fail with a [`PatchError`] and leave the
//! tree untouched. Trees are copy-on-write, so frames and checkpoints can
//! hold on to earlier versions cheaply.

pub mod error;
pub mod invariants;
pub mod node;
pub mod render;
pub mod tree;

pub use error::PatchError;
pub use invariants::verify;
pub use node::VNode;
pub use render::RenderNode;
pub use tree::{PatchEffect, VTree, apply_patch};
