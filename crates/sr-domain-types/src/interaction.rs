// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! User interaction payloads
//!
//! Interactions never mutate the virtual tree; they are replayed alongside it
//! so a renderer can draw pointers, key overlays and scroll positions.

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::id::SyntheticId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointerAction {
    Move,
    Down,
    Up,
    Click,
}

impl PointerAction {
    pub fn code(self) -> u8 {
        match self {
            PointerAction::Move => 0,
            PointerAction::Down => 1,
            PointerAction::Up => 2,
            PointerAction::Click => 3,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(PointerAction::Move),
            1 => Some(PointerAction::Down),
            2 => Some(PointerAction::Up),
            3 => Some(PointerAction::Click),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    Down,
    Up,
}

impl KeyAction {
    pub fn code(self) -> u8 {
        match self {
            KeyAction::Down => 0,
            KeyAction::Up => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(KeyAction::Down),
            1 => Some(KeyAction::Up),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct PointerEvent {
    pub action: PointerAction,
    pub x: i32,
    pub y: i32,
    pub target: Option<SyntheticId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct KeyEvent {
    pub action: KeyAction,
    /// Logical key name as reported by the browser (`"a"`, `"Enter"`, ...)
    #[validate(length(min = 1, max = 32, message = "key names must be 1..=32 bytes"))]
    pub key: String,
    pub target: Option<SyntheticId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ScrollEvent {
    pub target: SyntheticId,
    pub x: i32,
    pub y: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct ViewportResize {
    #[validate(range(min = 1, max = 16384))]
    pub width: u32,
    #[validate(range(min = 1, max = 16384))]
    pub height: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Interaction {
    Pointer(PointerEvent),
    Key(KeyEvent),
    Scroll(ScrollEvent),
    Resize(ViewportResize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sr_test_utils::logged_test]
    fn test_action_codes_are_stable() {
        for action in [
            PointerAction::Move,
            PointerAction::Down,
            PointerAction::Up,
            PointerAction::Click,
        ] {
            assert_eq!(PointerAction::from_code(action.code()), Some(action));
        }
        assert_eq!(PointerAction::from_code(4), None);
        assert_eq!(KeyAction::from_code(KeyAction::Up.code()), Some(KeyAction::Up));
        assert_eq!(KeyAction::from_code(9), None);
    }

    #[sr_test_utils::logged_test]
    fn test_resize_range() {
        let bad = ViewportResize {
            width: 0,
            height: 20_000,
        };
        let errors = bad.validate().unwrap_err();
        assert_eq!(errors.field_errors().len(), 2);
    }
}
