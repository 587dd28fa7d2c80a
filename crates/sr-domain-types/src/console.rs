// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConsoleLevel {
    Debug,
    Log,
    Info,
    Warn,
    Error,
}

impl ConsoleLevel {
    pub fn code(self) -> u8 {
        match self {
            ConsoleLevel::Debug => 0,
            ConsoleLevel::Log => 1,
            ConsoleLevel::Info => 2,
            ConsoleLevel::Warn => 3,
            ConsoleLevel::Error => 4,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(ConsoleLevel::Debug),
            1 => Some(ConsoleLevel::Log),
            2 => Some(ConsoleLevel::Info),
            3 => Some(ConsoleLevel::Warn),
            4 => Some(ConsoleLevel::Error),
            _ => None,
        }
    }
}

/// One argument of a console call, kept structured rather than stringified
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum ConsolePart {
    Text(String),
    Number(f64),
    Bool(bool),
    Null,
    /// Pre-serialized object or array
    Json(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ConsoleEvent {
    pub level: ConsoleLevel,
    #[validate(length(min = 1, max = 64, message = "console entries carry 1..=64 parts"))]
    pub parts: Vec<ConsolePart>,
}

impl ConsoleEvent {
    pub fn text(level: ConsoleLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            parts: vec![ConsolePart::Text(message.into())],
        }
    }

    /// Flatten the parts into a single display line
    pub fn message(&self) -> String {
        self.parts
            .iter()
            .map(|part| match part {
                ConsolePart::Text(s) | ConsolePart::Json(s) => s.clone(),
                ConsolePart::Number(n) => n.to_string(),
                ConsolePart::Bool(b) => b.to_string(),
                ConsolePart::Null => "null".to_string(),
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sr_test_utils::logged_test]
    fn test_message_joins_parts() {
        let event = ConsoleEvent {
            level: ConsoleLevel::Warn,
            parts: vec![
                ConsolePart::Text("retry".to_string()),
                ConsolePart::Number(3.0),
                ConsolePart::Bool(false),
                ConsolePart::Null,
            ],
        };
        assert_eq!(event.message(), "retry 3 false null");
    }

    #[sr_test_utils::logged_test]
    fn test_empty_parts_rejected() {
        let event = ConsoleEvent {
            level: ConsoleLevel::Log,
            parts: vec![],
        };
        assert!(event.validate().is_err());
    }
}
