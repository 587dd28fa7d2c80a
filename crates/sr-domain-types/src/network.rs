// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Network activity payloads
//!
//! Requests, responses and WebSocket frames share a correlation id: the
//! 36-character hyphenated UUID the capture side assigned to the exchange.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Width of the fixed `char` field holding a correlation id
pub const CORRELATION_ID_LEN: usize = 36;

/// Generate a fresh correlation id in the canonical hyphenated form
pub fn new_correlation_id() -> String {
    Uuid::new_v4().hyphenated().to_string()
}

/// Correlation ids occupy a fixed-width byte field: exactly
/// [`CORRELATION_ID_LEN`] bytes of printable ASCII, so padding and multi-byte
/// characters never alter the decoded id.
pub fn validate_correlation_id(id: &str) -> Result<(), ValidationError> {
    if id.len() == CORRELATION_ID_LEN && id.bytes().all(|b| b.is_ascii_graphic()) {
        return Ok(());
    }
    Err(ValidationError::new("correlation_id").with_message(Cow::Borrowed(
        "correlation id must be 36 bytes of printable ASCII",
    )))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct HttpRequest {
    #[validate(custom(function = "validate_correlation_id"))]
    pub correlation_id: String,
    #[validate(length(min = 1, max = 16))]
    pub method: String,
    #[validate(length(min = 1, max = 8192))]
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct HttpResponse {
    #[validate(custom(function = "validate_correlation_id"))]
    pub correlation_id: String,
    #[validate(range(min = 100, max = 599))]
    pub status: u16,
    pub duration_ms: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WsDirection {
    Sent,
    Received,
}

impl WsDirection {
    pub fn code(self) -> u8 {
        match self {
            WsDirection::Sent => 0,
            WsDirection::Received => 1,
        }
    }

    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WsDirection::Sent),
            1 => Some(WsDirection::Received),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct WebSocketFrame {
    #[validate(custom(function = "validate_correlation_id"))]
    pub correlation_id: String,
    pub direction: WsDirection,
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NetworkEvent {
    Request(HttpRequest),
    Response(HttpResponse),
    WebSocket(WebSocketFrame),
}

impl NetworkEvent {
    pub fn correlation_id(&self) -> &str {
        match self {
            NetworkEvent::Request(r) => &r.correlation_id,
            NetworkEvent::Response(r) => &r.correlation_id,
            NetworkEvent::WebSocket(f) => &f.correlation_id,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sr_test_utils::logged_test]
    fn test_generated_correlation_id_fits_char_field() {
        let id = new_correlation_id();
        assert_eq!(id.len(), CORRELATION_ID_LEN);
        let request = HttpRequest {
            correlation_id: id,
            method: "GET".to_string(),
            url: "https://example.test/".to_string(),
        };
        assert!(request.validate().is_ok());
    }

    #[sr_test_utils::logged_test]
    fn test_response_reports_every_violation() {
        let response = HttpResponse {
            correlation_id: "short".to_string(),
            status: 42,
            duration_ms: 3,
        };
        let errors = response.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("correlation_id"));
        assert!(fields.contains_key("status"));
    }

    #[sr_test_utils::logged_test]
    fn test_correlation_id_is_counted_in_bytes() {
        assert!(validate_correlation_id(&new_correlation_id()).is_ok());
        // 36 characters, 72 bytes
        assert!(validate_correlation_id(&"é".repeat(CORRELATION_ID_LEN)).is_err());
        let padded = format!("{}\0", "a".repeat(CORRELATION_ID_LEN - 1));
        assert_eq!(padded.len(), CORRELATION_ID_LEN);
        assert!(validate_correlation_id(&padded).is_err());
        assert!(validate_correlation_id(&format!("{} ", "a".repeat(CORRELATION_ID_LEN - 1))).is_err());
    }
}
