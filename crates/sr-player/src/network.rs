// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Request/response correlation for the network panel

use indexmap::IndexMap;
use serde::Serialize;
use sr_domain_types::{EventData, NetworkEvent, SourceEvent, WsDirection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WsFrameRecord {
    pub time: u64,
    pub direction: WsDirection,
    pub payload: String,
}

/// Everything recorded under one correlation id
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkExchange {
    pub correlation_id: String,
    pub started_at: u64,
    pub method: Option<String>,
    pub url: Option<String>,
    pub status: Option<u16>,
    pub duration_ms: Option<u32>,
    pub completed_at: Option<u64>,
    pub frames: Vec<WsFrameRecord>,
}

impl NetworkExchange {
    fn new(correlation_id: &str, time: u64) -> Self {
        Self {
            correlation_id: correlation_id.to_string(),
            started_at: time,
            method: None,
            url: None,
            status: None,
            duration_ms: None,
            completed_at: None,
            frames: Vec::new(),
        }
    }

    /// A request still waiting for its response
    pub fn is_pending(&self) -> bool {
        self.method.is_some() && self.status.is_none()
    }
}

/// Network exchanges keyed by correlation id, in order of first appearance
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NetworkLedger {
    exchanges: IndexMap<String, NetworkExchange>,
}

impl NetworkLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ledger of every network event in `events`
    pub fn from_events<'a>(events: impl IntoIterator<Item = &'a SourceEvent>) -> Self {
        let mut ledger = Self::new();
        for event in events {
            if let EventData::Network(network) = &event.data {
                ledger.record(event.time, network);
            }
        }
        ledger
    }

    pub fn record(&mut self, time: u64, event: &NetworkEvent) {
        let exchange = self
            .exchanges
            .entry(event.correlation_id().to_string())
            .or_insert_with(|| NetworkExchange::new(event.correlation_id(), time));
        match event {
            NetworkEvent::Request(request) => {
                exchange.method = Some(request.method.clone());
                exchange.url = Some(request.url.clone());
                exchange.started_at = exchange.started_at.min(time);
            }
            NetworkEvent::Response(response) => {
                exchange.status = Some(response.status);
                exchange.duration_ms = Some(response.duration_ms);
                exchange.completed_at = Some(time);
            }
            NetworkEvent::WebSocket(frame) => exchange.frames.push(WsFrameRecord {
                time,
                direction: frame.direction,
                payload: frame.payload.clone(),
            }),
        }
    }

    pub fn get(&self, correlation_id: &str) -> Option<&NetworkExchange> {
        self.exchanges.get(correlation_id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NetworkExchange> {
        self.exchanges.values()
    }

    pub fn len(&self) -> usize {
        self.exchanges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.exchanges.is_empty()
    }

    pub fn pending(&self) -> impl Iterator<Item = &NetworkExchange> {
        self.iter().filter(|exchange| exchange.is_pending())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sr_domain_types::{HttpRequest, HttpResponse, WebSocketFrame};

    fn request(time: u64, id: &str) -> SourceEvent {
        SourceEvent::new(
            time,
            NetworkEvent::Request(HttpRequest {
                correlation_id: id.to_string(),
                method: "POST".to_string(),
                url: "https://api.example.com/items".to_string(),
            }),
        )
    }

    fn response(time: u64, id: &str) -> SourceEvent {
        SourceEvent::new(
            time,
            NetworkEvent::Response(HttpResponse {
                correlation_id: id.to_string(),
                status: 201,
                duration_ms: (time - 10) as u32,
            }),
        )
    }

    #[sr_test_utils::logged_test]
    fn pairs_requests_with_responses() {
        let events = vec![request(10, "a"), request(12, "b"), response(30, "a")];
        let ledger = NetworkLedger::from_events(&events);
        assert_eq!(ledger.len(), 2);

        let a = ledger.get("a").unwrap();
        assert_eq!(a.status, Some(201));
        assert_eq!(a.completed_at, Some(30));
        assert!(!a.is_pending());

        let pending: Vec<&str> = ledger.pending().map(|e| e.correlation_id.as_str()).collect();
        assert_eq!(pending, vec!["b"]);
    }

    #[sr_test_utils::logged_test]
    fn collects_websocket_frames_in_order() {
        let frame = |time, direction, payload: &str| {
            SourceEvent::new(
                time,
                NetworkEvent::WebSocket(WebSocketFrame {
                    correlation_id: "ws".to_string(),
                    direction,
                    payload: payload.to_string(),
                }),
            )
        };
        let events = vec![
            frame(5, WsDirection::Sent, "ping"),
            frame(7, WsDirection::Received, "pong"),
        ];
        let ledger = NetworkLedger::from_events(&events);
        let exchange = ledger.get("ws").unwrap();
        assert_eq!(exchange.started_at, 5);
        assert_eq!(exchange.frames.len(), 2);
        assert_eq!(exchange.frames[1].payload, "pong");
        assert!(!exchange.is_pending());
    }
}
