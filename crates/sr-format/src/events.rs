// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Views for every recordable event kind
//
// Record layout: `[u8 event kind][u64 time][kind fields]`. Sum types are
// `Tagged` descriptors whose discriminant is the variant's position below;
// those positions are part of the wire format.

use sr_domain_types::{
    CORRELATION_ID_LEN, ConsoleEvent, ConsoleLevel, ConsolePart, DocTypeData, DomPatch,
    ElementData, EventData, EventKind, FullSnapshot, HttpRequest, HttpResponse, InsertNode,
    Interaction, KeyAction, KeyEvent, MoveNode, NetworkEvent, NodeData, PointerAction,
    PointerEvent, RemoveAttribute, RemoveNode, ScrollEvent, SetAttribute, SetText, SnapshotNode,
    SnapshotNodeData, SourceEvent, SyntheticId, TextData, ViewportResize, WebSocketFrame,
    WsDirection,
};

use crate::descriptor::{Descriptor, Primitive};
use crate::error::{Mismatch, SchemaViolations};
use crate::schema::{Schema, field_path, index_path, validator_schema};
use crate::value::Value;
use crate::view::Viewable;

macro_rules! field_descriptor {
    ($ty:ty) => {
        <$ty as Viewable>::descriptor()
    };
    ($ty:ty, $descriptor:expr) => {
        $descriptor
    };
}

/// Struct view with fields in declaration order; `=> descriptor` overrides a field's wire shape
macro_rules! view_struct {
    ($name:ident { $($field:ident : $ty:ty $(=> $descriptor:expr)?),* $(,)? }) => {
        impl Viewable for $name {
            fn descriptor() -> Descriptor {
                Descriptor::structure([
                    $((stringify!($field), field_descriptor!($ty $(, $descriptor)?)),)*
                ])
            }

            fn to_value(&self) -> Value {
                Value::Struct(vec![$(Viewable::to_value(&self.$field),)*])
            }

            fn from_value(value: Value) -> Result<Self, Mismatch> {
                let mut fields = value.into_fields()?;
                let decoded = $name {
                    $($field: <$ty as Viewable>::from_value(fields.take(stringify!($field))?)?,)*
                };
                fields.finish()?;
                Ok(decoded)
            }
        }
    };
}

/// Fieldless enum stored as a single code byte
macro_rules! view_code {
    ($($name:ident),* $(,)?) => {
        $(
            impl Viewable for $name {
                fn descriptor() -> Descriptor {
                    Descriptor::Primitive(Primitive::U8)
                }

                fn to_value(&self) -> Value {
                    Value::U8(self.code())
                }

                fn from_value(value: Value) -> Result<Self, Mismatch> {
                    let code = value.into_u8()?;
                    $name::from_code(code).ok_or(Mismatch::UnknownDiscriminant {
                        type_name: stringify!($name),
                        value: code,
                    })
                }
            }

            impl Schema for $name {
                fn check(&self, _path: &str, _violations: &mut SchemaViolations) {}
            }
        )*
    };
}

fn unknown_variant(type_name: &'static str, value: u8) -> Mismatch {
    Mismatch::UnknownDiscriminant { type_name, value }
}

impl Viewable for SyntheticId {
    fn descriptor() -> Descriptor {
        Descriptor::Primitive(Primitive::U64)
    }

    fn to_value(&self) -> Value {
        Value::U64(self.get())
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        value.into_u64().map(SyntheticId::new)
    }
}

impl Schema for SyntheticId {
    fn check(&self, _path: &str, _violations: &mut SchemaViolations) {}
}

view_code!(PointerAction, KeyAction, WsDirection, ConsoleLevel);

// Nodes

view_struct!(DocTypeData {
    name: String,
    public_id: String,
    system_id: String,
});

view_struct!(ElementData {
    tag: String,
    attributes: indexmap::IndexMap<String, String>,
});

view_struct!(TextData { value: String });

validator_schema!(DocTypeData, ElementData, TextData);

impl Viewable for NodeData {
    fn descriptor() -> Descriptor {
        Descriptor::tagged(
            "NodeData",
            [
                ("doctype", DocTypeData::descriptor()),
                ("element", ElementData::descriptor()),
                ("text", TextData::descriptor()),
            ],
        )
    }

    fn to_value(&self) -> Value {
        match self {
            NodeData::DocType(d) => Value::tagged(0, d.to_value()),
            NodeData::Element(e) => Value::tagged(1, e.to_value()),
            NodeData::Text(t) => Value::tagged(2, t.to_value()),
        }
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let (tag, body) = value.into_tagged()?;
        match tag {
            0 => Ok(NodeData::DocType(DocTypeData::from_value(body)?)),
            1 => Ok(NodeData::Element(ElementData::from_value(body)?)),
            2 => Ok(NodeData::Text(TextData::from_value(body)?)),
            other => Err(unknown_variant("NodeData", other)),
        }
    }
}

impl Schema for NodeData {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        match self {
            NodeData::DocType(d) => d.check(&field_path(path, "doctype"), violations),
            NodeData::Element(e) => e.check(&field_path(path, "element"), violations),
            NodeData::Text(t) => t.check(&field_path(path, "text"), violations),
        }
    }
}

impl Viewable for SnapshotNodeData {
    fn descriptor() -> Descriptor {
        Descriptor::tagged(
            "SnapshotNodeData",
            [
                (
                    "document",
                    Descriptor::structure([("children", Vec::<SyntheticId>::descriptor())]),
                ),
                ("doctype", DocTypeData::descriptor()),
                (
                    "element",
                    Descriptor::structure([
                        ("element", ElementData::descriptor()),
                        ("children", Vec::<SyntheticId>::descriptor()),
                    ]),
                ),
                ("text", TextData::descriptor()),
            ],
        )
    }

    fn to_value(&self) -> Value {
        match self {
            SnapshotNodeData::Document { children } => {
                Value::tagged(0, Value::Struct(vec![children.to_value()]))
            }
            SnapshotNodeData::DocType(d) => Value::tagged(1, d.to_value()),
            SnapshotNodeData::Element { element, children } => Value::tagged(
                2,
                Value::Struct(vec![element.to_value(), children.to_value()]),
            ),
            SnapshotNodeData::Text(t) => Value::tagged(3, t.to_value()),
        }
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let (tag, body) = value.into_tagged()?;
        match tag {
            0 => {
                let mut fields = body.into_fields()?;
                let children = Vec::<SyntheticId>::from_value(fields.take("children")?)?;
                fields.finish()?;
                Ok(SnapshotNodeData::Document { children })
            }
            1 => Ok(SnapshotNodeData::DocType(DocTypeData::from_value(body)?)),
            2 => {
                let mut fields = body.into_fields()?;
                let element = ElementData::from_value(fields.take("element")?)?;
                let children = Vec::<SyntheticId>::from_value(fields.take("children")?)?;
                fields.finish()?;
                Ok(SnapshotNodeData::Element { element, children })
            }
            3 => Ok(SnapshotNodeData::Text(TextData::from_value(body)?)),
            other => Err(unknown_variant("SnapshotNodeData", other)),
        }
    }
}

impl Schema for SnapshotNodeData {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        match self {
            SnapshotNodeData::Document { .. } => {}
            SnapshotNodeData::DocType(d) => d.check(&field_path(path, "doctype"), violations),
            SnapshotNodeData::Element { element, .. } => {
                element.check(&field_path(path, "element"), violations)
            }
            SnapshotNodeData::Text(t) => t.check(&field_path(path, "text"), violations),
        }
    }
}

view_struct!(SnapshotNode {
    id: SyntheticId,
    data: SnapshotNodeData,
});

impl Schema for SnapshotNode {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        self.data.check(&field_path(path, "data"), violations);
    }
}

// Patches

view_struct!(FullSnapshot {
    root: SyntheticId,
    nodes: Vec<SnapshotNode>,
});

view_struct!(InsertNode {
    parent: SyntheticId,
    id: SyntheticId,
    index: u32,
    node: NodeData,
});

view_struct!(RemoveNode { id: SyntheticId });

view_struct!(MoveNode {
    id: SyntheticId,
    new_parent: SyntheticId,
    index: u32,
});

view_struct!(SetText {
    id: SyntheticId,
    value: String,
});

view_struct!(SetAttribute {
    id: SyntheticId,
    name: String,
    value: String,
});

view_struct!(RemoveAttribute {
    id: SyntheticId,
    name: String,
});

validator_schema!(RemoveNode, MoveNode, SetText, SetAttribute, RemoveAttribute);

impl Schema for FullSnapshot {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        if let Err(errors) = validator::Validate::validate(self) {
            violations.extend_from_validator(path, &errors);
        }
        let nodes_path = field_path(path, "nodes");
        for (index, node) in self.nodes.iter().enumerate() {
            node.check(&index_path(&nodes_path, index), violations);
        }
    }
}

impl Schema for InsertNode {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        if let Err(errors) = validator::Validate::validate(self) {
            violations.extend_from_validator(path, &errors);
        }
        self.node.check(&field_path(path, "node"), violations);
    }
}

impl Viewable for DomPatch {
    fn descriptor() -> Descriptor {
        Descriptor::tagged(
            "DomPatch",
            [
                ("snapshot", FullSnapshot::descriptor()),
                ("insert", InsertNode::descriptor()),
                ("remove", RemoveNode::descriptor()),
                ("move", MoveNode::descriptor()),
                ("set_text", SetText::descriptor()),
                ("set_attribute", SetAttribute::descriptor()),
                ("remove_attribute", RemoveAttribute::descriptor()),
            ],
        )
    }

    fn to_value(&self) -> Value {
        match self {
            DomPatch::Snapshot(p) => Value::tagged(0, p.to_value()),
            DomPatch::Insert(p) => Value::tagged(1, p.to_value()),
            DomPatch::Remove(p) => Value::tagged(2, p.to_value()),
            DomPatch::Move(p) => Value::tagged(3, p.to_value()),
            DomPatch::SetText(p) => Value::tagged(4, p.to_value()),
            DomPatch::SetAttribute(p) => Value::tagged(5, p.to_value()),
            DomPatch::RemoveAttribute(p) => Value::tagged(6, p.to_value()),
        }
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let (tag, body) = value.into_tagged()?;
        let patch = match tag {
            0 => DomPatch::Snapshot(FullSnapshot::from_value(body)?),
            1 => DomPatch::Insert(InsertNode::from_value(body)?),
            2 => DomPatch::Remove(RemoveNode::from_value(body)?),
            3 => DomPatch::Move(MoveNode::from_value(body)?),
            4 => DomPatch::SetText(SetText::from_value(body)?),
            5 => DomPatch::SetAttribute(SetAttribute::from_value(body)?),
            6 => DomPatch::RemoveAttribute(RemoveAttribute::from_value(body)?),
            other => return Err(unknown_variant("DomPatch", other)),
        };
        Ok(patch)
    }
}

impl Schema for DomPatch {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        let path = field_path(path, self.kind().as_str());
        match self {
            DomPatch::Snapshot(p) => p.check(&path, violations),
            DomPatch::Insert(p) => p.check(&path, violations),
            DomPatch::Remove(p) => p.check(&path, violations),
            DomPatch::Move(p) => p.check(&path, violations),
            DomPatch::SetText(p) => p.check(&path, violations),
            DomPatch::SetAttribute(p) => p.check(&path, violations),
            DomPatch::RemoveAttribute(p) => p.check(&path, violations),
        }
    }
}

// Interactions

view_struct!(PointerEvent {
    action: PointerAction,
    x: i32,
    y: i32,
    target: Option<SyntheticId>,
});

view_struct!(KeyEvent {
    action: KeyAction,
    key: String,
    target: Option<SyntheticId>,
});

view_struct!(ScrollEvent {
    target: SyntheticId,
    x: i32,
    y: i32,
});

view_struct!(ViewportResize {
    width: u32,
    height: u32,
});

validator_schema!(PointerEvent, KeyEvent, ScrollEvent, ViewportResize);

impl Viewable for Interaction {
    fn descriptor() -> Descriptor {
        Descriptor::tagged(
            "Interaction",
            [
                ("pointer", PointerEvent::descriptor()),
                ("key", KeyEvent::descriptor()),
                ("scroll", ScrollEvent::descriptor()),
                ("resize", ViewportResize::descriptor()),
            ],
        )
    }

    fn to_value(&self) -> Value {
        match self {
            Interaction::Pointer(e) => Value::tagged(0, e.to_value()),
            Interaction::Key(e) => Value::tagged(1, e.to_value()),
            Interaction::Scroll(e) => Value::tagged(2, e.to_value()),
            Interaction::Resize(e) => Value::tagged(3, e.to_value()),
        }
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let (tag, body) = value.into_tagged()?;
        match tag {
            0 => Ok(Interaction::Pointer(PointerEvent::from_value(body)?)),
            1 => Ok(Interaction::Key(KeyEvent::from_value(body)?)),
            2 => Ok(Interaction::Scroll(ScrollEvent::from_value(body)?)),
            3 => Ok(Interaction::Resize(ViewportResize::from_value(body)?)),
            other => Err(unknown_variant("Interaction", other)),
        }
    }
}

impl Schema for Interaction {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        match self {
            Interaction::Pointer(e) => e.check(&field_path(path, "pointer"), violations),
            Interaction::Key(e) => e.check(&field_path(path, "key"), violations),
            Interaction::Scroll(e) => e.check(&field_path(path, "scroll"), violations),
            Interaction::Resize(e) => e.check(&field_path(path, "resize"), violations),
        }
    }
}

// Network

view_struct!(HttpRequest {
    correlation_id: String => Descriptor::Char(CORRELATION_ID_LEN),
    method: String,
    url: String,
});

view_struct!(HttpResponse {
    correlation_id: String => Descriptor::Char(CORRELATION_ID_LEN),
    status: u16,
    duration_ms: u32,
});

view_struct!(WebSocketFrame {
    correlation_id: String => Descriptor::Char(CORRELATION_ID_LEN),
    direction: WsDirection,
    payload: String,
});

validator_schema!(HttpRequest, HttpResponse, WebSocketFrame);

impl Viewable for NetworkEvent {
    fn descriptor() -> Descriptor {
        Descriptor::tagged(
            "NetworkEvent",
            [
                ("request", HttpRequest::descriptor()),
                ("response", HttpResponse::descriptor()),
                ("web_socket", WebSocketFrame::descriptor()),
            ],
        )
    }

    fn to_value(&self) -> Value {
        match self {
            NetworkEvent::Request(e) => Value::tagged(0, e.to_value()),
            NetworkEvent::Response(e) => Value::tagged(1, e.to_value()),
            NetworkEvent::WebSocket(e) => Value::tagged(2, e.to_value()),
        }
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let (tag, body) = value.into_tagged()?;
        match tag {
            0 => Ok(NetworkEvent::Request(HttpRequest::from_value(body)?)),
            1 => Ok(NetworkEvent::Response(HttpResponse::from_value(body)?)),
            2 => Ok(NetworkEvent::WebSocket(WebSocketFrame::from_value(body)?)),
            other => Err(unknown_variant("NetworkEvent", other)),
        }
    }
}

impl Schema for NetworkEvent {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        match self {
            NetworkEvent::Request(e) => e.check(&field_path(path, "request"), violations),
            NetworkEvent::Response(e) => e.check(&field_path(path, "response"), violations),
            NetworkEvent::WebSocket(e) => e.check(&field_path(path, "web_socket"), violations),
        }
    }
}

// Console

impl Viewable for ConsolePart {
    fn descriptor() -> Descriptor {
        Descriptor::tagged(
            "ConsolePart",
            [
                ("text", Descriptor::String),
                ("number", Descriptor::Primitive(Primitive::F64)),
                ("bool", Descriptor::Primitive(Primitive::Bool)),
                ("null", Descriptor::unit()),
                ("json", Descriptor::String),
            ],
        )
    }

    fn to_value(&self) -> Value {
        match self {
            ConsolePart::Text(s) => Value::tagged(0, Value::Str(s.clone())),
            ConsolePart::Number(n) => Value::tagged(1, Value::F64(*n)),
            ConsolePart::Bool(b) => Value::tagged(2, Value::Bool(*b)),
            ConsolePart::Null => Value::tagged(3, Value::unit()),
            ConsolePart::Json(s) => Value::tagged(4, Value::Str(s.clone())),
        }
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let (tag, body) = value.into_tagged()?;
        match tag {
            0 => Ok(ConsolePart::Text(body.into_string()?)),
            1 => Ok(ConsolePart::Number(body.into_f64()?)),
            2 => Ok(ConsolePart::Bool(body.into_bool()?)),
            3 => {
                body.into_fields()?.finish()?;
                Ok(ConsolePart::Null)
            }
            4 => Ok(ConsolePart::Json(body.into_string()?)),
            other => Err(unknown_variant("ConsolePart", other)),
        }
    }
}

impl Schema for ConsolePart {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        match self {
            ConsolePart::Number(n) => n.check(&field_path(path, "number"), violations),
            ConsolePart::Json(raw) => {
                if let Err(err) = serde_json::from_str::<serde_json::Value>(raw) {
                    violations.push(field_path(path, "json"), "json", Some(err.to_string()));
                }
            }
            ConsolePart::Text(_) | ConsolePart::Bool(_) | ConsolePart::Null => {}
        }
    }
}

view_struct!(ConsoleEvent {
    level: ConsoleLevel,
    parts: Vec<ConsolePart>,
});

impl Schema for ConsoleEvent {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        if let Err(errors) = validator::Validate::validate(self) {
            violations.extend_from_validator(path, &errors);
        }
        self.parts.check(&field_path(path, "parts"), violations);
    }
}

// Envelope

fn timed(payload: Descriptor) -> Descriptor {
    Descriptor::structure([("time", Descriptor::Primitive(Primitive::U64)), ("payload", payload)])
}

impl Viewable for SourceEvent {
    fn descriptor() -> Descriptor {
        Descriptor::tagged(
            "EventKind",
            [
                (EventKind::Dom.as_str(), timed(DomPatch::descriptor())),
                (EventKind::Interaction.as_str(), timed(Interaction::descriptor())),
                (EventKind::Network.as_str(), timed(NetworkEvent::descriptor())),
                (EventKind::Console.as_str(), timed(ConsoleEvent::descriptor())),
            ],
        )
    }

    fn to_value(&self) -> Value {
        let payload = match &self.data {
            EventData::Dom(p) => p.to_value(),
            EventData::Interaction(i) => i.to_value(),
            EventData::Network(n) => n.to_value(),
            EventData::Console(c) => c.to_value(),
        };
        Value::tagged(
            self.kind().tag(),
            Value::Struct(vec![Value::U64(self.time), payload]),
        )
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let (tag, body) = value.into_tagged()?;
        let kind = EventKind::from_tag(tag).ok_or(unknown_variant("EventKind", tag))?;
        let mut fields = body.into_fields()?;
        let time = fields.take("time")?.into_u64()?;
        let payload = fields.take("payload")?;
        fields.finish()?;
        let data = match kind {
            EventKind::Dom => EventData::Dom(DomPatch::from_value(payload)?),
            EventKind::Interaction => EventData::Interaction(Interaction::from_value(payload)?),
            EventKind::Network => EventData::Network(NetworkEvent::from_value(payload)?),
            EventKind::Console => EventData::Console(ConsoleEvent::from_value(payload)?),
        };
        Ok(SourceEvent { time, data })
    }
}

impl Schema for EventData {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        match self {
            EventData::Dom(p) => p.check(path, violations),
            EventData::Interaction(i) => i.check(path, violations),
            EventData::Network(n) => n.check(path, violations),
            EventData::Console(c) => c.check(&field_path(path, "console"), violations),
        }
    }
}

impl Schema for SourceEvent {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        self.data.check(path, violations);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CodecError;
    use crate::view::View;
    use sr_domain_types::{SnapshotNode, new_correlation_id};

    fn roundtrip(event: SourceEvent) {
        let view = View::<SourceEvent>::new();
        let bytes = view.encode(&event).unwrap();
        let (decoded, next) = view.decode(&bytes, 0).unwrap();
        assert_eq!(decoded, event);
        assert_eq!(next, bytes.len());
    }

    #[sr_test_utils::logged_test]
    fn record_starts_with_kind_then_time() {
        let view = View::<SourceEvent>::new();
        let event = SourceEvent::new(0x0102, DomPatch::remove(7u64));
        let bytes = view.encode(&event).unwrap();
        assert_eq!(bytes[0], EventKind::Dom.tag());
        assert_eq!(&bytes[1..9], &[0x02, 0x01, 0, 0, 0, 0, 0, 0]);
        // patch discriminant for remove, then the node id
        assert_eq!(bytes[9], 2);
        assert_eq!(&bytes[10..18], &[7, 0, 0, 0, 0, 0, 0, 0]);
        assert_eq!(bytes.len(), 18);
    }

    #[sr_test_utils::logged_test]
    fn every_kind_roundtrips() {
        roundtrip(SourceEvent::new(
            0,
            DomPatch::snapshot(
                1u64,
                vec![
                    SnapshotNode::document(1u64, vec![2u64.into(), 3u64.into()]),
                    SnapshotNode::doctype(2u64, DocTypeData::html5()),
                    SnapshotNode::element(
                        3u64,
                        ElementData::new("html").with_attribute("lang", "en"),
                        vec![4u64.into()],
                    ),
                    SnapshotNode::text(4u64, "hello"),
                ],
            ),
        ));
        roundtrip(SourceEvent::new(5, DomPatch::insert(3u64, 9u64, 0, NodeData::text("x"))));
        roundtrip(SourceEvent::new(6, DomPatch::move_to(9u64, 1u64, 2)));
        roundtrip(SourceEvent::new(7, DomPatch::set_attribute(3u64, "class", "a b")));
        roundtrip(SourceEvent::new(7, DomPatch::remove_attribute(3u64, "class")));
        roundtrip(SourceEvent::new(
            8,
            Interaction::Pointer(PointerEvent {
                action: PointerAction::Click,
                x: -4,
                y: 12,
                target: Some(SyntheticId::new(3)),
            }),
        ));
        roundtrip(SourceEvent::new(
            9,
            Interaction::Resize(ViewportResize {
                width: 1280,
                height: 720,
            }),
        ));
        let id = new_correlation_id();
        roundtrip(SourceEvent::new(
            10,
            NetworkEvent::Request(HttpRequest {
                correlation_id: id.clone(),
                method: "GET".to_string(),
                url: "https://example.com/a".to_string(),
            }),
        ));
        roundtrip(SourceEvent::new(
            11,
            NetworkEvent::WebSocket(WebSocketFrame {
                correlation_id: id,
                direction: WsDirection::Received,
                payload: "{}".to_string(),
            }),
        ));
        roundtrip(SourceEvent::new(
            12,
            ConsoleEvent {
                level: ConsoleLevel::Warn,
                parts: vec![
                    ConsolePart::Text("count".to_string()),
                    ConsolePart::Number(2.5),
                    ConsolePart::Bool(false),
                    ConsolePart::Null,
                    ConsolePart::Json("[1,2]".to_string()),
                ],
            },
        ));
    }

    #[sr_test_utils::logged_test]
    fn correlation_id_is_fixed_width() {
        let view = View::<HttpResponse>::new();
        let response = HttpResponse {
            correlation_id: new_correlation_id(),
            status: 204,
            duration_ms: 12,
        };
        let bytes = view.encode(&response).unwrap();
        assert_eq!(bytes.len(), CORRELATION_ID_LEN + 2 + 4);
    }

    #[sr_test_utils::logged_test]
    fn validation_collects_all_paths() {
        let view = View::<SourceEvent>::new();
        let event = SourceEvent::new(
            1,
            DomPatch::snapshot(
                1u64,
                vec![
                    SnapshotNode::document(1u64, vec![2u64.into()]),
                    SnapshotNode::element(2u64, ElementData::new(""), vec![]),
                    SnapshotNode::doctype(
                        3u64,
                        DocTypeData {
                            name: String::new(),
                            public_id: String::new(),
                            system_id: String::new(),
                        },
                    ),
                ],
            ),
        );
        let err = view.encode(&event).unwrap_err();
        let CodecError::SchemaValidation(violations) = err else {
            panic!("expected schema validation failure");
        };
        assert_eq!(
            violations.paths(),
            vec![
                "snapshot.nodes[1].data.element.tag",
                "snapshot.nodes[2].data.doctype.name"
            ]
        );
    }

    #[sr_test_utils::logged_test]
    fn invalid_network_and_console_payloads_are_rejected() {
        let view = View::<SourceEvent>::new();
        let request = SourceEvent::new(
            1,
            NetworkEvent::Request(HttpRequest {
                correlation_id: "short".to_string(),
                method: String::new(),
                url: "https://example.com".to_string(),
            }),
        );
        let CodecError::SchemaValidation(violations) = view.encode(&request).unwrap_err() else {
            panic!("expected schema validation failure");
        };
        assert_eq!(
            violations.paths(),
            vec!["request.correlation_id", "request.method"]
        );

        let console = SourceEvent::new(
            2,
            ConsoleEvent {
                level: ConsoleLevel::Log,
                parts: vec![ConsolePart::Json("{".to_string()), ConsolePart::Number(f64::NAN)],
            },
        );
        let CodecError::SchemaValidation(violations) = view.encode(&console).unwrap_err() else {
            panic!("expected schema validation failure");
        };
        assert_eq!(
            violations.paths(),
            vec!["console.parts[0].json", "console.parts[1].number.value"]
        );
    }

    #[sr_test_utils::logged_test]
    fn correlation_ids_that_would_not_survive_the_char_field_are_rejected() {
        let view = View::<SourceEvent>::new();
        let padded = format!("{}\0", "a".repeat(CORRELATION_ID_LEN - 1));
        for id in ["é".repeat(CORRELATION_ID_LEN), padded] {
            let request = SourceEvent::new(
                1,
                NetworkEvent::Request(HttpRequest {
                    correlation_id: id,
                    method: "GET".to_string(),
                    url: "https://example.com".to_string(),
                }),
            );
            let CodecError::SchemaValidation(violations) = view.encode(&request).unwrap_err() else {
                panic!("expected schema validation failure");
            };
            assert_eq!(violations.paths(), vec!["request.correlation_id"]);
        }
    }

    #[sr_test_utils::logged_test]
    fn unknown_event_kind_is_a_schema_mismatch() {
        let view = View::<SourceEvent>::new();
        let mut bytes = view.encode(&SourceEvent::new(3, DomPatch::remove(1u64))).unwrap();
        bytes[0] = 9;
        match view.decode(&bytes, 0).unwrap_err() {
            CodecError::SchemaMismatch { offset, reason } => {
                assert_eq!(offset, 0);
                assert_eq!(
                    reason,
                    Mismatch::UnknownDiscriminant {
                        type_name: "EventKind",
                        value: 9
                    }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[sr_test_utils::logged_test]
    fn unknown_action_code_is_a_schema_mismatch() {
        let view = View::<PointerEvent>::new();
        let mut bytes = view
            .encode(&PointerEvent {
                action: PointerAction::Move,
                x: 0,
                y: 0,
                target: None,
            })
            .unwrap();
        bytes[0] = 42;
        assert!(matches!(
            view.decode(&bytes, 0).unwrap_err(),
            CodecError::SchemaMismatch {
                reason: Mismatch::UnknownDiscriminant {
                    type_name: "PointerAction",
                    value: 42
                },
                ..
            }
        ));
    }
}
