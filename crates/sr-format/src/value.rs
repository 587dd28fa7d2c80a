// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Untyped intermediate values
//!
//! `Value` mirrors a `Descriptor` one to one. Typed views convert to and from
//! it; the codec only ever sees `Value`s. Struct fields are positional, their
//! names live in the descriptor.

use crate::error::Mismatch;

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U8(u8),
    U16(u16),
    U32(u32),
    U64(u64),
    I32(i32),
    I64(i64),
    F64(f64),
    Bool(bool),
    /// Both `Char(n)` and `String` fields
    Str(String),
    Struct(Vec<Value>),
    List(Vec<Value>),
    Optional(Option<Box<Value>>),
    Tagged(u8, Box<Value>),
}

macro_rules! scalar_accessors {
    ($($method:ident => $variant:ident : $ty:ty),* $(,)?) => {
        $(
            pub fn $method(self) -> Result<$ty, Mismatch> {
                match self {
                    Value::$variant(v) => Ok(v),
                    other => Err(other.unexpected(stringify!($variant))),
                }
            }
        )*
    };
}

impl Value {
    scalar_accessors! {
        into_u8 => U8: u8,
        into_u16 => U16: u16,
        into_u32 => U32: u32,
        into_u64 => U64: u64,
        into_i32 => I32: i32,
        into_i64 => I64: i64,
        into_f64 => F64: f64,
        into_bool => Bool: bool,
        into_string => Str: String,
        into_list => List: Vec<Value>,
    }

    pub fn into_fields(self) -> Result<Fields, Mismatch> {
        match self {
            Value::Struct(values) => Ok(Fields {
                values: values.into_iter(),
            }),
            other => Err(other.unexpected("Struct")),
        }
    }

    pub fn into_optional(self) -> Result<Option<Value>, Mismatch> {
        match self {
            Value::Optional(inner) => Ok(inner.map(|boxed| *boxed)),
            other => Err(other.unexpected("Optional")),
        }
    }

    pub fn into_tagged(self) -> Result<(u8, Value), Mismatch> {
        match self {
            Value::Tagged(tag, body) => Ok((tag, *body)),
            other => Err(other.unexpected("Tagged")),
        }
    }

    pub fn tagged(tag: u8, body: Value) -> Self {
        Value::Tagged(tag, Box::new(body))
    }

    pub fn optional(inner: Option<Value>) -> Self {
        Value::Optional(inner.map(Box::new))
    }

    pub fn unit() -> Self {
        Value::Struct(Vec::new())
    }

    pub fn variant_name(&self) -> &'static str {
        match self {
            Value::U8(_) => "U8",
            Value::U16(_) => "U16",
            Value::U32(_) => "U32",
            Value::U64(_) => "U64",
            Value::I32(_) => "I32",
            Value::I64(_) => "I64",
            Value::F64(_) => "F64",
            Value::Bool(_) => "Bool",
            Value::Str(_) => "Str",
            Value::Struct(_) => "Struct",
            Value::List(_) => "List",
            Value::Optional(_) => "Optional",
            Value::Tagged(..) => "Tagged",
        }
    }

    fn unexpected(&self, wanted: &str) -> Mismatch {
        Mismatch::Shape(format!("expected {}, found {}", wanted, self.variant_name()))
    }
}

/// Positional reader over the fields of a decoded struct
#[derive(Debug)]
pub struct Fields {
    values: std::vec::IntoIter<Value>,
}

impl Fields {
    /// Next field, or a shape mismatch naming the missing field
    pub fn take(&mut self, name: &str) -> Result<Value, Mismatch> {
        self.values
            .next()
            .ok_or_else(|| Mismatch::Shape(format!("missing field `{}`", name)))
    }

    /// Fails if fields remain unread
    pub fn finish(mut self) -> Result<(), Mismatch> {
        match self.values.next() {
            None => Ok(()),
            Some(_) => Err(Mismatch::Shape(format!(
                "{} unexpected extra field(s)",
                self.values.len() + 1
            ))),
        }
    }
}
