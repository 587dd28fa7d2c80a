// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Typed views: a descriptor bound to a validation schema
//!
//! Encoding validates first and writes nothing when any rule fails.
//! Decoding trusts the bytes as far as the descriptor allows and never
//! runs the schema.

use std::fmt;
use std::marker::PhantomData;

use indexmap::IndexMap;

use crate::codec::{decode_value, encode_value};
use crate::descriptor::{Descriptor, Primitive};
use crate::error::{CodecError, Mismatch};
use crate::schema::Schema;
use crate::value::Value;

/// Types with a binary wire shape
pub trait Viewable: Sized {
    fn descriptor() -> Descriptor;
    fn to_value(&self) -> Value;
    fn from_value(value: Value) -> Result<Self, Mismatch>;
}

/// Dual-mode codec for one logical type
pub struct View<T> {
    descriptor: Descriptor,
    min_len: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Viewable + Schema> View<T> {
    pub fn new() -> Self {
        let descriptor = T::descriptor();
        let min_len = descriptor.min_encoded_len();
        Self {
            descriptor,
            min_len,
            _marker: PhantomData,
        }
    }

    pub fn descriptor(&self) -> &Descriptor {
        &self.descriptor
    }

    pub fn min_encoded_len(&self) -> usize {
        self.min_len
    }

    /// Run the schema and report every violation
    pub fn validate(&self, value: &T) -> Result<(), CodecError> {
        value.violations().into_result()
    }

    pub fn encode(&self, value: &T) -> Result<Vec<u8>, CodecError> {
        let mut out = Vec::with_capacity(self.min_len);
        self.encode_into(value, &mut out)?;
        Ok(out)
    }

    /// Validate then append to `out`; returns the number of bytes written
    pub fn encode_into(&self, value: &T, out: &mut Vec<u8>) -> Result<usize, CodecError> {
        self.validate(value)?;
        let start = out.len();
        encode_value(&self.descriptor, &value.to_value(), out)?;
        Ok(out.len() - start)
    }

    /// Decode one value at `offset`, returning it with the next read offset
    pub fn decode(&self, bytes: &[u8], offset: usize) -> Result<(T, usize), CodecError> {
        let (value, next) = decode_value(&self.descriptor, bytes, offset)?;
        let typed = T::from_value(value).map_err(|reason| CodecError::mismatch(offset, reason))?;
        Ok((typed, next))
    }
}

impl<T: Viewable + Schema> Default for View<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for View<T> {
    fn clone(&self) -> Self {
        Self {
            descriptor: self.descriptor.clone(),
            min_len: self.min_len,
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for View<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("View")
            .field("type", &std::any::type_name::<T>())
            .field("min_len", &self.min_len)
            .finish()
    }
}

macro_rules! primitive_viewable {
    ($($ty:ty => $primitive:ident, $variant:ident, $accessor:ident;)*) => {
        $(
            impl Viewable for $ty {
                fn descriptor() -> Descriptor {
                    Descriptor::Primitive(Primitive::$primitive)
                }

                fn to_value(&self) -> Value {
                    Value::$variant(*self)
                }

                fn from_value(value: Value) -> Result<Self, Mismatch> {
                    value.$accessor()
                }
            }
        )*
    };
}

primitive_viewable! {
    u8 => U8, U8, into_u8;
    u16 => U16, U16, into_u16;
    u32 => U32, U32, into_u32;
    u64 => U64, U64, into_u64;
    i32 => I32, I32, into_i32;
    i64 => I64, I64, into_i64;
    f64 => F64, F64, into_f64;
    bool => Bool, Bool, into_bool;
}

impl Viewable for String {
    fn descriptor() -> Descriptor {
        Descriptor::String
    }

    fn to_value(&self) -> Value {
        Value::Str(self.clone())
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        value.into_string()
    }
}

impl<T: Viewable> Viewable for Vec<T> {
    fn descriptor() -> Descriptor {
        Descriptor::list(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::List(self.iter().map(Viewable::to_value).collect())
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        value.into_list()?.into_iter().map(T::from_value).collect()
    }
}

impl<T: Viewable> Viewable for Option<T> {
    fn descriptor() -> Descriptor {
        Descriptor::optional(T::descriptor())
    }

    fn to_value(&self) -> Value {
        Value::optional(self.as_ref().map(Viewable::to_value))
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        value.into_optional()?.map(T::from_value).transpose()
    }
}

/// Ordered string map, encoded as a list of `{name, value}` pairs
impl Viewable for IndexMap<String, String> {
    fn descriptor() -> Descriptor {
        Descriptor::list(Descriptor::structure([
            ("name", Descriptor::String),
            ("value", Descriptor::String),
        ]))
    }

    fn to_value(&self) -> Value {
        Value::List(
            self.iter()
                .map(|(name, value)| {
                    Value::Struct(vec![Value::Str(name.clone()), Value::Str(value.clone())])
                })
                .collect(),
        )
    }

    fn from_value(value: Value) -> Result<Self, Mismatch> {
        let mut map = IndexMap::new();
        for entry in value.into_list()? {
            let mut fields = entry.into_fields()?;
            let name = fields.take("name")?.into_string()?;
            let value = fields.take("value")?.into_string()?;
            fields.finish()?;
            map.insert(name, value);
        }
        Ok(map)
    }
}
