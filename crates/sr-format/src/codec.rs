// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

// Descriptor-driven binary codec
//
// Encoding walks a `Value` alongside its `Descriptor`; decoding walks the
// descriptor over a byte slice. All integers are little endian. Decoding
// never returns a partially read value: every read is bounds checked and
// fails with `TruncatedBuffer` before touching missing bytes.

use byteorder::{ByteOrder, LittleEndian};

use crate::descriptor::{Descriptor, Primitive};
use crate::error::{CodecError, Mismatch};
use crate::value::Value;

/// Shape error carrying the path segments collected while unwinding
struct ShapeError {
    segments: Vec<String>,
    expected: &'static str,
}

impl ShapeError {
    fn new(expected: &'static str) -> Self {
        Self {
            segments: Vec::new(),
            expected,
        }
    }

    fn at(mut self, segment: impl Into<String>) -> Self {
        self.segments.push(segment.into());
        self
    }

    fn into_codec_error(self) -> CodecError {
        let mut segments = self.segments;
        segments.reverse();
        let path = if segments.is_empty() {
            "<root>".to_string()
        } else {
            segments.join(".")
        };
        CodecError::ValueShape {
            path,
            expected: self.expected,
        }
    }
}

/// Append the encoding of `value` to `out`
///
/// On error `out` is restored to its original length.
pub fn encode_value(
    descriptor: &Descriptor,
    value: &Value,
    out: &mut Vec<u8>,
) -> Result<(), CodecError> {
    let start = out.len();
    match encode_inner(descriptor, value, out) {
        Ok(()) => Ok(()),
        Err(err) => {
            out.truncate(start);
            Err(err.into_codec_error())
        }
    }
}

fn encode_inner(descriptor: &Descriptor, value: &Value, out: &mut Vec<u8>) -> Result<(), ShapeError> {
    match (descriptor, value) {
        (Descriptor::Primitive(primitive), value) => encode_primitive(*primitive, value, out),
        (Descriptor::Char(width), Value::Str(text)) => {
            let bytes = truncate_at_char_boundary(text, *width);
            out.extend_from_slice(bytes);
            out.resize(out.len() + (*width - bytes.len()), 0);
            Ok(())
        }
        (Descriptor::String, Value::Str(text)) => {
            let len = u32::try_from(text.len()).map_err(|_| ShapeError::new("string shorter than 4 GiB"))?;
            put_u32(out, len);
            out.extend_from_slice(text.as_bytes());
            Ok(())
        }
        (Descriptor::Struct(fields), Value::Struct(values)) => {
            if fields.len() != values.len() {
                return Err(ShapeError::new("struct with matching field count"));
            }
            for (field, value) in fields.iter().zip(values) {
                encode_inner(&field.descriptor, value, out).map_err(|e| e.at(field.name))?;
            }
            Ok(())
        }
        (Descriptor::List(element), Value::List(values)) => {
            let count = u32::try_from(values.len()).map_err(|_| ShapeError::new("list shorter than u32::MAX"))?;
            put_u32(out, count);
            for (index, value) in values.iter().enumerate() {
                encode_inner(element, value, out).map_err(|e| e.at(format!("[{}]", index)))?;
            }
            Ok(())
        }
        (Descriptor::Optional(inner), Value::Optional(value)) => match value {
            None => {
                out.push(0);
                Ok(())
            }
            Some(value) => {
                out.push(1);
                encode_inner(inner, value, out)
            }
        },
        (Descriptor::Tagged { variants, .. }, Value::Tagged(tag, body)) => {
            let variant = variants
                .get(usize::from(*tag))
                .ok_or_else(|| ShapeError::new("known variant discriminant"))?;
            out.push(*tag);
            encode_inner(&variant.descriptor, body, out).map_err(|e| e.at(variant.name))
        }
        (descriptor, _) => Err(ShapeError::new(descriptor.kind_name())),
    }
}

fn encode_primitive(primitive: Primitive, value: &Value, out: &mut Vec<u8>) -> Result<(), ShapeError> {
    match (primitive, value) {
        (Primitive::U8, Value::U8(v)) => out.push(*v),
        (Primitive::Bool, Value::Bool(v)) => out.push(u8::from(*v)),
        (Primitive::U16, Value::U16(v)) => {
            let mut buf = [0u8; 2];
            LittleEndian::write_u16(&mut buf, *v);
            out.extend_from_slice(&buf);
        }
        (Primitive::U32, Value::U32(v)) => put_u32(out, *v),
        (Primitive::I32, Value::I32(v)) => {
            let mut buf = [0u8; 4];
            LittleEndian::write_i32(&mut buf, *v);
            out.extend_from_slice(&buf);
        }
        (Primitive::U64, Value::U64(v)) => put_u64(out, *v),
        (Primitive::I64, Value::I64(v)) => {
            let mut buf = [0u8; 8];
            LittleEndian::write_i64(&mut buf, *v);
            out.extend_from_slice(&buf);
        }
        (Primitive::F64, Value::F64(v)) => {
            let mut buf = [0u8; 8];
            LittleEndian::write_f64(&mut buf, *v);
            out.extend_from_slice(&buf);
        }
        (primitive, _) => return Err(ShapeError::new(primitive.name())),
    }
    Ok(())
}

pub(crate) fn put_u32(out: &mut Vec<u8>, v: u32) {
    let mut buf = [0u8; 4];
    LittleEndian::write_u32(&mut buf, v);
    out.extend_from_slice(&buf);
}

fn put_u64(out: &mut Vec<u8>, v: u64) {
    let mut buf = [0u8; 8];
    LittleEndian::write_u64(&mut buf, v);
    out.extend_from_slice(&buf);
}

/// Longest prefix of `text` that fits in `width` bytes without splitting a char
fn truncate_at_char_boundary(text: &str, width: usize) -> &[u8] {
    if text.len() <= width {
        return text.as_bytes();
    }
    let mut end = width;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text.as_bytes()[..end]
}

/// Bounds-checked cursor over an input buffer
pub(crate) struct Cursor<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(bytes: &'a [u8], pos: usize) -> Self {
        Self { bytes, pos }
    }

    pub(crate) fn position(&self) -> usize {
        self.pos
    }

    pub(crate) fn remaining(&self) -> usize {
        self.bytes.len().saturating_sub(self.pos)
    }

    pub(crate) fn take(&mut self, needed: usize) -> Result<&'a [u8], CodecError> {
        let available = self.remaining();
        if needed > available {
            return Err(CodecError::TruncatedBuffer {
                offset: self.pos,
                needed,
                available,
            });
        }
        let slice = &self.bytes[self.pos..self.pos + needed];
        self.pos += needed;
        Ok(slice)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, CodecError> {
        Ok(self.take(1)?[0])
    }

    pub(crate) fn u32(&mut self) -> Result<u32, CodecError> {
        Ok(LittleEndian::read_u32(self.take(4)?))
    }

    /// Fails unless `count` elements of at least `min_len` bytes could fit
    pub(crate) fn ensure_room(&self, count: usize, min_len: usize) -> Result<(), CodecError> {
        let needed = count.saturating_mul(min_len);
        let available = self.remaining();
        if needed > available {
            return Err(CodecError::TruncatedBuffer {
                offset: self.pos,
                needed,
                available,
            });
        }
        Ok(())
    }
}

/// Decode one value starting at `offset`; returns the value and the next offset
pub fn decode_value(
    descriptor: &Descriptor,
    bytes: &[u8],
    offset: usize,
) -> Result<(Value, usize), CodecError> {
    let mut cursor = Cursor::new(bytes, offset);
    let value = decode_inner(descriptor, &mut cursor)?;
    Ok((value, cursor.position()))
}

pub(crate) fn decode_inner(descriptor: &Descriptor, cursor: &mut Cursor<'_>) -> Result<Value, CodecError> {
    match descriptor {
        Descriptor::Primitive(primitive) => decode_primitive(*primitive, cursor),
        Descriptor::Char(width) => {
            let start = cursor.position();
            let raw = cursor.take(*width)?;
            let end = raw.iter().rposition(|b| *b != 0).map_or(0, |i| i + 1);
            let text = std::str::from_utf8(&raw[..end])
                .map_err(|_| CodecError::mismatch(start, Mismatch::InvalidUtf8))?;
            Ok(Value::Str(text.to_string()))
        }
        Descriptor::String => {
            let len = cursor.u32()? as usize;
            let start = cursor.position();
            let raw = cursor.take(len)?;
            let text = std::str::from_utf8(raw)
                .map_err(|_| CodecError::mismatch(start, Mismatch::InvalidUtf8))?;
            Ok(Value::Str(text.to_string()))
        }
        Descriptor::Struct(fields) => {
            let mut values = Vec::with_capacity(fields.len());
            for field in fields {
                values.push(decode_inner(&field.descriptor, cursor)?);
            }
            Ok(Value::Struct(values))
        }
        Descriptor::List(element) => {
            let count = cursor.u32()? as usize;
            cursor.ensure_room(count, element.min_encoded_len())?;
            let mut values = Vec::with_capacity(count.min(cursor.remaining()));
            for _ in 0..count {
                values.push(decode_inner(element, cursor)?);
            }
            Ok(Value::List(values))
        }
        Descriptor::Optional(inner) => {
            let start = cursor.position();
            match cursor.u8()? {
                0 => Ok(Value::Optional(None)),
                1 => Ok(Value::optional(Some(decode_inner(inner, cursor)?))),
                flag => Err(CodecError::mismatch(start, Mismatch::InvalidPresenceFlag(flag))),
            }
        }
        Descriptor::Tagged { name, variants } => {
            let start = cursor.position();
            let tag = cursor.u8()?;
            let variant = variants.get(usize::from(tag)).ok_or_else(|| {
                CodecError::mismatch(
                    start,
                    Mismatch::UnknownDiscriminant {
                        type_name: *name,
                        value: tag,
                    },
                )
            })?;
            let body = decode_inner(&variant.descriptor, cursor)?;
            Ok(Value::tagged(tag, body))
        }
    }
}

fn decode_primitive(primitive: Primitive, cursor: &mut Cursor<'_>) -> Result<Value, CodecError> {
    let start = cursor.position();
    let raw = cursor.take(primitive.width())?;
    let value = match primitive {
        Primitive::U8 => Value::U8(raw[0]),
        Primitive::Bool => match raw[0] {
            0 => Value::Bool(false),
            1 => Value::Bool(true),
            other => return Err(CodecError::mismatch(start, Mismatch::InvalidBool(other))),
        },
        Primitive::U16 => Value::U16(LittleEndian::read_u16(raw)),
        Primitive::U32 => Value::U32(LittleEndian::read_u32(raw)),
        Primitive::I32 => Value::I32(LittleEndian::read_i32(raw)),
        Primitive::U64 => Value::U64(LittleEndian::read_u64(raw)),
        Primitive::I64 => Value::I64(LittleEndian::read_i64(raw)),
        Primitive::F64 => Value::F64(LittleEndian::read_f64(raw)),
    };
    Ok(value)
}
