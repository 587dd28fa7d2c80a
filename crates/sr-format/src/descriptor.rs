// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Structural type descriptors
//!
//! A descriptor is the wire shape of a type. Field order inside a struct is
//! part of the format: reordering fields changes the bytes.

/// Fixed-width little-endian scalars
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Primitive {
    U8,
    U16,
    U32,
    U64,
    I32,
    I64,
    F64,
    Bool,
}

impl Primitive {
    pub const fn width(self) -> usize {
        match self {
            Primitive::U8 | Primitive::Bool => 1,
            Primitive::U16 => 2,
            Primitive::U32 | Primitive::I32 => 4,
            Primitive::U64 | Primitive::I64 | Primitive::F64 => 8,
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Primitive::U8 => "u8",
            Primitive::U16 => "u16",
            Primitive::U32 => "u32",
            Primitive::U64 => "u64",
            Primitive::I32 => "i32",
            Primitive::I64 => "i64",
            Primitive::F64 => "f64",
            Primitive::Bool => "bool",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    pub name: &'static str,
    pub descriptor: Descriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Variant {
    pub name: &'static str,
    pub descriptor: Descriptor,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Primitive(Primitive),
    /// Fixed-width UTF-8, NUL padded on the right
    Char(usize),
    /// u32 byte length followed by UTF-8
    String,
    /// Fields encoded back to back in declaration order
    Struct(Vec<Field>),
    /// u32 element count followed by the elements
    List(Box<Descriptor>),
    /// u8 presence flag (0 or 1) followed by the value when present
    Optional(Box<Descriptor>),
    /// u8 discriminant (index into `variants`) followed by the variant body
    Tagged {
        name: &'static str,
        variants: Vec<Variant>,
    },
}

impl Descriptor {
    pub fn structure<I>(fields: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Descriptor)>,
    {
        Descriptor::Struct(
            fields
                .into_iter()
                .map(|(name, descriptor)| Field { name, descriptor })
                .collect(),
        )
    }

    pub fn list(element: Descriptor) -> Self {
        Descriptor::List(Box::new(element))
    }

    pub fn optional(inner: Descriptor) -> Self {
        Descriptor::Optional(Box::new(inner))
    }

    pub fn tagged<I>(name: &'static str, variants: I) -> Self
    where
        I: IntoIterator<Item = (&'static str, Descriptor)>,
    {
        Descriptor::Tagged {
            name,
            variants: variants
                .into_iter()
                .map(|(name, descriptor)| Variant { name, descriptor })
                .collect(),
        }
    }

    /// The empty struct, used for payload-free variants
    pub fn unit() -> Self {
        Descriptor::Struct(Vec::new())
    }

    /// Smallest number of bytes any value of this shape occupies
    pub fn min_encoded_len(&self) -> usize {
        match self {
            Descriptor::Primitive(p) => p.width(),
            Descriptor::Char(width) => *width,
            Descriptor::String | Descriptor::List(_) => 4,
            Descriptor::Struct(fields) => fields.iter().map(|f| f.descriptor.min_encoded_len()).sum(),
            Descriptor::Optional(_) => 1,
            Descriptor::Tagged { variants, .. } => {
                1 + variants
                    .iter()
                    .map(|v| v.descriptor.min_encoded_len())
                    .min()
                    .unwrap_or(0)
            }
        }
    }

    /// Human readable name used in shape errors
    pub fn kind_name(&self) -> &'static str {
        match self {
            Descriptor::Primitive(p) => p.name(),
            Descriptor::Char(_) => "char",
            Descriptor::String => "string",
            Descriptor::Struct(_) => "struct",
            Descriptor::List(_) => "list",
            Descriptor::Optional(_) => "optional",
            Descriptor::Tagged { .. } => "tagged",
        }
    }
}

impl From<Primitive> for Descriptor {
    fn from(primitive: Primitive) -> Self {
        Descriptor::Primitive(primitive)
    }
}
