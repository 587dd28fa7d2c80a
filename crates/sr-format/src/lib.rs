// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Binary format for session recordings
//!
//! A [`View`] binds a type's structural [`Descriptor`] to its validation
//! [`Schema`]: encoding validates and then writes, decoding reads strictly by
//! descriptor. A [`List`] is a count-prefixed container of view-encoded
//! records; a recording is a `List<SourceEvent>`, optionally wrapped in a
//! Brotli envelope.

pub mod codec;
pub mod compression;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod list;
pub mod reader;
pub mod schema;
pub mod value;
pub mod view;
pub mod writer;

pub use compression::{MAGIC, compress, decompress, is_compressed, unwrap_envelope};
pub use descriptor::{Descriptor, Field, Primitive, Variant};
pub use error::{CodecError, Mismatch, SchemaViolations, Violation};
pub use list::{List, ListIter};
pub use reader::{RecordingReader, decode_list, decode_recording};
pub use schema::Schema;
pub use value::{Fields, Value};
pub use view::{View, Viewable};
pub use writer::{RecordingWriter, WriterConfig, encode_recording};
