// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use std::fmt;

use thiserror::Error;

/// Errors raised while encoding or decoding views
#[derive(Debug, Error)]
pub enum CodecError {
    /// Encode-time: the value violates its authoring rules. Nothing was written.
    #[error("schema validation failed: {0}")]
    SchemaValidation(SchemaViolations),

    /// Decode-time: the buffer ends before the descriptor is satisfied
    #[error("truncated buffer at offset {offset}: need {needed} bytes, {available} available")]
    TruncatedBuffer {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// Decode-time: the bytes are present but do not fit the descriptor
    #[error("schema mismatch at offset {offset}: {reason}")]
    SchemaMismatch { offset: usize, reason: Mismatch },

    /// Encode-time: a `Value` tree does not have the shape its descriptor expects
    #[error("value at `{path}` does not match descriptor: expected {expected}")]
    ValueShape { path: String, expected: &'static str },

    #[error("compression error: {0}")]
    Compression(#[from] std::io::Error),
}

impl CodecError {
    /// True for failures caused by malformed input bytes
    pub fn is_decode_error(&self) -> bool {
        matches!(
            self,
            CodecError::TruncatedBuffer { .. } | CodecError::SchemaMismatch { .. }
        )
    }

    pub(crate) fn mismatch(offset: usize, reason: Mismatch) -> Self {
        CodecError::SchemaMismatch { offset, reason }
    }
}

/// Why a well-sized region of bytes could not be read as the expected value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Mismatch {
    #[error("unknown discriminant {value} for {type_name}")]
    UnknownDiscriminant { type_name: &'static str, value: u8 },

    #[error("string field is not valid UTF-8")]
    InvalidUtf8,

    #[error("invalid bool byte {0:#04x}")]
    InvalidBool(u8),

    #[error("invalid presence flag {0:#04x}")]
    InvalidPresenceFlag(u8),

    #[error("record declares {declared} bytes but its contents span {consumed}")]
    RecordLength { declared: usize, consumed: usize },

    #[error("{0} trailing bytes after the last record")]
    TrailingBytes(usize),

    #[error("decoded value has unexpected shape: {0}")]
    Shape(String),

    #[error("event at time {time} precedes the previous event at {previous}")]
    OutOfOrder { previous: u64, time: u64 },
}

/// A single violated authoring rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path from the encoded root to the offending field
    pub path: String,
    /// Machine readable rule name (`length`, `range`, ...)
    pub code: String,
    pub message: Option<String>,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {} ({})", self.path, message, self.code),
            None => write!(f, "{}: {}", self.path, self.code),
        }
    }
}

/// Every rule a value violates, collected in one pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaViolations {
    violations: Vec<Violation>,
}

impl SchemaViolations {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        path: impl Into<String>,
        code: impl Into<String>,
        message: Option<String>,
    ) {
        self.violations.push(Violation {
            path: path.into(),
            code: code.into(),
            message,
        });
    }

    /// Flatten the field errors reported by a `validator` derive under `prefix`
    pub fn extend_from_validator(&mut self, prefix: &str, errors: &validator::ValidationErrors) {
        let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
        fields.sort_by(|a, b| a.0.cmp(&b.0));
        for (field, field_errors) in fields {
            let path = join_path(prefix, &field);
            for error in field_errors.iter() {
                self.push(
                    path.clone(),
                    error.code.to_string(),
                    error.message.as_ref().map(|m| m.to_string()),
                );
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    pub fn len(&self) -> usize {
        self.violations.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Violation> {
        self.violations.iter()
    }

    /// Paths of every violation, in discovery order
    pub fn paths(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.path.as_str()).collect()
    }

    pub fn into_result(self) -> Result<(), CodecError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(CodecError::SchemaValidation(self))
        }
    }
}

impl fmt::Display for SchemaViolations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} violation(s)", self.violations.len())?;
        for (i, violation) in self.violations.iter().enumerate() {
            let sep = if i == 0 { ": " } else { "; " };
            write!(f, "{}{}", sep, violation)?;
        }
        Ok(())
    }
}

pub(crate) fn join_path(prefix: &str, segment: &str) -> String {
    if prefix.is_empty() {
        segment.to_string()
    } else {
        format!("{}.{}", prefix, segment)
    }
}
