// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Authoring-time validation schemas
//!
//! Leaf structs reuse their `validator` derive; sum types and containers
//! compose the checks of their parts so that one pass reports every
//! violated field.

use indexmap::IndexMap;

use crate::error::{SchemaViolations, join_path};

/// Validation rules applied before a value is encoded
pub trait Schema {
    /// Record every violated rule under `path`
    fn check(&self, path: &str, violations: &mut SchemaViolations);

    fn violations(&self) -> SchemaViolations {
        let mut violations = SchemaViolations::new();
        self.check("", &mut violations);
        violations
    }
}

/// Implement [`Schema`] by delegating to a `validator::Validate` derive
macro_rules! validator_schema {
    ($($ty:ty),* $(,)?) => {
        $(
            impl $crate::schema::Schema for $ty {
                fn check(&self, path: &str, violations: &mut $crate::error::SchemaViolations) {
                    if let Err(errors) = ::validator::Validate::validate(self) {
                        violations.extend_from_validator(path, &errors);
                    }
                }
            }
        )*
    };
}

pub(crate) use validator_schema;

macro_rules! unchecked_schema {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Schema for $ty {
                fn check(&self, _path: &str, _violations: &mut SchemaViolations) {}
            }
        )*
    };
}

unchecked_schema!(u8, u16, u32, u64, i32, i64, bool, String, IndexMap<String, String>);

impl Schema for f64 {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        if !self.is_finite() {
            violations.push(
                join_path(path, "value"),
                "finite",
                Some("numbers must be finite".to_string()),
            );
        }
    }
}

impl<T: Schema> Schema for Vec<T> {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        for (index, item) in self.iter().enumerate() {
            item.check(&index_path(path, index), violations);
        }
    }
}

impl<T: Schema> Schema for Option<T> {
    fn check(&self, path: &str, violations: &mut SchemaViolations) {
        if let Some(inner) = self {
            inner.check(path, violations);
        }
    }
}

pub(crate) fn index_path(prefix: &str, index: usize) -> String {
    format!("{}[{}]", prefix, index)
}

pub(crate) fn field_path(prefix: &str, field: &str) -> String {
    join_path(prefix, field)
}
