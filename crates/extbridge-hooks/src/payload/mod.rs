//! Schema-validated payload reading
//!
//! Payloads arrive as untyped JSON. The reader validates them against a
//! [`Schema`], which is either a single object schema or a closed, ordered
//! union of object schemas.
//!
//! Every object schema is evaluated in **passthrough** mode at the top level:
//! fields the schema does not declare are copied into the output unchanged.
//! Nested object schemas keep whatever unknown-key policy they were built with,
//! so extras inside a nested object survive only when that nested schema is
//! itself passthrough.
//!
//! Unions are evaluated member by member in declaration order and the first
//! member that accepts the value wins. Members are never merged.
//!
//! # Examples
//!
//! ```ignore
//! use extbridge_hooks::payload::{read, FieldKind, ObjectShape, Schema};
//!
//! let schema = Schema::union([
//!     ObjectShape::new().field("foo", FieldKind::String),
//!     ObjectShape::new().field("bar", FieldKind::String),
//! ])?;
//!
//! let value = read(&json!({ "bar": "baz" }), &schema)?;
//! assert_eq!(value, json!({ "bar": "baz" }));
//! ```

pub mod diagnostic;
pub mod json_schema;
pub mod reader;
pub mod shape;

use std::fmt;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

pub use diagnostic::{Diagnostic, Issue};
pub use json_schema::JsonSchemaShape;
pub use reader::{
    read_hook_payload, read_hook_payload_as, read_trigger_keys, read_trigger_payload,
    read_trigger_payload_as,
};
pub use shape::{Field, FieldKind, ObjectShape};

use crate::error::{HooksError, Result, ValidationError};

/// What an object schema does with fields it does not declare
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownKeys {
    /// Drop undeclared fields from the output
    #[default]
    Strip,

    /// Copy undeclared fields into the output unchanged
    Passthrough,

    /// Reject values that carry undeclared fields
    Strict,
}

/// An object-shaped validator
///
/// Implementations validate (and may coerce) declared fields and apply their
/// configured [`UnknownKeys`] policy to everything else. They must never add
/// fields that were neither declared nor present in the input, apart from
/// declared defaults.
pub trait ObjectSchema: Send + Sync + fmt::Debug {
    /// Validate `value`, returning the accepted output or a diagnostic
    fn validate(&self, value: &Value) -> std::result::Result<Value, Diagnostic>;

    /// A copy of this schema whose top level keeps undeclared fields
    fn passthrough(&self) -> Arc<dyn ObjectSchema>;
}

#[derive(Debug, Clone)]
enum SchemaKind {
    Object(Arc<dyn ObjectSchema>),
    Union(Vec<Arc<dyn ObjectSchema>>),
}

/// A single object schema or a non-empty ordered union of object schemas
///
/// Members are switched to passthrough mode once, when the schema is built.
#[derive(Debug, Clone)]
pub struct Schema {
    kind: SchemaKind,
}

impl Schema {
    /// Schema accepting a single object shape
    pub fn object<S: ObjectSchema + 'static>(schema: S) -> Self {
        Self {
            kind: SchemaKind::Object(schema.passthrough()),
        }
    }

    /// Schema accepting any of `members`, tried in the given order
    ///
    /// # Errors
    ///
    /// Returns an error if `members` is empty.
    pub fn union<S, I>(members: I) -> Result<Self>
    where
        S: ObjectSchema + 'static,
        I: IntoIterator<Item = S>,
    {
        Self::union_of(
            members
                .into_iter()
                .map(|member| Arc::new(member) as Arc<dyn ObjectSchema>),
        )
    }

    /// Like [`Schema::union`] for heterogeneous, already shared members
    pub fn union_of<I>(members: I) -> Result<Self>
    where
        I: IntoIterator<Item = Arc<dyn ObjectSchema>>,
    {
        let members: Vec<_> = members
            .into_iter()
            .map(|member| member.passthrough())
            .collect();

        if members.is_empty() {
            return Err(HooksError::InvalidConfiguration(
                "union schema requires at least one member".to_string(),
            ));
        }

        Ok(Self {
            kind: SchemaKind::Union(members),
        })
    }

    /// Number of alternatives (1 for a single object schema)
    pub fn alternatives(&self) -> usize {
        match &self.kind {
            SchemaKind::Object(_) => 1,
            SchemaKind::Union(members) => members.len(),
        }
    }

    /// Validate `value` against this schema
    pub fn read(&self, value: &Value) -> std::result::Result<Value, ValidationError> {
        match &self.kind {
            SchemaKind::Object(schema) => schema.validate(value).map_err(ValidationError::new),
            SchemaKind::Union(members) => {
                let mut rejections = Vec::with_capacity(members.len());
                for (index, member) in members.iter().enumerate() {
                    match member.validate(value) {
                        Ok(accepted) => {
                            debug!(member = index, "Union member accepted payload");
                            return Ok(accepted);
                        }
                        Err(diagnostic) => rejections.push(diagnostic),
                    }
                }
                Err(ValidationError::new(Diagnostic::union(rejections)))
            }
        }
    }
}

impl From<ObjectShape> for Schema {
    fn from(shape: ObjectShape) -> Self {
        Self::object(shape)
    }
}

/// Validate `value` against `schema`, keeping undeclared fields
pub fn read(value: &Value, schema: &Schema) -> Result<Value> {
    Ok(schema.read(value)?)
}
