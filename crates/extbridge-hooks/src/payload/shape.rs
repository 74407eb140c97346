//! Built-in object validator
//!
//! [`ObjectShape`] declares a set of fields, each with a [`FieldKind`] and a few
//! modifiers (optional, nullable, default, coercion), plus object-level
//! refinements that run once every declared field has validated.

use std::fmt;
use std::sync::Arc;

use regex::Regex;
use serde_json::{Map, Value};

use super::diagnostic::{join_path, Diagnostic};
use super::{ObjectSchema, UnknownKeys};

/// Type of a declared field
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Any JSON value
    Any,
    String,
    Number,
    Integer,
    Boolean,
    /// RFC 3339 timestamp string
    DateTime,
    /// String matching a regular expression
    Pattern(Regex),
    /// Exactly this value
    Literal(Value),
    /// One of a fixed set of strings
    Enum(Vec<String>),
    /// Array whose elements all match the inner field
    Array(Box<Field>),
    /// Nested object with its own unknown-key policy
    Object(ObjectShape),
}

impl FieldKind {
    fn describe(&self) -> String {
        match self {
            Self::Any => "any".to_string(),
            Self::String => "string".to_string(),
            Self::Number => "number".to_string(),
            Self::Integer => "integer".to_string(),
            Self::Boolean => "boolean".to_string(),
            Self::DateTime => "datetime".to_string(),
            Self::Pattern(re) => format!("string matching /{}/", re.as_str()),
            Self::Literal(value) => format!("literal {value}"),
            Self::Enum(options) => format!("one of [{}]", options.join(", ")),
            Self::Array(_) => "array".to_string(),
            Self::Object(_) => "object".to_string(),
        }
    }
}

/// A declared field: its kind plus presence and coercion modifiers
#[derive(Debug, Clone)]
pub struct Field {
    kind: FieldKind,
    optional: bool,
    nullable: bool,
    coerce: bool,
    default: Option<Value>,
}

impl Field {
    pub fn new(kind: FieldKind) -> Self {
        Self {
            kind,
            optional: false,
            nullable: false,
            coerce: false,
            default: None,
        }
    }

    /// Field may be absent
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Field may be `null`
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Convert compatible scalars (e.g. `"42"` for a number) before checking
    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    /// Value used when the field is absent
    pub fn default_value(mut self, value: Value) -> Self {
        self.default = Some(value);
        self
    }

    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    fn validate(&self, value: &Value, path: &str, diagnostic: &mut Diagnostic) -> Option<Value> {
        if value.is_null() {
            if self.nullable {
                return Some(Value::Null);
            }
            diagnostic.push(
                path,
                format!("expected {}, received null", self.kind.describe()),
            );
            return None;
        }

        match &self.kind {
            FieldKind::Any => Some(value.clone()),
            FieldKind::String => match value {
                Value::String(_) => Some(value.clone()),
                Value::Number(n) if self.coerce => Some(Value::String(n.to_string())),
                Value::Bool(b) if self.coerce => Some(Value::String(b.to_string())),
                other => self.mismatch(other, path, diagnostic),
            },
            FieldKind::Number => match value {
                Value::Number(_) => Some(value.clone()),
                Value::String(s) if self.coerce => match parse_number(s) {
                    Some(n) => Some(n),
                    None => self.mismatch(value, path, diagnostic),
                },
                other => self.mismatch(other, path, diagnostic),
            },
            FieldKind::Integer => match value {
                Value::Number(n) if n.is_i64() || n.is_u64() => Some(value.clone()),
                Value::Number(n) if n.as_f64().is_some_and(|f| f.fract() == 0.0) => {
                    Some(value.clone())
                }
                Value::String(s) if self.coerce => match s.trim().parse::<i64>() {
                    Ok(n) => Some(Value::from(n)),
                    Err(_) => self.mismatch(value, path, diagnostic),
                },
                other => self.mismatch(other, path, diagnostic),
            },
            FieldKind::Boolean => match value {
                Value::Bool(_) => Some(value.clone()),
                Value::String(s) if self.coerce => match s.trim() {
                    "true" | "1" => Some(Value::Bool(true)),
                    "false" | "0" => Some(Value::Bool(false)),
                    _ => self.mismatch(value, path, diagnostic),
                },
                other => self.mismatch(other, path, diagnostic),
            },
            FieldKind::DateTime => match value.as_str() {
                Some(s) if chrono::DateTime::parse_from_rfc3339(s).is_ok() => Some(value.clone()),
                Some(s) => {
                    diagnostic.push(path, format!("invalid datetime '{s}'"));
                    None
                }
                None => self.mismatch(value, path, diagnostic),
            },
            FieldKind::Pattern(re) => match value.as_str() {
                Some(s) if re.is_match(s) => Some(value.clone()),
                Some(_) => {
                    diagnostic.push(path, format!("does not match /{}/", re.as_str()));
                    None
                }
                None => self.mismatch(value, path, diagnostic),
            },
            FieldKind::Literal(expected) => {
                if value == expected {
                    Some(value.clone())
                } else {
                    diagnostic.push(path, format!("expected {expected}, received {value}"));
                    None
                }
            }
            FieldKind::Enum(options) => match value.as_str() {
                Some(s) if options.iter().any(|o| o == s) => Some(value.clone()),
                _ => self.mismatch(value, path, diagnostic),
            },
            FieldKind::Array(item) => match value.as_array() {
                Some(elements) => {
                    let before = diagnostic.issues.len();
                    let mut out = Vec::with_capacity(elements.len());
                    for (index, element) in elements.iter().enumerate() {
                        let element_path = join_path(path, &format!("[{index}]"));
                        if let Some(v) = item.validate(element, &element_path, diagnostic) {
                            out.push(v);
                        }
                    }
                    (diagnostic.issues.len() == before).then_some(Value::Array(out))
                }
                None => self.mismatch(value, path, diagnostic),
            },
            FieldKind::Object(shape) => match shape.validate_at(value, path) {
                Ok(v) => Some(v),
                Err(nested) => {
                    diagnostic.issues.extend(nested.issues);
                    None
                }
            },
        }
    }

    fn mismatch(&self, value: &Value, path: &str, diagnostic: &mut Diagnostic) -> Option<Value> {
        diagnostic.push(
            path,
            format!(
                "expected {}, received {}",
                self.kind.describe(),
                type_name(value)
            ),
        );
        None
    }
}

impl From<FieldKind> for Field {
    fn from(kind: FieldKind) -> Self {
        Self::new(kind)
    }
}

type RefineFn = dyn Fn(&Map<String, Value>) -> bool + Send + Sync;

/// Object-level rule evaluated against the validated output
#[derive(Clone)]
struct Refinement {
    path: String,
    message: String,
    check: Arc<RefineFn>,
}

impl fmt::Debug for Refinement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Refinement")
            .field("path", &self.path)
            .field("message", &self.message)
            .finish()
    }
}

/// Declarative object validator
///
/// # Examples
///
/// ```ignore
/// let item = ObjectShape::new()
///     .field("id", FieldKind::Integer)
///     .field("title", FieldKind::String)
///     .field("status", Field::new(FieldKind::Enum(vec!["draft".into(), "published".into()])).optional())
///     .keep_unknown();
/// ```
#[derive(Debug, Clone, Default)]
pub struct ObjectShape {
    fields: Vec<(String, Field)>,
    unknown_keys: UnknownKeys,
    refinements: Vec<Refinement>,
}

impl ObjectShape {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a field, replacing any earlier declaration with the same name
    pub fn field(mut self, name: impl Into<String>, field: impl Into<Field>) -> Self {
        let name = name.into();
        let field = field.into();
        match self.fields.iter_mut().find(|(existing, _)| *existing == name) {
            Some(slot) => slot.1 = field,
            None => self.fields.push((name, field)),
        }
        self
    }

    pub fn with_unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }

    /// Keep undeclared fields in the output
    pub fn keep_unknown(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Passthrough)
    }

    /// Reject undeclared fields
    pub fn strict(self) -> Self {
        self.with_unknown_keys(UnknownKeys::Strict)
    }

    /// Add a rule over the validated object; failures are reported at `path`
    pub fn refine<F>(mut self, path: impl Into<String>, message: impl Into<String>, check: F) -> Self
    where
        F: Fn(&Map<String, Value>) -> bool + Send + Sync + 'static,
    {
        self.refinements.push(Refinement {
            path: path.into(),
            message: message.into(),
            check: Arc::new(check),
        });
        self
    }

    pub fn unknown_keys(&self) -> UnknownKeys {
        self.unknown_keys
    }

    pub fn declares(&self, name: &str) -> bool {
        self.fields.iter().any(|(declared, _)| declared == name)
    }

    fn validate_at(&self, value: &Value, path: &str) -> Result<Value, Diagnostic> {
        let Some(input) = value.as_object() else {
            return Err(Diagnostic::single(
                path,
                format!("expected object, received {}", type_name(value)),
            ));
        };

        let mut diagnostic = Diagnostic::new();
        let mut output = Map::new();

        for (name, field) in &self.fields {
            let field_path = join_path(path, name);
            match input.get(name) {
                Some(raw) => {
                    if let Some(v) = field.validate(raw, &field_path, &mut diagnostic) {
                        output.insert(name.clone(), v);
                    }
                }
                None => match &field.default {
                    Some(default) => {
                        output.insert(name.clone(), default.clone());
                    }
                    None if field.optional => {}
                    None => diagnostic.push(field_path, "required"),
                },
            }
        }

        for (key, raw) in input {
            if self.declares(key) {
                continue;
            }
            match self.unknown_keys {
                UnknownKeys::Strip => {}
                UnknownKeys::Passthrough => {
                    output.insert(key.clone(), raw.clone());
                }
                UnknownKeys::Strict => {
                    diagnostic.push(join_path(path, key), "unrecognized key");
                }
            }
        }

        if !diagnostic.is_empty() {
            return Err(diagnostic);
        }

        for refinement in &self.refinements {
            if !(refinement.check)(&output) {
                diagnostic.push(join_path(path, &refinement.path), refinement.message.clone());
            }
        }

        if diagnostic.is_empty() {
            Ok(Value::Object(output))
        } else {
            Err(diagnostic)
        }
    }
}

impl ObjectSchema for ObjectShape {
    fn validate(&self, value: &Value) -> Result<Value, Diagnostic> {
        self.validate_at(value, "")
    }

    fn passthrough(&self) -> Arc<dyn ObjectSchema> {
        Arc::new(self.clone().keep_unknown())
    }
}

fn parse_number(s: &str) -> Option<Value> {
    let trimmed = s.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(n) = trimmed.parse::<i64>() {
        return Some(Value::from(n));
    }
    trimmed
        .parse::<f64>()
        .ok()
        .and_then(serde_json::Number::from_f64)
        .map(Value::Number)
}

pub(crate) fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
