//! JSON Schema documents as object validators

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;

use super::diagnostic::Diagnostic;
use super::shape::type_name;
use super::{ObjectSchema, UnknownKeys};
use crate::error::{HooksError, Result};

/// Adapts a compiled JSON Schema document to [`ObjectSchema`]
///
/// JSON Schema validates without transforming, so the unknown-key policy is
/// applied after validation using the document's top-level `properties`. A
/// document that sets `additionalProperties: false` still rejects extras in
/// passthrough mode.
#[derive(Clone)]
pub struct JsonSchemaShape {
    compiled: Arc<JSONSchema>,
    declared: Arc<BTreeSet<String>>,
    unknown_keys: UnknownKeys,
}

impl JsonSchemaShape {
    /// Compile a JSON Schema document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid JSON Schema.
    pub fn compile(document: &Value) -> Result<Self> {
        let compiled = JSONSchema::compile(document).map_err(|e| {
            HooksError::InvalidConfiguration(format!("Failed to compile schema: {}", e))
        })?;

        let declared = document
            .get("properties")
            .and_then(Value::as_object)
            .map(|properties| properties.keys().cloned().collect())
            .unwrap_or_default();

        Ok(Self {
            compiled: Arc::new(compiled),
            declared: Arc::new(declared),
            unknown_keys: UnknownKeys::Strip,
        })
    }

    pub fn with_unknown_keys(mut self, unknown_keys: UnknownKeys) -> Self {
        self.unknown_keys = unknown_keys;
        self
    }
}

impl fmt::Debug for JsonSchemaShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JsonSchemaShape")
            .field("declared", &self.declared)
            .field("unknown_keys", &self.unknown_keys)
            .finish()
    }
}

impl ObjectSchema for JsonSchemaShape {
    fn validate(&self, value: &Value) -> std::result::Result<Value, Diagnostic> {
        let Some(object) = value.as_object() else {
            return Err(Diagnostic::single(
                "",
                format!("expected object, received {}", type_name(value)),
            ));
        };

        if let Err(errors) = self.compiled.validate(value) {
            let mut diagnostic = Diagnostic::new();
            for error in errors {
                diagnostic.push(pointer_to_path(&error.instance_path.to_string()), error.to_string());
            }
            return Err(diagnostic);
        }

        match self.unknown_keys {
            UnknownKeys::Passthrough => Ok(value.clone()),
            UnknownKeys::Strip => Ok(Value::Object(
                object
                    .iter()
                    .filter(|(key, _)| self.declared.contains(*key))
                    .map(|(key, v)| (key.clone(), v.clone()))
                    .collect(),
            )),
            UnknownKeys::Strict => {
                let mut diagnostic = Diagnostic::new();
                for key in object.keys().filter(|key| !self.declared.contains(*key)) {
                    diagnostic.push(key.clone(), "unrecognized key");
                }
                if diagnostic.is_empty() {
                    Ok(value.clone())
                } else {
                    Err(diagnostic)
                }
            }
        }
    }

    fn passthrough(&self) -> Arc<dyn ObjectSchema> {
        Arc::new(self.clone().with_unknown_keys(UnknownKeys::Passthrough))
    }
}

/// `/items/0/name` -> `items[0].name`
fn pointer_to_path(pointer: &str) -> String {
    let mut path = String::new();
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        if segment.chars().all(|c| c.is_ascii_digit()) {
            path.push_str(&format!("[{segment}]"));
        } else {
            if !path.is_empty() {
                path.push('.');
            }
            path.push_str(segment);
        }
    }
    path
}
