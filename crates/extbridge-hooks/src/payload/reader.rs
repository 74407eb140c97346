//! Payload accessors for hook handlers and flow operations

use serde::de::DeserializeOwned;
use serde_json::Value;

use super::{read, Schema};
use crate::context::{HookContext, OperationContext};
use crate::error::Result;

static MISSING: Value = Value::Null;

/// Validate the event payload carried by a hook context
///
/// A missing payload is validated as `null` and therefore rejected by every
/// object schema.
pub fn read_hook_payload(ctx: &HookContext, schema: &Schema) -> Result<Value> {
    read(ctx.payload().unwrap_or(&MISSING), schema)
}

/// [`read_hook_payload`] followed by deserialization into `T`
pub fn read_hook_payload_as<T: DeserializeOwned>(ctx: &HookContext, schema: &Schema) -> Result<T> {
    Ok(serde_json::from_value(read_hook_payload(ctx, schema)?)?)
}

/// Validate `$trigger.payload` of an operation's data
pub fn read_trigger_payload(op: &OperationContext, schema: &Schema) -> Result<Value> {
    let payload = op
        .trigger()
        .and_then(|trigger| trigger.get("payload"))
        .unwrap_or(&MISSING);
    read(payload, schema)
}

/// [`read_trigger_payload`] followed by deserialization into `T`
pub fn read_trigger_payload_as<T: DeserializeOwned>(
    op: &OperationContext,
    schema: &Schema,
) -> Result<T> {
    Ok(serde_json::from_value(read_trigger_payload(op, schema)?)?)
}

/// `$trigger.keys` as strings, or empty when absent; no validation
pub fn read_trigger_keys(op: &OperationContext) -> Vec<String> {
    match op.trigger().and_then(|trigger| trigger.get("keys")) {
        Some(Value::Array(keys)) => keys
            .iter()
            .filter(|key| !key.is_null())
            .map(|key| match key {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde::Deserialize;
    use serde_json::json;

    use super::*;
    use crate::context::ExtensionContext;
    use crate::error::HooksError;
    use crate::payload::{FieldKind, ObjectShape};
    use crate::types::RawFields;

    fn base() -> Arc<ExtensionContext> {
        Arc::new(ExtensionContext::builder("reader-test").build())
    }

    fn fields(value: Value) -> RawFields {
        value.as_object().cloned().unwrap()
    }

    fn title_schema() -> Schema {
        ObjectShape::new().field("title", FieldKind::String).into()
    }

    #[derive(Debug, Deserialize)]
    struct Article {
        title: String,
    }

    #[test]
    fn test_read_hook_payload() {
        let ctx = HookContext::merged(
            base(),
            RawFields::new(),
            Some(json!({ "title": "Hello", "status": "draft" })),
        );
        let payload = read_hook_payload(&ctx, &title_schema()).unwrap();
        assert_eq!(payload, json!({ "title": "Hello", "status": "draft" }));

        let article: Article = read_hook_payload_as(&ctx, &title_schema()).unwrap();
        assert_eq!(article.title, "Hello");
    }

    #[test]
    fn test_missing_hook_payload_rejected() {
        let ctx = HookContext::base_only(base());
        let result = read_hook_payload(&ctx, &title_schema());
        assert!(matches!(result, Err(HooksError::Validation(_))));
    }

    #[test]
    fn test_read_trigger_payload_and_keys() {
        let op = OperationContext::new(
            base(),
            "publish",
            fields(json!({ "$trigger": { "payload": { "title": "T" }, "keys": ["1", 2] } })),
        );

        assert_eq!(
            read_trigger_payload(&op, &title_schema()).unwrap(),
            json!({ "title": "T" })
        );
        let article: Article = read_trigger_payload_as(&op, &title_schema()).unwrap();
        assert_eq!(article.title, "T");
        assert_eq!(read_trigger_keys(&op), vec!["1", "2"]);
    }

    #[test]
    fn test_trigger_keys_default_empty() {
        let op = OperationContext::new(base(), "noop", RawFields::new());
        assert!(read_trigger_keys(&op).is_empty());
        assert!(read_trigger_payload(&op, &title_schema()).is_err());
    }
}
