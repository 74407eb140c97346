//! Core data types for normalized hook dispatch
//!
//! Raw hosts describe events with loosely shaped JSON maps. This module turns
//! those maps into [`Metadata`], whose `keys` field is always a list no matter
//! how the host reported the affected record identifiers.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Untyped field map as supplied by the host
pub type RawFields = Map<String, Value>;

/// Kind of registration a handler was attached through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HookKind {
    Filter,
    Action,
    Schedule,
}

impl HookKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            HookKind::Filter => "filter",
            HookKind::Action => "action",
            HookKind::Schedule => "schedule",
        }
    }
}

impl fmt::Display for HookKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Normalized event metadata handed to filter and action handlers
///
/// `event`, `collection` and `keys` are lifted out of the raw map; every other
/// raw field is kept in `extra` untouched (including a singular `key` or an
/// action `payload`).
///
/// # Examples
///
/// ```ignore
/// let raw = json!({ "event": "items.update", "collection": "articles", "keys": ["1"], "key": "2" });
/// let meta = Metadata::for_action(raw.as_object().unwrap().clone());
/// assert_eq!(meta.keys, vec!["1", "2"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Metadata {
    /// Identifier of the triggering action (e.g. `items.create`)
    #[serde(default)]
    pub event: String,

    /// Affected resource group
    #[serde(default)]
    pub collection: String,

    /// Identifiers of the affected records
    #[serde(default)]
    pub keys: Vec<String>,

    /// Remaining raw metadata fields
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Metadata {
    /// Normalize filter metadata: `keys` defaults to empty, `key` is ignored
    pub fn for_filter(raw: RawFields) -> Self {
        Self::from_raw(raw)
    }

    /// Normalize action metadata: `keys` defaults to empty and a singular
    /// `key`, when present, is appended
    pub fn for_action(raw: RawFields) -> Self {
        let single = raw.get("key").and_then(key_string);
        let mut meta = Self::from_raw(raw);
        if let Some(key) = single {
            meta.keys.push(key);
        }
        meta
    }

    fn from_raw(mut raw: RawFields) -> Self {
        let event = raw.remove("event").map(text).unwrap_or_default();
        let collection = raw.remove("collection").map(text).unwrap_or_default();
        let keys = match raw.remove("keys") {
            Some(Value::Array(items)) => items.iter().filter_map(key_string).collect(),
            Some(other) => key_string(&other).into_iter().collect(),
            None => Vec::new(),
        };

        Self {
            event,
            collection,
            keys,
            extra: raw,
        }
    }

    /// Look up a raw field that was not lifted into a typed member
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.extra.get(field)
    }
}

/// Render a record identifier; `null` is not an identifier
fn key_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

fn text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn raw(value: Value) -> RawFields {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_action_keys_and_key_coexist() {
        let meta = Metadata::for_action(raw(json!({ "keys": ["a", "b"], "key": "c" })));
        assert_eq!(meta.keys, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_action_single_key() {
        let meta = Metadata::for_action(raw(json!({ "key": "c" })));
        assert_eq!(meta.keys, vec!["c"]);
    }

    #[test]
    fn test_action_no_keys() {
        let meta = Metadata::for_action(raw(json!({ "event": "items.create" })));
        assert!(meta.keys.is_empty());
        assert_eq!(meta.event, "items.create");
    }

    #[test]
    fn test_filter_ignores_single_key() {
        let meta = Metadata::for_filter(raw(json!({ "key": "c", "collection": "articles" })));
        assert!(meta.keys.is_empty());
        assert_eq!(meta.collection, "articles");
        assert_eq!(meta.get("key"), Some(&json!("c")));
    }

    #[test]
    fn test_numeric_keys_rendered() {
        let meta = Metadata::for_action(raw(json!({ "keys": [1, 2], "key": 3 })));
        assert_eq!(meta.keys, vec!["1", "2", "3"]);
    }

    #[test]
    fn test_extra_fields_preserved() {
        let meta = Metadata::for_action(raw(json!({
            "event": "items.update",
            "payload": { "title": "x" },
            "key": "1"
        })));
        assert_eq!(meta.get("payload"), Some(&json!({ "title": "x" })));
        assert_eq!(meta.get("key"), Some(&json!("1")));
    }

    #[test]
    fn test_serializes_with_keys() {
        let meta = Metadata::for_filter(raw(json!({ "event": "items.create", "collection": "a" })));
        let value = serde_json::to_value(&meta).unwrap();
        assert_eq!(
            value,
            json!({ "event": "items.create", "collection": "a", "keys": [] })
        );
    }
}
