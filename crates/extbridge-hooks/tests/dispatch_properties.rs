//! Property-based tests for hook dispatch
//!
//! Covers metadata normalization and filter pass-through over the in-memory
//! host.

use std::sync::Arc;

use proptest::prelude::*;
use extbridge_hooks::*;
use serde_json::{json, Value};

fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z0-9-]{1,12}".prop_map(|s| s.to_string())
}

fn raw_fields(value: Value) -> RawFields {
    value.as_object().cloned().unwrap_or_default()
}

proptest! {
    /// Action metadata appends a singular `key` after the `keys` list
    #[test]
    fn prop_action_keys_append_single_key(
        keys in prop::collection::vec(key_strategy(), 0..8),
        key in key_strategy(),
    ) {
        let meta = Metadata::for_action(raw_fields(json!({
            "event": "items.update",
            "collection": "articles",
            "keys": keys.clone(),
            "key": key.clone(),
        })));

        let mut expected = keys;
        expected.push(key);
        prop_assert_eq!(meta.keys, expected);
        prop_assert_eq!(meta.event, "items.update");
        prop_assert_eq!(meta.collection, "articles");
    }

    /// Filter metadata never folds in a singular `key`
    #[test]
    fn prop_filter_ignores_single_key(
        keys in prop::collection::vec(key_strategy(), 0..8),
        key in key_strategy(),
    ) {
        let meta = Metadata::for_filter(raw_fields(json!({
            "keys": keys.clone(),
            "key": key.clone(),
        })));

        let single = json!(key);
        prop_assert_eq!(meta.get("key"), Some(&single));
        prop_assert_eq!(meta.keys, keys);
    }

    /// Missing `keys` normalizes to an empty list
    #[test]
    fn prop_missing_keys_default_empty(collection in "[a-z_]{1,16}") {
        let meta = Metadata::for_filter(raw_fields(json!({ "collection": collection })));
        prop_assert!(meta.keys.is_empty());
    }

    /// A filter returning its payload leaves the host's value unchanged
    #[test]
    fn prop_identity_filter_preserves_payload(
        title in "[a-zA-Z ]{0,20}",
        views in any::<u32>(),
    ) {
        let runtime = tokio::runtime::Runtime::new().unwrap();
        let payload = json!({ "title": title, "views": views });

        let out = runtime.block_on(async {
            let host = Arc::new(InMemoryHookHost::new());
            let context = Arc::new(ExtensionContext::builder("props").build());
            let dispatcher = HookDispatcher::new(host.clone(), context).unwrap();

            dispatcher
                .filter("items.create", |_meta: Metadata, ctx: HookContext| async move {
                    Ok::<Value, HooksError>(ctx.payload().cloned().unwrap_or(Value::Null))
                })
                .unwrap();

            host.emit_filter("items.create", payload.clone(), RawFields::new(), RawFields::new())
                .await
                .unwrap()
        });

        prop_assert_eq!(out, payload);
    }
}
