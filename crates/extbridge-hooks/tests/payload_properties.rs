//! Property-based tests for payload reading
//!
//! Covers undeclared-field preservation, rejection diagnostics and
//! first-match union ordering.

use proptest::prelude::*;
use extbridge_hooks::*;
use serde_json::{json, Map, Value};

/// Strategy for undeclared field names that never collide with `title`
fn extra_key_strategy() -> impl Strategy<Value = String> {
    "x_[a-z]{1,8}".prop_map(|s| s.to_string())
}

/// Strategy for scalar JSON values
fn scalar_strategy() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::from),
        any::<bool>().prop_map(Value::from),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::from),
        Just(Value::Null),
    ]
}

fn extras_strategy() -> impl Strategy<Value = Map<String, Value>> {
    prop::collection::btree_map(extra_key_strategy(), scalar_strategy(), 0..6)
        .prop_map(|entries| entries.into_iter().collect())
}

fn article_schema_shape() -> ObjectShape {
    ObjectShape::new().field("title", FieldKind::String)
}

fn article_schema() -> Schema {
    article_schema_shape().into()
}

proptest! {
    /// Every undeclared field survives a successful read unchanged
    #[test]
    fn prop_undeclared_fields_preserved(
        title in "[a-zA-Z ]{1,20}",
        extras in extras_strategy(),
    ) {
        let mut payload = extras.clone();
        payload.insert("title".to_string(), json!(title));
        let payload = Value::Object(payload);

        let accepted = read(&payload, &article_schema()).unwrap();
        prop_assert_eq!(accepted, payload);
    }

    /// A payload missing a required field is rejected with a path to it
    #[test]
    fn prop_missing_required_field_rejected(extras in extras_strategy()) {
        let payload = Value::Object(extras);

        match read(&payload, &article_schema()) {
            Err(HooksError::Validation(err)) => {
                prop_assert!(err
                    .diagnostic
                    .issues
                    .iter()
                    .any(|issue| issue.path == "title" && issue.message == "required"));
            }
            other => prop_assert!(false, "unexpected outcome: {:?}", other),
        }
    }

    /// Non-object payloads are never accepted
    #[test]
    fn prop_non_objects_rejected(value in scalar_strategy()) {
        prop_assert!(read(&value, &article_schema()).is_err());
    }

    /// When several union members accept a value, the first one wins
    #[test]
    fn prop_union_first_match_wins(
        members in 2usize..6,
        extras in extras_strategy(),
    ) {
        let shapes = (0..members).map(|index| {
            ObjectShape::new().field(
                "matched_by",
                Field::new(FieldKind::Integer).default_value(json!(index)),
            )
        });
        let schema = Schema::union(shapes).unwrap();
        prop_assert_eq!(schema.alternatives(), members);

        let accepted = read(&Value::Object(extras), &schema).unwrap();
        prop_assert_eq!(accepted["matched_by"].clone(), json!(0));
    }

    /// Nested passthrough extras stay nested and top-level extras stay on top
    /// when a later union member accepts
    #[test]
    fn prop_union_preserves_nested_and_top_level_extras(
        city in "[A-Za-z]{1,12}",
        nested in extras_strategy(),
        top in extras_strategy(),
    ) {
        let address = ObjectShape::new().field("city", FieldKind::String).keep_unknown();
        let located = ObjectShape::new().field("addr", FieldKind::Object(address));
        let schema = Schema::union(vec![article_schema_shape(), located]).unwrap();

        let mut addr = nested;
        addr.insert("city".to_string(), json!(city));
        let mut payload = top;
        payload.insert("addr".to_string(), Value::Object(addr));
        let payload = Value::Object(payload);

        let accepted = read(&payload, &schema).unwrap();
        prop_assert_eq!(accepted, payload);
    }

    /// A union rejection reports one root issue plus every member's issues
    #[test]
    fn prop_union_rejection_lists_members(members in 1usize..5) {
        let shapes = (0..members).map(|index| {
            ObjectShape::new().field(format!("field_{index}"), FieldKind::String)
        });
        let schema = Schema::union(shapes).unwrap();

        match read(&json!({}), &schema) {
            Err(HooksError::Validation(err)) => {
                prop_assert_eq!(err.diagnostic.issues.len(), members + 1);
                for index in 0..members {
                    let prefix = format!("union[{index}]");
                    prop_assert!(err
                        .diagnostic
                        .issues
                        .iter()
                        .any(|issue| issue.path.starts_with(&prefix)));
                }
            }
            other => prop_assert!(false, "unexpected outcome: {:?}", other),
        }
    }
}

#[test]
fn test_empty_union_is_configuration_error() {
    let result = Schema::union(Vec::<ObjectShape>::new());
    assert!(matches!(result, Err(HooksError::InvalidConfiguration(_))));
}
