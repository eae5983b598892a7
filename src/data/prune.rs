//! Removing empty members from nested JSON

use serde_json::Value;

/// Recursively drop empty members from objects and arrays.
///
/// Empty means null, `""`, or an object/array that is empty once its own
/// members were pruned. `0` and `false` are kept. Strings are scalars. A value
/// that ends up empty collapses to `None`.
pub fn remove_empty_members(value: Value) -> Option<Value> {
    match value {
        Value::Object(members) => {
            let kept: serde_json::Map<String, Value> = members
                .into_iter()
                .filter_map(|(key, member)| remove_empty_members(member).map(|m| (key, m)))
                .collect();
            (!kept.is_empty()).then_some(Value::Object(kept))
        }
        Value::Array(items) => {
            let kept: Vec<Value> = items.into_iter().filter_map(remove_empty_members).collect();
            (!kept.is_empty()).then_some(Value::Array(kept))
        }
        Value::Null => None,
        Value::String(s) if s.is_empty() => None,
        scalar => Some(scalar),
    }
}

/// Same as [`remove_empty_members`] but edits `value` where it lies.
///
/// Returns `false` when nothing survived, in which case `value` is left as
/// the empty remainder and should be treated as absent.
pub fn remove_empty_members_in_place(value: &mut Value) -> bool {
    match value {
        Value::Object(members) => {
            members.retain(|_, member| remove_empty_members_in_place(member));
            !members.is_empty()
        }
        Value::Array(items) => {
            items.retain_mut(remove_empty_members_in_place);
            !items.is_empty()
        }
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Bool(_) | Value::Number(_) => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn test_prunes_nested_empties() {
        let pruned = remove_empty_members(json!({
            "foo": "",
            "bar": [1, 2, ""],
            "baz": ["", ""],
        }));
        assert_eq!(pruned, Some(json!({"bar": [1, 2]})));
    }

    #[test]
    fn test_falsy_scalars_are_kept() {
        assert_eq!(remove_empty_members(json!(0)), Some(json!(0)));
        assert_eq!(remove_empty_members(json!(false)), Some(json!(false)));
        assert_eq!(
            remove_empty_members(json!({"n": 0, "flag": false, "s": ""})),
            Some(json!({"n": 0, "flag": false}))
        );
    }

    #[test]
    fn test_empty_scalars_collapse() {
        assert_eq!(remove_empty_members(json!("")), None);
        assert_eq!(remove_empty_members(Value::Null), None);
        assert_eq!(remove_empty_members(json!("x")), Some(json!("x")));
    }

    #[test]
    fn test_fully_empty_structures_collapse() {
        assert_eq!(remove_empty_members(json!({})), None);
        assert_eq!(remove_empty_members(json!([])), None);
        assert_eq!(
            remove_empty_members(json!({"a": {"b": [{}, [], "", null]}})),
            None
        );
    }

    #[test]
    fn test_key_order_is_preserved() {
        let pruned = remove_empty_members(json!({"z": 1, "m": "", "a": 2})).unwrap();
        let keys: Vec<&String> = pruned.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["z", "a"]);
    }

    #[test]
    fn test_in_place() {
        let mut doc = json!({"keep": [0, "", {"x": null}], "drop": {}});
        assert!(remove_empty_members_in_place(&mut doc));
        assert_eq!(doc, json!({"keep": [0]}));

        let mut empty = json!([[""], {}]);
        assert!(!remove_empty_members_in_place(&mut empty));
    }

    fn non_empty_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-z0-9]{1,8}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 1..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 1..4)
                    .prop_map(|members| Value::Object(members.into_iter().collect())),
            ]
        })
    }

    fn any_json() -> impl Strategy<Value = Value> {
        let leaf = prop_oneof![
            Just(Value::Null),
            Just(json!("")),
            any::<i64>().prop_map(Value::from),
            any::<bool>().prop_map(Value::from),
            "[a-z]{0,4}".prop_map(Value::from),
        ];
        leaf.prop_recursive(4, 32, 4, |inner| {
            prop_oneof![
                prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                    .prop_map(|members| Value::Object(members.into_iter().collect())),
            ]
        })
    }

    proptest! {
        #[test]
        fn prop_identity_without_empties(value in non_empty_json()) {
            prop_assert_eq!(remove_empty_members(value.clone()), Some(value));
        }

        #[test]
        fn prop_in_place_matches_owned(value in any_json()) {
            let owned = remove_empty_members(value.clone());
            let mut edited = value;
            let survived = remove_empty_members_in_place(&mut edited);
            prop_assert_eq!(owned, survived.then_some(edited));
        }

        #[test]
        fn prop_pruning_is_idempotent(value in any_json()) {
            let once = remove_empty_members(value);
            let twice = once.clone().and_then(remove_empty_members);
            prop_assert_eq!(once, twice);
        }
    }
}
