//! Deep merge precedence.

use proptest::prelude::*;
use serde_json::{json, Map, Value};

use unified_scripts::merge::deep_merge;
use unified_scripts::scripts::{Hooks, ScriptBuilder};

use crate::fixtures::downstream;

/// Small keys so generated trees collide often; hook names make the
/// default tree itself vary with the input.
fn key() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["a", "b", "c", "default", "script", "prebuild", "postbump"])
        .prop_map(str::to_string)
}

fn tree() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i32>().prop_map(Value::from),
        "[a-z ]{0,8}".prop_map(Value::from),
        prop::collection::vec(any::<u8>().prop_map(Value::from), 0..3).prop_map(Value::from),
    ];
    leaf.prop_recursive(4, 32, 4, |inner| {
        prop::collection::btree_map(key(), inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
    })
}

fn object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map(key(), tree(), 0..4)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<String, Value>>()))
}

/// Every leaf of `overlay` must appear unchanged at the same path in `merged`.
fn overlay_wins(merged: &Value, overlay: &Value) -> bool {
    match overlay {
        Value::Object(map) if merged.is_object() => map
            .iter()
            .all(|(k, v)| merged.get(k).is_some_and(|m| overlay_wins(m, v))),
        _ => merged == overlay,
    }
}

/// Every path of `base` that `overlay` does not touch survives the merge.
fn base_kept(merged: &Value, base: &Value, overlay: &Value) -> bool {
    match (base, overlay) {
        (Value::Object(b), Value::Object(o)) => b.iter().all(|(k, v)| match o.get(k) {
            Some(ov) => merged.get(k).is_some_and(|m| base_kept(m, v, ov)),
            None => merged.get(k) == Some(v),
        }),
        _ => true,
    }
}

proptest! {
    #[test]
    fn prop_overlay_leaves_take_precedence(base in object(), overlay in object()) {
        let merged = deep_merge(base.clone(), overlay.clone());
        prop_assert!(overlay_wins(&merged, &overlay));
        prop_assert!(base_kept(&merged, &base, &overlay));
    }

    #[test]
    fn prop_merge_with_empty_is_identity(base in object()) {
        prop_assert_eq!(deep_merge(base.clone(), json!({})), base.clone());
        prop_assert_eq!(deep_merge(json!({}), base.clone()), base);
    }

    #[test]
    fn prop_merge_is_idempotent_on_self(base in object()) {
        prop_assert_eq!(deep_merge(base.clone(), base.clone()), base);
    }

    #[test]
    fn prop_build_equals_merge_of_defaults(scripts in object()) {
        let input = json!({ "scripts": scripts });
        let hooks = Hooks::detect(&input);
        let defaults = ScriptBuilder::default().default_scripts(&hooks).to_value();

        let tree = downstream(input.clone());
        prop_assert_eq!(&tree["scripts"], &deep_merge(defaults, input["scripts"].clone()));
        prop_assert_eq!(&tree["options"]["logLevel"], &json!("warn"));
    }
}

#[test]
fn test_hook_input_changes_defaults_before_merge() {
    let input = json!({"scripts": {"prebuild": "codegen", "postbump": {"script": "git push"}}});
    let hooks = Hooks::detect(&input);
    assert!(hooks.prebuild && hooks.postbump);
    let defaults = ScriptBuilder::default().default_scripts(&hooks).to_value();
    assert!(defaults["build"]["default"]["script"]
        .as_str()
        .unwrap()
        .starts_with("nps prebuild && "));

    let tree = downstream(input.clone());
    assert_eq!(tree["scripts"], deep_merge(defaults, input["scripts"].clone()));
}

#[test]
fn test_user_options_merge_with_generated_options() {
    let tree = downstream(json!({"options": {"silent": true}}));
    assert_eq!(tree["options"], json!({"logLevel": "warn", "silent": true}));

    let tree = downstream(json!({"options": {"logLevel": "info"}}));
    assert_eq!(tree["options"]["logLevel"], "info");
}

#[test]
fn test_user_leaf_replaces_generated_group() {
    let tree = downstream(json!({"scripts": {"test": "mocha"}}));
    assert_eq!(tree["scripts"]["test"], "mocha");
}

#[test]
fn test_user_variant_added_to_generated_group() {
    let tree = downstream(json!({
        "scripts": {"test": {"e2e": {"description": "End to end.", "script": "playwright test"}}}
    }));
    assert_eq!(tree["scripts"]["test"]["default"]["script"], "unified.jest");
    assert_eq!(tree["scripts"]["test"]["e2e"]["script"], "playwright test");
}
