//! Tests for option parsing and activation-time error handling.

use serde_json::json;
use ymlint::rules::get_ordering_rules;
use ymlint::rules::sort_keys::config::OptionsError;
use ymlint::rules::sort_keys::SortKeysRule;
use ymlint::Rule;

#[test]
fn activation_succeeds_for_the_full_schema() {
    let rules = get_ordering_rules(&json!([
        {
            "pathPattern": "^$",
            "hasProperties": ["kind"],
            "order": [
                "kind",
                { "keyPattern": "^meta", "order": { "type": "desc", "natural": true } },
                { "order": { "type": "asc", "caseSensitive": false } }
            ]
        }
    ]))
    .unwrap();
    assert_eq!(rules.len(), 1);
    assert_eq!(rules[0].code(), "YML-O001");
    assert_eq!(rules[0].category(), "ordering");
}

#[test]
fn invalid_path_pattern_aborts_activation() {
    let err = SortKeysRule::from_json(&json!([
        { "pathPattern": "(", "order": { "type": "asc" } }
    ]))
    .unwrap_err();
    assert!(matches!(err, OptionsError::InvalidPathPattern { .. }));
    let text = err.to_string();
    assert!(
        text.contains("invalid path pattern `(`"),
        "unexpected error text: {text}"
    );
}

#[test]
fn invalid_key_pattern_aborts_activation() {
    let err = SortKeysRule::from_json(&json!([
        {
            "pathPattern": "^$",
            "order": [{ "keyPattern": "[", "order": { "type": "asc" } }]
        }
    ]))
    .unwrap_err();
    assert!(matches!(err, OptionsError::InvalidKeyPattern { .. }));
}

#[test]
fn second_catch_all_group_aborts_activation() {
    let err = SortKeysRule::from_json(&json!([
        {
            "pathPattern": "^$",
            "order": [
                "a",
                { "order": { "type": "asc" } },
                { "order": { "type": "desc" } }
            ]
        }
    ]))
    .unwrap_err();
    assert!(matches!(err, OptionsError::DuplicateRestGroup));
}

#[test]
fn malformed_options_shape_aborts_activation() {
    let err = SortKeysRule::from_json(&json!([
        { "pathPattern": "^$", "order": 42 }
    ]))
    .unwrap_err();
    assert!(matches!(err, OptionsError::Parse(_)));

    let err = SortKeysRule::from_json(&json!({ "pathPattern": "^$" })).unwrap_err();
    assert!(matches!(err, OptionsError::Parse(_)));
}

#[test]
fn unknown_option_fields_are_rejected() {
    let err = SortKeysRule::from_json(&json!([
        { "pathPattern": "^$", "order": { "type": "asc" }, "surprise": true }
    ]))
    .unwrap_err();
    assert!(matches!(err, OptionsError::Parse(_)));
}

#[test]
fn invalid_type_value_is_rejected() {
    let err = SortKeysRule::from_json(&json!([
        { "pathPattern": "^$", "order": { "type": "sideways" } }
    ]))
    .unwrap_err();
    assert!(matches!(err, OptionsError::Parse(_)));
}
