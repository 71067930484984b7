//! Tests for configuration resolution across mappings: overlapping
//! configurations validate independently, guards and patterns scope per
//! node, unmatched mappings are skipped silently.

use serde_json::json;
use ymlint::test_utils::{fix_source, lint_source, messages};

#[test]
fn overlapping_configs_each_report_their_own_violation() {
    let source = "b: 2\na: 1\n";
    let options = json!([
        { "pathPattern": "^$", "order": ["a", "b"] },
        { "pathPattern": "^$", "order": { "type": "asc" } }
    ]);
    let findings = lint_source(source, &options).unwrap();
    assert_eq!(
        messages(&findings),
        vec![
            "Expected mapping keys to be in specified order. 'a' should be before 'b'.",
            "Expected mapping keys to be in ascending order. 'a' should be before 'b'.",
        ]
    );
    // Both findings concern the same key, separately.
    assert_eq!(findings[0].line, findings[1].line);
}

#[test]
fn one_fix_can_satisfy_agreeing_configs() {
    let source = "b: 2\na: 1\n";
    let options = json!([
        { "pathPattern": "^$", "order": ["a", "b"] },
        { "pathPattern": "^$", "order": { "type": "asc" } }
    ]);
    let fixed = fix_source(source, &options).unwrap();
    assert_eq!(fixed, "a: 1\nb: 2\n");
    let findings = lint_source(&fixed, &options).unwrap();
    assert!(findings.is_empty(), "expected no findings: {findings:?}");
}

#[test]
fn guarded_wildcard_matches_root_and_nested_mappings() {
    let source = "\
type: object
items:
  type: array
  minItems: 1
";
    let options = json!([
        { "pathPattern": ".*", "hasProperties": ["type"], "order": { "type": "asc" } }
    ]);
    let findings = lint_source(source, &options).unwrap();
    assert_eq!(
        messages(&findings),
        vec![
            "Expected mapping keys to be in ascending order. 'items' should be before 'type'.",
            "Expected mapping keys to be in ascending order. 'minItems' should be before 'type'.",
        ]
    );
    // Outer mapping first, nested mapping second.
    assert!(findings[0].line < findings[1].line);
}

#[test]
fn guard_requires_every_listed_property() {
    let source = "b: 2\na: 1\n";
    let options = json!([
        { "pathPattern": ".*", "hasProperties": ["a", "missing"], "order": { "type": "asc" } }
    ]);
    let findings = lint_source(source, &options).unwrap();
    assert!(findings.is_empty(), "expected no findings: {findings:?}");
}

#[test]
fn unmatched_mappings_are_skipped_silently() {
    let source = "b: 2\na: 1\n";
    let options = json!([
        { "pathPattern": "^elsewhere$", "order": { "type": "asc" } }
    ]);
    let findings = lint_source(source, &options).unwrap();
    assert!(findings.is_empty(), "expected no findings: {findings:?}");
}

#[test]
fn empty_options_disable_the_rule() {
    let findings = lint_source("b: 2\na: 1\n", &json!([])).unwrap();
    assert!(findings.is_empty(), "expected no findings: {findings:?}");
}

#[test]
fn path_scoped_config_does_not_leak_to_siblings() {
    let source = "\
tight:
  b: 2
  a: 1
loose:
  b: 2
  a: 1
";
    let options = json!([
        { "pathPattern": "^tight$", "order": { "type": "asc" } }
    ]);
    let findings = lint_source(source, &options).unwrap();
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].line, 3);
}
