//! Integration tests for oneOf / allOf / anyOf resolution.

use jsonview::schema::{walk_value, Kind, Property, SchemaNode};
use jsonview::CompileError;
use serde_json::json;

fn leaf_paths(props: &[Property]) -> Vec<(&str, Kind)> {
    props
        .iter()
        .filter_map(|p| match p {
            Property::Leaf(leaf) => Some((leaf.path.as_str(), leaf.kind)),
            _ => None,
        })
        .collect()
}

#[test]
fn test_one_of_branches_union() {
    let props = walk_value(&json!({
        "type": "object",
        "properties": {"kind": {"type": "string"}},
        "oneOf": [
            {"properties": {"width": {"type": "number"}}},
            {"properties": {"radius": {"type": "number"}}},
        ],
    }))
    .unwrap();

    assert_eq!(
        leaf_paths(&props),
        vec![
            ("kind", Kind::String),
            ("width", Kind::Float),
            ("radius", Kind::Float),
        ]
    );
}

#[test]
fn test_quantifier_order_is_one_of_all_of_any_of() {
    let props = walk_value(&json!({
        "type": "object",
        "anyOf": [{"properties": {"c": {"type": "integer"}}}],
        "allOf": [{"properties": {"b": {"type": "integer"}}}],
        "oneOf": [{"properties": {"a": {"type": "integer"}}}],
    }))
    .unwrap();

    let paths: Vec<&str> = props.iter().map(Property::path).collect();
    assert_eq!(paths, ["a", "b", "c"]);
}

#[test]
fn test_quantifiers_only_object() {
    let props = walk_value(&json!({
        "type": "object",
        "allOf": [
            {"properties": {"a": {"type": "integer"}}},
            {"properties": {"b": {"type": "boolean"}}},
        ],
    }))
    .unwrap();

    assert_eq!(
        leaf_paths(&props),
        vec![("a", Kind::Integer), ("b", Kind::Boolean)]
    );
}

#[test]
fn test_identical_declarations_merge_silently() {
    let props = walk_value(&json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}},
        "oneOf": [
            {"properties": {"a": {"type": "integer"}}},
            {"properties": {"a": {"type": "integer"}}},
        ],
    }))
    .unwrap();

    assert_eq!(leaf_paths(&props), vec![("a", Kind::Integer)]);
}

#[test]
fn test_conflicting_types_raise_schema_conflict() {
    let err = walk_value(&json!({
        "type": "object",
        "oneOf": [
            {"properties": {"a": {"type": "integer"}}},
            {"properties": {"a": {"type": "string"}}},
        ],
    }))
    .unwrap_err();

    assert_eq!(
        err,
        CompileError::SchemaConflict {
            key: "type".into(),
            left: json!("integer"),
            right: json!("string"),
        }
    );
}

#[test]
fn test_conflicting_formats_raise_schema_conflict() {
    let err = walk_value(&json!({
        "type": "object",
        "anyOf": [
            {"properties": {"at": {"type": "string", "format": "date"}}},
            {"properties": {"at": {"type": "string", "format": "date-time"}}},
        ],
    }))
    .unwrap_err();

    assert!(matches!(err, CompileError::SchemaConflict { key, .. } if key == "format"));
}

#[test]
fn test_cosmetic_keys_later_branch_wins() {
    let root = SchemaNode::parse(&json!({
        "type": "object",
        "oneOf": [
            {"properties": {"a": {"type": "integer", "title": "First"}}},
            {"properties": {"a": {"type": "integer", "title": "Second"}}},
        ],
    }))
    .unwrap();

    let SchemaNode::Scalar(a) = root.as_object().unwrap().get("a").unwrap() else {
        panic!("expected scalar");
    };
    assert_eq!(a.title.as_deref(), Some("Second"));
}

#[test]
fn test_enum_lists_concatenate() {
    let root = SchemaNode::parse(&json!({
        "type": "object",
        "oneOf": [
            {"properties": {"s": {"type": "string", "enum": ["a"]}}},
            {"properties": {"s": {"type": "string", "enum": ["b"]}}},
        ],
    }))
    .unwrap();

    let SchemaNode::Scalar(s) = root.as_object().unwrap().get("s").unwrap() else {
        panic!("expected scalar");
    };
    assert_eq!(s.enum_values, Some(vec![json!("a"), json!("b")]));
}

#[test]
fn test_nested_objects_merge_recursively() {
    let props = walk_value(&json!({
        "type": "object",
        "oneOf": [
            {"properties": {"addr": {"type": "object", "properties": {"zip": {"type": "string"}}}}},
            {"properties": {"addr": {"type": "object", "properties": {"city": {"type": "string"}}}}},
        ],
    }))
    .unwrap();

    let paths: Vec<&str> = props.iter().map(Property::path).collect();
    assert_eq!(paths, ["addr.zip", "addr.city"]);
}

#[test]
fn test_quantifier_inside_nested_object() {
    let props = walk_value(&json!({
        "type": "object",
        "properties": {
            "shape": {
                "type": "object",
                "oneOf": [{"properties": {"sides": {"type": "integer"}}}],
            },
        },
    }))
    .unwrap();

    assert_eq!(leaf_paths(&props), vec![("shape.sides", Kind::Integer)]);
}

#[test]
fn test_malformed_quantifier_rejected() {
    let err = walk_value(&json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}},
        "oneOf": {"properties": {}},
    }))
    .unwrap_err();

    assert!(matches!(err, CompileError::InvalidSchema(_)));
}
