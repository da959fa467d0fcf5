//! Integration tests for top-level view compilation.

use insta::assert_snapshot;
use jsonview::compile::{compile, BaseQuery, CompileOptions, DocumentColumn, ViewRole};
use jsonview::schema::{DatePart, Encoding, Kind};
use jsonview::sql::{col, ExprExt, TableRef};
use jsonview::CompileError;
use serde_json::json;

fn forms() -> BaseQuery {
    BaseQuery::new(TableRef::new("forms"), DocumentColumn::jsonb("data"))
        .columns(["id", "tenant_id", "data"])
        .filter(col("tenant_id").eq(1))
}

fn no_indexes() -> CompileOptions {
    CompileOptions::default().with_indexes(false)
}

// ============================================================================
// Basic Views
// ============================================================================

#[test]
fn test_two_leaf_schema() {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
    });

    let output = compile("forms_v", &forms(), &schema, &CompileOptions::default()).unwrap();

    assert_snapshot!(output.sql, @r#"
    CREATE VIEW "forms_v" AS
    SELECT
      "id",
      jsonb_int("data", 'a') AS "data.a",
      jsonb_string("data", 'b') AS "data.b"
    FROM "forms"
    WHERE "tenant_id" = 1;

    CREATE INDEX IF NOT EXISTS "forms_Q-nJHGGslH9LVw_3S0FJgQTjDBXQA" ON "forms" ((jsonb_int("data", 'a'))) WHERE "tenant_id" = 1;

    CREATE INDEX IF NOT EXISTS "forms_Q-nJHGGslH9LVw_Kc7KK6Qz99DK_w" ON "forms" ((jsonb_string("data", 'b'))) WHERE "tenant_id" = 1;
    "#);

    let leaves: Vec<(&str, Kind)> = output
        .leaves
        .iter()
        .map(|l| (l.path.as_str(), l.kind))
        .collect();
    assert_eq!(leaves, vec![("a", Kind::Integer), ("b", Kind::String)]);
}

#[test]
fn test_json_encoding_uses_json_functions() {
    let base = BaseQuery::new(TableRef::new("forms"), DocumentColumn::json("data"))
        .filter(col("tenant_id").eq(1));
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
    });

    let output = compile("forms_v", &base, &schema, &CompileOptions::default()).unwrap();

    let names: Vec<&str> = output.indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        names,
        ["forms_Q-nJHGGslH9LVw_-082WM1iPh7wtA", "forms_Q-nJHGGslH9LVw_71n1QLYKsJcX9g"]
    );
    assert!(output.sql.contains("json_int(\"data\", 'a') AS \"data.a\""));
    assert!(!output.sql.contains("jsonb_"));
}

#[test]
fn test_leaf_count_matches_schema() {
    let schema = json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer"},
            "b": {"type": "object", "properties": {"c": {"type": "boolean"}, "d": {"type": "number"}}},
            "e": {"type": "string", "format": "date"},
        },
    });

    let output = compile("forms_v", &forms(), &schema, &no_indexes()).unwrap();

    assert_eq!(output.views.len(), 1);
    let view = &output.views[0];
    assert_eq!(view.role, ViewRole::Typed);
    let labels: Vec<&str> = view.labels().collect();
    assert_eq!(labels, ["id", "data.a", "data.b.c", "data.b.d", "data.e"]);
    assert_eq!(output.statements.len(), 1);
}

#[test]
fn test_scalar_arrays_not_rendered() {
    let schema = json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer"},
            "tags": {"type": "array", "items": {"type": "string"}},
        },
    });

    let output = compile("forms_v", &forms(), &schema, &CompileOptions::default()).unwrap();

    assert!(!output.sql.contains("tags"));
    assert_eq!(output.indexes.len(), 1);
}

// ============================================================================
// Pinned Columns
// ============================================================================

#[test]
fn test_pinned_columns_dropped() {
    let base = BaseQuery::new(TableRef::new("forms"), DocumentColumn::jsonb("data"))
        .columns(["id", "tenant_id", "type_id", "created_by", "data"])
        .filter(col("tenant_id").eq(1))
        .filter(col("type_id").eq(7));
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});

    let output = compile("forms_v", &base, &schema, &CompileOptions::default()).unwrap();

    let labels: Vec<&str> = output.views[0].labels().collect();
    assert_eq!(labels, ["id", "created_by", "data.a"]);
    assert!(output.sql.contains("WHERE \"tenant_id\" = 1 AND \"type_id\" = 7"));
    assert_eq!(
        output.indexes[0].name,
        "forms_5R9GC0vah6M6Yg_3S0FJgQTjDBXQA"
    );
}

#[test]
fn test_string_predicate_hashes_rendered_literal() {
    let base = BaseQuery::new(TableRef::new("forms"), DocumentColumn::jsonb("data"))
        .filter(col("tenant_id").eq("acme"));
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});

    let output = compile("forms_v", &base, &schema, &CompileOptions::default()).unwrap();

    assert_eq!(
        output.indexes[0].name,
        "forms_kXVpaRHWpoLTUQ_3S0FJgQTjDBXQA"
    );
}

#[test]
fn test_unfiltered_base_has_no_where() {
    let base = BaseQuery::new(TableRef::new("forms"), DocumentColumn::jsonb("data")).column("id");
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});

    let output = compile("forms_v", &base, &schema, &CompileOptions::default()).unwrap();

    assert!(!output.sql.contains("WHERE"));
    assert_eq!(output.indexes[0].name, "forms_47DEQpj8HBSa-w_3S0FJgQTjDBXQA");
    assert_eq!(output.indexes[0].predicate, None);
}

// ============================================================================
// Options
// ============================================================================

#[test]
fn test_replace_emits_or_replace() {
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});
    let output = compile(
        "forms_v",
        &forms(),
        &schema,
        &no_indexes().with_replace(true),
    )
    .unwrap();

    assert!(output.sql.starts_with("CREATE OR REPLACE VIEW \"forms_v\" AS"));
}

#[test]
fn test_drop_existing_indexes_precedes_each_create() {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
    });
    let output = compile(
        "forms_v",
        &forms(),
        &schema,
        &CompileOptions::default().with_drop_existing_indexes(true),
    )
    .unwrap();

    let statements = output.statement_sql();
    assert_eq!(statements.len(), 5);
    assert!(statements[0].starts_with("CREATE VIEW"));
    assert_eq!(
        statements[1],
        "DROP INDEX IF EXISTS \"forms_Q-nJHGGslH9LVw_3S0FJgQTjDBXQA\""
    );
    assert!(statements[2].starts_with("CREATE INDEX IF NOT EXISTS \"forms_Q-nJHGGslH9LVw_3S0FJgQTjDBXQA\""));
    assert_eq!(
        statements[3],
        "DROP INDEX IF EXISTS \"forms_Q-nJHGGslH9LVw_Kc7KK6Qz99DK_w\""
    );
    assert!(statements[4].starts_with("CREATE INDEX IF NOT EXISTS \"forms_Q-nJHGGslH9LVw_Kc7KK6Qz99DK_w\""));
}

#[test]
fn test_date_parts_follow_their_leaf() {
    let schema = json!({
        "type": "object",
        "properties": {
            "ts": {"type": "string", "format": "date-time"},
            "n": {"type": "integer"},
        },
    });
    let options = no_indexes().with_date_parts([DatePart::Year, DatePart::Month]);

    let output = compile("forms_v", &forms(), &schema, &options).unwrap();

    let labels: Vec<&str> = output.views[0].labels().collect();
    assert_eq!(
        labels,
        ["id", "data.ts", "data.ts_year", "data.ts_month", "data.n"]
    );
    assert!(output.sql.contains(
        "DATE_PART('year', jsonb_datetime(\"data\", 'ts')) AS \"data.ts_year\""
    ));
    assert_eq!(
        output.leaves[0].date_parts,
        vec![DatePart::Year, DatePart::Month]
    );
    assert!(output.leaves[1].date_parts.is_empty());
}

#[test]
fn test_date_part_label_collision_rejected() {
    let schema = json!({
        "type": "object",
        "properties": {
            "ts": {"type": "string", "format": "date"},
            "ts_year": {"type": "integer"},
        },
    });
    let options = no_indexes().with_date_parts([DatePart::Year]);

    let err = compile("forms_v", &forms(), &schema, &options).unwrap_err();

    assert_eq!(
        err,
        CompileError::InvalidSchema("duplicate column label 'data.ts_year'".into())
    );
}

#[test]
fn test_schema_qualified_view_name() {
    let base = BaseQuery::new(
        TableRef::new("forms").with_schema("app"),
        DocumentColumn::new("doc", Encoding::Jsonb),
    );
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});

    let output = compile("reporting.forms_v", &base, &schema, &no_indexes()).unwrap();

    assert!(output
        .sql
        .starts_with("CREATE VIEW \"reporting\".\"forms_v\" AS"));
    assert!(output.sql.contains("FROM \"app\".\"forms\""));
    assert!(output.sql.contains("jsonb_int(\"doc\", 'a') AS \"doc.a\""));
}

// ============================================================================
// Idempotence And Failure
// ============================================================================

#[test]
fn test_recompiling_is_deterministic() {
    let schema = json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer"},
            "b": {"type": "object", "properties": {"c": {"type": "string"}}},
        },
    });

    let first = compile("forms_v", &forms(), &schema, &CompileOptions::default()).unwrap();
    let second = compile("forms_v", &forms(), &schema, &CompileOptions::default()).unwrap();

    assert_eq!(first.sql, second.sql);
    let names: Vec<&str> = first.indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names.len(), 2);
    assert_ne!(names[0], names[1]);
}

#[test]
fn test_invalid_schema_yields_no_output() {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}, "b": {"type": "string", "format": "uuid"}},
    });

    let result = compile("forms_v", &forms(), &schema, &CompileOptions::default());

    assert!(matches!(result, Err(CompileError::InvalidSchema(_))));
}
