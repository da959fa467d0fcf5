//! Integration tests for partial index planning and naming.

use jsonview::compile::{compile, BaseQuery, CompileOptions, DocumentColumn};
use jsonview::index_name::{index_name, short_hash, MAX_IDENTIFIER_LEN};
use jsonview::schema::DatePart;
use jsonview::sql::{col, ExprExt, TableRef};
use serde_json::json;

fn forms() -> BaseQuery {
    BaseQuery::new(TableRef::new("forms"), DocumentColumn::jsonb("data"))
        .columns(["id", "tenant_id", "data"])
        .filter(col("tenant_id").eq(1))
}

// ============================================================================
// Naming
// ============================================================================

#[test]
fn test_name_is_table_predicate_hash_expression_hash() {
    assert_eq!(
        index_name("forms", "\"tenant_id\" = 1", "jsonb_int(\"data\", 'a')"),
        format!(
            "forms_{}_{}",
            short_hash("\"tenant_id\" = 1"),
            short_hash("jsonb_int(\"data\", 'a')")
        )
    );
}

#[test]
fn test_predicate_changes_name() {
    let a = index_name("forms", "\"tenant_id\" = 1", "jsonb_int(\"data\", 'a')");
    let b = index_name("forms", "\"tenant_id\" = 2", "jsonb_int(\"data\", 'a')");
    assert_eq!(a, "forms_Q-nJHGGslH9LVw_3S0FJgQTjDBXQA");
    assert_eq!(b, "forms_qGrCHRSl3sNphA_3S0FJgQTjDBXQA");
}

#[test]
fn test_long_table_name_truncated_to_identifier_limit() {
    let base = BaseQuery::new(
        TableRef::new("customer_feedback_submissions_archive_2024"),
        DocumentColumn::jsonb("data"),
    );
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});

    let output = compile("feedback_v", &base, &schema, &CompileOptions::default()).unwrap();

    let name = &output.indexes[0].name;
    assert_eq!(name, "customer_feedback__Fw2_aoUnv3lnSA_47DEQpj8HBSa-w_3S0FJgQTjDBXQA");
    assert_eq!(name.len(), MAX_IDENTIFIER_LEN);
}

#[test]
fn test_truncation_respects_char_boundaries() {
    let name = index_name("ünïcødé_table_name_with_many_chars_x", "", "x");
    assert!(name.starts_with("ünïcødé_table__Wy18YNC1F7adNA_"));
    assert!(name.len() <= MAX_IDENTIFIER_LEN);
}

#[test]
fn test_changing_one_expression_changes_only_its_name() {
    let schema = |a_type: &str| {
        json!({
            "type": "object",
            "properties": {"a": {"type": a_type}, "b": {"type": "string"}},
        })
    };
    let names = |a_type: &str| -> Vec<String> {
        compile("forms_v", &forms(), &schema(a_type), &CompileOptions::default())
            .unwrap()
            .indexes
            .into_iter()
            .map(|i| i.name)
            .collect()
    };

    let original = names("integer");
    let changed = names("string");
    assert_eq!(
        original,
        ["forms_Q-nJHGGslH9LVw_3S0FJgQTjDBXQA", "forms_Q-nJHGGslH9LVw_Kc7KK6Qz99DK_w"]
    );
    assert_eq!(changed[0], "forms_Q-nJHGGslH9LVw_M_2nPKXbyEptPQ");
    assert_eq!(changed[1], original[1]);

    assert_eq!(names("integer"), original);
}

// ============================================================================
// Planning
// ============================================================================

#[test]
fn test_one_index_per_leaf_under_base_predicate() {
    let schema = json!({
        "type": "object",
        "properties": {
            "a": {"type": "integer"},
            "b": {"type": "string"},
            "c": {"type": "boolean"},
        },
    });

    let output = compile("forms_v", &forms(), &schema, &CompileOptions::default()).unwrap();

    assert_eq!(output.indexes.len(), 3);
    for index in &output.indexes {
        assert_eq!(index.relation, TableRef::new("forms"));
        assert_eq!(index.predicate, Some(col("tenant_id").eq(1)));
        assert!(index.name.starts_with("forms_Q-nJHGGslH9LVw_"));
    }
}

#[test]
fn test_no_indexes_option() {
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});

    let output = compile(
        "forms_v",
        &forms(),
        &schema,
        &CompileOptions::default().with_indexes(false),
    )
    .unwrap();

    assert!(output.indexes.is_empty());
    assert!(!output.sql.contains("CREATE INDEX"));
}

#[test]
fn test_geopoint_uses_gist() {
    let schema = json!({
        "type": "object",
        "properties": {"loc": {"type": "string", "format": "geopoint"}},
    });

    let output = compile("forms_v", &forms(), &schema, &CompileOptions::default()).unwrap();

    assert_eq!(output.indexes[0].using.as_deref(), Some("gist"));
    assert_eq!(output.indexes[0].name, "forms_Q-nJHGGslH9LVw_gkXhQx4IEXMfKA");
    assert!(output
        .sql
        .contains("ON \"forms\" USING gist ((jsonb_geopoint(\"data\", 'loc')))"));
}

#[test]
fn test_date_parts_indexed_for_timestamp_without_zone() {
    let schema = json!({
        "type": "object",
        "properties": {"ts": {"type": "string", "format": "date-time-no-tz"}},
    });
    let options = CompileOptions::default().with_date_parts([DatePart::Year]);

    let output = compile("forms_v", &forms(), &schema, &options).unwrap();

    let names: Vec<&str> = output.indexes.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(
        names,
        [
            "forms_Q-nJHGGslH9LVw_0IXbBCdkZRuNQQ",
            "forms_Q-nJHGGslH9LVw_3xaE77W5RaOgEA",
        ]
    );
    assert_eq!(
        output.indexes[1].expression_sql(),
        "DATE_PART('year', jsonb_datetime_no_tz(\"data\", 'ts'))"
    );
}

#[test]
fn test_date_parts_not_indexed_for_zoned_timestamp() {
    let schema = json!({
        "type": "object",
        "properties": {"at": {"type": "string", "format": "date-time"}},
    });
    let options = CompileOptions::default().with_date_parts([DatePart::Year, DatePart::Month]);

    let output = compile("forms_v", &forms(), &schema, &options).unwrap();

    // Columns are still exposed; only the leaf itself is indexed.
    let labels: Vec<&str> = output.views[0].labels().collect();
    assert_eq!(labels, ["id", "data.at", "data.at_year", "data.at_month"]);
    assert_eq!(output.indexes.len(), 1);
    assert_eq!(output.indexes[0].name, "forms_Q-nJHGGslH9LVw_jrz05NHZJdrZ7Q");
}

#[test]
fn test_indexes_follow_their_view() {
    let schema = json!({
        "type": "object",
        "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
    });

    let output = compile("forms_v", &forms(), &schema, &CompileOptions::default()).unwrap();

    let statements = output.statement_sql();
    assert!(statements[0].starts_with("CREATE VIEW"));
    assert!(statements[1..].iter().all(|s| s.starts_with("CREATE INDEX")));
    assert_eq!(
        statements[1],
        "CREATE INDEX IF NOT EXISTS \"forms_Q-nJHGGslH9LVw_3S0FJgQTjDBXQA\" ON \"forms\" ((jsonb_int(\"data\", 'a'))) WHERE \"tenant_id\" = 1"
    );
}

#[test]
fn test_drop_index_is_schema_qualified() {
    let base = BaseQuery::new(
        TableRef::new("forms").with_schema("app"),
        DocumentColumn::jsonb("data"),
    )
    .filter(col("tenant_id").eq(1));
    let schema = json!({"type": "object", "properties": {"a": {"type": "integer"}}});

    let output = compile(
        "forms_v",
        &base,
        &schema,
        &CompileOptions::default().with_drop_existing_indexes(true),
    )
    .unwrap();

    let statements = output.statement_sql();
    assert_eq!(
        statements[1],
        "DROP INDEX IF EXISTS \"app\".\"forms_Q-nJHGGslH9LVw_3S0FJgQTjDBXQA\""
    );
    assert!(statements[2].contains("ON \"app\".\"forms\""));
}
