//! Integration tests for TOML settings.

use jsonview::compile::CompileOptions;
use jsonview::config::{Settings, SettingsError};
use jsonview::schema::{DatePart, Encoding};
use std::fs;
use std::path::PathBuf;

fn write_temp(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("jsonview-{}-{}", std::process::id(), name));
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_from_file() {
    let path = write_temp(
        "full.toml",
        r#"
[compile]
encoding = "json"
indexes = false
replace = true
drop_existing_indexes = true
use_materialized_view = true
extract_date_parts = ["year", "quarter", "doy"]
"#,
    );

    let settings = Settings::from_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    assert_eq!(settings.compile.encoding, Encoding::Json);
    assert_eq!(
        settings.compile.to_options(),
        CompileOptions::default()
            .with_indexes(false)
            .with_replace(true)
            .with_drop_existing_indexes(true)
            .with_materialized_view(true)
            .with_date_parts([DatePart::Year, DatePart::Quarter, DatePart::DayOfYear])
    );
}

#[test]
fn test_partial_section_keeps_defaults() {
    let settings = Settings::from_toml("[compile]\nreplace = true\n").unwrap();

    assert_eq!(settings.compile.encoding, Encoding::Jsonb);
    assert!(settings.compile.indexes);
    assert!(settings.compile.replace);
    assert!(!settings.compile.use_materialized_view);
}

#[test]
fn test_camel_case_keys_accepted() {
    let settings = Settings::from_toml(
        "[compile]\nuseMaterializedView = true\nextractDateParts = [\"month\"]\n",
    )
    .unwrap();

    assert!(settings.compile.use_materialized_view);
    assert_eq!(settings.compile.extract_date_parts, vec![DatePart::Month]);
}

#[test]
fn test_missing_file() {
    let path = std::env::temp_dir().join("jsonview-definitely-not-here.toml");
    let err = Settings::from_file(&path).unwrap_err();

    assert!(matches!(err, SettingsError::FileNotFound(p) if p == path));
}

#[test]
fn test_malformed_file() {
    let path = write_temp("bad.toml", "[compile\nindexes = ");

    let err = Settings::from_file(&path).unwrap_err();
    fs::remove_file(&path).unwrap();

    assert!(matches!(err, SettingsError::ParseError(_)));
    assert!(err.to_string().starts_with("Failed to parse config file"));
}

#[test]
fn test_unknown_encoding_rejected() {
    let err = Settings::from_toml("[compile]\nencoding = \"xml\"\n").unwrap_err();
    assert!(matches!(err, SettingsError::ParseError(_)));
}
