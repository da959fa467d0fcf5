//! PostgreSQL SQL dialect.
//!
//! PostgreSQL features used by the compiler:
//! - ANSI identifier quoting (`"`)
//! - Native boolean type (true/false)
//! - Partial and expression indexes, GiST access method
//! - Materialized views with REFRESH
//! - `json` and `jsonb` document storage

use super::helpers;
use super::SqlDialect;

/// PostgreSQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct Postgres;

impl SqlDialect for Postgres {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_double(ident)
    }

    fn format_bool(&self, b: bool) -> &'static str {
        helpers::format_bool_literal(b)
    }

    fn supports_partial_indexes(&self) -> bool {
        true
    }

    fn supports_index_method(&self) -> bool {
        true
    }

    fn supports_materialized_view(&self) -> bool {
        true
    }
}
