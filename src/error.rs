//! Error types for schema compilation and DDL application.

use serde_json::Value;

/// Errors that can occur during compilation.
///
/// Every variant is raised before any DDL text exists, so a failed
/// compilation never yields partial output.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CompileError {
    /// Unsupported, ambiguous or unrecognized schema construct.
    #[error("Invalid schema: {0}")]
    InvalidSchema(String),

    /// Two quantifier branches disagree on a structural key.
    #[error("Schema conflict on '{key}': {left} vs {right}")]
    SchemaConflict {
        key: String,
        left: Value,
        right: Value,
    },

    /// The DDL plan contains a dependency cycle.
    #[error("Cyclic dependency between statements: {}", .0.join(" -> "))]
    CyclicDependency(Vec<String>),
}

impl CompileError {
    pub(crate) fn invalid(msg: impl Into<String>) -> Self {
        CompileError::InvalidSchema(msg.into())
    }
}

pub type CompileResult<T> = Result<T, CompileError>;

/// A statement rejected by the executor while applying compiled DDL.
///
/// Statements before `statement` have already been applied.
#[derive(Debug, thiserror::Error)]
#[error("Statement {statement} failed: {source}")]
pub struct ApplyError<E: std::error::Error + 'static> {
    /// Zero-based position of the failing statement.
    pub statement: usize,
    /// The SQL text that failed.
    pub sql: String,
    #[source]
    pub source: E,
}
