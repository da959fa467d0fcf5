//! # jsonview
//!
//! Compiles the JSON Schema of a document column into typed SQL views and
//! partial expression indexes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │         JSON Schema (serde_json::Value)                  │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [schema::SchemaNode::parse]
//! ┌─────────────────────────────────────────────────────────┐
//! │   SchemaNode tree (oneOf / allOf / anyOf merged)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [schema::walk]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Properties: leaves, scalar arrays, object arrays       │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [compile]
//! ┌─────────────────────────────────────────────────────────┐
//! │   Views + indexes, ordered by a dependency graph         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [sql]
//! ┌─────────────────────────────────────────────────────────┐
//! │                    PostgreSQL DDL                        │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! Views call typed extraction functions (`jsonb_int`, `json_string`, ...)
//! that coerce malformed values to NULL. [`functions`] ships install scripts
//! for them.

pub mod compile;
pub mod config;
pub mod error;
pub mod functions;
pub mod index_name;
pub mod schema;
pub mod sql;

pub use error::{ApplyError, CompileError, CompileResult};

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::compile::{
        compile, compile_node, BaseQuery, CompileOptions, CompileOutput, DdlExecutor,
        DocumentColumn, IndexSpec, ViewSpec,
    };
    pub use crate::error::{ApplyError, CompileError, CompileResult};
    pub use crate::schema::{DatePart, Encoding, Kind, LeafProperty, SchemaNode};
    pub use crate::sql::dialect::{Dialect, SqlDialect};
    pub use crate::sql::expr::{
        col, func, lit_bool, lit_float, lit_int, lit_null, lit_str, table_col, BinaryOperator,
        Expr, ExprExt, Literal, UnaryOperator,
    };
    pub use crate::sql::query::{Query, SelectExpr, TableRef};
}

pub use compile::{compile, BaseQuery, CompileOptions, CompileOutput, DocumentColumn};
