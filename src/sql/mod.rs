//! SQL generation module.
//!
//! This module provides a type-safe SQL builder for the statements the view
//! compiler produces. It includes:
//!
//! - [`query`] - SELECT query builder
//! - [`expr`] - Expression AST and builder DSL
//! - [`ddl`] - Data Definition Language (CREATE/DROP INDEX, VIEW, REFRESH)
//! - [`token`] - Token types for SQL generation
//! - [`dialect`] - SQL dialect implementations

pub mod ddl;
pub mod dialect;
pub mod expr;
pub mod query;
pub mod token;

#[cfg(test)]
pub mod test_utils;

// Re-export commonly used types at the sql module level
pub use dialect::{Dialect, SqlDialect};
pub use expr::{
    col, func, lit_bool, lit_float, lit_int, lit_null, lit_str, raw_sql, table_col,
    BinaryOperator, Expr, ExprExt, Literal, UnaryOperator,
};
pub use query::{Query, SelectExpr, TableRef};
pub use token::{Token, TokenStream};

// Re-export DDL types
pub use ddl::{
    CreateIndex, CreateView, DdlStatement, DropIndex, DropView, IndexColumn,
    RefreshMaterializedView,
};
