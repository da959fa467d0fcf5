//! DDL (Data Definition Language) support.
//!
//! This module provides types and builders for the statements the view
//! compiler emits: expression indexes, views, materialized views and their
//! refresh.
//!
//! # Examples
//!
//! ```ignore
//! use jsonview::sql::ddl::{CreateIndex, IndexColumn};
//! use jsonview::sql::{col, func, lit_str, Dialect, ExprExt};
//!
//! let index = CreateIndex::new("forms_abc_def", "forms")
//!     .if_not_exists()
//!     .column(IndexColumn::expr(func("json_int", vec![col("data"), lit_str("a")])))
//!     .filter(col("tenant_id").eq(1));
//!
//! println!("{}", index.to_sql(Dialect::Postgres));
//! ```

use super::dialect::{Dialect, SqlDialect};
use super::expr::Expr;
use super::query::Query;
use super::token::{Token, TokenStream};

/// DDL statement types.
#[derive(Debug, Clone, PartialEq)]
pub enum DdlStatement {
    CreateIndex(CreateIndex),
    DropIndex(DropIndex),
    CreateView(CreateView),
    DropView(DropView),
    RefreshMaterializedView(RefreshMaterializedView),
}

impl DdlStatement {
    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        match self {
            DdlStatement::CreateIndex(ci) => ci.to_tokens(dialect),
            DdlStatement::DropIndex(di) => di.to_tokens(dialect),
            DdlStatement::CreateView(cv) => cv.to_tokens(dialect),
            DdlStatement::DropView(dv) => dv.to_tokens(dialect),
            DdlStatement::RefreshMaterializedView(r) => r.to_tokens(dialect),
        }
    }
}

impl From<CreateIndex> for DdlStatement {
    fn from(s: CreateIndex) -> Self {
        DdlStatement::CreateIndex(s)
    }
}

impl From<DropIndex> for DdlStatement {
    fn from(s: DropIndex) -> Self {
        DdlStatement::DropIndex(s)
    }
}

impl From<CreateView> for DdlStatement {
    fn from(s: CreateView) -> Self {
        DdlStatement::CreateView(s)
    }
}

impl From<DropView> for DdlStatement {
    fn from(s: DropView) -> Self {
        DdlStatement::DropView(s)
    }
}

impl From<RefreshMaterializedView> for DdlStatement {
    fn from(s: RefreshMaterializedView) -> Self {
        DdlStatement::RefreshMaterializedView(s)
    }
}

// ============================================================================
// CREATE INDEX
// ============================================================================

/// CREATE INDEX statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateIndex {
    pub if_not_exists: bool,
    pub name: String,
    pub schema: Option<String>,
    pub table: String,
    /// Access method (`btree`, `gist`). None leaves the engine default.
    pub using: Option<String>,
    pub columns: Vec<IndexColumn>,
    pub where_clause: Option<Expr>,
}

impl CreateIndex {
    /// Create a new CREATE INDEX statement.
    pub fn new(name: impl Into<String>, table: impl Into<String>) -> Self {
        Self {
            if_not_exists: false,
            name: name.into(),
            schema: None,
            table: table.into(),
            using: None,
            columns: Vec::new(),
            where_clause: None,
        }
    }

    /// Add IF NOT EXISTS clause.
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Set the schema of the indexed table.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Set the access method.
    pub fn using(mut self, method: impl Into<String>) -> Self {
        self.using = Some(method.into());
        self
    }

    /// Add a column or expression to the index.
    pub fn column(mut self, col: impl Into<IndexColumn>) -> Self {
        self.columns.push(col.into());
        self
    }

    /// Add WHERE clause for partial index.
    pub fn filter(mut self, expr: Expr) -> Self {
        self.where_clause = Some(expr);
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Create).space().push(Token::Index);

        if self.if_not_exists {
            ts.if_not_exists(dialect);
        }

        ts.space().push(Token::Ident(self.name.clone()));
        ts.space().push(Token::On).space();
        ts.push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.table.clone(),
        });

        if let Some(ref method) = self.using {
            if dialect.supports_index_method() {
                ts.space()
                    .push(Token::Using)
                    .space()
                    .push(Token::Raw(method.clone()));
            }
        }

        // Columns
        ts.space().lparen();
        for (i, col) in self.columns.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.append(&col.to_tokens(dialect));
        }
        ts.rparen();

        // WHERE clause for partial index
        if let Some(ref expr) = self.where_clause {
            if dialect.supports_partial_indexes() {
                ts.space()
                    .push(Token::Where)
                    .space()
                    .append(&expr.to_tokens_for_dialect(dialect));
            }
        }

        ts
    }
}

/// Index key: a plain column or an arbitrary expression.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexColumn {
    pub expr: Expr,
}

impl IndexColumn {
    /// Index a plain column.
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            expr: Expr::Column {
                table: None,
                column: name.into(),
            },
        }
    }

    /// Index the value of an expression.
    pub fn expr(expr: Expr) -> Self {
        Self { expr }
    }

    /// Convert to token stream.
    ///
    /// Expression keys are wrapped in their own parentheses.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        match &self.expr {
            Expr::Column { column, .. } => {
                ts.push(Token::Ident(column.clone()));
            }
            expr => {
                ts.lparen();
                ts.append(&expr.to_tokens_for_dialect(dialect));
                ts.rparen();
            }
        }
        ts
    }
}

impl From<Expr> for IndexColumn {
    fn from(expr: Expr) -> Self {
        IndexColumn::expr(expr)
    }
}

impl From<&str> for IndexColumn {
    fn from(s: &str) -> Self {
        IndexColumn::name(s)
    }
}

// ============================================================================
// DROP INDEX
// ============================================================================

/// DROP INDEX statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct DropIndex {
    pub if_exists: bool,
    pub name: String,
    pub schema: Option<String>,
}

impl DropIndex {
    /// Create a new DROP INDEX statement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            if_exists: false,
            name: name.into(),
            schema: None,
        }
    }

    /// Set the schema (indexes live in their table's schema).
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Add IF EXISTS clause.
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Drop).space().push(Token::Index);

        if self.if_exists {
            ts.if_exists(dialect);
        }

        ts.space().push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.name.clone(),
        });

        ts
    }
}

// ============================================================================
// CREATE VIEW
// ============================================================================

/// CREATE [OR REPLACE] [MATERIALIZED] VIEW statement.
///
/// # Example
///
/// ```ignore
/// let view = CreateView::new("forms_v", query)
///     .schema("reporting")
///     .or_replace();
///
/// // PostgreSQL: CREATE OR REPLACE VIEW "reporting"."forms_v" AS SELECT ...
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct CreateView {
    pub or_replace: bool,
    pub materialized: bool,
    pub if_not_exists: bool,
    pub schema: Option<String>,
    pub name: String,
    pub as_query: Box<Query>,
}

impl CreateView {
    /// Create a new CREATE VIEW statement.
    pub fn new(name: impl Into<String>, query: Query) -> Self {
        Self {
            or_replace: false,
            materialized: false,
            if_not_exists: false,
            schema: None,
            name: name.into(),
            as_query: Box::new(query),
        }
    }

    /// Set the schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Add OR REPLACE clause.
    ///
    /// PostgreSQL has no OR REPLACE for materialized views; the clause is
    /// skipped for them and callers drop the old relation first.
    pub fn or_replace(mut self) -> Self {
        self.or_replace = true;
        self
    }

    /// Create a MATERIALIZED VIEW.
    pub fn materialized(mut self) -> Self {
        self.materialized = true;
        self
    }

    /// Add IF NOT EXISTS clause (materialized views only).
    pub fn if_not_exists(mut self) -> Self {
        self.if_not_exists = true;
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        let materialized = self.materialized && dialect.supports_materialized_view();

        ts.push(Token::Create);

        if self.or_replace && !materialized && dialect.supports_create_or_replace_view() {
            ts.space().push(Token::Or).space().push(Token::Replace);
        }

        if materialized {
            ts.space().push(Token::Materialized);
        }

        ts.space().push(Token::View);

        if self.if_not_exists && materialized {
            ts.if_not_exists(dialect);
        }

        ts.space().push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.name.clone(),
        });

        // AS query
        ts.space()
            .push(Token::As)
            .newline()
            .append(&self.as_query.to_tokens_for_dialect(dialect));

        ts
    }
}

// ============================================================================
// DROP VIEW
// ============================================================================

/// DROP [MATERIALIZED] VIEW statement.
///
/// # Example
///
/// ```ignore
/// let drop = DropView::new("forms_v_items_exploded")
///     .materialized()
///     .if_exists()
///     .cascade();
///
/// // PostgreSQL: DROP MATERIALIZED VIEW IF EXISTS "forms_v_items_exploded" CASCADE
/// ```
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct DropView {
    pub if_exists: bool,
    pub materialized: bool,
    pub schema: Option<String>,
    pub name: String,
    pub cascade: bool,
}

impl DropView {
    /// Create a new DROP VIEW statement.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            if_exists: false,
            materialized: false,
            schema: None,
            name: name.into(),
            cascade: false,
        }
    }

    /// Set the schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Add IF EXISTS clause.
    pub fn if_exists(mut self) -> Self {
        self.if_exists = true;
        self
    }

    /// Drop a MATERIALIZED VIEW.
    pub fn materialized(mut self) -> Self {
        self.materialized = true;
        self
    }

    /// Add CASCADE clause.
    pub fn cascade(mut self) -> Self {
        self.cascade = true;
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();

        ts.push(Token::Drop);

        if self.materialized && dialect.supports_materialized_view() {
            ts.space().push(Token::Materialized);
        }

        ts.space().push(Token::View);

        if self.if_exists {
            ts.if_exists(dialect);
        }

        ts.space().push(Token::QualifiedIdent {
            schema: self.schema.clone(),
            name: self.name.clone(),
        });

        if self.cascade && dialect.supports_drop_cascade() {
            ts.space().push(Token::Cascade);
        }

        ts
    }
}

// ============================================================================
// REFRESH MATERIALIZED VIEW
// ============================================================================

/// REFRESH MATERIALIZED VIEW statement.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "DDL statements have no effect until converted to SQL with to_sql()"]
pub struct RefreshMaterializedView {
    pub schema: Option<String>,
    pub name: String,
}

impl RefreshMaterializedView {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    /// Set the schema.
    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    /// Convert to SQL for the given dialect.
    pub fn to_sql(&self, dialect: Dialect) -> String {
        self.to_tokens(dialect).serialize(dialect)
    }

    /// Convert to token stream.
    pub fn to_tokens(&self, _dialect: Dialect) -> TokenStream {
        let mut ts = TokenStream::new();
        ts.push(Token::Refresh)
            .space()
            .push(Token::Materialized)
            .space()
            .push(Token::View)
            .space()
            .push(Token::QualifiedIdent {
                schema: self.schema.clone(),
                name: self.name.clone(),
            });
        ts
    }
}

// ============================================================================
// Tests
// ============================================================================
