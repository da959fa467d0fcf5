//! Compiled view and index descriptors.

use super::base::BaseQuery;
use crate::schema::LeafProperty;
use crate::sql::ddl::{CreateIndex, CreateView, DropIndex, DropView, IndexColumn};
use crate::sql::expr::{Expr, ExprExt};
use crate::sql::query::{Query, SelectExpr, TableRef};
use crate::sql::Dialect;

/// Role of a view within one compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewRole {
    /// The typed view over the base relation (top level or child).
    Typed,
    /// One row per array element, feeding a child view.
    Exploded,
}

/// One output column: expression and label.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewColumn {
    pub expr: Expr,
    pub label: String,
}

impl ViewColumn {
    pub fn new(expr: Expr, label: impl Into<String>) -> Self {
        Self {
            expr,
            label: label.into(),
        }
    }

    /// Pass a base column through under its own name.
    pub fn passthrough(name: &str) -> Self {
        Self::new(crate::sql::expr::col(name), name)
    }

    fn to_select(&self) -> SelectExpr {
        match &self.expr {
            Expr::Column { column, .. } if *column == self.label => {
                SelectExpr::new(self.expr.clone())
            }
            expr => expr.clone().alias(&self.label),
        }
    }
}

/// A view produced by the compiler.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewSpec {
    pub name: TableRef,
    pub role: ViewRole,
    pub base: BaseQuery,
    pub columns: Vec<ViewColumn>,
    /// Leaves this view exposes (empty for exploded views).
    pub leaves: Vec<LeafProperty>,
    pub materialized: bool,
}

impl ViewSpec {
    /// The defining SELECT.
    pub fn query(&self) -> Query {
        let query = Query::new()
            .select(
                self.columns
                    .iter()
                    .map(ViewColumn::to_select)
                    .collect::<Vec<SelectExpr>>(),
            )
            .from(self.base.table.clone());
        match &self.base.filter {
            Some(filter) => query.filter(filter.clone()),
            None => query,
        }
    }

    pub fn create(&self, replace: bool) -> CreateView {
        let mut stmt = CreateView::new(self.name.table.clone(), self.query());
        if let Some(schema) = &self.name.schema {
            stmt = stmt.schema(schema.clone());
        }
        if self.materialized {
            stmt = stmt.materialized();
        }
        if replace {
            stmt = stmt.or_replace();
        }
        stmt
    }

    pub fn drop(&self) -> DropView {
        let mut stmt = DropView::new(self.name.table.clone()).if_exists().cascade();
        if let Some(schema) = &self.name.schema {
            stmt = stmt.schema(schema.clone());
        }
        if self.materialized {
            stmt = stmt.materialized();
        }
        stmt
    }

    /// Column labels in output order.
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.label.as_str())
    }
}

/// A partial expression index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexSpec {
    pub name: String,
    /// Relation the index is built on.
    pub relation: TableRef,
    pub expression: Expr,
    pub predicate: Option<Expr>,
    /// Access method, when not the default.
    pub using: Option<String>,
}

impl IndexSpec {
    /// Rendered expression text the name is derived from.
    pub fn expression_sql(&self) -> String {
        self.expression.to_sql(Dialect::Postgres)
    }

    pub fn create(&self) -> CreateIndex {
        let mut stmt = CreateIndex::new(self.name.clone(), self.relation.table.clone())
            .if_not_exists()
            .column(IndexColumn::expr(self.expression.clone()));
        if let Some(schema) = &self.relation.schema {
            stmt = stmt.schema(schema.clone());
        }
        if let Some(method) = &self.using {
            stmt = stmt.using(method.clone());
        }
        if let Some(predicate) = &self.predicate {
            stmt = stmt.filter(predicate.clone());
        }
        stmt
    }

    pub fn drop(&self) -> DropIndex {
        let mut stmt = DropIndex::new(self.name.clone()).if_exists();
        if let Some(schema) = &self.relation.schema {
            stmt = stmt.schema(schema.clone());
        }
        stmt
    }
}
