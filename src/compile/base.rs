//! Description of the base row selection a view is compiled over.

use std::collections::HashSet;

use crate::schema::Encoding;
use crate::sql::expr::{col, BinaryOperator, Expr, ExprExt};
use crate::sql::query::TableRef;
use crate::sql::Dialect;

/// The document column and how it is stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentColumn {
    pub name: String,
    pub encoding: Encoding,
}

impl DocumentColumn {
    pub fn new(name: impl Into<String>, encoding: Encoding) -> Self {
        Self {
            name: name.into(),
            encoding,
        }
    }

    pub fn json(name: impl Into<String>) -> Self {
        Self::new(name, Encoding::Json)
    }

    pub fn jsonb(name: impl Into<String>) -> Self {
        Self::new(name, Encoding::Jsonb)
    }

    /// Unqualified reference to the column.
    pub fn expr(&self) -> Expr {
        col(&self.name)
    }
}

/// Base relation, exposed columns, document column and row filter.
#[derive(Debug, Clone, PartialEq)]
#[must_use = "builders have no effect until used"]
pub struct BaseQuery {
    pub table: TableRef,
    /// The relation's own columns to pass through, in order.
    pub columns: Vec<String>,
    pub document: DocumentColumn,
    pub filter: Option<Expr>,
}

impl BaseQuery {
    pub fn new(table: TableRef, document: DocumentColumn) -> Self {
        Self {
            table,
            columns: Vec::new(),
            document,
            filter: None,
        }
    }

    /// Add a passthrough column.
    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(name.into());
        self
    }

    /// Add passthrough columns.
    pub fn columns(mut self, names: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.columns.extend(names.into_iter().map(Into::into));
        self
    }

    /// Add a row filter condition (ANDed with existing conditions).
    pub fn filter(mut self, condition: Expr) -> Self {
        self.filter = Some(match self.filter {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    /// Rendered filter used in index names; "" when unfiltered.
    pub fn predicate_sql(&self) -> String {
        self.filter
            .as_ref()
            .map(|f| f.to_sql(Dialect::Postgres))
            .unwrap_or_default()
    }

    /// Columns fixed by a top-level equality conjunct of the filter.
    ///
    /// Only a chain of ANDs is inspected; equalities under OR or NOT do not
    /// pin anything.
    pub fn pinned_columns(&self) -> HashSet<String> {
        let mut pinned = HashSet::new();
        if let Some(filter) = &self.filter {
            for conjunct in conjuncts(filter) {
                if let Expr::BinaryOp {
                    left,
                    op: BinaryOperator::Eq,
                    right,
                } = conjunct
                {
                    for side in [left.as_ref(), right.as_ref()] {
                        if let Expr::Column { column, .. } = side {
                            pinned.insert(column.clone());
                        }
                    }
                }
            }
        }
        pinned
    }

    /// Passthrough columns left in the result row.
    ///
    /// Pinned columns and the document column are dropped.
    pub fn exposed_columns(&self) -> Vec<&str> {
        let pinned = self.pinned_columns();
        self.columns
            .iter()
            .filter(|c| **c != self.document.name && !pinned.contains(*c))
            .map(String::as_str)
            .collect()
    }
}

fn conjuncts(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::BinaryOp {
            left,
            op: BinaryOperator::And,
            right,
        } => {
            let mut out = conjuncts(left);
            out.extend(conjuncts(right));
            out
        }
        other => vec![other],
    }
}
