//! End-to-end compilation from a JSON Schema to view and index DDL.
//!
//! ```text
//! Schema → Parse → Walk → Partition → Build Columns → (Child Views) → Plan → SQL
//! ```
//!
//! Every level (the top-level view and each array-of-objects child) runs the
//! same steps. A child level reads from an exploded view that turns the
//! parent's array into one row per element, keyed by the parent's id under
//! the reserved `_parent_id` column.
//!
//! # Example
//!
//! ```ignore
//! use jsonview::compile::{compile, BaseQuery, CompileOptions, DocumentColumn};
//! use jsonview::sql::{col, ExprExt, TableRef};
//! use serde_json::json;
//!
//! let base = BaseQuery::new(TableRef::new("forms"), DocumentColumn::jsonb("data"))
//!     .columns(["id", "tenant_id"])
//!     .filter(col("tenant_id").eq(1));
//!
//! let schema = json!({
//!     "type": "object",
//!     "properties": {"a": {"type": "integer"}, "b": {"type": "string"}},
//! });
//!
//! let output = compile("forms_v", &base, &schema, &CompileOptions::default())?;
//! println!("{}", output.sql);
//! ```

pub mod base;
pub mod options;
pub mod plan;
pub mod view;

use std::collections::HashSet;

use petgraph::graph::NodeIndex;
use serde_json::Value;
use tracing::{debug, trace};

pub use base::{BaseQuery, DocumentColumn};
pub use options::CompileOptions;
pub use plan::{DdlPlan, PlannedStatement};
pub use view::{IndexSpec, ViewColumn, ViewRole, ViewSpec};

use crate::error::{ApplyError, CompileError, CompileResult};
use crate::index_name::index_name;
use crate::schema::{
    walk_object, LeafProperty, ObjectArrayProperty, ObjectNode, Property, SchemaNode,
};
use crate::sql::ddl::{DdlStatement, RefreshMaterializedView};
use crate::sql::expr::{col, Expr};
use crate::sql::query::TableRef;
use crate::sql::Dialect;

/// Column carrying a child row's parent id.
pub const PARENT_ID_COLUMN: &str = "_parent_id";

// ============================================================================
// Result Types
// ============================================================================

/// Result of compiling a schema.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Statements in execution order.
    pub statements: Vec<DdlStatement>,

    /// The whole script, each statement terminated by `;`.
    pub sql: String,

    /// Leaves of the top-level view.
    pub leaves: Vec<LeafProperty>,

    /// Every view, children and exploded views included.
    pub views: Vec<ViewSpec>,

    /// Every index.
    pub indexes: Vec<IndexSpec>,
}

impl CompileOutput {
    /// Statement texts without terminators.
    pub fn statement_sql(&self) -> Vec<String> {
        self.statements
            .iter()
            .map(|s| s.to_sql(Dialect::Postgres))
            .collect()
    }

    /// Execute every statement in order, stopping at the first failure.
    ///
    /// Statements before the failing one stay applied.
    pub fn apply<X: DdlExecutor>(&self, executor: &mut X) -> Result<(), ApplyError<X::Error>> {
        for (i, statement) in self.statements.iter().enumerate() {
            let sql = statement.to_sql(Dialect::Postgres);
            trace!(statement = i, "executing");
            executor.execute(&sql).map_err(|source| ApplyError {
                statement: i,
                sql: sql.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

/// Executes DDL text against a database.
pub trait DdlExecutor {
    type Error: std::error::Error + 'static;

    fn execute(&mut self, sql: &str) -> Result<(), Self::Error>;
}

// ============================================================================
// Compilation Functions
// ============================================================================

/// Compile a raw schema document.
///
/// # Arguments
///
/// * `view_name` - Name of the top-level view, optionally `schema.name`.
///   Unqualified names land in the base table's schema.
/// * `base` - Base relation, passthrough columns, document column and filter
/// * `schema` - JSON Schema of the document column
/// * `options` - Compilation options
pub fn compile(
    view_name: &str,
    base: &BaseQuery,
    schema: &Value,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let root = SchemaNode::parse(schema)?;
    compile_node(view_name, base, &root, options)
}

/// Compile an already parsed schema.
pub fn compile_node(
    view_name: &str,
    base: &BaseQuery,
    root: &SchemaNode,
    options: &CompileOptions,
) -> CompileResult<CompileOutput> {
    let root = root
        .as_object()
        .ok_or_else(|| CompileError::invalid("schema root must be of type object"))?;

    let mut view = TableRef::parse(view_name);
    if view.schema.is_none() {
        view.schema = base.table.schema.clone();
    }
    debug!(view = %view, table = %base.table, "compiling schema");

    let mut compiler = Compiler::new(options);
    let level = compiler.compile_level(view, base.clone(), root, None)?;
    compiler.finish(level.leaves)
}

// ============================================================================
// Level Compiler
// ============================================================================

struct Compiler<'a> {
    options: &'a CompileOptions,
    plan: DdlPlan,
    views: Vec<ViewSpec>,
    indexes: Vec<IndexSpec>,
    /// Refresh statements, outermost array first.
    refreshes: Vec<NodeIndex>,
}

/// What one compiled level hands back to its parent.
struct Level {
    leaves: Vec<LeafProperty>,
    /// Every statement this level (and its descendants) planned.
    nodes: Vec<NodeIndex>,
}

impl<'a> Compiler<'a> {
    fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            plan: DdlPlan::new(),
            views: Vec::new(),
            indexes: Vec::new(),
            refreshes: Vec::new(),
        }
    }

    /// Compile one typed view over `base`.
    ///
    /// `parent_leaf` is set for child levels, whose base is an exploded view.
    fn compile_level(
        &mut self,
        view: TableRef,
        base: BaseQuery,
        root: &ObjectNode,
        parent_leaf: Option<LeafProperty>,
    ) -> CompileResult<Level> {
        // Walk + Partition
        let mut leaves = Vec::new();
        let mut arrays = Vec::new();
        for property in walk_object(root)? {
            match property {
                Property::Leaf(mut leaf) => {
                    if leaf.kind.is_temporal() {
                        leaf.date_parts = self.options.extract_date_parts.clone();
                    }
                    leaves.push(leaf);
                }
                Property::Array(array) => {
                    trace!(path = %array.path, "scalar array not rendered");
                }
                Property::ObjectArray(array) => arrays.push(array),
            }
        }
        let children = arrays
            .into_iter()
            .map(|array| -> CompileResult<_> {
                let id_leaf = parent_id_leaf(&array, &leaves)?.clone();
                Ok((array, id_leaf))
            })
            .collect::<CompileResult<Vec<_>>>()?;

        let is_child = parent_leaf.is_some();
        leaves.extend(parent_leaf);

        // Build columns
        let columns = build_columns(&base, &leaves)?;
        debug!(
            view = %view,
            leaves = leaves.len(),
            columns = columns.len(),
            arrays = children.len(),
            "compiled view level"
        );

        // Children first
        let mut nodes = Vec::new();
        for (array, id_leaf) in &children {
            nodes.extend(self.compile_child(&view, &base, array, id_leaf)?);
        }
        let child_nodes = nodes.clone();

        let spec = ViewSpec {
            name: view,
            role: ViewRole::Typed,
            base,
            columns,
            leaves,
            materialized: false,
        };

        // Indexes on a plain view are impossible; a child level is only
        // indexable when its exploded view is materialized.
        let indexable = self.options.indexes && (!is_child || self.options.use_materialized_view);
        let index_specs = if indexable {
            plan_indexes(&spec)
        } else {
            Vec::new()
        };
        debug!(view = %spec.name, indexes = index_specs.len(), "planned indexes");

        let view_node = self
            .plan
            .add(format!("view {}", spec.name), spec.create(self.options.replace));
        for node in &child_nodes {
            self.plan.depends_on(view_node, *node);
        }
        if !is_child {
            for node in &self.refreshes {
                self.plan.depends_on(view_node, *node);
            }
        }
        if is_child {
            // exploded view -> its indexes -> child view
            let index_nodes = self.add_indexes(&index_specs, None);
            for node in &index_nodes {
                self.plan.depends_on(view_node, *node);
            }
            nodes.extend(index_nodes);
            nodes.push(view_node);
        } else {
            nodes.push(view_node);
            nodes.extend(self.add_indexes(&index_specs, Some(view_node)));
        }

        let leaves = spec.leaves.clone();
        self.views.push(spec);
        self.indexes.extend(index_specs);
        Ok(Level { leaves, nodes })
    }

    /// Exploded view plus child level for one array of objects.
    fn compile_child(
        &mut self,
        parent_view: &TableRef,
        parent_base: &BaseQuery,
        array: &ObjectArrayProperty,
        id_leaf: &LeafProperty,
    ) -> CompileResult<Vec<NodeIndex>> {
        let suffix = sanitize(&array.path);
        let exploded_name = parent_view.sibling(&format!("{}_{}_exploded", parent_view.table, suffix));
        let child_name = parent_view.sibling(&format!("{}_{}", parent_view.table, suffix));
        let document = &parent_base.document;
        let materialized = self.options.use_materialized_view;

        let id_expr = id_leaf
            .kind
            .extract(document.encoding, document.expr(), &id_leaf.path);
        let exploded = ViewSpec {
            name: exploded_name.clone(),
            role: ViewRole::Exploded,
            base: parent_base.clone(),
            columns: vec![
                ViewColumn::new(id_expr, PARENT_ID_COLUMN),
                ViewColumn::new(
                    document.encoding.elements(document.expr(), &array.path),
                    document.name.clone(),
                ),
            ],
            leaves: Vec::new(),
            materialized,
        };
        debug!(array = %array.path, exploded = %exploded_name, child = %child_name, materialized, "compiling array child");

        let mut nodes = Vec::new();
        let label = format!("view {}", exploded_name);
        let exploded_node = if materialized && self.options.replace {
            // No CREATE OR REPLACE for materialized views.
            let drop = self.plan.add(format!("drop {}", exploded_name), exploded.drop());
            nodes.push(drop);
            self.plan.add_after(drop, label, exploded.create(false))
        } else {
            self.plan.add(label, exploded.create(self.options.replace))
        };
        nodes.push(exploded_node);
        self.views.push(exploded);

        let parent_id = array.parent_id.as_ref().map(|p| p.property.clone());
        let synthetic = LeafProperty {
            is_parent_id: true,
            parent_id_property: parent_id,
            ..LeafProperty::new(PARENT_ID_COLUMN, id_leaf.kind)
        };
        let child_base = BaseQuery::new(exploded_name.clone(), document.clone()).column(PARENT_ID_COLUMN);
        let nested_refreshes = self.refreshes.len();
        let level = self.compile_level(child_name, child_base, &array.items, Some(synthetic))?;
        for node in &level.nodes {
            self.plan.depends_on(*node, exploded_node);
        }

        if materialized {
            let mut refresh = RefreshMaterializedView::new(exploded_name.table.clone());
            if let Some(schema) = &exploded_name.schema {
                refresh = refresh.schema(schema.clone());
            }
            let refresh_node = self.plan.add(format!("refresh {}", exploded_name), refresh);
            for node in &level.nodes {
                self.plan.depends_on(refresh_node, *node);
            }
            self.plan.depends_on(refresh_node, exploded_node);
            // Nested exploded views read this one, so they refresh after it.
            for nested in &self.refreshes[nested_refreshes..] {
                self.plan.depends_on(*nested, refresh_node);
            }
            self.refreshes.insert(nested_refreshes, refresh_node);
        }
        nodes.extend(level.nodes);
        Ok(nodes)
    }

    /// Plan drop/create statements for `specs`, optionally after `after`.
    fn add_indexes(&mut self, specs: &[IndexSpec], after: Option<NodeIndex>) -> Vec<NodeIndex> {
        let mut nodes = Vec::new();
        for spec in specs {
            let mut previous = after;
            if self.options.drop_existing_indexes {
                let drop = self.plan.add(format!("drop index {}", spec.name), spec.drop());
                if let Some(prev) = previous {
                    self.plan.depends_on(drop, prev);
                }
                nodes.push(drop);
                previous = Some(drop);
            }
            let create = self.plan.add(format!("index {}", spec.name), spec.create());
            if let Some(prev) = previous {
                self.plan.depends_on(create, prev);
            }
            nodes.push(create);
        }
        nodes
    }

    fn finish(self, leaves: Vec<LeafProperty>) -> CompileResult<CompileOutput> {
        let ordered = self.plan.ordered()?;
        let mut statements = Vec::with_capacity(ordered.len());
        let mut sql = String::new();
        for planned in ordered {
            let text = planned.statement.to_sql(Dialect::Postgres);
            trace!(label = %planned.label, sql = %text, "emit");
            if !sql.is_empty() {
                sql.push_str("\n\n");
            }
            sql.push_str(&text);
            sql.push(';');
            statements.push(planned.statement.clone());
        }
        debug!(statements = statements.len(), views = self.views.len(), indexes = self.indexes.len(), "compilation finished");

        Ok(CompileOutput {
            statements,
            sql,
            leaves,
            views: self.views,
            indexes: self.indexes,
        })
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// The scalar leaf an object array correlates on.
fn parent_id_leaf<'l>(
    array: &ObjectArrayProperty,
    leaves: &'l [LeafProperty],
) -> CompileResult<&'l LeafProperty> {
    let parent = array.parent_id.as_ref().ok_or_else(|| {
        CompileError::invalid(format!(
            "array '{}' has no enclosing object with an id_property",
            array.path
        ))
    })?;
    let path = parent.path();
    leaves
        .iter()
        .find(|leaf| leaf.path == path && !leaf.is_parent_id)
        .ok_or_else(|| {
            CompileError::invalid(format!(
                "id_property '{}' for array '{}' is not a scalar property",
                parent.property, array.path
            ))
        })
}

/// Extraction expression for a leaf of the level reading `base`.
fn leaf_expr(base: &BaseQuery, leaf: &LeafProperty) -> Expr {
    if leaf.is_parent_id {
        col(PARENT_ID_COLUMN)
    } else {
        let document = &base.document;
        leaf.kind
            .extract(document.encoding, document.expr(), &leaf.path)
    }
}

/// Passthrough columns, then one column per leaf and date part.
fn build_columns(base: &BaseQuery, leaves: &[LeafProperty]) -> CompileResult<Vec<ViewColumn>> {
    let mut columns: Vec<ViewColumn> = base
        .exposed_columns()
        .into_iter()
        .map(ViewColumn::passthrough)
        .collect();

    for leaf in leaves.iter().filter(|leaf| !leaf.is_parent_id) {
        let expr = leaf_expr(base, leaf);
        let label = format!("{}.{}", base.document.name, leaf.path);
        let parts: Vec<ViewColumn> = leaf
            .date_parts
            .iter()
            .map(|part| ViewColumn::new(part.extract(expr.clone()), format!("{label}_{part}")))
            .collect();
        columns.push(ViewColumn::new(expr, label));
        columns.extend(parts);
    }

    let mut seen = HashSet::new();
    for column in &columns {
        if !seen.insert(column.label.as_str()) {
            return Err(CompileError::invalid(format!(
                "duplicate column label '{}'",
                column.label
            )));
        }
    }
    Ok(columns)
}

/// One index per leaf column (and indexable date part) of `view`.
fn plan_indexes(view: &ViewSpec) -> Vec<IndexSpec> {
    let base = &view.base;
    let predicate = base.predicate_sql();
    let mut specs = Vec::new();

    let mut push = |expression: Expr, using: Option<&str>| {
        let name = index_name(
            &base.table.table,
            &predicate,
            &expression.to_sql(Dialect::Postgres),
        );
        specs.push(IndexSpec {
            name,
            relation: base.table.clone(),
            expression,
            predicate: base.filter.clone(),
            using: using.map(String::from),
        });
    };

    for leaf in &view.leaves {
        let expr = leaf_expr(base, leaf);
        let using = if leaf.is_parent_id {
            None
        } else {
            leaf.kind.index_method()
        };
        push(expr.clone(), using);
        if leaf.kind.date_parts_indexable() {
            for part in &leaf.date_parts {
                push(part.extract(expr.clone()), None);
            }
        }
    }
    specs
}

/// Replace every non-alphanumeric character with `_`.
fn sanitize(path: &str) -> String {
    path.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
