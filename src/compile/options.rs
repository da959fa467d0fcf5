//! Compilation options.

use serde::{Deserialize, Serialize};

use crate::schema::DatePart;

/// Options for compilation.
///
/// Field names follow snake_case; the camelCase spellings used by
/// JSON-configured callers are accepted as aliases.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Create one partial index per emitted column.
    pub indexes: bool,

    /// Replace views of the same name.
    pub replace: bool,

    /// Drop indexes with the derived name before recreating them.
    #[serde(alias = "dropExistingIndexes")]
    pub drop_existing_indexes: bool,

    /// Materialize the array-exploding intermediate views.
    #[serde(alias = "useMaterializedView")]
    pub use_materialized_view: bool,

    /// Calendar parts exposed per temporal leaf.
    #[serde(alias = "extractDateParts")]
    pub extract_date_parts: Vec<DatePart>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            indexes: true,
            replace: false,
            drop_existing_indexes: false,
            use_materialized_view: false,
            extract_date_parts: Vec::new(),
        }
    }
}

impl CompileOptions {
    pub fn with_indexes(mut self, indexes: bool) -> Self {
        self.indexes = indexes;
        self
    }

    pub fn with_replace(mut self, replace: bool) -> Self {
        self.replace = replace;
        self
    }

    pub fn with_drop_existing_indexes(mut self, drop: bool) -> Self {
        self.drop_existing_indexes = drop;
        self
    }

    pub fn with_materialized_view(mut self, materialize: bool) -> Self {
        self.use_materialized_view = materialize;
        self
    }

    pub fn with_date_parts(mut self, parts: impl IntoIterator<Item = DatePart>) -> Self {
        self.extract_date_parts = parts.into_iter().collect();
        self
    }
}
