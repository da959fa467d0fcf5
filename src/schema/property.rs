//! Walker output: leaf and array descriptors with dotted paths.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::kind::Kind;
use super::node::{ObjectNode, SchemaNode};
use crate::sql::expr::{func, lit_str, Expr};

/// One item yielded by the schema walker.
#[derive(Debug, Clone, PartialEq)]
pub enum Property {
    Leaf(LeafProperty),
    /// Array of scalars. Parsed, never rendered.
    Array(ArrayProperty),
    /// Array of objects, compiled into a child view.
    ObjectArray(ObjectArrayProperty),
}

impl Property {
    pub fn path(&self) -> &str {
        match self {
            Property::Leaf(leaf) => &leaf.path,
            Property::Array(array) => &array.path,
            Property::ObjectArray(array) => &array.path,
        }
    }
}

/// A scalar leaf that becomes one view column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeafProperty {
    pub path: String,
    pub kind: Kind,
    #[serde(rename = "enum", skip_serializing_if = "Option::is_none")]
    pub enum_values: Option<Vec<Value>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Set on the synthetic leaf that carries a child row's parent id.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_parent_id: bool,
    /// Nearest enclosing object's `id_property`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id_property: Option<String>,
    /// Calendar parts exposed as extra columns.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub date_parts: Vec<DatePart>,
}

impl LeafProperty {
    pub fn new(path: impl Into<String>, kind: Kind) -> Self {
        Self {
            path: path.into(),
            kind,
            enum_values: None,
            title: None,
            is_parent_id: false,
            parent_id_property: None,
            date_parts: Vec::new(),
        }
    }
}

/// An array whose items are scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayProperty {
    pub path: String,
    pub items: SchemaNode,
}

/// An array whose items are objects.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectArrayProperty {
    pub path: String,
    /// Item schema, walked when the child view is compiled.
    pub items: ObjectNode,
    /// Id of the nearest enclosing object that declared one.
    pub parent_id: Option<ParentId>,
}

/// The sibling property correlating child rows to their parent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParentId {
    /// Name of the `id_property`.
    pub property: String,
    /// Dotted path of the object that declared it ("" for the root).
    pub enclosing_path: String,
}

impl ParentId {
    /// Full dotted path of the id leaf.
    pub fn path(&self) -> String {
        join_path(&self.enclosing_path, &self.property)
    }
}

pub(crate) fn join_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{parent}.{key}")
    }
}

// =============================================================================
// Date parts
// =============================================================================

/// Calendar field derivable from a temporal leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatePart {
    Year,
    Quarter,
    Month,
    Week,
    Day,
    #[serde(rename = "dow")]
    DayOfWeek,
    #[serde(rename = "doy")]
    DayOfYear,
    Hour,
    Minute,
    Second,
}

impl DatePart {
    pub const ALL: [DatePart; 10] = [
        DatePart::Year,
        DatePart::Quarter,
        DatePart::Month,
        DatePart::Week,
        DatePart::Day,
        DatePart::DayOfWeek,
        DatePart::DayOfYear,
        DatePart::Hour,
        DatePart::Minute,
        DatePart::Second,
    ];

    pub fn name(self) -> &'static str {
        match self {
            DatePart::Year => "year",
            DatePart::Quarter => "quarter",
            DatePart::Month => "month",
            DatePart::Week => "week",
            DatePart::Day => "day",
            DatePart::DayOfWeek => "dow",
            DatePart::DayOfYear => "doy",
            DatePart::Hour => "hour",
            DatePart::Minute => "minute",
            DatePart::Second => "second",
        }
    }

    /// `DATE_PART('<part>', expr)`
    pub fn extract(self, expr: Expr) -> Expr {
        func("DATE_PART", vec![lit_str(self.name()), expr])
    }
}

impl fmt::Display for DatePart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for DatePart {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        DatePart::ALL
            .into_iter()
            .find(|part| part.name() == lower)
            .ok_or_else(|| format!("unknown date part '{s}'"))
    }
}
