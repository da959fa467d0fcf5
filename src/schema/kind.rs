//! Semantic leaf kinds and their extraction functions.
//!
//! A leaf's `(type, format)` pair resolves to exactly one [`Kind`]. Each kind
//! maps, through a static table, to one extraction function per document
//! storage [`Encoding`]. The functions coerce malformed values to NULL; the
//! compiler only references them by name.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sql::expr::{func, lit_str, Expr};

/// Storage type of the document column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Encoding {
    Json,
    #[default]
    Jsonb,
}

impl Encoding {
    pub const ALL: [Encoding; 2] = [Encoding::Json, Encoding::Jsonb];

    /// Prefix of every extraction function for this encoding.
    pub fn prefix(self) -> &'static str {
        match self {
            Encoding::Json => "json",
            Encoding::Jsonb => "jsonb",
        }
    }

    /// Set-returning function yielding one row per array element.
    pub fn elements_function(self) -> &'static str {
        match self {
            Encoding::Json => "json_elements",
            Encoding::Jsonb => "jsonb_elements",
        }
    }

    /// Expand the array at `path` of `document` into rows.
    pub fn elements(self, document: Expr, path: &str) -> Expr {
        func(self.elements_function(), vec![document, lit_str(path)])
    }
}

impl fmt::Display for Encoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for Encoding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Encoding::Json),
            "jsonb" => Ok(Encoding::Jsonb),
            other => Err(format!("unknown encoding '{other}' (expected json or jsonb)")),
        }
    }
}

/// Semantic type of a scalar leaf.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Kind {
    String,
    Decimal,
    Float,
    Integer,
    Boolean,
    #[serde(rename = "datetime")]
    DateTime,
    #[serde(rename = "datetime_no_tz")]
    DateTimeNoTZ,
    Date,
    Geopoint,
}

struct KindInfo {
    kind: Kind,
    /// Function suffix shared by both encodings.
    suffix: &'static str,
    sql_type: &'static str,
    index_method: Option<&'static str>,
}

const KINDS: [KindInfo; 9] = [
    KindInfo {
        kind: Kind::String,
        suffix: "string",
        sql_type: "text",
        index_method: None,
    },
    KindInfo {
        kind: Kind::Decimal,
        suffix: "decimal",
        sql_type: "numeric",
        index_method: None,
    },
    KindInfo {
        kind: Kind::Float,
        suffix: "float",
        sql_type: "double precision",
        index_method: None,
    },
    KindInfo {
        kind: Kind::Integer,
        suffix: "int",
        sql_type: "bigint",
        index_method: None,
    },
    KindInfo {
        kind: Kind::Boolean,
        suffix: "bool",
        sql_type: "boolean",
        index_method: None,
    },
    KindInfo {
        kind: Kind::DateTime,
        suffix: "datetime",
        sql_type: "timestamptz",
        index_method: None,
    },
    KindInfo {
        kind: Kind::DateTimeNoTZ,
        suffix: "datetime_no_tz",
        sql_type: "timestamp",
        index_method: None,
    },
    KindInfo {
        kind: Kind::Date,
        suffix: "date",
        sql_type: "date",
        index_method: None,
    },
    KindInfo {
        kind: Kind::Geopoint,
        suffix: "geopoint",
        sql_type: "geometry",
        index_method: Some("gist"),
    },
];

impl Kind {
    pub const ALL: [Kind; 9] = [
        Kind::String,
        Kind::Decimal,
        Kind::Float,
        Kind::Integer,
        Kind::Boolean,
        Kind::DateTime,
        Kind::DateTimeNoTZ,
        Kind::Date,
        Kind::Geopoint,
    ];

    /// Resolve a JSON Schema `(type, format)` pair.
    ///
    /// Returns `None` for anything outside the recognized table, including
    /// `object` and `array` which are not leaves.
    pub fn resolve(type_name: &str, format: Option<&str>) -> Option<Kind> {
        match (type_name, format) {
            ("number", _) => Some(Kind::Float),
            ("integer", _) => Some(Kind::Integer),
            ("boolean", _) => Some(Kind::Boolean),
            ("string", Some("decimal")) => Some(Kind::Decimal),
            ("string", Some("date-time")) => Some(Kind::DateTime),
            ("string", Some("date-time-no-tz")) => Some(Kind::DateTimeNoTZ),
            ("string", Some("date")) => Some(Kind::Date),
            ("string", Some("geopoint")) => Some(Kind::Geopoint),
            ("string", None) => Some(Kind::String),
            _ => None,
        }
    }

    fn info(self) -> &'static KindInfo {
        // KINDS is ordered like the enum.
        let info = &KINDS[self as usize];
        debug_assert_eq!(info.kind, self);
        info
    }

    /// Name of the extraction function for `encoding`.
    pub fn function_name(self, encoding: Encoding) -> String {
        format!("{}_{}", encoding.prefix(), self.info().suffix)
    }

    /// Typed extraction of `path` from `document`.
    pub fn extract(self, encoding: Encoding, document: Expr, path: &str) -> Expr {
        func(&self.function_name(encoding), vec![document, lit_str(path)])
    }

    /// SQL type the extraction function returns.
    pub fn sql_type(self) -> &'static str {
        self.info().sql_type
    }

    /// Preferred index access method, if not the default btree.
    pub fn index_method(self) -> Option<&'static str> {
        self.info().index_method
    }

    /// Whether calendar parts can be derived from this kind.
    pub fn is_temporal(self) -> bool {
        matches!(self, Kind::DateTime | Kind::DateTimeNoTZ | Kind::Date)
    }

    /// Whether `DATE_PART` over this kind may appear in an index.
    ///
    /// `DATE_PART` on `timestamptz` depends on the session time zone and is
    /// not immutable. A `date` argument resolves to that overload too.
    pub fn date_parts_indexable(self) -> bool {
        matches!(self, Kind::DateTimeNoTZ)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.info().suffix)
    }
}
