//! JSON Schema parsing and walking.
//!
//! ```text
//! serde_json::Value ──parse──▶ SchemaNode ──walk──▶ Vec<Property>
//!                      │
//!                      └── oneOf / allOf / anyOf merged per object
//! ```

pub mod kind;
pub mod merge;
pub mod node;
pub mod property;
pub mod walk;

pub use kind::{Encoding, Kind};
pub use node::{ArrayNode, ObjectNode, ScalarNode, SchemaNode};
pub use property::{
    ArrayProperty, DatePart, LeafProperty, ObjectArrayProperty, ParentId, Property,
};
pub use walk::{walk, walk_object, walk_value};
