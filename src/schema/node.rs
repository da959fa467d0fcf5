//! Typed schema tree.
//!
//! A raw `serde_json::Value` is parsed once into a [`SchemaNode`]. Quantifiers
//! are resolved during parsing, so every [`ObjectNode`] already carries its
//! effective property list and malformed input fails here rather than deep
//! inside a walk.

use serde_json::{Map, Value};

use super::kind::Kind;
use super::merge::effective_properties;
use crate::error::{CompileError, CompileResult};

#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Scalar(ScalarNode),
    Object(ObjectNode),
    Array(ArrayNode),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScalarNode {
    pub kind: Kind,
    pub enum_values: Option<Vec<Value>>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectNode {
    /// Effective properties in first-seen order.
    pub properties: Vec<(String, SchemaNode)>,
    pub id_property: Option<String>,
    pub title: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ArrayNode {
    pub items: Box<SchemaNode>,
    pub title: Option<String>,
}

impl SchemaNode {
    /// Parse a schema document.
    pub fn parse(value: &Value) -> CompileResult<SchemaNode> {
        let Value::Object(schema) = value else {
            return Err(CompileError::invalid(format!(
                "schema node must be an object, got {value}"
            )));
        };

        let type_name = match schema.get("type") {
            Some(Value::String(t)) if t != "any" => t.as_str(),
            other => {
                return Err(CompileError::invalid(format!(
                    "Unsupported type value: {}",
                    other.map_or_else(|| "null".to_string(), Value::to_string)
                )))
            }
        };
        let title = string_field(schema, "title")?;

        match type_name {
            "object" => Ok(SchemaNode::Object(ObjectNode::parse(schema)?)),
            "array" => {
                let items = schema
                    .get("items")
                    .ok_or_else(|| CompileError::invalid("array schema has no 'items'"))?;
                Ok(SchemaNode::Array(ArrayNode {
                    items: Box::new(SchemaNode::parse(items)?),
                    title,
                }))
            }
            _ => {
                let format = match schema.get("format") {
                    None => None,
                    Some(Value::String(f)) => Some(f.as_str()),
                    Some(other) => {
                        return Err(CompileError::invalid(format!(
                            "'format' must be a string, got {other}"
                        )))
                    }
                };
                let kind = Kind::resolve(type_name, format).ok_or_else(|| {
                    CompileError::invalid(format!(
                        "Unrecognized (type, format): ({type_name}, {})",
                        format.unwrap_or("None")
                    ))
                })?;
                let enum_values = match schema.get("enum") {
                    None => None,
                    Some(Value::Array(values)) => Some(values.clone()),
                    Some(other) => {
                        return Err(CompileError::invalid(format!(
                            "'enum' must be a list, got {other}"
                        )))
                    }
                };
                Ok(SchemaNode::Scalar(ScalarNode {
                    kind,
                    enum_values,
                    title,
                }))
            }
        }
    }

    pub fn as_object(&self) -> Option<&ObjectNode> {
        match self {
            SchemaNode::Object(obj) => Some(obj),
            _ => None,
        }
    }
}

impl ObjectNode {
    fn parse(schema: &Map<String, Value>) -> CompileResult<ObjectNode> {
        let properties = effective_properties(schema)?
            .iter()
            .map(|(name, value)| Ok((name.clone(), SchemaNode::parse(value)?)))
            .collect::<CompileResult<Vec<_>>>()?;

        Ok(ObjectNode {
            properties,
            id_property: string_field(schema, "id_property")?,
            title: string_field(schema, "title")?,
        })
    }

    pub fn get(&self, name: &str) -> Option<&SchemaNode> {
        self.properties
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, node)| node)
    }
}

fn string_field(schema: &Map<String, Value>, key: &str) -> CompileResult<Option<String>> {
    match schema.get(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s.clone())),
        Some(other) => Err(CompileError::invalid(format!(
            "'{key}' must be a string, got {other}"
        ))),
    }
}
