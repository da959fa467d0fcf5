//! Recursive descent over a parsed schema.
//!
//! Produces leaf and array descriptors in first-seen order with dotted
//! paths. The nearest enclosing object's `id_property` is threaded down as an
//! explicit scope, so every descendant knows which sibling correlates it to
//! its parent row.

use std::collections::HashSet;

use serde_json::Value;

use super::node::{ObjectNode, SchemaNode};
use super::property::{
    join_path, ArrayProperty, LeafProperty, ObjectArrayProperty, ParentId, Property,
};
use crate::error::{CompileError, CompileResult};

/// Walk a schema whose root is an object.
pub fn walk(root: &SchemaNode) -> CompileResult<Vec<Property>> {
    let obj = root
        .as_object()
        .ok_or_else(|| CompileError::invalid("schema root must be of type object"))?;
    walk_object(obj)
}

/// Walk an object node as a root (path prefix "").
pub fn walk_object(root: &ObjectNode) -> CompileResult<Vec<Property>> {
    let mut walker = Walker::default();
    walker.visit_object(root, "", None)?;
    Ok(walker.out)
}

/// Parse then walk a raw schema document.
pub fn walk_value(value: &Value) -> CompileResult<Vec<Property>> {
    walk(&SchemaNode::parse(value)?)
}

#[derive(Default)]
struct Walker {
    out: Vec<Property>,
    seen: HashSet<String>,
}

impl Walker {
    fn visit_object(
        &mut self,
        obj: &ObjectNode,
        path: &str,
        inherited: Option<&ParentId>,
    ) -> CompileResult<()> {
        // Inner declarations shadow outer ones.
        let own = obj.id_property.as_ref().map(|property| ParentId {
            property: property.clone(),
            enclosing_path: path.to_string(),
        });
        let scope = own.as_ref().or(inherited);

        for (key, node) in &obj.properties {
            let child_path = join_path(path, key);
            self.visit(node, child_path, scope)?;
        }
        Ok(())
    }

    fn visit(&mut self, node: &SchemaNode, path: String, scope: Option<&ParentId>) -> CompileResult<()> {
        let property = match node {
            SchemaNode::Object(obj) => return self.visit_object(obj, &path, scope),
            SchemaNode::Array(array) => match array.items.as_ref() {
                SchemaNode::Object(items) => Property::ObjectArray(ObjectArrayProperty {
                    path,
                    items: items.clone(),
                    parent_id: scope.cloned(),
                }),
                items => Property::Array(ArrayProperty {
                    path,
                    items: items.clone(),
                }),
            },
            SchemaNode::Scalar(scalar) => Property::Leaf(LeafProperty {
                enum_values: scalar.enum_values.clone(),
                title: scalar.title.clone(),
                parent_id_property: scope.map(|id| id.property.clone()),
                ..LeafProperty::new(path, scalar.kind)
            }),
        };

        if !self.seen.insert(property.path().to_string()) {
            return Err(CompileError::invalid(format!(
                "duplicate property path '{}'",
                property.path()
            )));
        }
        self.out.push(property);
        Ok(())
    }
}
