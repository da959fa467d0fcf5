//! Quantifier resolution for object schemas.
//!
//! An object's effective property map is its own `properties` merged with
//! the `properties` of every `oneOf`, `allOf` and `anyOf` branch, in that
//! order. Cosmetic keys may diverge across branches (the later branch wins);
//! structural keys must agree.

use serde_json::{Map, Value};
use tracing::trace;

use crate::error::{CompileError, CompileResult};

/// Keys whose scalar values must agree across merged branches.
pub const STRUCTURAL_KEYS: [&str; 3] = ["type", "format", "properties"];

/// Quantifier keywords, in merge order.
pub const QUANTIFIERS: [&str; 3] = ["oneOf", "allOf", "anyOf"];

/// Merge `incoming` into `target`.
///
/// Per key: absent is inserted, equal is kept, two lists are concatenated,
/// two maps are merged recursively. Any other difference is a conflict on a
/// structural key and an override everywhere else.
pub fn merge_maps(target: &mut Map<String, Value>, incoming: &Map<String, Value>) -> CompileResult<()> {
    for (key, value) in incoming {
        let Some(existing) = target.get_mut(key) else {
            target.insert(key.clone(), value.clone());
            continue;
        };
        if existing == value {
            continue;
        }
        match (existing, value) {
            (Value::Array(left), Value::Array(right)) => {
                left.extend(right.iter().cloned());
            }
            (Value::Object(left), Value::Object(right)) => {
                merge_maps(left, right)?;
            }
            (existing, value) if STRUCTURAL_KEYS.contains(&key.as_str()) => {
                return Err(CompileError::SchemaConflict {
                    key: key.clone(),
                    left: existing.clone(),
                    right: value.clone(),
                });
            }
            (existing, value) => {
                trace!(key = %key, "later branch overrides value");
                *existing = value.clone();
            }
        }
    }
    Ok(())
}

/// Resolve the effective property map of an object schema.
pub fn effective_properties(schema: &Map<String, Value>) -> CompileResult<Map<String, Value>> {
    let mut merged = match schema.get("properties") {
        None => Map::new(),
        Some(Value::Object(props)) => props.clone(),
        Some(other) => {
            return Err(CompileError::invalid(format!(
                "'properties' must be an object, got {other}"
            )))
        }
    };

    for quantifier in QUANTIFIERS {
        let branches = match schema.get(quantifier) {
            None => continue,
            Some(Value::Array(branches)) => branches,
            Some(other) => {
                return Err(CompileError::invalid(format!(
                    "'{quantifier}' must be a list of schemas, got {other}"
                )))
            }
        };
        for branch in branches {
            let Value::Object(branch) = branch else {
                return Err(CompileError::invalid(format!(
                    "'{quantifier}' branch must be an object, got {branch}"
                )));
            };
            match branch.get("properties") {
                None => {}
                Some(Value::Object(props)) => merge_maps(&mut merged, props)?,
                Some(other) => {
                    return Err(CompileError::invalid(format!(
                        "'properties' must be an object, got {other}"
                    )))
                }
            }
        }
    }

    if merged.is_empty() {
        return Err(CompileError::invalid("properties can't be empty"));
    }
    Ok(merged)
}
