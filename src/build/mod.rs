//! Assigning values into a result tree at the position a field path names.

mod shape;

use serde_json::{Map, Value};

use crate::options::Limits;
use crate::path::{parse_path_with_limit, FieldPath, Segment};
use crate::{Error, Result};

pub use shape::to_sequence;
use shape::{ensure_sequence, fill_vacant, grow, numeral_lookup};

/// Parse `path` and assign `value` into `tree` with the default limits.
pub fn set_nested_value(tree: &mut Map<String, Value>, path: &str, value: Value) -> Result<()> {
    Builder::default().set(tree, path, value)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Builder {
    limits: Limits,
}

impl Builder {
    pub fn new(limits: Limits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> Limits {
        self.limits
    }

    pub fn set(&self, tree: &mut Map<String, Value>, path: &str, value: Value) -> Result<()> {
        let path = parse_path_with_limit(path, self.limits.max_parse_steps)?;
        self.set_path(tree, &path, value)
    }

    /// Assign `value` at `path`. Every check runs before the tree is touched, so a
    /// failing field leaves what other fields built intact.
    pub fn set_path(&self, tree: &mut Map<String, Value>, path: &FieldPath, value: Value) -> Result<()> {
        self.check_bounds(path)?;
        let segments = path.segments();
        let (first, rest) = match segments.split_first() {
            Some(split) => split,
            None => return Err(Error::path_syntax("field path has no segments")),
        };
        if first.is_index {
            return Err(Error::path_conflict("the root document cannot be indexed"));
        }
        self.probe(tree, first, rest)?;

        let Some(next) = rest.first() else {
            tree.insert(first.key.to_string(), value);
            return Ok(());
        };
        let slot = tree.entry(first.key.to_string()).or_insert(Value::Null);
        fill_vacant(slot, next);
        self.assign(slot, rest, value)
    }

    fn check_bounds(&self, path: &FieldPath) -> Result<()> {
        if path.len() > self.limits.max_depth {
            return Err(Error::depth_exceeded(path.len(), self.limits.max_depth));
        }
        for segment in path.iter().filter(|segment| segment.is_index) {
            match segment.as_index() {
                Some(index) if index <= self.limits.max_index => {}
                _ => return Err(Error::index_too_large(&segment.key, self.limits.max_index)),
            }
        }
        Ok(())
    }

    /// Read-only walk over the existing nodes `rest` passes through, rejecting
    /// shapes that cannot be converted.
    fn probe(&self, tree: &Map<String, Value>, first: &Segment, rest: &[Segment]) -> Result<()> {
        let mut node = tree.get(first.key.as_str());
        for segment in rest {
            let Some(current) = node else {
                return Ok(());
            };
            node = match (current, segment.as_index()) {
                (Value::Null, _) => return Ok(()),
                (Value::Array(items), Some(index)) => items.get(index),
                (Value::Array(_), None) => {
                    return Err(Error::path_conflict(format!(
                        "property {:?} addressed on a sequence",
                        segment.key
                    )))
                }
                (Value::Object(map), Some(index)) => numeral_lookup(map, index, self.limits.max_index),
                (Value::Object(map), None) => map.get(segment.key.as_str()),
                (_, _) => {
                    return Err(Error::path_conflict(format!(
                        "{segment} descends into a scalar value"
                    )))
                }
            };
        }
        Ok(())
    }

    fn assign(&self, node: &mut Value, segments: &[Segment], value: Value) -> Result<()> {
        let Some((segment, rest)) = segments.split_first() else {
            *node = value;
            return Ok(());
        };

        if segment.is_index {
            let index = segment
                .as_index()
                .ok_or_else(|| Error::index_too_large(&segment.key, self.limits.max_index))?;
            let items = ensure_sequence(node, self.limits.max_index)?;
            let Some(next) = rest.first() else {
                grow(items, index, Value::Null);
                items[index] = value;
                return Ok(());
            };
            grow(items, index, Value::Object(Map::new()));
            let slot = &mut items[index];
            fill_vacant(slot, next);
            return self.assign(slot, rest, value);
        }

        let map = match node {
            Value::Object(map) => map,
            Value::Array(_) => {
                return Err(Error::path_conflict(format!(
                    "property {:?} addressed on a sequence",
                    segment.key
                )))
            }
            _ => {
                return Err(Error::path_conflict(format!(
                    "{segment} descends into a scalar value"
                )))
            }
        };
        let Some(next) = rest.first() else {
            map.insert(segment.key.to_string(), value);
            return Ok(());
        };
        let slot = map.entry(segment.key.to_string()).or_insert(Value::Null);
        fill_vacant(slot, next);
        self.assign(slot, rest, value)
    }
}
