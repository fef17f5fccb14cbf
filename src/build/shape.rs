use serde_json::{Map, Value};

use crate::constants::is_numeral;
use crate::path::Segment;
use crate::{Error, Result};

/// Rewrite a mapping into a sequence.
///
/// Numeral keys become positions (holes are `Null`); non-numeral keys and
/// positions above `max_index` are dropped. When two keys name the same
/// position (`"7"` and `"007"`) the later one wins.
pub fn to_sequence(map: Map<String, Value>, max_index: usize) -> Vec<Value> {
    let mut items = Vec::new();
    for (key, value) in map {
        let Some(index) = numeral_position(&key, max_index) else {
            continue;
        };
        grow(&mut items, index, Value::Null);
        items[index] = value;
    }
    items
}

pub(crate) fn numeral_position(key: &str, max_index: usize) -> Option<usize> {
    if !is_numeral(key) {
        return None;
    }
    key.parse::<usize>().ok().filter(|index| *index <= max_index)
}

/// Entry a mapping would contribute at `index` once converted by [`to_sequence`].
pub(crate) fn numeral_lookup(map: &Map<String, Value>, index: usize, max_index: usize) -> Option<&Value> {
    map.iter()
        .filter(|(key, _)| numeral_position(key, max_index) == Some(index))
        .map(|(_, value)| value)
        .last()
}

/// Extend `items` with `filler` until `index` is addressable.
pub(crate) fn grow(items: &mut Vec<Value>, index: usize, filler: Value) {
    if items.len() <= index {
        items.resize(index + 1, filler);
    }
}

/// Make `node` a sequence, converting a mapping or a vacant slot in place.
pub(crate) fn ensure_sequence(node: &mut Value, max_index: usize) -> Result<&mut Vec<Value>> {
    match node {
        Value::Array(_) => {}
        Value::Object(map) => {
            let map = std::mem::take(map);
            *node = Value::Array(to_sequence(map, max_index));
        }
        Value::Null => *node = Value::Array(Vec::new()),
        _ => return Err(Error::path_conflict("cannot index into a scalar value")),
    }
    match node {
        Value::Array(items) => Ok(items),
        _ => Err(Error::path_conflict("expected a sequence")),
    }
}

/// Give a vacant slot the container shape `next` needs: a sequence if and only
/// if `next` is an index.
pub(crate) fn fill_vacant(slot: &mut Value, next: &Segment) {
    if slot.is_null() {
        *slot = if next.is_index {
            Value::Array(Vec::new())
        } else {
            Value::Object(Map::new())
        };
    }
}
