use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::warn;

use crate::build::Builder;
use crate::collect::{collect, FieldValue, FormSource};
use crate::{Result, SerializeOptions};

/// A field that was skipped because its path failed to parse or build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProblemRecord {
    pub key: String,
    pub value: Value,
    pub error: String,
}

/// The outcome of one serialization call: the document plus the diagnostics
/// of the fields that were skipped while building it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Serialized {
    pub tree: Value,
    #[serde(default)]
    pub problems: Vec<ProblemRecord>,
}

impl Serialized {
    pub fn is_clean(&self) -> bool {
        self.problems.is_empty()
    }

    pub fn into_tree(self) -> Value {
        self.tree
    }
}

pub fn serialize<S>(source: &S, options: &SerializeOptions) -> Result<Serialized>
where
    S: FormSource + ?Sized,
{
    serialize_entries(collect(source, options), options)
}

/// Build a document from already-collected entries, strictly in iteration order.
pub fn serialize_entries<I, K, V>(entries: I, options: &SerializeOptions) -> Result<Serialized>
where
    I: IntoIterator<Item = (K, V)>,
    K: AsRef<str>,
    V: Into<FieldValue>,
{
    let builder = Builder::new(options.limits);
    let mut tree = Map::new();
    let mut problems = Vec::new();

    for (key, value) in entries {
        let key = key.as_ref();
        let value: FieldValue = value.into();
        let value = Value::from(value);
        if let Err(err) = builder.set(&mut tree, key, value.clone()) {
            if options.strict || !err.kind.is_field_level() {
                return Err(err.with_key(key));
            }
            warn!(field = %key, error = %err, "skipping field");
            problems.push(ProblemRecord {
                key: key.to_string(),
                value,
                error: err.message,
            });
        }
    }

    Ok(Serialized {
        tree: Value::Object(tree),
        problems,
    })
}
