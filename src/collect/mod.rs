//! Extracting ordered `(name, value)` entries from a form-like source.

mod template;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::SerializeOptions;

pub use template::template_split;

/// A submitted field value: text, or a checkbox-style boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Bool(bool),
    Text(String),
}

impl FieldValue {
    pub fn is_empty(&self) -> bool {
        matches!(self, FieldValue::Text(text) if text.is_empty())
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<FieldValue> for Value {
    fn from(value: FieldValue) -> Self {
        match value {
            FieldValue::Bool(flag) => Value::Bool(flag),
            FieldValue::Text(text) => Value::String(text),
        }
    }
}

/// One field of a form, as the host hands it over.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub name: String,
    pub value: FieldValue,
    #[serde(default)]
    pub disabled: bool,
}

impl FormField {
    pub fn new(name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            disabled: false,
        }
    }

    pub fn with_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }
}

/// An ordered field entry, ready for parsing.
pub type Entry = (String, FieldValue);

/// Anything that can list its fields in document order.
pub trait FormSource {
    fn fields(&self) -> Vec<FormField>;
}

impl FormSource for [FormField] {
    fn fields(&self) -> Vec<FormField> {
        self.to_vec()
    }
}

impl FormSource for Vec<FormField> {
    fn fields(&self) -> Vec<FormField> {
        self.clone()
    }
}

impl<K, V> FormSource for [(K, V)]
where
    K: AsRef<str>,
    V: Clone + Into<FieldValue>,
{
    fn fields(&self) -> Vec<FormField> {
        self.iter()
            .map(|(name, value)| FormField::new(name.as_ref(), value.clone()))
            .collect()
    }
}

impl<K, V> FormSource for Vec<(K, V)>
where
    K: AsRef<str>,
    V: Clone + Into<FieldValue>,
{
    fn fields(&self) -> Vec<FormField> {
        self.as_slice().fields()
    }
}

/// Collect the ordered entries of `source`, dropping disabled and (optionally)
/// empty fields, then resolving template placeholder groups.
///
/// Duplicate names are kept, in source order.
pub fn collect<S>(source: &S, options: &SerializeOptions) -> Vec<Entry>
where
    S: FormSource + ?Sized,
{
    let mut entries = Vec::new();
    for field in source.fields() {
        if field.disabled && !options.include_disabled {
            debug!(field = %field.name, "skipping disabled field");
            continue;
        }
        if !options.include_empty && field.value.is_empty() {
            debug!(field = %field.name, "skipping empty field");
            continue;
        }
        entries.push((field.name, field.value));
    }
    template::resolve_templates(entries, &options.template_markers)
}
