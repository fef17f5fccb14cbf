pub mod build;
pub mod collect;
pub mod constants;
pub mod dispatch;
pub mod error;
pub mod options;
pub mod path;
pub mod serialize;
pub mod validate;

pub use crate::build::{set_nested_value, to_sequence, Builder};
pub use crate::collect::{collect, Entry, FieldValue, FormField, FormSource};
pub use crate::dispatch::{serialize_bounded, Dispatcher, ThreadWorker, WorkerFacility};
pub use crate::error::{Error, ErrorKind, ErrorStage};
pub use crate::options::{Limits, SerializeOptions, TemplateMarkers};
pub use crate::path::{parse_path, FieldPath, Segment};
pub use crate::serialize::{serialize, serialize_entries, ProblemRecord, Serialized};
pub use crate::validate::{validate, validate_entries, ValidationReport};

pub type Result<T> = std::result::Result<T, Error>;

/// Serialize `source` with default options and return only the document.
pub fn to_value<S>(source: &S) -> Result<serde_json::Value>
where
    S: FormSource + ?Sized,
{
    serialize(source, &SerializeOptions::default()).map(Serialized::into_tree)
}

/// Serialize `source` and deserialize the document into `T`.
pub fn from_form<T, S>(source: &S, options: &SerializeOptions) -> Result<(T, Vec<ProblemRecord>)>
where
    T: serde::de::DeserializeOwned,
    S: FormSource + ?Sized,
{
    let out = serialize(source, options)?;
    let value = serde_json::from_value(out.tree)
        .map_err(|err| Error::deserialize(format!("deserialize failed: {err}")))?;
    Ok((value, out.problems))
}
