//! Field paths: the dotted/bracketed names of form fields, split into segments.

mod parser;

use std::fmt;

use smallvec::SmallVec;
use smol_str::SmolStr;

pub use parser::{parse_path, parse_path_with_limit};

/// One step of a field path: an object property or a numeral array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Segment {
    pub key: SmolStr,
    pub is_index: bool,
}

impl Segment {
    pub fn property(key: impl AsRef<str>) -> Self {
        Self {
            key: SmolStr::new(key.as_ref()),
            is_index: false,
        }
    }

    /// Caller guarantees `digits` is an ASCII numeral.
    pub fn index(digits: impl AsRef<str>) -> Self {
        Self {
            key: SmolStr::new(digits.as_ref()),
            is_index: true,
        }
    }

    /// Numeric value of an index segment; `None` for properties and for numerals
    /// too large for `usize`.
    pub fn as_index(&self) -> Option<usize> {
        if !self.is_index {
            return None;
        }
        self.key.parse().ok()
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_index {
            write!(f, "[{}]", self.key)
        } else {
            f.write_str(&self.key)
        }
    }
}

/// A parsed field path. Never empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldPath {
    segments: SmallVec<[Segment; 8]>,
}

impl FieldPath {
    pub(crate) fn from_segments(segments: SmallVec<[Segment; 8]>) -> Self {
        debug_assert!(!segments.is_empty());
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn terminal(&self) -> &Segment {
        &self.segments[self.segments.len() - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Segment> {
        self.segments.iter()
    }

    /// Render the first `len` segments back into field-name form.
    pub fn prefix_string(&self, len: usize) -> String {
        let mut out = String::new();
        for (idx, segment) in self.segments.iter().take(len).enumerate() {
            if idx > 0 && !segment.is_index {
                out.push('.');
            }
            if segment.is_index {
                out.push('[');
                out.push_str(&segment.key);
                out.push(']');
            } else {
                out.push_str(&segment.key);
            }
        }
        out
    }
}

impl<'a> IntoIterator for &'a FieldPath {
    type Item = &'a Segment;
    type IntoIter = std::slice::Iter<'a, Segment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.prefix_string(self.segments.len()))
    }
}
