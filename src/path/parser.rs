use memchr::{memchr, memchr2};
use smallvec::SmallVec;

use super::{FieldPath, Segment};
use crate::constants::{is_numeral, MAX_PARSE_STEPS};
use crate::{Error, Result};

pub fn parse_path(path: &str) -> Result<FieldPath> {
    parse_path_with_limit(path, MAX_PARSE_STEPS)
}

/// Split `path` into segments, left to right.
///
/// Each loop iteration is one resolution step: a `name[digits]` group, a
/// `name.` property, or the final property. More than `max_steps` steps fails
/// with a path-too-complex error.
pub fn parse_path_with_limit(path: &str, max_steps: usize) -> Result<FieldPath> {
    if path.is_empty() {
        return Err(Error::path_syntax("empty field path"));
    }

    let mut segments: SmallVec<[Segment; 8]> = SmallVec::new();
    let mut rest = path;
    let mut steps = 0;

    while !rest.is_empty() {
        steps += 1;
        if steps > max_steps {
            return Err(Error::path_too_complex(max_steps));
        }

        let bytes = rest.as_bytes();
        match memchr2(b'.', b'[', bytes) {
            None => {
                segments.push(Segment::property(rest));
                break;
            }
            Some(pos) if bytes[pos] == b'.' => {
                segments.push(Segment::property(&rest[..pos]));
                rest = &rest[pos + 1..];
            }
            Some(open) => {
                let close = memchr(b']', &bytes[open + 1..])
                    .map(|offset| open + 1 + offset)
                    .ok_or_else(|| Error::path_syntax("unclosed '[' in field path"))?;
                let index = &rest[open + 1..close];
                if !is_numeral(index) {
                    return Err(Error::invalid_index(index));
                }
                if open > 0 {
                    segments.push(Segment::property(&rest[..open]));
                }
                segments.push(Segment::index(index));
                rest = &rest[close + 1..];
                if let Some(after_dot) = rest.strip_prefix('.') {
                    rest = after_dot;
                }
            }
        }
    }

    if segments.is_empty() {
        return Err(Error::path_syntax("field path has no segments"));
    }
    Ok(FieldPath::from_segments(segments))
}
