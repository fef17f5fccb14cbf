//! Pre-submission diagnostics over field names. Nothing here builds a tree.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::collect::{collect, FormSource};
use crate::path::{parse_path_with_limit, FieldPath};
use crate::{Result, SerializeOptions};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub success: bool,
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

/// Collect `source` (resolving template groups) and check every field name.
pub fn validate<S>(source: &S, options: &SerializeOptions) -> ValidationReport
where
    S: FormSource + ?Sized,
{
    let entries = collect(source, options);
    validate_entries(entries.iter().map(|(name, _)| name.as_str()), options)
}

pub fn validate_entries<I, K>(names: I, options: &SerializeOptions) -> ValidationReport
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let names: Vec<K> = names.into_iter().collect();
    let names: Vec<&str> = names.iter().map(|name| name.as_ref()).collect();
    let parsed = parse_all(&names, options.limits.max_parse_steps);

    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut groups: BTreeMap<String, BTreeSet<usize>> = BTreeMap::new();

    for (name, path) in names.iter().zip(parsed) {
        if name.contains("..") {
            warnings.push(format!("{name}: consecutive separators"));
        }
        if has_inner_empty_brackets(name) {
            warnings.push(format!("{name}: empty array notation before the end of the name"));
        }
        match path {
            Ok(path) => record_indices(&path, &mut groups),
            Err(err) => errors.push(format!("{name}: {err}")),
        }
    }

    for (group, indices) in &groups {
        if let Some(missing) = describe_gaps(indices) {
            warnings.push(format!("gap in `{group}` indices: missing {missing}"));
        }
    }

    ValidationReport {
        success: errors.is_empty(),
        errors,
        warnings,
    }
}

#[cfg(feature = "parallel")]
fn parse_all(names: &[&str], max_steps: usize) -> Vec<Result<FieldPath>> {
    names
        .par_iter()
        .map(|name| parse_path_with_limit(name, max_steps))
        .collect()
}

#[cfg(not(feature = "parallel"))]
fn parse_all(names: &[&str], max_steps: usize) -> Vec<Result<FieldPath>> {
    names
        .iter()
        .map(|name| parse_path_with_limit(name, max_steps))
        .collect()
}

fn has_inner_empty_brackets(name: &str) -> bool {
    name.match_indices("[]")
        .any(|(pos, token)| pos + token.len() != name.len())
}

fn record_indices(path: &FieldPath, groups: &mut BTreeMap<String, BTreeSet<usize>>) {
    for (pos, segment) in path.iter().enumerate() {
        if let Some(index) = segment.as_index() {
            groups
                .entry(path.prefix_string(pos))
                .or_default()
                .insert(index);
        }
    }
}

/// Render the positions missing between the smallest and largest observed
/// index as `1`, `3-5, 9`, or `None` when contiguous.
fn describe_gaps(indices: &BTreeSet<usize>) -> Option<String> {
    let mut ranges = Vec::new();
    let mut iter = indices.iter().copied();
    let mut prev = iter.next()?;
    for index in iter {
        if index > prev + 1 {
            let (start, end) = (prev + 1, index - 1);
            ranges.push(if start == end {
                start.to_string()
            } else {
                format!("{start}-{end}")
            });
        }
        prev = index;
    }
    if ranges.is_empty() {
        None
    } else {
        Some(ranges.join(", "))
    }
}
