use std::collections::BTreeMap;

use tracing::debug;

use super::Entry;
use crate::options::TemplateMarkers;

/// Locate the first `[<marker>]` token in `name`.
///
/// Returns the group prefix (the text before the token) and the marker found.
pub fn template_split<'a, 'm>(name: &'a str, markers: &'m TemplateMarkers) -> Option<(&'a str, &'m str)> {
    markers
        .iter()
        .filter_map(|marker| find_token(name, marker).map(|pos| (pos, marker)))
        .min_by_key(|(pos, _)| *pos)
        .map(|(pos, marker)| (&name[..pos], marker))
}

fn find_token(name: &str, marker: &str) -> Option<usize> {
    let bytes = name.as_bytes();
    let mut from = 0;
    while let Some(offset) = memchr::memchr(b'[', &bytes[from..]) {
        let open = from + offset;
        let inner = &name[open + 1..];
        if inner.starts_with(marker) && inner[marker.len()..].starts_with(']') {
            return Some(open);
        }
        from = open + 1;
    }
    None
}

/// True when `name` is `<prefix>[<digits>]...`.
fn is_instance_of(name: &str, prefix: &str) -> bool {
    let Some(rest) = name.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('[')) else {
        return false;
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    digits > 0 && rest[digits..].starts_with(']')
}

fn rewrite_markers(name: &str, markers: &TemplateMarkers) -> String {
    let mut out = name.to_string();
    for marker in markers.iter() {
        out = out.replace(&format!("[{marker}]"), "[0]");
    }
    out
}

/// Drop or promote template placeholder groups.
///
/// Each group (fields sharing the prefix before their first marker) is decided
/// independently: when a genuine `<prefix>[<digits>]` field exists the whole
/// group is dropped, otherwise its markers are rewritten to index `0`.
pub(crate) fn resolve_templates(entries: Vec<Entry>, markers: &TemplateMarkers) -> Vec<Entry> {
    if markers.is_empty() {
        return entries;
    }
    let prefixes: Vec<Option<String>> = entries
        .iter()
        .map(|(name, _)| template_split(name, markers).map(|(prefix, _)| prefix.to_string()))
        .collect();
    if prefixes.iter().all(Option::is_none) {
        return entries;
    }

    let mut has_instance: BTreeMap<&str, bool> = BTreeMap::new();
    for prefix in prefixes.iter().flatten() {
        has_instance.entry(prefix.as_str()).or_insert_with(|| {
            entries
                .iter()
                .zip(&prefixes)
                .any(|((name, _), own)| own.as_deref() != Some(prefix.as_str()) && is_instance_of(name, prefix))
        });
    }
    for (prefix, genuine) in &has_instance {
        if *genuine {
            debug!(group = %prefix, "dropping template group, genuine instance present");
        } else {
            debug!(group = %prefix, "promoting template group to index 0");
        }
    }

    entries
        .into_iter()
        .zip(&prefixes)
        .filter_map(|((name, value), prefix)| match prefix {
            None => Some((name, value)),
            Some(prefix) if has_instance[prefix.as_str()] => None,
            Some(_) => Some((rewrite_markers(&name, markers), value)),
        })
        .collect()
}
