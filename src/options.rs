use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::constants::{
    DEFAULT_TEMPLATE_MARKER, DEFAULT_TIMEOUT_MS, MAX_DEPTH, MAX_INDEX, MAX_PARSE_STEPS,
};

/// Hard bounds applied while parsing and building a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    pub max_depth: usize,
    pub max_index: usize,
    pub max_parse_steps: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_depth: MAX_DEPTH,
            max_index: MAX_INDEX,
            max_parse_steps: MAX_PARSE_STEPS,
        }
    }
}

/// Placeholder index tokens marking template groups, e.g. `senses[TEMPLATE]`.
///
/// # Examples
/// ```
/// use formpath::TemplateMarkers;
///
/// let markers = TemplateMarkers::new(["TEMPLATE", "NEW"]);
/// assert!(markers.contains("NEW"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateMarkers(Vec<SmolStr>);

impl TemplateMarkers {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self(markers.into_iter().map(|m| SmolStr::new(m.as_ref())).collect())
    }

    pub fn none() -> Self {
        Self(Vec::new())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.iter().any(|marker| marker == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(SmolStr::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for TemplateMarkers {
    fn default() -> Self {
        Self::new([DEFAULT_TEMPLATE_MARKER])
    }
}

/// Options for collecting, building and dispatching a form serialization.
///
/// The serde shape is the one posted to an offload worker, so field names are
/// camelCase and every field falls back to its default when missing.
///
/// # Examples
/// ```
/// use formpath::SerializeOptions;
///
/// let opts = SerializeOptions::new()
///     .with_include_disabled(true)
///     .with_timeout_ms(2_000);
/// assert!(opts.include_disabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SerializeOptions {
    pub include_empty: bool,
    pub include_disabled: bool,
    #[serde(rename = "timeout")]
    pub timeout_ms: u64,
    pub strict: bool,
    pub template_markers: TemplateMarkers,
    pub limits: Limits,
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self {
            include_empty: true,
            include_disabled: false,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            strict: false,
            template_markers: TemplateMarkers::default(),
            limits: Limits::default(),
        }
    }
}

impl SerializeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep text fields whose value is the empty string.
    pub fn with_include_empty(mut self, include_empty: bool) -> Self {
        self.include_empty = include_empty;
        self
    }

    /// Keep fields whose source element is marked disabled.
    pub fn with_include_disabled(mut self, include_disabled: bool) -> Self {
        self.include_disabled = include_disabled;
        self
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Raise the first field-level error instead of recording it.
    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }

    pub fn with_template_markers(mut self, markers: TemplateMarkers) -> Self {
        self.template_markers = markers;
        self
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}
