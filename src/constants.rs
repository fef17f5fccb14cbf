pub const MAX_DEPTH: usize = 30;

pub const MAX_INDEX: usize = 10_000;

pub const MAX_PARSE_STEPS: usize = 50;

pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

pub const DEFAULT_TEMPLATE_MARKER: &str = "TEMPLATE";

#[inline]
pub fn is_numeral(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|byte| byte.is_ascii_digit())
}
