use regex::Regex;
use std::sync::LazyLock;

/// First fenced block, optionally tagged `json`. Lazy so that a second fence
/// further down the completion is never swallowed into the first.
static FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)```(?:json)?\s*(.*?)```").unwrap());

/// Return the trimmed interior of the first fenced block, or the whole text
/// when there is none.
pub fn strip_fence(text: &str) -> &str {
    match FENCE.captures(text).and_then(|caps| caps.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text,
    }
}
