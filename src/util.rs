//! Small text utilities shared across the crate.

use url::Url;

/// Truncate a string to at most `max_chars` characters, appending an
/// ellipsis when anything was cut. Operates on character boundaries so
/// multi-byte input is never split.
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    let keep = max_chars.saturating_sub(1);
    let mut out: String = s.chars().take(keep).collect();
    out.push('…');
    out
}

/// Extract the final path component of a file path.
///
/// Works on both `/` and `\` separators since tool arguments may come from
/// any platform.
#[must_use]
pub fn file_name_of(path: &str) -> &str {
    path.rsplit(['/', '\\'])
        .next()
        .filter(|s| !s.is_empty())
        .unwrap_or(path)
}

/// Extract the host portion of a URL, if it parses as one.
#[must_use]
pub fn host_of(url: &str) -> Option<String> {
    Url::parse(url)
        .ok()
        .and_then(|u| u.host_str().map(str::to_string))
}

/// Render a JSON value as a single compact line bounded to `max_chars`.
///
/// Used when handing tool arguments to a language model.
#[must_use]
pub fn compact_json(value: &serde_json::Value, max_chars: usize) -> String {
    truncate_str(&value.to_string(), max_chars)
}
