//! Dotted-path addressing.
//!
//! A path is a sequence of keys separated by `.`. A backslash escapes the
//! character that follows it, so `a\.b` addresses the single key `"a.b"` and
//! `a\\b` addresses the key `a\b`.

use std::borrow::Cow;

/// Split a dotted path into its unescaped segments.
///
/// Always returns at least one segment; the empty path addresses the empty key.
///
/// # Examples
///
/// ```rust
/// use hotswap_json::core::path::segments;
///
/// assert_eq!(segments("server.port"), vec!["server", "port"]);
/// assert_eq!(segments(r"hosts.db\.primary"), vec!["hosts", "db.primary"]);
/// ```
pub fn segments(path: &str) -> Vec<Cow<'_, str>> {
    if !path.contains('\\') {
        return path.split('.').map(Cow::Borrowed).collect();
    }

    let mut segments = Vec::new();
    let mut current = String::new();
    let mut chars = path.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some(escaped) => current.push(escaped),
                None => current.push('\\'),
            },
            '.' => segments.push(Cow::Owned(std::mem::take(&mut current))),
            _ => current.push(c),
        }
    }
    segments.push(Cow::Owned(current));

    segments
}

/// Escape a raw key so it can be used as one segment of a dotted path.
///
/// # Examples
///
/// ```rust
/// use hotswap_json::core::path::escape_segment;
///
/// assert_eq!(escape_segment("port"), "port");
/// assert_eq!(escape_segment("db.primary"), r"db\.primary");
/// ```
pub fn escape_segment(key: &str) -> Cow<'_, str> {
    if !key.contains(['.', '\\']) {
        return Cow::Borrowed(key);
    }

    let mut escaped = String::with_capacity(key.len() + 2);
    for c in key.chars() {
        if c == '.' || c == '\\' {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    Cow::Owned(escaped)
}

/// Join a parent path and an already-escaped child path.
pub fn join(parent: &str, child: &str) -> String {
    format!("{}.{}", parent, child)
}
