//! Path pattern matching.
//!
//! # Responsibilities
//! - Match a concrete request path against a route pattern
//! - Extract named `{placeholder}` segments
//!
//! # Design Decisions
//! - Segment-wise comparison, split on `/`; empty segments count
//! - Placeholders bind any single segment, including an empty one
//! - Literal segments compare byte-for-byte (case-sensitive)
//! - Matching runs on the percent-decoded path; `%2F` decodes to a
//!   separator before the split
//! - No wildcards, no regex

use std::borrow::Cow;
use std::collections::BTreeMap;

use percent_encoding::percent_decode_str;

/// Parameters extracted from a matched path, keyed by placeholder name.
///
/// Ordered so that the subprocess environment is built deterministically.
pub type PathParams = BTreeMap<String, String>;

/// Returns the placeholder name if `segment` is written `{name}` with a
/// non-empty name.
fn placeholder(segment: &str) -> Option<&str> {
    if segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}') {
        Some(&segment[1..segment.len() - 1])
    } else {
        None
    }
}

/// Percent-decode a request path for matching.
///
/// Invalid escapes are kept as written; bytes that are not UTF-8 become
/// U+FFFD.
pub fn decode_path(path: &str) -> Cow<'_, str> {
    percent_decode_str(path).decode_utf8_lossy()
}

/// Match `path` against `pattern`.
///
/// Returns `None` on mismatch. A successful match with no placeholders
/// returns an empty map. If a name occurs twice the later segment wins.
pub fn match_path(path: &str, pattern: &str) -> Option<PathParams> {
    let path_segments: Vec<&str> = path.split('/').collect();
    let pattern_segments: Vec<&str> = pattern.split('/').collect();

    if path_segments.len() != pattern_segments.len() {
        return None;
    }

    let mut params = PathParams::new();

    for (expected, actual) in pattern_segments.iter().zip(&path_segments) {
        match placeholder(expected) {
            Some(name) => {
                params.insert(name.to_string(), (*actual).to_string());
            }
            None if expected != actual => return None,
            None => {}
        }
    }

    Some(params)
}
