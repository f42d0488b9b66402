//! Dotted/bracket path resolution over nested data.

use serde_json::Value;

/// One step of a parsed path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    /// Object member
    Key(String),
    /// Sequence position; only ever applied to arrays
    Index(usize),
}

/// Split `a.b[0].c` into segments.
///
/// `.`, `[` and `]` all separate segments; blank segments are dropped.
/// All-digit segments become indices.
pub fn parse_path(path: &str) -> Vec<PathSegment> {
    path.split(['.', '[', ']'])
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
        .map(|segment| {
            if segment.bytes().all(|b| b.is_ascii_digit()) {
                match segment.parse() {
                    Ok(index) => PathSegment::Index(index),
                    Err(_) => PathSegment::Key(segment.to_string()),
                }
            } else {
                PathSegment::Key(segment.to_string())
            }
        })
        .collect()
}

/// Walk `path` through `root`.
///
/// Returns `None` on a missing key, an out-of-range index, or a type
/// mismatch such as a key applied to an array. A `null` at the end of the
/// path also counts as missing.
pub fn resolve_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let segments = parse_path(path);
    if segments.is_empty() {
        return None;
    }

    let mut current = root;
    for segment in &segments {
        current = match (segment, current) {
            (PathSegment::Key(key), Value::Object(map)) => map.get(key)?,
            (PathSegment::Index(i), Value::Array(items)) => items.get(*i)?,
            _ => return None,
        };
    }

    if current.is_null() {
        None
    } else {
        Some(current)
    }
}

/// Anything the renderer can pull field values from.
pub trait ValueSource {
    /// Value bound at `path`, or `None` when nothing is there.
    fn resolve(&self, path: &str) -> Option<Value>;
}

impl ValueSource for Value {
    fn resolve(&self, path: &str) -> Option<Value> {
        resolve_path(self, path).cloned()
    }
}

impl<T: ValueSource + ?Sized> ValueSource for &T {
    fn resolve(&self, path: &str) -> Option<Value> {
        (**self).resolve(path)
    }
}
