use crate::types::{Path, Segment};

/// Largest integer a path index may hold (2^53 - 1).
pub const MAX_SAFE_INTEGER: u64 = 9_007_199_254_740_991;

/// Check if a string is a canonical non-negative integer index.
///
/// # Example
///
/// ```
/// use json_binding_path::is_index_str;
///
/// assert!(is_index_str("0"));
/// assert!(is_index_str("123"));
/// assert!(!is_index_str("-1"));
/// assert!(!is_index_str("1.5"));
/// assert!(!is_index_str("01"));
/// ```
pub fn is_index_str(index: &str) -> bool {
    if index.is_empty() {
        return false;
    }
    let bytes = index.as_bytes();
    // First char can't be leading zero unless it's just "0"
    if bytes.len() > 1 && bytes[0] == b'0' {
        return false;
    }
    if !bytes.iter().all(|&b| b.is_ascii_digit()) {
        return false;
    }
    index.parse::<u64>().is_ok_and(|n| n < MAX_SAFE_INTEGER)
}

/// Check if a segment addresses an array slot.
///
/// Decides whether a missing intermediate container becomes an array or an
/// object when a write builds it out.
pub fn is_index(segment: &Segment) -> bool {
    match segment {
        Segment::Index(idx) => (*idx as u64) < MAX_SAFE_INTEGER,
        Segment::Key(key) => is_index_str(key),
    }
}

/// Join path segments with `sep`.
///
/// ```
/// use json_binding_path::{join_path, path};
///
/// assert_eq!(join_path(&path!["A", "B", 0, "C"], "."), "A.B.0.C");
/// ```
pub fn join_path(path: &[Segment], sep: &str) -> String {
    let mut out = String::new();
    for (i, segment) in path.iter().enumerate() {
        if i > 0 {
            out.push_str(sep);
        }
        out.push_str(&segment.as_key());
    }
    out
}

/// Concatenate two paths into a new one.
pub fn concat_path(head: &[Segment], tail: &[Segment]) -> Path {
    let mut out = Vec::with_capacity(head.len() + tail.len());
    out.extend_from_slice(head);
    out.extend_from_slice(tail);
    out
}

/// Check if `parent` path contains the `child` path.
pub fn is_child(parent: &[Segment], child: &[Segment]) -> bool {
    parent.len() < child.len() && child.starts_with(parent)
}

/// Check if two segments address the same location.
///
/// `Key("0")` and `Index(0)` are the same step.
pub fn is_same_segment(a: &Segment, b: &Segment) -> bool {
    a.as_key() == b.as_key()
}

/// Check if two paths address the same location.
pub fn is_path_equal(p1: &[Segment], p2: &[Segment]) -> bool {
    p1.len() == p2.len() && p1.iter().zip(p2).all(|(a, b)| is_same_segment(a, b))
}

/// Get the parent path of a given path, `None` for the root.
pub fn parent_path(path: &[Segment]) -> Option<Path> {
    path.split_last().map(|(_, parent)| parent.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::path;

    #[test]
    fn test_is_index() {
        assert!(is_index(&Segment::Index(0)));
        assert!(is_index(&Segment::from("42")));
        assert!(!is_index(&Segment::from("")));
        assert!(!is_index(&Segment::from("x1")));
        assert!(!is_index(&Segment::from("9007199254740991")));
        assert!(is_index(&Segment::from("9007199254740990")));
    }

    #[test]
    fn test_join_and_concat() {
        let p = concat_path(&path!["a"], &path![1, "b"]);
        assert_eq!(join_path(&p, "."), "a.1.b");
        assert_eq!(join_path(&[], "."), "");
    }

    #[test]
    fn test_is_child() {
        let parent = path!["foo"];
        let child = path!["foo", "bar"];
        let sibling = path!["baz"];

        assert!(is_child(&parent, &child));
        assert!(!is_child(&child, &parent));
        assert!(!is_child(&parent, &sibling));
        assert!(!is_child(&parent, &parent));
    }

    #[test]
    fn test_is_path_equal_mixes_index_forms() {
        assert!(is_path_equal(&path!["a", 0], &path!["a", "0"]));
        assert!(!is_path_equal(&path!["a", 0], &path!["a", 1]));
    }

    #[test]
    fn test_parent_path() {
        assert_eq!(parent_path(&path!["foo", "bar"]), Some(path!["foo"]));
        assert_eq!(parent_path(&path!["foo"]), Some(path![]));
        assert_eq!(parent_path(&[]), None);
    }
}
