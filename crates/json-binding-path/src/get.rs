use serde_json::Value;

use crate::types::{Path, Reference, Segment};

/// Maximum number of reference hops followed while resolving one path.
pub const DEFAULT_MAX_REF_HOPS: usize = 32;

/// Step from a container into one of its children.
///
/// Objects are addressed by key, arrays by index; anything else has no
/// children.
pub fn child<'a>(container: &'a Value, segment: &Segment) -> Option<&'a Value> {
    match container {
        Value::Object(map) => map.get(segment.as_key().as_ref()),
        Value::Array(arr) => arr.get(segment.as_index()?),
        _ => None,
    }
}

/// Get a value by path without following references.
pub fn get<'a>(val: &'a Value, path: &[Segment]) -> Option<&'a Value> {
    let mut current = val;
    for segment in path {
        current = child(current, segment)?;
    }
    Some(current)
}

/// Get a value by path, following references met in container position.
///
/// A reference stored at the leaf is returned as-is so callers can inspect
/// or edit it. An empty path returns `root`.
///
/// # Example
///
/// ```
/// use json_binding_path::{base_get, path};
/// use serde_json::json;
///
/// let doc = json!({
///     "todos": [{"$type": "ref", "value": ["todosById", "44"]}],
///     "todosById": {"44": {"done": false}}
/// });
/// assert_eq!(base_get(&doc, &path!["todos", 0, "done"]), Some(&json!(false)));
/// assert_eq!(
///     base_get(&doc, &path!["todos", 0]),
///     Some(&json!({"$type": "ref", "value": ["todosById", "44"]}))
/// );
/// ```
pub fn base_get<'a>(root: &'a Value, path: &[Segment]) -> Option<&'a Value> {
    base_get_with(root, path, DEFAULT_MAX_REF_HOPS)
}

/// [`base_get`] with an explicit reference hop limit.
pub fn base_get_with<'a>(root: &'a Value, path: &[Segment], max_hops: usize) -> Option<&'a Value> {
    let mut budget = max_hops;
    walk(root, root, path, &mut budget)
}

/// Follow `candidate` to its target when it is a reference.
///
/// Chains of references are followed until a non-reference is reached.
/// Returns `None` when the target does not exist or the chain is longer than
/// [`DEFAULT_MAX_REF_HOPS`].
pub fn follow_ref<'a>(root: &'a Value, candidate: &'a Value) -> Option<&'a Value> {
    let mut budget = DEFAULT_MAX_REF_HOPS;
    deref(root, candidate, &mut budget)
}

fn walk<'a>(
    root: &'a Value,
    start: &'a Value,
    path: &[Segment],
    budget: &mut usize,
) -> Option<&'a Value> {
    let mut current = start;
    for segment in path {
        current = deref(root, current, budget)?;
        current = child(current, segment)?;
    }
    Some(current)
}

fn deref<'a>(root: &'a Value, candidate: &'a Value, budget: &mut usize) -> Option<&'a Value> {
    let mut current = candidate;
    while let Some(reference) = Reference::from_value(current) {
        if *budget == 0 {
            tracing::debug!(target_path = ?reference.path, "reference hop limit reached");
            return None;
        }
        *budget -= 1;
        current = walk(root, root, &reference.path, budget)?;
    }
    Some(current)
}

/// Rewrite a logical path into the physical location it addresses.
///
/// Every reference met in container position is replaced by its target
/// path, so the result can be walked with plain [`get`] or written with
/// [`base_set`](crate::base_set). Parts of the path that do not exist yet are
/// kept verbatim. Returns `None` only when the hop limit is exceeded.
///
/// ```
/// use json_binding_path::{path, resolve_path, DEFAULT_MAX_REF_HOPS};
/// use serde_json::json;
///
/// let doc = json!({
///     "todos": [{"$type": "ref", "value": ["todosById", "44"]}],
///     "todosById": {"44": {}}
/// });
/// assert_eq!(
///     resolve_path(&doc, &path!["todos", 0, "done"], DEFAULT_MAX_REF_HOPS),
///     Some(path!["todosById", "44", "done"])
/// );
/// ```
pub fn resolve_path(root: &Value, path: &[Segment], max_hops: usize) -> Option<Path> {
    let mut budget = max_hops;
    resolve_into(root, path, &mut budget)
}

fn resolve_into(root: &Value, path: &[Segment], budget: &mut usize) -> Option<Path> {
    let mut physical: Path = Vec::with_capacity(path.len());
    let mut current = Some(root);
    for segment in path {
        while let Some(reference) = current.and_then(Reference::from_value) {
            if *budget == 0 {
                tracing::debug!(target_path = ?reference.path, "reference hop limit reached");
                return None;
            }
            *budget -= 1;
            physical = resolve_into(root, &reference.path, budget)?;
            current = get(root, &physical);
        }
        current = current.and_then(|c| child(c, segment));
        physical.push(segment.clone());
    }
    Some(physical)
}
