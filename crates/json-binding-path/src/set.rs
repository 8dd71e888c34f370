use serde_json::{Map, Value};

use crate::types::Segment;
use crate::util::{is_index, join_path};
use crate::PathError;

/// Most `null` slots a single write may add when it addresses past the end
/// of an array.
pub const MAX_INDEX_GAP: usize = 1 << 16;

/// Decides what to place at a missing intermediate position.
///
/// Called with the value currently in the slot (`null` when absent) and the
/// segment that addresses it; `None` keeps the default choice.
pub type Customizer<'c> = dyn FnMut(&Value, &Segment) -> Option<Value> + 'c;

/// An empty container suited to be addressed by `next`.
pub fn empty_container_for(next: &Segment) -> Value {
    if is_index(next) {
        Value::Array(Vec::new())
    } else {
        Value::Object(Map::new())
    }
}

fn kind_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn is_container(value: &Value) -> bool {
    matches!(value, Value::Array(_) | Value::Object(_))
}

/// Set `value` at `path`, creating missing intermediate containers.
///
/// A missing or `null` intermediate becomes an array when the following
/// segment is an index and an object otherwise, unless `customizer` supplies
/// something else. Writing past the end of an array pads it with `null`.
/// References are not followed; resolve the path first with
/// [`resolve_path`](crate::resolve_path).
///
/// Returns the slot that now holds `value`.
///
/// # Errors
///
/// [`PathError::PathType`] when an intermediate position holds a primitive,
/// [`PathError::NotAnIndex`] when a non-index key is used against an array,
/// and [`PathError::IndexOutOfRange`] when an index lies more than
/// [`MAX_INDEX_GAP`] slots past the end of its array.
///
/// # Example
///
/// ```
/// use json_binding_path::{base_set, path};
/// use serde_json::json;
///
/// let mut doc = json!({});
/// base_set(&mut doc, &path!["Person", "Contact", "Email"], json!("x"), None).unwrap();
/// base_set(&mut doc, &path!["Hobbies", 1, "Name"], json!("y"), None).unwrap();
/// assert_eq!(doc, json!({
///     "Person": {"Contact": {"Email": "x"}},
///     "Hobbies": [null, {"Name": "y"}]
/// }));
/// ```
pub fn base_set<'a>(
    root: &'a mut Value,
    path: &[Segment],
    value: Value,
    mut customizer: Option<&mut Customizer<'_>>,
) -> Result<&'a mut Value, PathError> {
    let Some((leaf, parents)) = path.split_last() else {
        *root = value;
        return Ok(root);
    };
    if root.is_null() {
        *root = empty_container_for(&path[0]);
    } else if !is_container(root) {
        return Err(PathError::PathType {
            path: String::new(),
            found: kind_name(root),
        });
    }

    let mut nested = root;
    for (depth, segment) in parents.iter().enumerate() {
        let slot = slot_mut(nested, segment, &path[..depth])?;
        let next = &path[depth + 1];
        let replacement = match customizer.as_mut() {
            Some(customize) => customize(&*slot, segment),
            None => None,
        };
        match replacement {
            Some(container) => *slot = container,
            None if slot.is_null() => *slot = empty_container_for(next),
            None if is_container(slot) => {}
            None => {
                return Err(PathError::PathType {
                    path: join_path(&path[..=depth], "."),
                    found: kind_name(slot),
                })
            }
        }
        nested = slot;
    }
    let slot = slot_mut(nested, leaf, parents)?;
    *slot = value;
    Ok(slot)
}

fn slot_mut<'a>(
    container: &'a mut Value,
    segment: &Segment,
    at: &[Segment],
) -> Result<&'a mut Value, PathError> {
    match container {
        Value::Object(map) => Ok(map.entry(segment.as_key().into_owned()).or_insert(Value::Null)),
        Value::Array(arr) => {
            let idx = segment.as_index().ok_or_else(|| PathError::NotAnIndex {
                path: join_path(at, "."),
                segment: segment.to_string(),
            })?;
            if idx >= arr.len() {
                let len = idx
                    .checked_add(1)
                    .filter(|len| len - arr.len() <= MAX_INDEX_GAP)
                    .ok_or_else(|| PathError::IndexOutOfRange {
                        path: join_path(at, "."),
                        index: idx,
                    })?;
                arr.resize(len, Value::Null);
            }
            Ok(&mut arr[idx])
        }
        other => Err(PathError::PathType {
            path: join_path(at, "."),
            found: kind_name(other),
        }),
    }
}
