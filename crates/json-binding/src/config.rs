//! Store configuration.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use json_binding_path::{base_set, PathError, Segment, DEFAULT_MAX_REF_HOPS};

/// Settings shared by every adapter created over one store.
///
/// Deserializes from any serde format; missing fields take their defaults.
///
/// ```
/// use json_binding::StoreConfig;
///
/// let config: StoreConfig = serde_json::from_str(r#"{"max_ref_hops": 4}"#).unwrap();
/// assert_eq!(config.max_ref_hops, 4);
/// assert!(config.index_creates_array);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Longest reference chain followed while resolving one path.
    pub max_ref_hops: usize,
    /// Build a missing container as an array when the next segment is an
    /// index. When `false` every missing container is an object.
    pub index_creates_array: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            max_ref_hops: DEFAULT_MAX_REF_HOPS,
            index_creates_array: true,
        }
    }
}

impl StoreConfig {
    pub fn with_max_ref_hops(mut self, max_ref_hops: usize) -> Self {
        self.max_ref_hops = max_ref_hops;
        self
    }

    pub fn with_index_creates_array(mut self, enabled: bool) -> Self {
        self.index_creates_array = enabled;
        self
    }

    /// The empty container a write places in front of `next`.
    pub fn empty_container(&self, next: &Segment) -> Value {
        if self.index_creates_array {
            json_binding_path::empty_container_for(next)
        } else {
            Value::Object(Map::new())
        }
    }

    /// Write `value` at a physical `path` inside `doc`, building missing
    /// containers according to this configuration.
    pub(crate) fn assign(&self, doc: &mut Value, path: &[Segment], value: Value) -> Result<(), PathError> {
        if self.index_creates_array {
            base_set(doc, path, value, None)?;
        } else {
            if doc.is_null() && !path.is_empty() {
                *doc = Value::Object(Map::new());
            }
            let mut objects_only =
                |slot: &Value, _: &Segment| slot.is_null().then(|| Value::Object(Map::new()));
            base_set(doc, path, value, Some(&mut objects_only))?;
        }
        Ok(())
    }
}
