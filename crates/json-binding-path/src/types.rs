//! Type definitions for binding paths.

use std::borrow::Cow;
use std::fmt;

use serde_json::{Map, Value};

use crate::parse::cast_str;
use crate::util::is_index_str;

/// A step in a binding path.
///
/// Either a property name or a non-negative array index. A `Key` that looks
/// like an integer (`"0"`) still addresses array elements; an `Index` used
/// against an object addresses the decimal key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    Key(String),
    Index(usize),
}

/// A binding path, root to leaf.
pub type Path = Vec<Segment>;

impl Segment {
    /// The array index this segment addresses, if any.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            Segment::Index(idx) => Some(*idx),
            Segment::Key(key) if is_index_str(key) => key.parse().ok(),
            Segment::Key(_) => None,
        }
    }

    /// The object key this segment addresses.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            Segment::Key(key) => Cow::Borrowed(key),
            Segment::Index(idx) => Cow::Owned(idx.to_string()),
        }
    }

    /// Convert a JSON path step (string or non-negative integer).
    pub fn from_json(step: &Value) -> Option<Segment> {
        match step {
            Value::String(s) => Some(Segment::Key(s.clone())),
            Value::Number(n) => n.as_u64().and_then(|n| usize::try_from(n).ok()).map(Segment::Index),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Segment::Key(key) => Value::String(key.clone()),
            Segment::Index(idx) => Value::from(*idx),
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<usize> for Segment {
    fn from(idx: usize) -> Self {
        Segment::Index(idx)
    }
}

/// Build a [`Path`] from mixed keys and indices.
///
/// ```
/// use json_binding_path::{path, Segment};
///
/// let p = path!["Hobbies", 0, "Name"];
/// assert_eq!(p[1], Segment::Index(0));
/// ```
#[macro_export]
macro_rules! path {
    () => {
        ::std::vec::Vec::<$crate::Segment>::new()
    };
    ($($seg:expr),+ $(,)?) => {
        ::std::vec![$($crate::Segment::from($seg)),+]
    };
}

/// Anything that can be read as a path expression.
///
/// Strings go through the shared tokenizer, segment lists pass through
/// unchanged.
pub trait IntoPath {
    fn into_path(self) -> Path;
}

impl IntoPath for &str {
    fn into_path(self) -> Path {
        cast_str(self)
    }
}

impl IntoPath for String {
    fn into_path(self) -> Path {
        cast_str(&self)
    }
}

impl IntoPath for &String {
    fn into_path(self) -> Path {
        cast_str(self)
    }
}

impl IntoPath for Path {
    fn into_path(self) -> Path {
        self
    }
}

impl IntoPath for &Path {
    fn into_path(self) -> Path {
        self.clone()
    }
}

impl IntoPath for &[Segment] {
    fn into_path(self) -> Path {
        self.to_vec()
    }
}

impl<const N: usize> IntoPath for [Segment; N] {
    fn into_path(self) -> Path {
        self.into()
    }
}

impl IntoPath for Segment {
    fn into_path(self) -> Path {
        vec![self]
    }
}

impl IntoPath for usize {
    fn into_path(self) -> Path {
        vec![Segment::Index(self)]
    }
}

impl IntoPath for () {
    fn into_path(self) -> Path {
        Vec::new()
    }
}

impl<T: IntoPath> IntoPath for Option<T> {
    fn into_path(self) -> Path {
        self.map(IntoPath::into_path).unwrap_or_default()
    }
}

pub const REF_TYPE_KEY: &str = "$type";
pub const REF_TYPE: &str = "ref";
pub const REF_VALUE_KEY: &str = "value";

/// A symbolic reference stored in place of a literal value:
/// `{ "$type": "ref", "value": <path> }`.
///
/// The path is absolute, resolved against the root of the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    pub path: Path,
}

impl Reference {
    pub fn new(path: impl IntoPath) -> Self {
        Self {
            path: path.into_path(),
        }
    }

    /// Read a reference out of a stored value.
    ///
    /// The target may be written as an array of steps or as a path string.
    pub fn from_value(value: &Value) -> Option<Reference> {
        let map = value.as_object()?;
        if map.get(REF_TYPE_KEY)?.as_str()? != REF_TYPE {
            return None;
        }
        let path = match map.get(REF_VALUE_KEY)? {
            Value::Array(steps) => steps
                .iter()
                .map(Segment::from_json)
                .collect::<Option<Path>>()?,
            Value::String(s) => cast_str(s),
            _ => return None,
        };
        Some(Reference { path })
    }

    pub fn to_value(&self) -> Value {
        let mut map = Map::new();
        map.insert(REF_TYPE_KEY.to_string(), Value::String(REF_TYPE.to_string()));
        map.insert(
            REF_VALUE_KEY.to_string(),
            Value::Array(self.path.iter().map(Segment::to_json).collect()),
        );
        Value::Object(map)
    }
}

/// Check whether `value` has the reference shape.
pub fn is_reference(value: &Value) -> bool {
    Reference::from_value(value).is_some()
}
