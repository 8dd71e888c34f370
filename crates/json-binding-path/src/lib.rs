//! Path expressions over JSON values.
//!
//! A path names a location inside a JSON document, written either as a list
//! of [`Segment`]s or as a dotted/bracketed string such as
//! `Hobbies[0].People[1].Name`. Both forms normalize to the same segment
//! list through [`cast_path`].
//!
//! Documents may hold symbolic references (`{"$type": "ref", "value": [...]}`)
//! in place of literal values. [`base_get`] follows them transparently and
//! [`resolve_path`] rewrites a logical path into the physical one it lands
//! on, so writes through a reference update the target.
//!
//! # Example
//!
//! ```
//! use json_binding_path::{base_get, base_set, cast_path};
//! use serde_json::json;
//!
//! let mut doc = json!({"Person": {"FirstName": "Ann"}});
//! let path = cast_path("Person.Contact.Email");
//! assert_eq!(base_get(&doc, &path), None);
//!
//! base_set(&mut doc, &path, json!("ann@example.com"), None).unwrap();
//! assert_eq!(base_get(&doc, &path), Some(&json!("ann@example.com")));
//! ```

use thiserror::Error;

mod get;
mod parse;
mod set;
mod types;
mod util;

pub use get::{base_get, base_get_with, child, follow_ref, get, resolve_path, DEFAULT_MAX_REF_HOPS};
pub use parse::{cast_path, is_key, string_to_path, ParseError};
pub use set::{base_set, empty_container_for, Customizer, MAX_INDEX_GAP};
pub use types::{
    is_reference, IntoPath, Path, Reference, Segment, REF_TYPE, REF_TYPE_KEY, REF_VALUE_KEY,
};
pub use util::{
    concat_path, is_child, is_index, is_index_str, is_path_equal, is_same_segment, join_path,
    parent_path, MAX_SAFE_INTEGER,
};

/// Errors raised while writing through a path.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot descend into {found} at '{path}'")]
    PathType { path: String, found: &'static str },
    #[error("array at '{path}' cannot be addressed by key '{segment}'")]
    NotAnIndex { path: String, segment: String },
    #[error("index {index} is too far past the end of the array at '{path}'")]
    IndexOutOfRange { path: String, index: usize },
}
