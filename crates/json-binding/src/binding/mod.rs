//! Binding nodes.
//!
//! A binding is a view of "the value at this path in this store". Nodes form
//! a tree: root nodes are anchored at a storage adapter, child nodes hold
//! only a relative path and their parent. Absolute paths, the adapter and
//! the change callback are always derived by walking up the parent chain,
//! never cached.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use json_binding_path::{concat_path, join_path, Path};
use serde_json::Value;

use crate::adapter::SharedAdapter;
use crate::converter::SharedConverter;
use crate::error::BindingError;

mod array;
mod object;

pub use array::ArrayBinding;
pub use object::ObjectBinding;

/// Change callback. Called with `None` after a write into the store, or
/// with the new value when a root node bound to an empty path is replaced.
pub type NotifyChange = Rc<dyn Fn(Option<Value>)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingKind {
    RootObject,
    ChildObject,
    RootArray,
    ChildArray,
}

pub struct RootNode {
    source: SharedAdapter,
    path: Path,
    notify: RefCell<Option<NotifyChange>>,
    converter: Option<SharedConverter>,
    attributes: RefCell<BTreeMap<String, Value>>,
}

pub struct ChildNode {
    parent: Binding,
    relative_path: Path,
    /// Adapter of an array item, narrowed to the item.
    scope: Option<SharedAdapter>,
    converter: Option<SharedConverter>,
    attributes: RefCell<BTreeMap<String, Value>>,
}

pub enum BindingNode {
    RootObject(RootNode),
    ChildObject(ChildNode),
    RootArray(RootNode),
    ChildArray(ChildNode),
}

/// Shared handle to a binding node.
#[derive(Clone)]
pub struct Binding(Rc<BindingNode>);

impl RootNode {
    pub(crate) fn new(
        source: SharedAdapter,
        path: Path,
        notify: Option<NotifyChange>,
        converter: Option<SharedConverter>,
    ) -> Self {
        Self {
            source,
            path,
            notify: RefCell::new(notify),
            converter,
            attributes: RefCell::new(BTreeMap::new()),
        }
    }
}

impl ChildNode {
    pub(crate) fn new(
        parent: Binding,
        relative_path: Path,
        scope: Option<SharedAdapter>,
        converter: Option<SharedConverter>,
    ) -> Self {
        Self {
            parent,
            relative_path,
            scope,
            converter,
            attributes: RefCell::new(BTreeMap::new()),
        }
    }
}

enum NodeRef<'a> {
    Root(&'a RootNode),
    Child(&'a ChildNode),
}

impl Binding {
    pub(crate) fn from_node(node: BindingNode) -> Self {
        Self(Rc::new(node))
    }

    fn node(&self) -> NodeRef<'_> {
        match &*self.0 {
            BindingNode::RootObject(n) | BindingNode::RootArray(n) => NodeRef::Root(n),
            BindingNode::ChildObject(n) | BindingNode::ChildArray(n) => NodeRef::Child(n),
        }
    }

    pub fn kind(&self) -> BindingKind {
        match &*self.0 {
            BindingNode::RootObject(_) => BindingKind::RootObject,
            BindingNode::ChildObject(_) => BindingKind::ChildObject,
            BindingNode::RootArray(_) => BindingKind::RootArray,
            BindingNode::ChildArray(_) => BindingKind::ChildArray,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self.kind(), BindingKind::RootArray | BindingKind::ChildArray)
    }

    /// Check whether both handles point at the same node.
    pub fn ptr_eq(&self, other: &Binding) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<Binding> {
        match self.node() {
            NodeRef::Root(_) => None,
            NodeRef::Child(n) => Some(n.parent.clone()),
        }
    }

    /// The top-most node of the chain; a node without parent is its own root.
    pub fn root(&self) -> Binding {
        let mut current = self.clone();
        while let Some(parent) = current.parent() {
            current = parent;
        }
        current
    }

    /// Path relative to the parent, or the anchored path of a root node.
    pub fn relative_path(&self) -> Path {
        match self.node() {
            NodeRef::Root(n) => n.path.clone(),
            NodeRef::Child(n) => n.relative_path.clone(),
        }
    }

    /// Absolute path, root to leaf.
    pub fn path(&self) -> Path {
        match self.node() {
            NodeRef::Root(n) => n.path.clone(),
            NodeRef::Child(n) => concat_path(&n.parent.path(), &n.relative_path),
        }
    }

    /// The adapter this node resolves against.
    pub fn source(&self) -> SharedAdapter {
        match self.node() {
            NodeRef::Root(n) => Rc::clone(&n.source),
            NodeRef::Child(n) => match &n.scope {
                Some(scope) => Rc::clone(scope),
                None => n.parent.source(),
            },
        }
    }

    /// This node's path relative to [`Binding::source`].
    pub fn source_path(&self) -> Path {
        match self.node() {
            NodeRef::Root(n) => n.path.clone(),
            NodeRef::Child(n) if n.scope.is_some() => Vec::new(),
            NodeRef::Child(n) => concat_path(&n.parent.source_path(), &n.relative_path),
        }
    }

    /// The change callback of the chain, held by the root.
    pub fn notify_change(&self) -> Option<NotifyChange> {
        match self.node() {
            NodeRef::Root(n) => n.notify.borrow().clone(),
            NodeRef::Child(n) => n.parent.notify_change(),
        }
    }

    /// Replace the change callback for the whole chain.
    pub fn set_notify_change(&self, notify: Option<NotifyChange>) {
        match self.node() {
            NodeRef::Root(n) => *n.notify.borrow_mut() = notify,
            NodeRef::Child(n) => n.parent.set_notify_change(notify),
        }
    }

    pub fn converter(&self) -> Option<SharedConverter> {
        match self.node() {
            NodeRef::Root(n) => n.converter.clone(),
            NodeRef::Child(n) => n.converter.clone(),
        }
    }

    /// Read an attribute stored on this node.
    pub fn attribute(&self, name: &str) -> Option<Value> {
        self.attributes().borrow().get(name).cloned()
    }

    /// Attach an attribute to this node, returning the previous one.
    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.attributes().borrow_mut().insert(name.into(), value.into())
    }

    fn attributes(&self) -> &RefCell<BTreeMap<String, Value>> {
        match self.node() {
            NodeRef::Root(n) => &n.attributes,
            NodeRef::Child(n) => &n.attributes,
        }
    }

    /// Invoke the change callback, if any.
    pub fn notify(&self, value: Option<Value>) {
        if let Some(notify) = self.notify_change() {
            tracing::trace!(path = %join_path(&self.path(), "."), replaced = value.is_some(), "notify change");
            notify(value);
        }
    }

    /// The stored value, before any converter.
    pub fn raw_value(&self) -> Option<Value> {
        self.source().get_value(&self.source_path())
    }

    /// The stored value, formatted by the node's converter.
    pub(crate) fn read(&self) -> Result<Option<Value>, BindingError> {
        let raw = self.raw_value();
        match self.converter() {
            Some(converter) => Ok(converter.format(raw, None)?),
            None => Ok(raw),
        }
    }

    /// Parse `value`, write it when it differs from the stored value, and
    /// notify. Returns whether anything changed.
    pub(crate) fn assign(&self, value: Value) -> Result<bool, BindingError> {
        let previous = self.raw_value();
        let converted = match self.converter() {
            Some(converter) => converter.parse(Some(value), None)?,
            None => Some(value),
        };
        let path = self.path();
        if converted == previous {
            tracing::trace!(path = %join_path(&path, "."), "unchanged value, write skipped");
            return Ok(false);
        }
        if path.is_empty() {
            self.notify(Some(converted.unwrap_or(Value::Null)));
            return Ok(true);
        }
        self.source()
            .set_value(&self.source_path(), converted.unwrap_or(Value::Null))?;
        self.notify(None);
        Ok(true)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("kind", &self.kind())
            .field("path", &join_path(&self.path(), "."))
            .finish_non_exhaustive()
    }
}
