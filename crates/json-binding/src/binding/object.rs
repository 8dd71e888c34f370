use std::ops::Deref;

use json_binding_path::IntoPath;
use serde_json::Value;

use super::{Binding, BindingNode, ChildNode, NotifyChange, RootNode};
use crate::adapter::SharedAdapter;
use crate::converter::SharedConverter;
use crate::error::BindingError;

/// Binding to a single value.
#[derive(Debug, Clone)]
pub struct ObjectBinding(Binding);

impl ObjectBinding {
    /// Root node anchored at `source`.
    pub fn new(source: SharedAdapter, path: impl IntoPath) -> Self {
        Self::with_options(source, path, None, None)
    }

    pub fn with_options(
        source: SharedAdapter,
        path: impl IntoPath,
        notify: Option<NotifyChange>,
        converter: Option<SharedConverter>,
    ) -> Self {
        let node = RootNode::new(source, path.into_path(), notify, converter);
        Self(Binding::from_node(BindingNode::RootObject(node)))
    }

    /// Child node at `relative_path` below `parent`.
    pub fn child(parent: &Binding, relative_path: impl IntoPath, converter: Option<SharedConverter>) -> Self {
        let node = ChildNode::new(parent.clone(), relative_path.into_path(), None, converter);
        Self(Binding::from_node(BindingNode::ChildObject(node)))
    }

    /// Array item node; `scope` is the adapter narrowed to the item.
    pub(crate) fn item(parent: &Binding, index: usize, scope: SharedAdapter) -> Self {
        let node = ChildNode::new(parent.clone(), vec![index.into()], Some(scope), None);
        Self(Binding::from_node(BindingNode::ChildObject(node)))
    }

    /// The value at this node's path, formatted by its converter.
    ///
    /// A missing value reads as `None`.
    ///
    /// # Errors
    ///
    /// Propagates converter failures.
    pub fn value(&self) -> Result<Option<Value>, BindingError> {
        self.0.read()
    }

    /// Parse and store `value`, then notify.
    ///
    /// Nothing is written and nobody is notified when the parsed value equals
    /// the stored one. A root node bound to an empty path does not touch the
    /// store; it hands the new value to the change callback instead.
    ///
    /// Returns whether a change was made.
    ///
    /// # Errors
    ///
    /// Converter failures, and path errors from the store (writing below a
    /// primitive, or a reference chain that is too long).
    pub fn set_value(&self, value: impl Into<Value>) -> Result<bool, BindingError> {
        self.0.assign(value.into())
    }

    /// Alias of [`ObjectBinding::set_value`] for "value + request change"
    /// style controls.
    pub fn request_change(&self, value: impl Into<Value>) -> Result<bool, BindingError> {
        self.set_value(value)
    }

    pub fn into_binding(self) -> Binding {
        self.0
    }
}

impl Deref for ObjectBinding {
    type Target = Binding;

    fn deref(&self) -> &Binding {
        &self.0
    }
}

impl From<ObjectBinding> for Binding {
    fn from(binding: ObjectBinding) -> Self {
        binding.0
    }
}
