//! Entry points wiring external state or existing nodes into bindings.

use std::marker::PhantomData;
use std::rc::Rc;

use json_binding_path::IntoPath;
use serde_json::{Map, Value};

use crate::adapter::{AdapterFactory, ObservableAdapter, PlainAdapter, SharedAdapter, SnapshotAdapter};
use crate::binding::{ArrayBinding, Binding, NotifyChange, ObjectBinding};
use crate::config::StoreConfig;
use crate::converter::{curry, SharedConverter};

/// The view-layer side of a "bind to state" binding.
///
/// `set_state` receives a partial state patch and is expected to store it
/// and schedule a re-render.
pub trait StateContainer {
    fn state(&self, key: &str) -> Option<Value>;
    fn set_state(&self, patch: Map<String, Value>);
}

/// Change callback that writes back into `component` under `key`.
///
/// Called with a value, it submits `{key: value}`. Called without one, it
/// resubmits the current contents of `source`, which holds the bound copy
/// of the slot and has already been updated in place.
pub fn create_state_key_setter<C>(component: Rc<C>, key: impl Into<String>, source: SharedAdapter) -> NotifyChange
where
    C: StateContainer + ?Sized + 'static,
{
    let key = key.into();
    Rc::new(move |value: Option<Value>| {
        let value = value
            .or_else(|| source.get_value(&[]))
            .or_else(|| component.state(&key))
            .unwrap_or(Value::Null);
        let mut patch = Map::new();
        patch.insert(key.clone(), value);
        component.set_state(patch);
    })
}

/// What a binding can be attached to.
pub enum BindTarget {
    /// An existing node; the new binding becomes its child.
    Node(Binding),
    /// A bare container; a fresh adapter is built over it.
    Value(Value),
    /// A ready adapter.
    Adapter(SharedAdapter),
}

impl From<Binding> for BindTarget {
    fn from(node: Binding) -> Self {
        BindTarget::Node(node)
    }
}

impl From<&Binding> for BindTarget {
    fn from(node: &Binding) -> Self {
        BindTarget::Node(node.clone())
    }
}

impl From<&ObjectBinding> for BindTarget {
    fn from(node: &ObjectBinding) -> Self {
        BindTarget::Node(Binding::clone(node))
    }
}

impl From<&ArrayBinding> for BindTarget {
    fn from(node: &ArrayBinding) -> Self {
        BindTarget::Node(Binding::clone(node))
    }
}

impl From<Value> for BindTarget {
    fn from(value: Value) -> Self {
        BindTarget::Value(value)
    }
}

impl From<SharedAdapter> for BindTarget {
    fn from(adapter: SharedAdapter) -> Self {
        BindTarget::Adapter(adapter)
    }
}

/// Binding entry points over one storage backend.
///
/// ```
/// use json_binding::PlainBinder;
/// use serde_json::json;
///
/// let binder = PlainBinder::new();
/// let root = binder.bind_to(json!({"Person": {"FirstName": "Roman"}}), (), None, None);
/// let first = binder.bind_to(&root, "Person.FirstName", None, None);
/// assert_eq!(first.value().unwrap(), Some(json!("Roman")));
/// ```
pub struct Binder<A: AdapterFactory = PlainAdapter> {
    config: StoreConfig,
    backend: PhantomData<A>,
}

pub type PlainBinder = Binder<PlainAdapter>;
pub type SnapshotBinder = Binder<SnapshotAdapter>;
pub type ObservableBinder = Binder<ObservableAdapter>;

impl<A: AdapterFactory> Default for Binder<A> {
    fn default() -> Self {
        Self::with_config(StoreConfig::default())
    }
}

impl<A: AdapterFactory> Binder<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: StoreConfig) -> Self {
        Self {
            config,
            backend: PhantomData,
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Bind to `path` inside the state slot `key` of `component`.
    ///
    /// Writes notify `component` through [`create_state_key_setter`].
    pub fn bind_to_state<C>(
        &self,
        component: &Rc<C>,
        key: &str,
        path: impl IntoPath,
        converter: Option<SharedConverter>,
        params: Option<Value>,
    ) -> ObjectBinding
    where
        C: StateContainer + ?Sized + 'static,
    {
        let (source, notify) = self.state_source(component, key);
        ObjectBinding::with_options(source, path, Some(notify), curry(converter, params))
    }

    /// Bind to `path` below `target`.
    pub fn bind_to(
        &self,
        target: impl Into<BindTarget>,
        path: impl IntoPath,
        converter: Option<SharedConverter>,
        params: Option<Value>,
    ) -> ObjectBinding {
        let converter = curry(converter, params);
        match target.into() {
            BindTarget::Node(parent) => ObjectBinding::child(&parent, path, converter),
            BindTarget::Value(value) => {
                ObjectBinding::with_options(A::from_root(value, &self.config), path, None, converter)
            }
            BindTarget::Adapter(source) => ObjectBinding::with_options(source, path, None, converter),
        }
    }

    /// Bind to the array at `path` inside the state slot `key` of
    /// `component`.
    pub fn bind_array_to_state<C>(
        &self,
        component: &Rc<C>,
        key: &str,
        path: impl IntoPath,
        converter: Option<SharedConverter>,
        params: Option<Value>,
    ) -> ArrayBinding
    where
        C: StateContainer + ?Sized + 'static,
    {
        let (source, notify) = self.state_source(component, key);
        ArrayBinding::with_options(source, path, Some(notify), curry(converter, params))
    }

    /// Bind to the array at `path` below `target`.
    pub fn bind_array_to(
        &self,
        target: impl Into<BindTarget>,
        path: impl IntoPath,
        converter: Option<SharedConverter>,
        params: Option<Value>,
    ) -> ArrayBinding {
        let converter = curry(converter, params);
        match target.into() {
            BindTarget::Node(parent) => ArrayBinding::child(&parent, path, converter),
            BindTarget::Value(value) => {
                ArrayBinding::with_options(A::from_root(value, &self.config), path, None, converter)
            }
            BindTarget::Adapter(source) => ArrayBinding::with_options(source, path, None, converter),
        }
    }

    fn state_source<C>(&self, component: &Rc<C>, key: &str) -> (SharedAdapter, NotifyChange)
    where
        C: StateContainer + ?Sized + 'static,
    {
        let slot = component.state(key).unwrap_or(Value::Null);
        let source = A::from_root(slot, &self.config);
        let notify = create_state_key_setter(Rc::clone(component), key, Rc::clone(&source));
        (source, notify)
    }
}
