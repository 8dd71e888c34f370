//! Storage adapters.
//!
//! An adapter owns (or shares) the backing store and resolves paths against
//! it. Every adapter is narrowed to a base path inside its store; paths
//! passed to [`StorageAdapter`] methods are relative to that base. References
//! are always resolved against the store root, whatever the base.

use std::collections::BTreeMap;
use std::rc::Rc;

use json_binding_path::{base_get_with, join_path, Path, Segment};
use serde_json::Value;

use crate::config::StoreConfig;
use crate::error::BindingError;

mod observable;
mod plain;
mod snapshot;

pub use observable::{ObservableAdapter, ObservableStore};
pub use plain::PlainAdapter;
pub use snapshot::{SnapshotAdapter, SnapshotStore};

pub type SharedAdapter = Rc<dyn StorageAdapter>;
pub type SubscriptionId = u64;
pub type ChangeListener = Box<dyn FnMut(&ChangeEvent)>;

/// One committed write: the physical path written and the whole store
/// before and after it.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeEvent {
    pub path: Path,
    pub before: Rc<Value>,
    pub after: Rc<Value>,
}

/// A [`ChangeEvent`] narrowed to one location.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopedChangeEvent {
    pub path: Path,
    pub before: Option<Value>,
    pub after: Option<Value>,
}

impl ChangeEvent {
    /// Narrow the event to `path`; `None` when the value there did not change.
    ///
    /// References along `path` are followed for at most `max_hops` hops.
    pub fn scoped(&self, path: &[Segment], max_hops: usize) -> Option<ScopedChangeEvent> {
        let before = base_get_with(&self.before, path, max_hops);
        let after = base_get_with(&self.after, path, max_hops);
        if before == after {
            return None;
        }
        Some(ScopedChangeEvent {
            path: path.to_vec(),
            before: before.cloned(),
            after: after.cloned(),
        })
    }
}

/// Get/set access to one backing store.
pub trait StorageAdapter {
    /// Read the value at `path`. `None` when any step is missing.
    fn get_value(&self, path: &[Segment]) -> Option<Value>;

    /// Write `value` at `path`, building missing containers on the way.
    fn set_value(&self, path: &[Segment], value: Value) -> Result<(), BindingError>;

    /// An adapter narrowed to `path` below this one.
    ///
    /// When `item` is given and differs from the stored value there, the new
    /// adapter wraps a detached store seeded with `item`.
    fn create_new(&self, path: &[Segment], item: Option<Value>) -> SharedAdapter;

    /// Register for change notification. Backends without native events
    /// accept the listener and never call it.
    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId;

    fn unsubscribe(&self, id: SubscriptionId) -> bool;

    /// Location of this adapter inside its store.
    fn base_path(&self) -> Path;
}

/// Builds a root adapter of one backend.
pub trait AdapterFactory {
    fn from_root(root: Value, config: &StoreConfig) -> SharedAdapter;
}

pub(crate) fn reference_limit(path: &[Segment], config: &StoreConfig) -> BindingError {
    BindingError::ReferenceLimit {
        path: join_path(path, "."),
        limit: config.max_ref_hops,
    }
}

/// Id-keyed listener registry.
#[derive(Default)]
pub(crate) struct Listeners {
    next_listener_id: u64,
    listeners: BTreeMap<u64, ChangeListener>,
}

impl Listeners {
    pub(crate) fn on_change(&mut self, listener: ChangeListener) -> SubscriptionId {
        self.next_listener_id = self.next_listener_id.saturating_add(1);
        let id = self.next_listener_id;
        self.listeners.insert(id, listener);
        id
    }

    pub(crate) fn off_change(&mut self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Take the registered listeners out so they can run without holding a
    /// borrow of the registry.
    pub(crate) fn take(&mut self) -> BTreeMap<u64, ChangeListener> {
        std::mem::take(&mut self.listeners)
    }

    /// Put listeners back after a dispatch, keeping any registered meanwhile.
    pub(crate) fn restore(&mut self, mut active: BTreeMap<u64, ChangeListener>) {
        active.append(&mut self.listeners);
        self.listeners = active;
    }
}
