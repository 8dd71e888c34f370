use std::cell::{Cell, RefCell};
use std::rc::Rc;

use json_binding_path::{base_get_with, concat_path, get, join_path, resolve_path, Path, Segment};
use serde_json::Value;

use super::{
    reference_limit, AdapterFactory, ChangeEvent, ChangeListener, Listeners, SharedAdapter,
    StorageAdapter, SubscriptionId,
};
use crate::config::StoreConfig;
use crate::error::BindingError;

/// A store of immutable generations.
///
/// Each write commits a new generation; a reader holding an older
/// `Rc<Value>` keeps seeing that whole generation unchanged. Every commit
/// emits an update event with the new and previous state.
pub struct SnapshotStore {
    current: RefCell<Rc<Value>>,
    generation: Cell<u64>,
    listeners: RefCell<Listeners>,
    config: StoreConfig,
}

impl SnapshotStore {
    pub fn new(root: Value) -> Rc<Self> {
        Self::with_config(root, StoreConfig::default())
    }

    pub fn with_config(root: Value, config: StoreConfig) -> Rc<Self> {
        Rc::new(Self {
            current: RefCell::new(Rc::new(root)),
            generation: Cell::new(0),
            listeners: RefCell::new(Listeners::default()),
            config,
        })
    }

    /// The current generation.
    pub fn get(&self) -> Rc<Value> {
        Rc::clone(&self.current.borrow())
    }

    /// Number of generations committed so far.
    pub fn generation(&self) -> u64 {
        self.generation.get()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn on_update<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.listeners.borrow_mut().on_change(Box::new(listener))
    }

    pub fn off_update(&self, id: SubscriptionId) -> bool {
        self.listeners.borrow_mut().off_change(id)
    }

    /// Write `value` at `path`.
    ///
    /// Missing intermediate containers are added one generation per level
    /// before the final generation carrying `value`. A write that cannot
    /// succeed commits nothing.
    pub fn set(&self, path: &[Segment], value: Value) -> Result<(), BindingError> {
        let state = self.get();
        let physical = resolve_path(&state, path, self.config.max_ref_hops)
            .ok_or_else(|| reference_limit(path, &self.config))?;

        let mut next = (*state).clone();
        self.config.assign(&mut next, &physical, value)?;

        let mut latest = state;
        for depth in 1..physical.len() {
            let prefix = &physical[..depth];
            let state = self.get();
            if get(&state, prefix).is_some_and(|v| !v.is_null()) {
                continue;
            }
            let mut level = (*state).clone();
            let container = self.config.empty_container(&physical[depth]);
            self.config.assign(&mut level, prefix, container)?;
            latest = self.commit(prefix.to_vec(), level);
        }

        // a listener wrote while the intermediate levels were committed
        let current = self.get();
        if !Rc::ptr_eq(&current, &latest) {
            let leaf = get(&next, &physical).cloned().unwrap_or(Value::Null);
            next = (*current).clone();
            self.config.assign(&mut next, &physical, leaf)?;
        }
        self.commit(physical, next);
        Ok(())
    }

    fn commit(&self, path: Path, next: Value) -> Rc<Value> {
        let after = Rc::new(next);
        let before = self.current.replace(Rc::clone(&after));
        let generation = self.generation.get() + 1;
        self.generation.set(generation);
        tracing::debug!(generation, path = %join_path(&path, "."), "snapshot committed");
        self.emit(&ChangeEvent {
            path,
            before,
            after: Rc::clone(&after),
        });
        after
    }

    fn emit(&self, event: &ChangeEvent) {
        let mut active = self.listeners.borrow_mut().take();
        for listener in active.values_mut() {
            listener(event);
        }
        self.listeners.borrow_mut().restore(active);
    }
}

/// Adapter over a [`SnapshotStore`], narrowed to a base path.
#[derive(Clone)]
pub struct SnapshotAdapter {
    store: Rc<SnapshotStore>,
    base: Path,
}

impl SnapshotAdapter {
    pub fn new(store: Rc<SnapshotStore>) -> Self {
        Self {
            store,
            base: Vec::new(),
        }
    }

    pub fn store(&self) -> &Rc<SnapshotStore> {
        &self.store
    }
}

impl StorageAdapter for SnapshotAdapter {
    fn get_value(&self, path: &[Segment]) -> Option<Value> {
        let full = concat_path(&self.base, path);
        let state = self.store.get();
        base_get_with(&state, &full, self.store.config.max_ref_hops).cloned()
    }

    fn set_value(&self, path: &[Segment], value: Value) -> Result<(), BindingError> {
        let full = concat_path(&self.base, path);
        tracing::trace!(path = %join_path(&full, "."), "snapshot write");
        self.store.set(&full, value)
    }

    fn create_new(&self, path: &[Segment], item: Option<Value>) -> SharedAdapter {
        match item {
            Some(item) if self.get_value(path).as_ref() != Some(&item) => Rc::new(Self::new(
                SnapshotStore::with_config(item, self.store.config.clone()),
            )),
            _ => Rc::new(Self {
                store: Rc::clone(&self.store),
                base: concat_path(&self.base, path),
            }),
        }
    }

    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId {
        self.store.listeners.borrow_mut().on_change(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.off_update(id)
    }

    fn base_path(&self) -> Path {
        self.base.clone()
    }
}

impl AdapterFactory for SnapshotAdapter {
    fn from_root(root: Value, config: &StoreConfig) -> SharedAdapter {
        Rc::new(Self::new(SnapshotStore::with_config(root, config.clone())))
    }
}
