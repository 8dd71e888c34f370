use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use json_binding_path::{concat_path, get, join_path, resolve_path, IntoPath, Path, Segment};
use serde_json::Value;

use super::{
    reference_limit, AdapterFactory, ChangeEvent, ChangeListener, Listeners, ScopedChangeEvent,
    SharedAdapter, StorageAdapter, SubscriptionId,
};
use crate::config::StoreConfig;
use crate::error::BindingError;

/// A mutable store whose properties are tracked for reactions.
///
/// Every property present in the document is tracked. Reading an absent
/// property of an existing container starts tracking it, so a later write
/// there is observed like any other. Writes to untracked properties promote
/// them. Reactions run synchronously after each committed write.
pub struct ObservableStore {
    state: RefCell<Value>,
    tracked: RefCell<BTreeSet<Vec<String>>>,
    reactions: RefCell<Listeners>,
    config: StoreConfig,
}

fn tracking_key(path: &[Segment]) -> Vec<String> {
    path.iter().map(|s| s.as_key().into_owned()).collect()
}

impl ObservableStore {
    pub fn new(root: Value) -> Rc<Self> {
        Self::with_config(root, StoreConfig::default())
    }

    pub fn with_config(root: Value, config: StoreConfig) -> Rc<Self> {
        Rc::new(Self {
            state: RefCell::new(root),
            tracked: RefCell::new(BTreeSet::new()),
            reactions: RefCell::new(Listeners::default()),
            config,
        })
    }

    /// A copy of the whole document.
    pub fn value(&self) -> Value {
        self.state.borrow().clone()
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Check whether the property at a physical `path` is tracked.
    pub fn is_tracked(&self, path: &[Segment]) -> bool {
        get(&self.state.borrow(), path).is_some() || self.tracked.borrow().contains(&tracking_key(path))
    }

    /// Read the value at `path`, following references.
    pub fn get(&self, path: &[Segment]) -> Option<Value> {
        let state = self.state.borrow();
        let physical = resolve_path(&state, path, self.config.max_ref_hops)?;
        if let Some(value) = get(&state, &physical) {
            return Some(value.clone());
        }
        if let Some((_, parent)) = physical.split_last() {
            if get(&state, parent).is_some_and(|p| p.is_object() || p.is_array()) {
                self.track(&physical, "property tracked");
            }
        }
        None
    }

    /// Write `value` at `path`, following references and building missing
    /// containers.
    pub fn set(&self, path: &[Segment], value: Value) -> Result<(), BindingError> {
        let physical = resolve_path(&self.state.borrow(), path, self.config.max_ref_hops)
            .ok_or_else(|| reference_limit(path, &self.config))?;
        let before = if self.reactions.borrow().is_empty() {
            None
        } else {
            Some(Rc::new(self.value()))
        };
        let promoted = !self.is_tracked(&physical);

        self.config.assign(&mut self.state.borrow_mut(), &physical, value)?;
        if promoted {
            self.track(&physical, "property promoted");
        }
        for depth in 1..physical.len() {
            self.track(&physical[..depth], "container tracked");
        }

        if let Some(before) = before {
            let after = Rc::new(self.value());
            self.emit(&ChangeEvent {
                path: physical,
                before,
                after,
            });
        }
        Ok(())
    }

    /// Run `listener` after every committed write.
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: FnMut(&ChangeEvent) + 'static,
    {
        self.reactions.borrow_mut().on_change(Box::new(listener))
    }

    /// Run `listener` whenever the value at `path` changes.
    ///
    /// References along `path` are followed in both the old and the new
    /// state, within the store's hop limit.
    pub fn react<F>(&self, path: impl IntoPath, mut listener: F) -> SubscriptionId
    where
        F: FnMut(&ScopedChangeEvent) + 'static,
    {
        let path = path.into_path();
        let max_hops = self.config.max_ref_hops;
        self.subscribe(move |event| {
            if let Some(scoped) = event.scoped(&path, max_hops) {
                listener(&scoped);
            }
        })
    }

    pub fn dispose(&self, id: SubscriptionId) -> bool {
        self.reactions.borrow_mut().off_change(id)
    }

    fn track(&self, path: &[Segment], reason: &'static str) {
        if self.tracked.borrow_mut().insert(tracking_key(path)) {
            tracing::trace!(path = %join_path(path, "."), reason);
        }
    }

    fn emit(&self, event: &ChangeEvent) {
        let mut active = self.reactions.borrow_mut().take();
        for reaction in active.values_mut() {
            reaction(event);
        }
        self.reactions.borrow_mut().restore(active);
    }
}

/// Adapter over an [`ObservableStore`], narrowed to a base path.
#[derive(Clone)]
pub struct ObservableAdapter {
    store: Rc<ObservableStore>,
    base: Path,
}

impl ObservableAdapter {
    pub fn new(store: Rc<ObservableStore>) -> Self {
        Self {
            store,
            base: Vec::new(),
        }
    }

    pub fn store(&self) -> &Rc<ObservableStore> {
        &self.store
    }
}

impl StorageAdapter for ObservableAdapter {
    fn get_value(&self, path: &[Segment]) -> Option<Value> {
        self.store.get(&concat_path(&self.base, path))
    }

    fn set_value(&self, path: &[Segment], value: Value) -> Result<(), BindingError> {
        let full = concat_path(&self.base, path);
        tracing::trace!(path = %join_path(&full, "."), "observable write");
        self.store.set(&full, value)
    }

    fn create_new(&self, path: &[Segment], item: Option<Value>) -> SharedAdapter {
        match item {
            Some(item) if self.get_value(path).as_ref() != Some(&item) => Rc::new(Self::new(
                ObservableStore::with_config(item, self.store.config.clone()),
            )),
            _ => Rc::new(Self {
                store: Rc::clone(&self.store),
                base: concat_path(&self.base, path),
            }),
        }
    }

    fn subscribe(&self, listener: ChangeListener) -> SubscriptionId {
        self.store.reactions.borrow_mut().on_change(listener)
    }

    fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.store.dispose(id)
    }

    fn base_path(&self) -> Path {
        self.base.clone()
    }
}

impl AdapterFactory for ObservableAdapter {
    fn from_root(root: Value, config: &StoreConfig) -> SharedAdapter {
        Rc::new(Self::new(ObservableStore::with_config(root, config.clone())))
    }
}
