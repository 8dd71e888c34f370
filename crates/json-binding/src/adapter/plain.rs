use std::cell::RefCell;
use std::rc::Rc;

use json_binding_path::{base_get_with, concat_path, join_path, resolve_path, Path, Segment};
use serde_json::Value;

use super::{reference_limit, AdapterFactory, ChangeListener, SharedAdapter, StorageAdapter, SubscriptionId};
use crate::config::StoreConfig;
use crate::error::BindingError;

/// Adapter over a bare JSON document held by shared reference.
///
/// All adapters created from one root (see [`StorageAdapter::create_new`])
/// see every write made through any of them. There are no change events.
#[derive(Debug, Clone)]
pub struct PlainAdapter {
    root: Rc<RefCell<Value>>,
    base: Path,
    config: Rc<StoreConfig>,
}

impl PlainAdapter {
    pub fn new(root: Value) -> Self {
        Self::with_config(root, StoreConfig::default())
    }

    pub fn with_config(root: Value, config: StoreConfig) -> Self {
        Self::from_shared(Rc::new(RefCell::new(root)), config)
    }

    /// Adapter over a document the caller keeps a handle to.
    pub fn from_shared(root: Rc<RefCell<Value>>, config: StoreConfig) -> Self {
        Self {
            root,
            base: Vec::new(),
            config: Rc::new(config),
        }
    }

    pub fn shared(self) -> SharedAdapter {
        Rc::new(self)
    }

    /// The shared document.
    pub fn root(&self) -> Rc<RefCell<Value>> {
        Rc::clone(&self.root)
    }

    /// A copy of the whole document.
    pub fn snapshot(&self) -> Value {
        self.root.borrow().clone()
    }

    fn narrowed(&self, path: &[Segment]) -> Self {
        Self {
            root: Rc::clone(&self.root),
            base: concat_path(&self.base, path),
            config: Rc::clone(&self.config),
        }
    }
}

impl StorageAdapter for PlainAdapter {
    fn get_value(&self, path: &[Segment]) -> Option<Value> {
        let full = concat_path(&self.base, path);
        let root = self.root.borrow();
        base_get_with(&root, &full, self.config.max_ref_hops).cloned()
    }

    fn set_value(&self, path: &[Segment], value: Value) -> Result<(), BindingError> {
        let full = concat_path(&self.base, path);
        let mut root = self.root.borrow_mut();
        let physical = resolve_path(&root, &full, self.config.max_ref_hops)
            .ok_or_else(|| reference_limit(&full, &self.config))?;
        tracing::trace!(path = %join_path(&physical, "."), "plain write");
        self.config.assign(&mut root, &physical, value)?;
        Ok(())
    }

    fn create_new(&self, path: &[Segment], item: Option<Value>) -> SharedAdapter {
        match item {
            Some(item) if self.get_value(path).as_ref() != Some(&item) => {
                Rc::new(Self::with_config(item, (*self.config).clone()))
            }
            _ => Rc::new(self.narrowed(path)),
        }
    }

    fn subscribe(&self, _listener: ChangeListener) -> SubscriptionId {
        0
    }

    fn unsubscribe(&self, _id: SubscriptionId) -> bool {
        false
    }

    fn base_path(&self) -> Path {
        self.base.clone()
    }
}

impl AdapterFactory for PlainAdapter {
    fn from_root(root: Value, config: &StoreConfig) -> SharedAdapter {
        Rc::new(Self::with_config(root, config.clone()))
    }
}
