//! Two-way data binding over JSON stores.
//!
//! A [`Binding`] names "the value at this path in this store". Reading it
//! resolves the path through a [`StorageAdapter`]; writing it stores the new
//! value and calls the chain's change callback so the view can re-render.
//! Bindings compose: child nodes hold a relative path and derive everything
//! else from their parent, array nodes hand out one binding per element.
//!
//! Three storage backends share one adapter contract:
//!
//! - [`PlainAdapter`] writes into a shared document in place;
//! - [`SnapshotAdapter`] commits immutable generations and emits update events;
//! - [`ObservableAdapter`] tracks properties and runs reactions.
//!
//! # Example
//!
//! ```
//! use json_binding::{ArrayBinding, ObjectBinding, PlainAdapter};
//! use serde_json::json;
//!
//! let store = PlainAdapter::new(json!({"Person": {"FirstName": "Roman"}}));
//! let root = ObjectBinding::new(store.clone().shared(), ());
//!
//! let email = ObjectBinding::child(&root, "Person.Contact.Email", None);
//! email.set_value("roman@example.com").unwrap();
//!
//! let hobbies = ArrayBinding::child(&root, "Hobbies", None);
//! hobbies.add(json!({"Name": "cycling"})).unwrap();
//!
//! assert_eq!(store.snapshot(), json!({
//!     "Person": {"FirstName": "Roman", "Contact": {"Email": "roman@example.com"}},
//!     "Hobbies": [{"Name": "cycling"}]
//! }));
//! ```

pub mod adapter;
pub mod binder;
pub mod binding;
pub mod config;
pub mod converter;
pub mod error;

pub use adapter::{
    AdapterFactory, ChangeEvent, ChangeListener, ObservableAdapter, ObservableStore, PlainAdapter,
    ScopedChangeEvent, SharedAdapter, SnapshotAdapter, SnapshotStore, StorageAdapter, SubscriptionId,
};
pub use binder::{
    create_state_key_setter, BindTarget, Binder, ObservableBinder, PlainBinder, SnapshotBinder,
    StateContainer,
};
pub use binding::{ArrayBinding, Binding, BindingKind, BindingNode, NotifyChange, ObjectBinding};
pub use config::StoreConfig;
pub use converter::{curry, ConverterError, CurryConverter, FnConverter, SharedConverter, ValueConverter};
pub use error::BindingError;

pub use json_binding_path::{cast_path, path, IntoPath, Path, Reference, Segment};
