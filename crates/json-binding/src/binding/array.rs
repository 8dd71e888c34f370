use std::ops::Deref;

use json_binding_path::{concat_path, join_path, IntoPath, Segment};
use serde_json::{Map, Value};

use super::{Binding, BindingNode, ChildNode, NotifyChange, ObjectBinding, RootNode};
use crate::adapter::SharedAdapter;
use crate::converter::SharedConverter;
use crate::error::BindingError;

/// Binding to an array, with item bindings and in-place mutations.
///
/// Items are re-derived from the store on every call to
/// [`ArrayBinding::items`]. With a converter attached, items are taken from
/// the formatted value while mutations act on the stored array.
#[derive(Debug, Clone)]
pub struct ArrayBinding(Binding);

impl ArrayBinding {
    /// Root array node anchored at `source`.
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
        Self(Binding::from_node(BindingNode::RootArray(node)))
    }

    /// Child array node at `relative_path` below `parent`.
    pub fn child(parent: &Binding, relative_path: impl IntoPath, converter: Option<SharedConverter>) -> Self {
        let node = ChildNode::new(parent.clone(), relative_path.into_path(), None, converter);
        Self(Binding::from_node(BindingNode::ChildArray(node)))
    }

    /// One object binding per element, in order.
    ///
    /// Each item gets its own adapter narrowed to its index. A missing array
    /// yields no items.
    ///
    /// # Errors
    ///
    /// Converter failures, or [`BindingError::NotAnArray`] when the (formatted)
    /// value is present but not an array.
    pub fn items(&self) -> Result<Vec<ObjectBinding>, BindingError> {
        let elements = self.formatted_items()?;
        let source = self.0.source();
        let base = self.0.source_path();
        Ok(elements
            .into_iter()
            .enumerate()
            .map(|(index, element)| {
                let scope = source.create_new(&concat_path(&base, &[Segment::Index(index)]), Some(element));
                ObjectBinding::item(&self.0, index, scope)
            })
            .collect())
    }

    /// Number of items [`ArrayBinding::items`] would return.
    pub fn len(&self) -> Result<usize, BindingError> {
        Ok(self.formatted_items()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, BindingError> {
        Ok(self.len()? == 0)
    }

    /// Append `item`, creating the array when it is missing, then notify.
    pub fn add(&self, item: impl Into<Value>) -> Result<(), BindingError> {
        let mut items = match self.stored_items()? {
            Some(items) => items,
            None => {
                self.write_items(Vec::new())?;
                Vec::new()
            }
        };
        items.push(item.into());
        self.write_items(items)?;
        self.0.notify(None);
        Ok(())
    }

    /// Append an empty object.
    pub fn add_default(&self) -> Result<(), BindingError> {
        self.add(Value::Object(Map::new()))
    }

    /// Remove the first element equal to `item`, then notify.
    ///
    /// Returns `false`, without notifying, when there is no such element.
    pub fn remove(&self, item: &Value) -> Result<bool, BindingError> {
        let Some(mut items) = self.stored_items()? else {
            return Ok(false);
        };
        let Some(index) = items.iter().position(|candidate| candidate == item) else {
            return Ok(false);
        };
        items.remove(index);
        self.write_items(items)?;
        self.0.notify(None);
        Ok(true)
    }

    /// Remove `delete_count` elements from `start` and insert `insert` in
    /// their place. Returns the removed elements.
    ///
    /// A negative `start` counts from the end; out-of-range values are
    /// clamped. Does not notify.
    pub fn splice(&self, start: isize, delete_count: usize, insert: Vec<Value>) -> Result<Vec<Value>, BindingError> {
        let Some(mut items) = self.stored_items()? else {
            return Ok(Vec::new());
        };
        let removed = splice_vec(&mut items, start, delete_count, insert);
        self.write_items(items)?;
        Ok(removed)
    }

    /// Move the element at `from` to index `to`, then notify once.
    ///
    /// `to` is clamped to the end of the array. Returns `false`, without
    /// notifying, when `from` is out of range.
    pub fn move_item(&self, from: usize, to: usize) -> Result<bool, BindingError> {
        let Some(mut items) = self.stored_items()? else {
            return Ok(false);
        };
        if from >= items.len() {
            return Ok(false);
        }
        let moved = items.remove(from);
        let to = to.min(items.len());
        items.insert(to, moved);
        self.write_items(items)?;
        self.0.notify(None);
        Ok(true)
    }

    pub fn into_binding(self) -> Binding {
        self.0
    }

    fn formatted_items(&self) -> Result<Vec<Value>, BindingError> {
        match self.0.read()? {
            None | Some(Value::Null) => Ok(Vec::new()),
            Some(Value::Array(items)) => Ok(items),
            Some(_) => Err(self.not_an_array()),
        }
    }

    fn stored_items(&self) -> Result<Option<Vec<Value>>, BindingError> {
        match self.0.raw_value() {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Array(items)) => Ok(Some(items)),
            Some(_) => Err(self.not_an_array()),
        }
    }

    fn write_items(&self, items: Vec<Value>) -> Result<(), BindingError> {
        self.0.source().set_value(&self.0.source_path(), Value::Array(items))
    }

    fn not_an_array(&self) -> BindingError {
        BindingError::NotAnArray {
            path: join_path(&self.0.path(), "."),
        }
    }
}

fn splice_vec(items: &mut Vec<Value>, start: isize, delete_count: usize, insert: Vec<Value>) -> Vec<Value> {
    let len = items.len();
    let start = if start < 0 {
        len.saturating_sub(start.unsigned_abs())
    } else {
        start.unsigned_abs().min(len)
    };
    let end = start + delete_count.min(len - start);
    items.splice(start..end, insert).collect()
}

impl Deref for ArrayBinding {
    type Target = Binding;

    fn deref(&self) -> &Binding {
        &self.0
    }
}

impl From<ArrayBinding> for Binding {
    fn from(binding: ArrayBinding) -> Self {
        binding.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::PlainAdapter;
    use json_binding_path::path;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn counting(adapter: &PlainAdapter, path: &str) -> (ArrayBinding, Rc<Cell<usize>>) {
        let calls = Rc::new(Cell::new(0));
        let counter = Rc::clone(&calls);
        let notify: NotifyChange = Rc::new(move |_| counter.set(counter.get() + 1));
        let binding = ArrayBinding::with_options(adapter.clone().shared(), path, Some(notify), None);
        (binding, calls)
    }

    #[test]
    fn test_splice_vec_clamps() {
        let mut items = vec![json!(1), json!(2), json!(3)];
        assert_eq!(splice_vec(&mut items, 1, 10, vec![]), vec![json!(2), json!(3)]);
        assert_eq!(items, vec![json!(1)]);

        let mut items = vec![json!(1), json!(2), json!(3)];
        assert_eq!(splice_vec(&mut items, -1, 1, vec![json!(9)]), vec![json!(3)]);
        assert_eq!(items, vec![json!(1), json!(2), json!(9)]);

        let mut items = vec![json!(1)];
        assert!(splice_vec(&mut items, -10, 0, vec![json!(0)]).is_empty());
        assert_eq!(items, vec![json!(0), json!(1)]);

        let mut items = vec![json!(1)];
        assert!(splice_vec(&mut items, 7, 1, vec![json!(2)]).is_empty());
        assert_eq!(items, vec![json!(1), json!(2)]);
    }

    #[test]
    fn test_items_are_rederived() {
        let adapter = PlainAdapter::new(json!({"list": [{"n": 1}]}));
        let list = ArrayBinding::new(adapter.clone().shared(), "list");
        assert_eq!(list.items().unwrap().len(), 1);
        adapter.root().borrow_mut()["list"] = json!([{"n": 1}, {"n": 2}]);
        let items = list.items().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].path(), path!["list", 1]);
        assert_eq!(items[1].value().unwrap(), Some(json!({"n": 2})));
        assert!(items[1].parent().is_some_and(|p| p.ptr_eq(&list)));
    }

    #[test]
    fn test_add_creates_missing_array() {
        let adapter = PlainAdapter::new(json!({}));
        let (list, calls) = counting(&adapter, "Hobbies");
        assert!(list.is_empty().unwrap());
        list.add_default().unwrap();
        list.add(json!({"Name": "x"})).unwrap();
        assert_eq!(adapter.snapshot(), json!({"Hobbies": [{}, {"Name": "x"}]}));
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_remove() {
        let adapter = PlainAdapter::new(json!({"list": ["a", "b"]}));
        let (list, calls) = counting(&adapter, "list");
        assert!(!list.remove(&json!("z")).unwrap());
        assert_eq!(calls.get(), 0);
        assert!(list.remove(&json!("a")).unwrap());
        assert_eq!(adapter.snapshot(), json!({"list": ["b"]}));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_splice_does_not_notify() {
        let adapter = PlainAdapter::new(json!({"list": [1, 2, 3]}));
        let (list, calls) = counting(&adapter, "list");
        let removed = list.splice(0, 1, vec![]).unwrap();
        assert_eq!(removed, vec![json!(1)]);
        assert_eq!(calls.get(), 0);
        assert_eq!(adapter.snapshot(), json!({"list": [2, 3]}));
    }

    #[test]
    fn test_move_out_of_range() {
        let adapter = PlainAdapter::new(json!({"list": [1, 2]}));
        let (list, calls) = counting(&adapter, "list");
        assert!(!list.move_item(5, 0).unwrap());
        assert_eq!(calls.get(), 0);
        assert!(list.move_item(0, 9).unwrap());
        assert_eq!(adapter.snapshot(), json!({"list": [2, 1]}));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_not_an_array() {
        let adapter = PlainAdapter::new(json!({"list": 5}));
        let list = ArrayBinding::new(adapter.shared(), "list");
        assert!(matches!(list.add_default(), Err(BindingError::NotAnArray { .. })));
        assert!(matches!(list.items(), Err(BindingError::NotAnArray { .. })));
    }
}
