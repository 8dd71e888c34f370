use std::cell::RefCell;
use std::rc::Rc;

use json_binding::{
    BindingError, ConverterError, CurryConverter, ObservableBinder, PlainBinder, SharedConverter,
    ValueConverter,
};
use regex::Regex;
use serde_json::{json, Value};

/// Stores ISO timestamps, shows `YYYY-MM-DD` plus an optional suffix, and
/// parses `YYYY/MM/DD` out of user input.
struct DateValueSuffixConverter {
    pattern: Regex,
}

impl DateValueSuffixConverter {
    fn new() -> Self {
        Self {
            pattern: Regex::new(r"\d{4}/\d{2}/\d{2}").unwrap(),
        }
    }
}

impl ValueConverter for DateValueSuffixConverter {
    fn format(&self, value: Option<Value>, params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        let Some(value) = value else { return Ok(None) };
        let day = value
            .as_str()
            .and_then(|iso| iso.get(..10))
            .ok_or_else(|| ConverterError::new("expected an ISO timestamp"))?;
        let suffix = params.and_then(Value::as_str).unwrap_or("");
        Ok(Some(json!(format!("{day}{suffix}"))))
    }

    fn parse(&self, value: Option<Value>, _params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        let Some(value) = value else { return Ok(None) };
        let text = value.as_str().unwrap_or_default();
        let found = self
            .pattern
            .find(text)
            .ok_or_else(|| ConverterError::new(format!("no date in {text:?}")))?;
        Ok(Some(json!(format!("{}T00:00:00.000Z", found.as_str().replace('/', "-")))))
    }
}

struct PersonConverter;

impl ValueConverter for PersonConverter {
    fn format(&self, value: Option<Value>, _params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        Ok(value.map(|person| {
            let part = |key: &str| person.get(key).and_then(Value::as_str).unwrap_or("").to_string();
            json!(format!("{} {}", part("FirstName"), part("LastName")))
        }))
    }
}

/// Count of pages shown as one descriptor per page.
struct ArraySizeConverter;

impl ValueConverter for ArraySizeConverter {
    fn format(&self, value: Option<Value>, _params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        let count = value.as_ref().and_then(Value::as_u64).unwrap_or(0);
        Ok(Some(Value::Array((0..count).map(|i| json!({"pageIndex": i})).collect())))
    }
}

/// Array shown as its length; a length written back generates that many
/// people.
struct ArrayConverter;

impl ValueConverter for ArrayConverter {
    fn format(&self, value: Option<Value>, _params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        let len = value.as_ref().and_then(Value::as_array).map_or(0, Vec::len);
        Ok(Some(json!(len)))
    }

    fn parse(&self, value: Option<Value>, _params: Option<&Value>) -> Result<Option<Value>, ConverterError> {
        let count = value.as_ref().and_then(Value::as_u64).unwrap_or(0);
        let people = (0..count)
            .map(|i| {
                json!({"Person": {
                    "FirstName": format!("Roman {i}"),
                    "LastName": format!("Samec {i}"),
                    "Addresses": []
                }})
            })
            .collect();
        Ok(Some(Value::Array(people)))
    }
}

fn vacation() -> Value {
    json!({"Vacation": {
        "From": "2015-01-01T00:00:00.000Z",
        "To": "2015-01-07T00:00:00.000Z"
    }})
}

#[test]
fn bind_dates_with_value_converters() {
    let binder = PlainBinder::new();
    let root = binder.bind_to(vacation(), (), None, None);
    let vacation = binder.bind_to(&root, "Vacation", None, None);
    let dates: SharedConverter = Rc::new(DateValueSuffixConverter::new());
    let from = binder.bind_to(&vacation, "From", Some(Rc::clone(&dates)), None);
    let to = binder.bind_to(&vacation, "To", Some(dates), None);

    assert_eq!(from.value().unwrap(), Some(json!("2015-01-01")));
    assert_eq!(to.value().unwrap(), Some(json!("2015-01-07")));

    from.set_value("2015/02/13").unwrap();
    to.set_value("2015/02/20").unwrap();
    assert_eq!(from.raw_value(), Some(json!("2015-02-13T00:00:00.000Z")));
    assert_eq!(to.value().unwrap(), Some(json!("2015-02-20")));
}

#[test]
fn bind_dates_with_value_converter_parameters() {
    let binder = PlainBinder::new();
    let root = binder.bind_to(vacation(), (), None, None);
    let converter: SharedConverter = Rc::new(CurryConverter::new(Rc::new(DateValueSuffixConverter::new()), "UTC"));
    let from = binder.bind_to(&root, "Vacation.From", Some(Rc::clone(&converter)), None);
    // parameters passed to the binder are curried the same way
    let to = binder.bind_to(
        &root,
        "Vacation.To",
        Some(Rc::new(DateValueSuffixConverter::new())),
        Some(json!("UTC")),
    );

    assert_eq!(from.value().unwrap(), Some(json!("2015-01-01UTC")));
    assert_eq!(to.value().unwrap(), Some(json!("2015-01-07UTC")));

    from.set_value("2015/02/13UTC").unwrap();
    to.set_value("2015/02/20UTC").unwrap();
    assert_eq!(from.value().unwrap(), Some(json!("2015-02-13UTC")));
    assert_eq!(to.raw_value(), Some(json!("2015-02-20T00:00:00.000Z")));
}

#[test]
fn curried_format_matches_direct_call() {
    let inner = DateValueSuffixConverter::new();
    let sample = Some(json!("2015-03-04T10:00:00.000Z"));
    let curried = CurryConverter::new(Rc::new(DateValueSuffixConverter::new()), "UTC");
    assert_eq!(
        curried.format(sample.clone(), None).unwrap(),
        inner.format(sample, Some(&json!("UTC"))).unwrap()
    );
}

#[test]
fn converter_failure_propagates_and_leaves_store_alone() {
    let binder = PlainBinder::new();
    let root = binder.bind_to(vacation(), (), None, None);
    let from = binder.bind_to(&root, "Vacation.From", Some(Rc::new(DateValueSuffixConverter::new())), None);

    let err = from.set_value("next tuesday").unwrap_err();
    assert!(matches!(err, BindingError::Converter(_)));
    assert_eq!(from.raw_value(), Some(json!("2015-01-01T00:00:00.000Z")));

    let broken = binder.bind_to(&root, "Vacation", Some(Rc::new(DateValueSuffixConverter::new())), None);
    assert!(matches!(broken.value(), Err(BindingError::Converter(_))));
}

#[test]
fn whole_object_converter_follows_its_fields() {
    let binder = ObservableBinder::new();
    let root = binder.bind_to(json!({"Person": {}}), (), None, None);
    let first_name = binder.bind_to(&root, "Person.FirstName", None, None);
    let last_name = binder.bind_to(&root, "Person.LastName", None, None);
    let full_name = binder.bind_to(&root, "Person", Some(Rc::new(PersonConverter)), None);

    let names = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&names);
    let reader = full_name.clone();
    root.source().subscribe(Box::new(move |_| {
        if let Ok(Some(name)) = reader.value() {
            sink.borrow_mut().push(name);
        }
    }));

    first_name.set_value("Roman").unwrap();
    last_name.set_value("Samec").unwrap();
    assert_eq!(full_name.value().unwrap(), Some(json!("Roman Samec")));
    assert_eq!(*names.borrow(), vec![json!("Roman "), json!("Roman Samec")]);
}

#[test]
fn array_size_converter_synthesizes_items() {
    let binder = PlainBinder::new();
    let root = binder.bind_to(json!({"pageCount": 3}), (), None, None);
    let pages = binder.bind_array_to(&root, "pageCount", Some(Rc::new(ArraySizeConverter)), None);

    let items = pages.items().unwrap();
    assert_eq!(items.len(), 3);
    assert_eq!(items[2].value().unwrap(), Some(json!({"pageIndex": 2})));

    // synthesized items live in their own store
    let index = binder.bind_to(&items[2], "pageIndex", None, None);
    index.set_value(7).unwrap();
    assert_eq!(index.value().unwrap(), Some(json!(7)));
    assert_eq!(root.value().unwrap(), Some(json!({"pageCount": 3})));
}

#[test]
fn array_converter_on_object_binding() {
    let binder = PlainBinder::new();
    let root = binder.bind_to(json!({"People": []}), (), None, None);
    let count = binder.bind_to(&root, "People", Some(Rc::new(ArrayConverter)), None);
    assert_eq!(count.value().unwrap(), Some(json!(0)));

    count.set_value(2).unwrap();
    assert_eq!(count.value().unwrap(), Some(json!(2)));
    let people = binder.bind_array_to(&root, "People", None, None);
    let second = binder.bind_to(&people.items().unwrap()[1], "Person.FirstName", None, None);
    assert_eq!(second.value().unwrap(), Some(json!("Roman 1")));
}
