use json_binding_path::{
    base_get, base_set, cast_path, concat_path, is_path_equal, path, resolve_path, Reference,
    Segment, DEFAULT_MAX_REF_HOPS,
};
use serde_json::json;

fn todo_store() -> serde_json::Value {
    json!({
        "todos": [
            {"$type": "ref", "value": ["todosById", "44"]},
            {"$type": "ref", "value": ["todosById", "54"]}
        ],
        "todosById": {
            "44": {"name": "get milk from corner store", "done": false},
            "54": {"name": "deliver pizza", "done": true}
        }
    })
}

#[test]
fn test_string_and_list_forms_agree() {
    let cases = [
        ("FirstName", path!["FirstName"]),
        ("Person.Contact.Email", path!["Person", "Contact", "Email"]),
        ("Hobbies[0].Name", path!["Hobbies", 0, "Name"]),
        (
            "Hobbies[2].People[1].Person.LastName",
            path!["Hobbies", 2, "People", 1, "Person", "LastName"],
        ),
        ("todosById['44'].done", path!["todosById", "44", "done"]),
    ];
    for (expr, expected) in cases {
        assert_eq!(cast_path(expr), expected, "expr: {expr}");
    }
}

#[test]
fn test_dotted_index_matches_bracket_index() {
    assert!(is_path_equal(
        &cast_path("Hobbies.0.Name"),
        &cast_path("Hobbies[0].Name")
    ));
}

#[test]
fn test_reference_read_matrix() {
    let doc = todo_store();
    assert_eq!(
        base_get(&doc, &cast_path("todos[0].name")),
        Some(&json!("get milk from corner store"))
    );
    assert_eq!(base_get(&doc, &cast_path("todos[1].done")), Some(&json!(true)));
    assert_eq!(base_get(&doc, &cast_path("todos[2].done")), None);
    assert_eq!(
        base_get(&doc, &cast_path("todos[0]")),
        Some(&Reference::new(path!["todosById", "44"]).to_value())
    );
}

#[test]
fn test_write_through_reference() {
    let mut doc = todo_store();
    let physical = resolve_path(&doc, &cast_path("todos[0].done"), DEFAULT_MAX_REF_HOPS).unwrap();
    assert_eq!(physical, path!["todosById", "44", "done"]);

    base_set(&mut doc, &physical, json!(true), None).unwrap();
    assert_eq!(doc["todosById"]["44"]["done"], json!(true));
    assert!(Reference::from_value(&doc["todos"][0]).is_some());
}

#[test]
fn test_reference_into_array_element() {
    let doc = json!({
        "current": {"$type": "ref", "value": "items[1]"},
        "items": [{"id": 1}, {"id": 2}]
    });
    assert_eq!(base_get(&doc, &path!["current", "id"]), Some(&json!(2)));
    assert_eq!(
        resolve_path(&doc, &path!["current", "id"], DEFAULT_MAX_REF_HOPS),
        Some(concat_path(&path!["items", 1], &[Segment::from("id")]))
    );
}
