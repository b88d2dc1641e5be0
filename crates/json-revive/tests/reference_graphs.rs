//! Shared-reference and cycle reconstruction scenarios.

use json_revive::{parse, stringify, DecodeError, Value};

fn round_trip(value: &Value) -> Value {
    parse(&stringify(value)).expect("round trip decode")
}

#[test]
fn self_cycle_survives() {
    let a = Value::object();
    a.insert("self", a.clone());
    assert_eq!(stringify(&a), r#"{"self":"_duplicate_$"}"#);
    let b = round_trip(&a);
    assert!(b.get("self").unwrap().same_identity(&b));
}

#[test]
fn shared_reference_is_one_allocation() {
    let shared = Value::object();
    shared.insert("x", Value::from(1.0));
    let root = Value::object();
    root.insert("p", shared.clone());
    root.insert("q", shared);
    assert_eq!(
        stringify(&root),
        r#"{"p":{"x":1},"q":"_duplicate_$.p"}"#
    );
    let back = round_trip(&root);
    let p = back.get("p").unwrap();
    let q = back.get("q").unwrap();
    assert!(p.same_identity(&q));
    assert_eq!(p.get("x"), Some(Value::from(1.0)));
    // Mutating through one handle is visible through the other.
    p.insert("x", Value::from(9.0));
    assert_eq!(q.get("x"), Some(Value::from(9.0)));
}

#[test]
fn array_self_cycle_survives() {
    let list = Value::array();
    list.push(Value::from(1.0));
    list.push(list.clone());
    assert_eq!(stringify(&list), r#"[1,"_duplicate_$"]"#);
    let back = round_trip(&list);
    assert_eq!(back.at(0), Some(Value::from(1.0)));
    assert!(back.at(1).unwrap().same_identity(&back));
}

#[test]
fn cycle_through_nested_array() {
    let root = Value::object();
    let items = Value::array();
    items.push(root.clone());
    root.insert("items", items);
    assert_eq!(stringify(&root), r#"{"items":["_duplicate_$"]}"#);
    let back = round_trip(&root);
    assert!(back.get("items").unwrap().at(0).unwrap().same_identity(&back));
}

#[test]
fn diamond_shares_one_child() {
    let leaf = Value::object();
    leaf.insert("n", Value::from(1.0));
    let left = Value::object();
    left.insert("child", leaf.clone());
    let right = Value::object();
    right.insert("child", leaf);
    let root = Value::object();
    root.insert("left", left);
    root.insert("right", right);
    assert_eq!(
        stringify(&root),
        r#"{"left":{"child":{"n":1}},"right":{"child":"_duplicate_$.left.child"}}"#
    );
    let back = round_trip(&root);
    let via_left = back.get("left").unwrap().get("child").unwrap();
    let via_right = back.get("right").unwrap().get("child").unwrap();
    assert!(via_left.same_identity(&via_right));
}

#[test]
fn mutual_cycle_between_two_objects() {
    let a = Value::object();
    let b = Value::object();
    a.insert("peer", b.clone());
    b.insert("peer", a.clone());
    assert_eq!(
        stringify(&a),
        r#"{"peer":{"peer":"_duplicate_$"}}"#
    );
    let back = round_trip(&a);
    let peer = back.get("peer").unwrap();
    assert!(peer.get("peer").unwrap().same_identity(&back));
    assert!(!peer.same_identity(&back));
}

#[test]
fn references_into_arrays_resolve_by_index() {
    let shared = Value::object();
    shared.insert("id", Value::from(7.0));
    let list = Value::array();
    list.push(Value::from("head"));
    list.push(shared.clone());
    let root = Value::object();
    root.insert("list", list);
    root.insert("again", shared);
    assert_eq!(
        stringify(&root),
        r#"{"list":["head",{"id":7}],"again":"_duplicate_$.list.1"}"#
    );
    let back = round_trip(&root);
    let in_list = back.get("list").unwrap().at(1).unwrap();
    let again = back.get("again").unwrap();
    assert!(in_list.same_identity(&again));
}

#[test]
fn class_name_survives_alongside_cycles() {
    let node = Value::object_of_class("Node");
    node.insert("next", node.clone());
    let back = round_trip(&node);
    assert_eq!(back.class_name().as_deref(), Some("Node"));
    assert!(back.get("next").unwrap().same_identity(&back));
}

#[test]
fn unresolved_reference_fails_loudly() {
    let err = parse(r#"{"q":"_duplicate_$.missing"}"#).unwrap_err();
    match err {
        DecodeError::UnresolvedReference(path) => assert_eq!(path, "$.missing"),
        other => panic!("expected unresolved reference, got {other}"),
    }
}

#[test]
fn reference_without_root_marker_fails() {
    let err = parse(r#"{"q":"_duplicate_p"}"#).unwrap_err();
    assert!(matches!(err, DecodeError::UnresolvedReference(path) if path == "p"));
}
