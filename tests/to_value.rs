use std::collections::BTreeMap;

use serde::Serialize;

use whisker::{to_value, ErrorKind, List, Map, SafeString, Value};

#[test]
fn to_value_scalars() {
    assert_eq!(to_value(true).unwrap(), Value::Bool(true));
    assert_eq!(to_value(7_u8).unwrap(), Value::Integer(7));
    assert_eq!(to_value(-7_i64).unwrap(), Value::Integer(-7));
    assert_eq!(to_value(1.5_f32).unwrap(), Value::Float(1.5));
    assert_eq!(to_value('a').unwrap(), Value::String("a".into()));
    assert_eq!(to_value("s").unwrap(), Value::String("s".into()));
}

#[test]
fn to_value_u64_out_of_range() {
    assert_eq!(to_value(42_u64).unwrap(), Value::Integer(42));
    let err = to_value(u64::MAX).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialize);
}

#[test]
fn to_value_none_and_unit() {
    assert_eq!(to_value(None::<i32>).unwrap(), Value::None);
    assert_eq!(to_value(Some("x")).unwrap(), Value::from("x"));
    assert_eq!(to_value(()).unwrap(), Value::None);
}

#[test]
fn to_value_unit_struct() {
    #[derive(Serialize)]
    struct Test;
    assert_eq!(to_value(Test).unwrap(), Value::None);
}

#[test]
fn to_value_newtype_struct() {
    #[derive(Serialize)]
    struct Meters(i32);
    assert_eq!(to_value(Meters(3)).unwrap(), Value::Integer(3));
}

#[test]
fn to_value_sequences() {
    let expected = Value::List(List::from([Value::Integer(1), Value::Integer(2)]));
    assert_eq!(to_value(vec![1, 2]).unwrap(), expected);
    assert_eq!(to_value((1, 2)).unwrap(), expected);
}

#[test]
fn to_value_struct_keeps_field_order() {
    #[derive(Serialize)]
    struct User {
        zeta: &'static str,
        alpha: i32,
        mid: Vec<bool>,
    }
    let Value::Map(map) = to_value(User {
        zeta: "z",
        alpha: 1,
        mid: vec![true],
    })
    .unwrap() else {
        panic!("expected map")
    };
    let keys: Vec<_> = map.keys().map(String::as_str).collect();
    assert_eq!(keys, ["zeta", "alpha", "mid"]);
}

#[test]
fn to_value_map_with_integer_keys() {
    let map = BTreeMap::from([(2, "b"), (1, "a")]);
    let mut expected = Map::new();
    expected.insert("1".into(), Value::from("a"));
    expected.insert("2".into(), Value::from("b"));
    assert_eq!(to_value(map).unwrap(), Value::Map(expected));
}

#[test]
fn to_value_map_with_invalid_keys() {
    let map = BTreeMap::from([((1, 2), "x")]);
    let err = to_value(map).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Serialize);
    assert_eq!(err.to_string(), "map key must be a string or an integer");
}

#[test]
fn to_value_enum_variants() {
    #[derive(Serialize)]
    enum Shape {
        Unit,
        Newtype(i32),
        Tuple(i32, i32),
        Struct { w: i32 },
    }
    assert_eq!(to_value(Shape::Unit).unwrap(), Value::from("Unit"));
    assert_eq!(
        to_value(Shape::Newtype(1)).unwrap(),
        Value::from([("Newtype", 1)])
    );
    assert_eq!(
        to_value(Shape::Tuple(1, 2)).unwrap(),
        Value::from([("Tuple", vec![1, 2])])
    );
    assert_eq!(
        to_value(Shape::Struct { w: 3 }).unwrap(),
        Value::from([("Struct", Value::from([("w", 3)]))])
    );
}

#[test]
fn value_serializes_back() {
    let value = Value::from([
        ("a", Value::from(1)),
        ("safe", Value::Safe(SafeString::from("<b>"))),
        ("none", Value::None),
    ]);
    let json = serde_json::to_string(&value).unwrap();
    assert_eq!(json, r#"{"a":1,"safe":"<b>","none":null}"#);
}
