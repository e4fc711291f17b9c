use serde_haystack::{dict, Coord, Date, Dict, Error, Number, Ref, Value};

#[test]
fn test_dict_macro_empty() {
    let d = dict! {}.unwrap();
    assert_eq!(d, Dict::empty());
}

#[test]
fn test_dict_macro_markers() {
    let d = dict! { "site", "equip", "point" }.unwrap();
    assert_eq!(d.len(), 3);
    assert!(d.iter().all(|(_, v)| v.is_marker()));
}

#[test]
fn test_dict_macro_host_values() {
    let d = dict! {
        "str" => "hello",
        "owned" => String::from("world"),
        "int" => 42,
        "float" => 3.5,
        "flag" => false,
    }
    .unwrap();
    assert_eq!(d.get("str"), Some(&Value::str("hello")));
    assert_eq!(d.get("owned"), Some(&Value::str("world")));
    assert_eq!(d.get("int"), Some(&Value::from(42)));
    assert_eq!(d.get("float").and_then(Value::as_f64), Some(3.5));
    assert_eq!(d.get("flag"), Some(&Value::Bool(false)));
}

#[test]
fn test_dict_macro_haystack_values() {
    let d = dict! {
        "id" => Ref::with_dis("b1", "Building 1").unwrap(),
        "geoCoord" => Coord::make(51.5074, -0.1278).unwrap(),
        "built" => Date::new(1998, 4, 1).unwrap(),
        "area" => Number::with_unit(5400.0, "m²").unwrap(),
        "tags" => vec![Value::Marker, Value::str("x")],
        "site",
    }
    .unwrap();
    assert_eq!(d.len(), 6);
    assert_eq!(d.dis(), "Building 1");
    assert_eq!(
        d.get("tags"),
        Some(&Value::List(vec![Value::Marker, Value::str("x")]))
    );
}

#[test]
fn test_dict_macro_later_tag_wins() {
    let d = dict! { "a" => 1, "a" => 2 }.unwrap();
    assert_eq!(d.get("a"), Some(&Value::from(2)));
}

#[test]
fn test_dict_macro_expression_values() {
    let base = 20.0;
    let d = dict! { "sp" => base + 1.5, "dis" => format!("SP {}", base) }.unwrap();
    assert_eq!(d.get("sp").and_then(Value::as_f64), Some(21.5));
    assert_eq!(d.get("dis").and_then(Value::as_str), Some("SP 20"));
}

#[test]
fn test_dict_macro_invalid_names() {
    assert!(matches!(dict! { "Upper" }, Err(Error::InvalidArgument(_))));
    assert!(matches!(dict! { "has space" => 1 }, Err(Error::InvalidArgument(_))));
    assert!(matches!(dict! { "_x", "ok" }, Err(Error::InvalidArgument(_))));
}

#[test]
fn test_dict_macro_with_question_mark() -> serde_haystack::Result<()> {
    let d = dict! { "site", "area" => 100 }?;
    assert!(d.has("site"));
    Ok(())
}
