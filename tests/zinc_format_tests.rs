//! Zinc format conformance tests
//!
//! Literal disambiguation, escapes, grid layout rules and the error cases
//! documented in the `format` module.

use serde_haystack::{
    from_zinc_str, read_scalar, to_zinc_string, to_zinc_string_with_options, CodecOptions, Date,
    DateTime, Error, GridBuilder, Number, Symbol, Time, TimeZone, Value, Version, ZincReader,
};

fn scalar(s: &str) -> Value {
    read_scalar(s)
        .unwrap_or_else(|e| panic!("{:?} failed: {}", s, e))
        .unwrap_or_else(|| panic!("{:?} was null", s))
}

#[test]
fn test_keywords() {
    assert_eq!(read_scalar("N").unwrap(), None);
    assert_eq!(scalar("M"), Value::Marker);
    assert_eq!(scalar("R"), Value::Remove);
    assert_eq!(scalar("NA"), Value::NA);
    assert_eq!(scalar("T"), Value::Bool(true));
    assert_eq!(scalar("F"), Value::Bool(false));
    assert!(scalar("NaN").as_f64().unwrap().is_nan());
    assert_eq!(scalar("INF").as_f64(), Some(f64::INFINITY));
    assert_eq!(scalar("-INF").as_f64(), Some(f64::NEG_INFINITY));
}

#[test]
fn test_number_literals() {
    assert_eq!(scalar("42"), Value::from(42));
    assert_eq!(scalar("-0.25"), Value::from(-0.25));
    assert_eq!(scalar("1_000_000"), Value::from(1_000_000));
    assert_eq!(scalar("2.5e3"), Value::from(2500.0));
    assert_eq!(scalar("0x1F"), Value::from(31));
    assert_eq!(
        scalar("5eggs"),
        Value::from(Number::with_unit(5.0, "eggs").unwrap())
    );
    assert_eq!(
        scalar("100%"),
        Value::from(Number::with_unit(100.0, "%").unwrap())
    );
    assert_eq!(
        scalar("3kW_h"),
        Value::from(Number::with_unit(3.0, "kW_h").unwrap())
    );
}

#[test]
fn test_units_with_dash_and_star() {
    assert_eq!(
        scalar("5kW-h"),
        Value::from(Number::with_unit(5.0, "kW-h").unwrap())
    );
    assert_eq!(
        scalar("5kW*h"),
        Value::from(Number::with_unit(5.0, "kW*h").unwrap())
    );
    assert_eq!(
        scalar("-2.5e-1m*s"),
        Value::from(Number::with_unit(-0.25, "m*s").unwrap())
    );

    let n = Value::from(Number::with_unit(12.0, "kW-h").unwrap());
    assert_eq!(read_scalar(&n.to_string()).unwrap(), Some(n));
}

#[test]
fn test_non_finite_numbers_roundtrip() {
    for v in [f64::INFINITY, f64::NEG_INFINITY, f64::NAN] {
        let n = Value::from(v);
        assert_eq!(read_scalar(&n.to_string()).unwrap(), Some(n));
        assert!(Number::with_unit(v, "kW").is_err());
    }
}

#[test]
fn test_temporal_literals() {
    assert_eq!(scalar("2024-02-29"), Value::from(Date::new(2024, 2, 29).unwrap()));
    assert_eq!(scalar("08:30:00"), Value::from(Time::new(8, 30, 0, 0).unwrap()));
    assert_eq!(scalar("08:30"), Value::from(Time::new(8, 30, 0, 0).unwrap()));
    assert_eq!(scalar("08:30:00.5"), Value::from(Time::new(8, 30, 0, 500).unwrap()));

    let utc = scalar("2024-03-15T08:30:00Z").as_datetime().unwrap();
    assert!(utc.tz().is_utc());
    assert_eq!(utc.tz_offset(), 0);

    let ny = scalar("2024-03-15T08:30:00-04:00 New_York").as_datetime().unwrap();
    assert_eq!(ny.tz(), TimeZone::make("New_York").unwrap());
    assert_eq!(ny.tz_offset(), -4 * 3600);
    assert_eq!(ny.millis(), utc.millis() + 4 * 3600 * 1000);
}

#[test]
fn test_temporal_errors() {
    assert!(read_scalar("2023-02-29").is_err());
    assert!(read_scalar("2024-1-05").is_err());
    assert!(read_scalar("8:30:00").is_err());
    assert!(read_scalar("08:30:00.1234").is_err());
    assert!(read_scalar("2024-03-15T08:30:00").is_err());
    assert!(read_scalar("2024-03-15T08:30:00-04:00 Atlantis").is_err());
}

#[test]
fn test_strings_and_uris() {
    assert_eq!(scalar(r#""tab\there""#), Value::str("tab\there"));
    assert_eq!(scalar(r#""é\$""#), Value::str("é$"));
    assert_eq!(scalar(r#""😀""#), Value::str("😀"));
    assert_eq!(scalar(r"`http://x/a\`b`"), Value::uri("http://x/a`b"));
    assert_eq!(scalar(r"`a\#b`"), Value::uri(r"a\#b"));
    assert!(read_scalar("\"open").is_err());
    assert!(read_scalar(r#""bad \q escape""#).is_err());
}

#[test]
fn test_compound_literals() {
    assert_eq!(
        scalar("[1, 2 , M]"),
        Value::List(vec![Value::from(1), Value::from(2), Value::Marker])
    );
    assert_eq!(scalar("[]"), Value::List(vec![]));
    assert_eq!(
        scalar("^elec-meter"),
        Value::from(Symbol::new("elec-meter").unwrap())
    );
    assert_eq!(scalar("Bin(text/plain)"), scalar("Bin(\"text/plain\")"));
    let c = scalar("C(-33.8688,151.2093)").as_coord().unwrap();
    assert_eq!(c.micro_lat(), -33_868_800);
    assert!(read_scalar("C(91,0)").is_err());
    assert!(read_scalar("[1,N]").is_err());
}

#[test]
fn test_trailing_input_rejected() {
    assert!(read_scalar("42 43").is_err());
    assert!(read_scalar("M,").is_err());
}

#[test]
fn test_grid_blank_cells_and_null() {
    let grid = from_zinc_str("ver:\"3.0\"\na,b,c\n1,,N\n,,\n").unwrap();
    assert_eq!(grid.num_rows(), 2);
    let r0 = grid.row(0).unwrap();
    assert_eq!(r0.get("a"), Some(&Value::from(1)));
    assert!(r0.missing("b"));
    assert!(r0.missing("c"));
    assert!(grid.row(1).unwrap().is_empty());
}

#[test]
fn test_grid_meta_and_col_meta() {
    let zinc = "ver:\"3.0\" hisStart:2024-01-01 view\nts tz:\"New_York\",val unit:\"kW\" precision:2\n";
    let grid = from_zinc_str(zinc).unwrap();
    assert!(grid.meta().has("view"));
    assert_eq!(
        grid.col("val").unwrap().meta().get("precision"),
        Some(&Value::from(2))
    );
    assert!(grid.is_empty());
}

#[test]
fn test_version_two_accepted() {
    let grid = from_zinc_str("ver:\"2.0\"\nfile\nBin(image/png)\n").unwrap();
    assert_eq!(grid.num_rows(), 1);
    assert!(from_zinc_str("ver:\"4.0\"\na\n").is_err());
    assert!(from_zinc_str("version:\"3.0\"\na\n").is_err());
}

#[test]
fn test_multiple_grids() {
    let text = "ver:\"3.0\"\na\n1\n\nver:\"3.0\"\nb\n2\n3\n";
    let grids = ZincReader::from_str(text).read_grids().unwrap();
    assert_eq!(grids.len(), 2);
    assert_eq!(grids[1].num_rows(), 2);

    let mut reader = ZincReader::from_str(text);
    assert_eq!(reader.read_grid().unwrap().num_rows(), 1);
    assert!(reader.read_grid().unwrap().has_col("b"));
}

#[test]
fn test_read_dict() {
    let d = ZincReader::from_str("site dis:\"HQ\" area:1200ft²").read_dict().unwrap();
    assert_eq!(d.len(), 3);
    let braced = ZincReader::from_str("{site dis:\"HQ\" area:1200ft²}").read_dict().unwrap();
    assert_eq!(braced, d);
}

#[test]
fn test_parse_error_lines() {
    let err = from_zinc_str("ver:\"3.0\"\nname\n\"unterminated\n").unwrap_err();
    assert!(matches!(err, Error::Parse { line: 3, .. }), "{:?}", err);

    let err = from_zinc_str("ver:\"3.0\"\na,b\n1,2\n1,2,3\n").unwrap_err();
    assert_eq!(err.line(), Some(4));

    let err = from_zinc_str("ver:\"3.0\"\na,b\n1\n").unwrap_err();
    assert_eq!(err.line(), Some(3));

    let err = from_zinc_str("ver:\"3.0\"\na,a\n").unwrap_err();
    assert_eq!(err.line(), Some(2));
}

#[test]
fn test_writer_escapes_roundtrip() {
    let mut b = GridBuilder::new();
    b.add_col("s").unwrap();
    b.add_col("u").unwrap();
    b.add_row(vec![
        Some(Value::str("q\"b\\n\nl\u{1}")),
        Some(Value::uri("a`b")),
    ])
    .unwrap();
    let grid = b.build().unwrap();
    let zinc = to_zinc_string(&grid).unwrap();
    assert_eq!(zinc, "ver:\"3.0\"\ns,u\n\"q\\\"b\\\\n\\nl\\u0001\",`a\\`b`\n");
    assert_eq!(from_zinc_str(&zinc).unwrap(), grid);
}

#[test]
fn test_version_two_writer() {
    let mut b = GridBuilder::new();
    b.add_col("kind").unwrap();
    b.add_row(vec![Some(Value::from(Symbol::new("ahu").unwrap()))])
        .unwrap();
    let grid = b.build().unwrap();
    let err = to_zinc_string_with_options(&grid, CodecOptions::new().with_version(Version::V2))
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedType(_)));
}

#[test]
fn test_datetime_ordering_is_by_instant() {
    let a = scalar("2024-03-15T08:30:00-04:00 New_York").as_datetime().unwrap();
    let b = scalar("2024-03-15T13:00:00Z").as_datetime().unwrap();
    assert_eq!(a.cmp_instant(&b), std::cmp::Ordering::Less);
    let c = DateTime::from_millis(a.millis(), TimeZone::utc()).unwrap();
    assert_eq!(a.cmp_instant(&c), std::cmp::Ordering::Equal);
}
