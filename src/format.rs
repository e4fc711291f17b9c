//! Zinc and Haystack JSON format reference
//!
//! This module documents the two wire formats as implemented by this library.
//!
//! # Overview
//!
//! A Haystack payload is a grid: a dict of grid meta, an ordered list of
//! named columns (each with its own meta), and rows holding one optional
//! value per column. Zinc is the line-oriented text form; Haystack JSON
//! carries the same model inside a JSON object.
//!
//! # Zinc
//!
//! ## Grid Layout
//!
//! ```text
//! ver:"3.0" dis:"Sites" hisStart:2024-01-01
//! id,dis,area unit:"ft²"
//! @s1 "HQ","Headquarters",12000ft²
//! @s2,,N
//!
//! ```
//!
//! **Rules**:
//! - The first line is the version header followed by grid meta tags
//! - The second line lists the columns, comma separated, each followed by its meta tags
//! - Each further line is a row with exactly one cell per column
//! - An empty cell, or `N`, is an absent value
//! - A blank line or end of input terminates the grid; several grids may follow each other
//! - Version `"2.0"` and `"3.0"` headers are both accepted when reading
//!
//! A row whose cells are all absent is written as `N` followed by commas so
//! it is not mistaken for the terminating blank line.
//!
//! ## Meta Tags
//!
//! Meta is a space-separated list where a bare name is a marker and
//! `name:value` carries any scalar: `hisFoo dis:"T" precision:2`.
//!
//! ## Scalars
//!
//! | Kind | Syntax | Example |
//! |------|--------|---------|
//! | Null | `N` | `N` |
//! | Marker | `M` | `M` |
//! | Remove | `R` | `R` |
//! | NA | `NA` | `NA` |
//! | Bool | `T` or `F` | `T` |
//! | Number | Decimal with optional exponent and unit | `-2.5e3kW`, `72°F`, `0x1F` |
//! | Special Numbers | `INF`, `-INF`, `NaN` | `INF` |
//! | Str | Double-quoted | `"hello\n"` |
//! | Uri | Back-quoted | `` `http://host/path` `` |
//! | Ref | `@id` with optional quoted display | `@site-1 "Main"` |
//! | Symbol | `^name` | `^elec-meter` |
//! | Date | `YYYY-MM-DD` | `2024-03-15` |
//! | Time | `hh:mm:ss[.fff]` | `08:30:00.125` |
//! | DateTime | Date, `T`, time, offset, timezone | `2024-03-15T08:30:00-04:00 New_York` |
//! | Coord | `C(lat,lng)` | `C(37.5458,-77.4)` |
//! | Bin | `Bin("mime")` | `Bin("text/plain")` |
//! | XStr | `Type("value")` | `Span("today")` |
//! | List | `[v, v, ...]` | `[1, "a", M]` |
//!
//! ## Numbers
//!
//! A number token runs from its first digit (or `-`) through digits, `.`,
//! `_` separators, an optional exponent and a trailing unit. A token with two
//! dashes and a `T` is a datetime, with two dashes alone a date, and with
//! one or two colons a time. The exponent is only recognized before the unit
//! begins, so `5eggs` is the number 5 with unit `eggs`. Once a unit has
//! begun it may also contain `-` and `*`, as in `5kW-h`.
//!
//! ## Strings
//!
//! Str and Uri literals recognize `\b \f \n \r \t \" \\ \$` and `\uXXXX`
//! escapes; a surrogate pair of `\u` escapes decodes to one character. In a
//! Uri, `` \` `` escapes the delimiter and a backslash before one of
//! `: / ? # [ ] @ & = ;` is kept as written.
//!
//! ## DateTimes
//!
//! ```text
//! 2024-03-15T08:30:00Z                      UTC
//! 2024-03-15T08:30:00Z UTC                  UTC, explicit name
//! 2024-03-15T08:30:00-04:00 New_York        offset and city name
//! 2024-03-15T08:30:00+01:00 Paris
//! ```
//!
//! The timezone name is the short city name of an IANA zone.
//!
//! ## Version 2.0
//!
//! Zinc 2.0 has no lists, symbols or typed strings and writes Bin MIME types
//! unquoted as `Bin(text/plain)`. Writing any of those kinds with
//! [`Version::V2`](crate::Version::V2) fails with
//! [`Error::UnsupportedType`](crate::Error::UnsupportedType).
//!
//! ```rust
//! use serde_haystack::{to_zinc_string_with_options, CodecOptions, GridBuilder, Value, Version};
//!
//! let mut b = GridBuilder::new();
//! b.add_col("tags").unwrap();
//! b.add_row(vec![Some(Value::List(vec![Value::Marker]))]).unwrap();
//! let grid = b.build().unwrap();
//!
//! let options = CodecOptions::new().with_version(Version::V2);
//! assert!(to_zinc_string_with_options(&grid, options).is_err());
//! ```
//!
//! # Haystack JSON
//!
//! ```json
//! {
//!   "meta": {"ver": "3.0", "dis": "Sites"},
//!   "cols": [{"name": "id"}, {"name": "area", "unit": "ft²"}],
//!   "rows": [{"id": "r:s1 HQ", "area": "n:12000 ft²"}]
//! }
//! ```
//!
//! **Rules**:
//! - `meta.ver` must be `"3.0"`; it is stripped from the decoded grid meta
//! - Each column is an object with a `name` member plus its meta tags
//! - Absent cells are left out of the row object; `null` also decodes as absent
//! - A row member that names no declared column is an error
//!
//! Bool is a JSON boolean and List is a JSON array. Every other kind is a
//! string with a type prefix; see [`json`](crate::json) for the table. A
//! plain string whose second character is `:` is written with an `s:`
//! prefix so it cannot be mistaken for a prefixed value. Bare JSON numbers
//! are accepted when reading and decode as unitless numbers.
//!
//! ```rust
//! use serde_haystack::from_json_str;
//!
//! let grid = from_json_str(
//!     r#"{"meta":{"ver":"3.0"},"cols":[{"name":"v"}],"rows":[{"v":"s:a:b"},{"v":7}]}"#,
//! )
//! .unwrap();
//! assert_eq!(grid.row(0).unwrap().get("v").and_then(|v| v.as_str()), Some("a:b"));
//! assert_eq!(grid.row(1).unwrap().get("v").and_then(|v| v.as_f64()), Some(7.0));
//! ```
//!
//! # Error Grids
//!
//! A server reports a failure as a grid whose meta has the `err` marker, a
//! `dis` message and an optional `errTrace`. [`Grid::is_err`](crate::Grid::is_err)
//! detects one and [`Grid::into_result`](crate::Grid::into_result) turns it into
//! [`Error::Call`](crate::Error::Call).
//!
//! # Limitations
//!
//! - **Dict and Grid values**: Nested dicts and grids are not supported as cell values
//! - **Binary payloads**: Bin carries only a MIME type, never content
//! - **Trio**: Not supported
//!
//! # Conformance
//!
//! This implementation follows the Project Haystack Zinc and JSON
//! definitions from <https://project-haystack.org/doc/docHaystack/Zinc>.

// This module contains only documentation; no implementation code
