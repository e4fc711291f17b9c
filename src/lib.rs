//! # serde_haystack
//!
//! The Project Haystack data model with Zinc and JSON codecs and a filter
//! expression engine.
//!
//! ## What is Haystack?
//!
//! Project Haystack is a tagging model for building automation and IoT data.
//! Entities are dicts of tags; query results and point histories travel as
//! grids, two-dimensional tables with metadata on the table and each column.
//!
//! ## Key Features
//!
//! - **Typed Values**: Marker, Number with unit, Ref, Date, Time, DateTime with timezone, Coord and more
//! - **Zinc**: Reader and writer for the compact text format, versions 2.0 and 3.0
//! - **JSON**: The Haystack JSON encoding, plus `Serialize`/`Deserialize` for values, dicts and grids
//! - **Filters**: Parse, print and evaluate filter expressions with ref-following paths
//! - **No Unsafe Code**: Written entirely in safe Rust
//!
//! ## Quick Start
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! serde_haystack = "0.1"
//! ```
//!
//! ### Reading and Writing Zinc
//!
//! ```rust
//! use serde_haystack::{from_zinc_str, to_zinc_string};
//!
//! let zinc = "ver:\"3.0\"\nid,dis,area\n@s1,\"HQ\",12000ft²\n";
//! let grid = from_zinc_str(zinc).unwrap();
//!
//! let row = grid.row(0).unwrap();
//! assert_eq!(row.get("dis").and_then(|v| v.as_str()), Some("HQ"));
//! assert_eq!(row.id().map(|r| r.id()), Some("s1"));
//!
//! assert_eq!(to_zinc_string(&grid).unwrap(), zinc);
//! ```
//!
//! ### Building Grids
//!
//! Dicts are frozen from a [`DictBuilder`] or the [`dict!`] macro; a list of
//! dicts becomes a grid with one column per distinct tag:
//!
//! ```rust
//! use serde_haystack::{dict, dicts_to_grid, to_json_string, Dict};
//!
//! let recs = vec![
//!     Some(dict! { "site", "dis" => "HQ" }.unwrap()),
//!     Some(dict! { "site", "dis" => "Annex", "area" => 800 }.unwrap()),
//! ];
//! let grid = dicts_to_grid(&Dict::empty(), &recs);
//! assert_eq!(grid.num_cols(), 3);
//!
//! let json = to_json_string(&grid).unwrap();
//! assert!(json.contains(r#""area":"n:800""#));
//! ```
//!
//! ### Filters
//!
//! ```rust
//! use serde_haystack::{dict, parse_filter, NoResolver};
//!
//! let f = parse_filter("point and curVal >= 70°F").unwrap();
//! let rec = dict! { "point", "curVal" => serde_haystack::Number::with_unit(72.0, "°F").unwrap() }.unwrap();
//! assert!(f.include(&rec, &NoResolver));
//! assert_eq!(f.to_string(), "point and curVal >= 70°F");
//! ```
//!
//! ## Logging
//!
//! The codecs emit [`tracing`] events at `debug` level when a grid is read or
//! written and at `trace` level when a filter is parsed. No subscriber is
//! installed by this crate.
//!
//! ## Safety Guarantees
//!
//! - No `unsafe` code blocks
//! - Proper error propagation with `Result` types
//! - No panics in the public API; malformed input is reported as [`Error::Parse`]
//!
//! ## Format Reference
//!
//! See the [`format`] module for the Zinc and JSON layouts.

pub mod de;
pub mod dict;
pub mod error;
pub mod filter;
pub mod format;
pub mod grid;
pub mod json;
pub mod macros;
pub mod options;
mod scanner;
pub mod ser;
pub mod temporal;
pub mod tz;
pub mod value;

pub use de::ZincReader;
pub use dict::{is_tag_name, Dict, DictBuilder, Tags};
pub use error::{Error, Result};
pub use filter::{Filter, NoResolver, Path, Resolver};
pub use grid::{dicts_to_grid, Col, Grid, GridBuilder, Row};
pub use options::{CodecOptions, Version};
pub use ser::ZincWriter;
pub use temporal::{days_in_month, is_leap_year, Date, DateTime, Time};
pub use tz::TimeZone;
pub use value::{Bin, Coord, Number, Ref, Symbol, Value, XStr};

use std::io;

/// Reads a grid from Zinc text.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::from_zinc_str;
///
/// let grid = from_zinc_str("ver:\"3.0\" dis:\"Demo\"\nval\n1\n2\n").unwrap();
/// assert_eq!(grid.num_rows(), 2);
/// assert!(grid.meta().has("dis"));
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] with the offending line if the input is not a
/// well-formed Zinc grid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_zinc_str(s: &str) -> Result<Grid> {
    ZincReader::from_str(s).read_grid()
}

/// Reads a grid from an I/O stream of Zinc text.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::from_zinc_reader;
/// use std::io::Cursor;
///
/// let grid = from_zinc_reader(Cursor::new(b"ver:\"3.0\"\nempty\n")).unwrap();
/// assert!(grid.is_empty());
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if reading fails, otherwise the errors of
/// [`from_zinc_str`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_zinc_reader<R: io::Read>(reader: R) -> Result<Grid> {
    ZincReader::from_reader(reader)?.read_grid()
}

/// Writes a grid as Zinc 3.0 text.
///
/// # Errors
///
/// Never fails for version 3.0 output; the `Result` matches
/// [`to_zinc_string_with_options`].
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_zinc_string(grid: &Grid) -> Result<String> {
    to_zinc_string_with_options(grid, CodecOptions::default())
}

/// Writes a grid as Zinc text using the given options.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{to_zinc_string_with_options, Bin, CodecOptions, GridBuilder, Value, Version};
///
/// let mut b = GridBuilder::new();
/// b.add_col("file").unwrap();
/// b.add_row(vec![Some(Value::from(Bin::new("text/csv").unwrap()))]).unwrap();
/// let grid = b.build().unwrap();
///
/// let zinc = to_zinc_string_with_options(&grid, CodecOptions::new().with_version(Version::V2)).unwrap();
/// assert_eq!(zinc, "ver:\"2.0\"\nfile\nBin(text/csv)\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::UnsupportedType`] if a value cannot be expressed in the
/// selected version.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_zinc_string_with_options(grid: &Grid, options: CodecOptions) -> Result<String> {
    let mut writer = ZincWriter::new(options);
    writer.write_grid(grid)?;
    Ok(writer.into_inner())
}

/// Writes a grid as Zinc 3.0 text to an I/O stream.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{to_zinc_writer, Grid};
///
/// let mut buffer = Vec::new();
/// to_zinc_writer(&mut buffer, &Grid::empty()).unwrap();
/// assert_eq!(buffer, b"ver:\"3.0\"\nempty\n");
/// ```
///
/// # Errors
///
/// Returns [`Error::Io`] if writing to the stream fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_zinc_writer<W: io::Write>(mut writer: W, grid: &Grid) -> Result<()> {
    let zinc = to_zinc_string(grid)?;
    writer
        .write_all(zinc.as_bytes())
        .map_err(|e| Error::io(&e.to_string()))?;
    Ok(())
}

/// Reads a grid from Haystack JSON text.
///
/// # Errors
///
/// Returns [`Error::Json`] if the text is not JSON and [`Error::Parse`] if
/// it is not a valid Haystack grid.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_json_str(s: &str) -> Result<Grid> {
    let json: serde_json::Value = serde_json::from_str(s)?;
    json::grid_from_json(&json)
}

/// Writes a grid as compact Haystack JSON.
///
/// # Errors
///
/// Returns [`Error::Json`] if the JSON writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_string(grid: &Grid) -> Result<String> {
    to_json_string_with_options(grid, CodecOptions::default())
}

/// Writes a grid as indented Haystack JSON.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{to_json_string_pretty, Grid};
///
/// let json = to_json_string_pretty(&Grid::empty()).unwrap();
/// assert!(json.contains("\n  \"meta\""));
/// ```
///
/// # Errors
///
/// Returns [`Error::Json`] if the JSON writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_string_pretty(grid: &Grid) -> Result<String> {
    to_json_string_with_options(grid, CodecOptions::pretty())
}

/// Writes a grid as Haystack JSON; only `options.pretty` applies.
///
/// # Errors
///
/// Returns [`Error::Json`] if the JSON writer fails.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn to_json_string_with_options(grid: &Grid, options: CodecOptions) -> Result<String> {
    let json = json::grid_to_json(grid);
    let text = if options.pretty {
        serde_json::to_string_pretty(&json)?
    } else {
        serde_json::to_string(&json)?
    };
    Ok(text)
}

/// Converts a grid into a [`serde_json::Value`] tree.
#[must_use]
pub fn to_json_value(grid: &Grid) -> serde_json::Value {
    json::grid_to_json(grid)
}

/// Reads a grid from a [`serde_json::Value`] tree.
///
/// # Errors
///
/// Same as [`from_json_str`] for a document that is already parsed.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn from_json_value(json: &serde_json::Value) -> Result<Grid> {
    json::grid_from_json(json)
}

/// Reads a single Zinc scalar; `N` yields `None`.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{read_scalar, Number, Value};
///
/// let v = read_scalar("72.5°F").unwrap();
/// assert_eq!(v, Some(Value::from(Number::with_unit(72.5, "°F").unwrap())));
/// ```
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed or trailing input.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn read_scalar(s: &str) -> Result<Option<Value>> {
    ZincReader::from_str(s).read_scalar()
}

/// Parses a filter expression.
///
/// # Errors
///
/// Returns [`Error::Parse`] for malformed filter syntax.
#[must_use = "this returns the result of the operation, errors must be handled"]
pub fn parse_filter(s: &str) -> Result<Filter> {
    Filter::parse(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Grid {
        let mut b = GridBuilder::new();
        b.meta_mut().add("dis", "Sites").unwrap();
        b.add_col("id").unwrap();
        b.add_col("area").unwrap().add("unit", "ft²").unwrap();
        b.add_row(vec![
            Some(Value::from(Ref::with_dis("s1", "HQ").unwrap())),
            Some(Value::from(Number::with_unit(12000.0, "ft²").unwrap())),
        ])
        .unwrap();
        b.add_row(vec![Some(Value::from(Ref::new("s2").unwrap())), None])
            .unwrap();
        b.build().unwrap()
    }

    #[test]
    fn test_zinc_roundtrip() {
        let grid = sample();
        let zinc = to_zinc_string(&grid).unwrap();
        assert_eq!(
            zinc,
            "ver:\"3.0\" dis:\"Sites\"\nid,area unit:\"ft²\"\n@s1 \"HQ\",12000ft²\n@s2,\n"
        );
        assert_eq!(from_zinc_str(&zinc).unwrap(), grid);
    }

    #[test]
    fn test_json_roundtrip() {
        let grid = sample();
        let json = to_json_string(&grid).unwrap();
        assert_eq!(from_json_str(&json).unwrap(), grid);
        let pretty = to_json_string_pretty(&grid).unwrap();
        assert_eq!(from_json_str(&pretty).unwrap(), grid);
        assert_eq!(from_json_value(&to_json_value(&grid)).unwrap(), grid);
    }

    #[test]
    fn test_reader_and_writer() {
        let grid = sample();
        let mut buffer = Vec::new();
        to_zinc_writer(&mut buffer, &grid).unwrap();
        let back = from_zinc_reader(std::io::Cursor::new(buffer)).unwrap();
        assert_eq!(back, grid);
    }

    #[test]
    fn test_invalid_json_text() {
        assert!(matches!(from_json_str("{"), Err(Error::Json(_))));
    }

    #[test]
    fn test_read_scalar_and_filter() {
        assert_eq!(read_scalar("N").unwrap(), None);
        assert_eq!(read_scalar("T").unwrap(), Some(Value::Bool(true)));
        let f = parse_filter("site or equip").unwrap();
        assert!(matches!(f, Filter::Or(_, _)));
        assert!(parse_filter("(site").is_err());
    }
}
