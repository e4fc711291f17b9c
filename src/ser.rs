//! Zinc serialization.
//!
//! This module provides [`ZincWriter`], which renders grids, tag lists and
//! scalars as Zinc text, and the [`Display`](std::fmt::Display) impl of
//! [`Value`], which yields a value's Zinc form.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_haystack::{dicts_to_grid, to_zinc_string, Dict, DictBuilder};
//!
//! let mut b = DictBuilder::new();
//! b.add_marker("site").unwrap().add("dis", "HQ").unwrap();
//! let grid = dicts_to_grid(&Dict::empty(), &[Some(b.into_dict())]);
//!
//! let zinc = to_zinc_string(&grid).unwrap();
//! assert_eq!(zinc, "ver:\"3.0\"\ndis,site\n\"HQ\",M\n");
//! ```
//!
//! ## Direct Writer Usage
//!
//! ```rust
//! use serde_haystack::{CodecOptions, Value, ZincWriter};
//!
//! let mut writer = ZincWriter::new(CodecOptions::new());
//! writer.write_scalar(&Value::str("line\nbreak")).unwrap();
//! assert_eq!(writer.into_inner(), "\"line\\nbreak\"");
//! ```

use crate::{CodecOptions, Dict, Error, Grid, Result, Value, Version};
use std::fmt;
use std::fmt::Write as _;
use tracing::debug;

/// The Zinc writer.
///
/// Accumulates output in memory; retrieve it with [`ZincWriter::into_inner`].
pub struct ZincWriter {
    output: String,
    options: CodecOptions,
}

impl ZincWriter {
    pub fn new(options: CodecOptions) -> Self {
        ZincWriter {
            output: String::with_capacity(256),
            options,
        }
    }

    pub fn into_inner(self) -> String {
        self.output
    }

    /// Writes a grid: version header and meta, column line, one line per row.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedType`] if a cell or meta value cannot be
    /// expressed in the configured version.
    pub fn write_grid(&mut self, grid: &Grid) -> Result<()> {
        let version = self.options.version;
        self.output.push_str("ver:");
        write_str(&mut self.output, version.as_str());
        for (name, val) in grid.meta() {
            self.output.push(' ');
            self.write_tag(name, val)?;
        }
        self.output.push('\n');

        for (i, col) in grid.cols().enumerate() {
            if i > 0 {
                self.output.push(',');
            }
            self.output.push_str(col.name());
            for (name, val) in col.meta() {
                self.output.push(' ');
                self.write_tag(name, val)?;
            }
        }
        self.output.push('\n');

        for row in grid {
            if row.is_empty() {
                // a blank line would end the grid
                self.output.push('N');
                for _ in 1..row.cells().len() {
                    self.output.push(',');
                }
            } else {
                for (i, cell) in row.cells().iter().enumerate() {
                    if i > 0 {
                        self.output.push(',');
                    }
                    if let Some(val) = cell {
                        write_val(&mut self.output, val, version)?;
                    }
                }
            }
            self.output.push('\n');
        }
        debug!(
            version = version.as_str(),
            cols = grid.num_cols(),
            rows = grid.num_rows(),
            "wrote zinc grid"
        );
        Ok(())
    }

    /// Writes a tag list in grid-meta form: `name` for markers, `name:val`
    /// otherwise, separated by spaces.
    ///
    /// # Errors
    ///
    /// Same as [`ZincWriter::write_grid`].
    pub fn write_dict(&mut self, dict: &Dict) -> Result<()> {
        for (i, (name, val)) in dict.iter().enumerate() {
            if i > 0 {
                self.output.push(' ');
            }
            self.write_tag(name, val)?;
        }
        Ok(())
    }

    /// Writes a single value.
    ///
    /// # Errors
    ///
    /// Same as [`ZincWriter::write_grid`].
    pub fn write_scalar(&mut self, val: &Value) -> Result<()> {
        write_val(&mut self.output, val, self.options.version)
    }

    fn write_tag(&mut self, name: &str, val: &Value) -> Result<()> {
        self.output.push_str(name);
        if !val.is_marker() {
            self.output.push(':');
            write_val(&mut self.output, val, self.options.version)?;
        }
        Ok(())
    }
}

/// Appends the Zinc form of `val`.
pub(crate) fn write_val(out: &mut String, val: &Value, version: Version) -> Result<()> {
    match val {
        Value::Marker => out.push('M'),
        Value::Remove => out.push('R'),
        Value::NA => out.push_str("NA"),
        Value::Bool(true) => out.push('T'),
        Value::Bool(false) => out.push('F'),
        Value::Number(n) => push_display(out, n),
        Value::Str(s) => write_str(out, s),
        Value::Uri(s) => write_uri(out, s),
        Value::Ref(r) => {
            out.push('@');
            out.push_str(r.id());
            if let Some(dis) = r.dis() {
                out.push(' ');
                write_str(out, dis);
            }
        }
        Value::Date(d) => push_display(out, d),
        Value::Time(t) => push_display(out, t),
        Value::DateTime(ts) => push_display(out, ts),
        Value::Bin(b) => {
            out.push_str("Bin(");
            match version {
                Version::V2 => out.push_str(b.mime()),
                Version::V3 => write_str(out, b.mime()),
            }
            out.push(')');
        }
        Value::Coord(c) => push_display(out, c),
        Value::Symbol(_) | Value::List(_) | Value::XStr(_) if version == Version::V2 => {
            return Err(Error::unsupported_type(&format!(
                "{} cannot be written as Zinc 2.0",
                val.kind()
            )));
        }
        Value::Symbol(sym) => {
            out.push('^');
            out.push_str(sym.name());
        }
        Value::List(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_val(out, item, version)?;
            }
            out.push(']');
        }
        Value::XStr(x) => {
            out.push_str(x.type_name());
            out.push('(');
            write_str(out, x.val());
            out.push(')');
        }
    }
    Ok(())
}

fn push_display<T: fmt::Display>(out: &mut String, val: &T) {
    // writing to a String cannot fail
    let _ = write!(out, "{}", val);
}

/// Appends a double-quoted Zinc string literal.
pub(crate) fn write_str(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            _ => push_char(out, c),
        }
    }
    out.push('"');
}

/// Appends a backtick-quoted Zinc URI literal.
pub(crate) fn write_uri(out: &mut String, s: &str) {
    out.push('`');
    for c in s.chars() {
        match c {
            '`' => out.push_str("\\`"),
            '\\' => out.push_str("\\\\"),
            _ => push_char(out, c),
        }
    }
    out.push('`');
}

fn push_char(out: &mut String, c: char) {
    match c {
        '\n' => out.push_str("\\n"),
        '\r' => out.push_str("\\r"),
        '\t' => out.push_str("\\t"),
        '\u{0008}' => out.push_str("\\b"),
        '\u{000C}' => out.push_str("\\f"),
        c if c < ' ' => {
            let _ = write!(out, "\\u{:04x}", c as u32);
        }
        c => out.push(c),
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        write_val(&mut out, self, Version::V3).map_err(|_| fmt::Error)?;
        f.write_str(&out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        Bin, Coord, Date, DateTime, GridBuilder, Number, Ref, Symbol, Time, TimeZone, XStr,
    };

    fn zinc(v: Value) -> String {
        v.to_string()
    }

    #[test]
    fn test_scalar_forms() {
        assert_eq!(zinc(Value::Marker), "M");
        assert_eq!(zinc(Value::Remove), "R");
        assert_eq!(zinc(Value::NA), "NA");
        assert_eq!(zinc(Value::Bool(false)), "F");
        assert_eq!(zinc(Value::from(Number::with_unit(-0.5, "m²").unwrap())), "-0.5m²");
        assert_eq!(zinc(Value::from(f64::NEG_INFINITY)), "-INF");
        assert_eq!(zinc(Value::uri("http://a/b")), "`http://a/b`");
        assert_eq!(zinc(Value::from(Ref::with_dis("a", "A \"1\"").unwrap())), "@a \"A \\\"1\\\"\"");
        assert_eq!(zinc(Value::from(Symbol::new("elec-meter").unwrap())), "^elec-meter");
        assert_eq!(zinc(Value::from(XStr::new("Span", "today").unwrap())), "Span(\"today\")");
        assert_eq!(zinc(Value::from(Bin::new("text/plain").unwrap())), "Bin(\"text/plain\")");
        assert_eq!(zinc(Value::from(Coord::make(37.5458, -77.4).unwrap())), "C(37.5458,-77.4)");
        assert_eq!(
            zinc(Value::List(vec![Value::from(1), Value::str("a")])),
            "[1,\"a\"]"
        );
    }

    #[test]
    fn test_temporal_forms() {
        let d = Date::new(2024, 3, 5).unwrap();
        assert_eq!(zinc(Value::from(d)), "2024-03-05");
        let t = Time::new(7, 0, 9, 40).unwrap();
        assert_eq!(zinc(Value::from(t)), "07:00:09.040");
        let ts = DateTime::new(d, t, TimeZone::make("Paris").unwrap(), 3600).unwrap();
        assert_eq!(zinc(Value::from(ts)), "2024-03-05T07:00:09.040+01:00 Paris");
    }

    #[test]
    fn test_string_escapes() {
        assert_eq!(zinc(Value::str("a\"b\\c")), r#""a\"b\\c""#);
        assert_eq!(zinc(Value::str("\n\r\t\u{8}\u{c}")), r#""\n\r\t\b\f""#);
        assert_eq!(zinc(Value::str("\u{1}")), r#""\u0001""#);
        assert_eq!(zinc(Value::str("$é")), "\"$é\"");
        assert_eq!(zinc(Value::uri("a`b\\c")), r"`a\`b\\c`");
    }

    #[test]
    fn test_write_grid() {
        let mut b = GridBuilder::new();
        b.meta_mut().add_marker("hisFoo").unwrap();
        b.meta_mut().add("dis", "T").unwrap();
        b.add_col("a").unwrap().add("unit", "kW").unwrap();
        b.add_col("b").unwrap();
        b.add_row(vec![Some(Value::from(1)), None]).unwrap();
        b.add_row(vec![None, None]).unwrap();
        let g = b.build().unwrap();
        let mut w = ZincWriter::new(CodecOptions::new());
        w.write_grid(&g).unwrap();
        assert_eq!(
            w.into_inner(),
            "ver:\"3.0\" dis:\"T\" hisFoo\na unit:\"kW\",b\n1,\nN,\n"
        );
    }

    #[test]
    fn test_write_dict() {
        let mut b = crate::DictBuilder::new();
        b.add_marker("site").unwrap().add("area", 10).unwrap();
        let mut w = ZincWriter::new(CodecOptions::new());
        w.write_dict(&b.into_dict()).unwrap();
        assert_eq!(w.into_inner(), "area:10 site");
    }

    #[test]
    fn test_version_two() {
        let opts = CodecOptions::new().with_version(Version::V2);
        let mut w = ZincWriter::new(opts.clone());
        w.write_scalar(&Value::from(Bin::new("image/png").unwrap())).unwrap();
        assert_eq!(w.into_inner(), "Bin(image/png)");

        let mut w = ZincWriter::new(opts.clone());
        let err = w.write_scalar(&Value::List(vec![])).unwrap_err();
        assert!(matches!(err, Error::UnsupportedType(_)));

        let mut w = ZincWriter::new(opts);
        w.write_grid(&Grid::empty()).unwrap();
        assert_eq!(w.into_inner(), "ver:\"2.0\"\nempty\n");
    }
}
