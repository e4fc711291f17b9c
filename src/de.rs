//! Zinc deserialization.
//!
//! This module provides [`ZincReader`], a single-pass pull parser for the
//! Zinc text format. One reader parses grids, bare tag lists, scalars and
//! filter expressions; all of them share the same scalar grammar.
//!
//! ## Usage
//!
//! Most users should use the high-level functions in the crate root:
//!
//! ```rust
//! use serde_haystack::from_zinc_str;
//!
//! let zinc = "ver:\"3.0\" dis:\"Sites\"\nid,area\n@a,100ft²\n@b,\n";
//! let grid = from_zinc_str(zinc).unwrap();
//! assert_eq!(grid.num_rows(), 2);
//! assert!(grid.row(1).unwrap().missing("area"));
//! ```
//!
//! ## Literal Disambiguation
//!
//! A token starting with a digit is read greedily and classified by what it
//! contains: two dashes make a date, colons make a time, both make a
//! timestamp, anything else is a number with an optional unit.
//!
//! ```rust
//! use serde_haystack::{read_scalar, Value};
//!
//! assert!(matches!(read_scalar("2024-03-15").unwrap(), Some(Value::Date(_))));
//! assert!(matches!(read_scalar("08:30:00").unwrap(), Some(Value::Time(_))));
//! assert!(matches!(read_scalar("2024-03-15T08:30:00Z").unwrap(), Some(Value::DateTime(_))));
//! assert_eq!(read_scalar("12.5kW").unwrap().unwrap().to_string(), "12.5kW");
//! ```

use crate::dict::is_tag_char;
use crate::filter::{Filter, Path};
use crate::scanner::Scanner;
use crate::tz::is_tz_char;
use crate::value::{is_ref_char, is_symbol_char};
use crate::{
    Bin, Coord, Date, DateTime, Dict, DictBuilder, Error, Grid, GridBuilder, Number, Ref, Result,
    Symbol, Time, TimeZone, Value, XStr,
};
use std::io;
use tracing::{debug, trace};

/// The Zinc reader.
///
/// Created via [`ZincReader::from_str`] or [`ZincReader::from_reader`]. A
/// reader owns its cursor and can be called repeatedly to pull several
/// documents from one stream.
pub struct ZincReader<'a> {
    sc: Scanner<'a>,
    filter_mode: bool,
}

impl<'a> ZincReader<'a> {
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(input: &'a str) -> Self {
        ZincReader {
            sc: Scanner::new(input),
            filter_mode: false,
        }
    }

    /// Reads a single scalar value; `N` yields `None`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed input or trailing text.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::{Value, ZincReader};
    ///
    /// let v = ZincReader::from_str("@site-1 \"Main\"").read_scalar().unwrap();
    /// assert_eq!(v.unwrap().as_ref().and_then(|r| r.dis()), Some("Main"));
    /// assert_eq!(ZincReader::from_str("N").read_scalar().unwrap(), None);
    /// ```
    pub fn read_scalar(&mut self) -> Result<Option<Value>> {
        self.sc.skip_whitespace();
        let val = self.read_val()?;
        self.expect_end()?;
        Ok(val)
    }

    /// Reads one grid. Parsing stops after the blank line that ends the grid
    /// or at the end of input.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for a missing `ver` header, an unsupported
    /// version, malformed separators or a row whose cell count differs from
    /// the column count.
    pub fn read_grid(&mut self) -> Result<Grid> {
        self.sc.skip_whitespace();
        let ver = self.read_id()?;
        if ver != "ver" {
            return Err(self
                .sc
                .err(format!("Expecting grid 'ver' identifier, not {:?}", ver)));
        }
        self.sc.expect(':')?;
        let version = self.read_str()?;
        if version != "3.0" && version != "2.0" {
            return Err(self.sc.err(format!("Unsupported version {:?}", version)));
        }

        let mut b = GridBuilder::new();
        self.read_meta(b.meta_mut())?;
        self.read_newline()?;

        loop {
            self.sc.skip_spaces();
            let line = self.sc.line();
            let name = self.read_id()?;
            let meta = b.add_col(name).map_err(|e| at_line(line, e))?;
            self.read_meta(meta)?;
            self.sc.skip_spaces();
            if !self.sc.eat(',') {
                break;
            }
        }
        self.read_newline()?;

        let num_cols = b.num_cols();
        loop {
            match self.sc.peek() {
                None => break,
                Some('\n' | '\r') => {
                    self.read_newline()?;
                    break;
                }
                _ => {}
            }
            let mut cells = Vec::with_capacity(num_cols);
            for i in 0..num_cols {
                self.sc.skip_spaces();
                let cell = match self.sc.peek() {
                    Some(',' | '\n' | '\r') | None => None,
                    _ => self.read_val()?,
                };
                cells.push(cell);
                self.sc.skip_spaces();
                if i + 1 < num_cols && !self.sc.eat(',') {
                    return Err(self.sc.err(format!(
                        "Row has {} cells, expected {}",
                        i + 1,
                        num_cols
                    )));
                }
            }
            if self.sc.peek() == Some(',') {
                return Err(self
                    .sc
                    .err(format!("Row has more than {} cells", num_cols)));
            }
            self.read_newline()?;
            b.add_row(cells)?;
        }

        let grid = b.build()?;
        debug!(
            version = %version,
            cols = grid.num_cols(),
            rows = grid.num_rows(),
            "read zinc grid"
        );
        Ok(grid)
    }

    /// Reads every grid remaining in the input.
    ///
    /// # Errors
    ///
    /// Same as [`ZincReader::read_grid`].
    pub fn read_grids(&mut self) -> Result<Vec<Grid>> {
        let mut grids = Vec::new();
        loop {
            self.sc.skip_whitespace();
            if self.sc.is_eof() {
                return Ok(grids);
            }
            grids.push(self.read_grid()?);
        }
    }

    /// Reads a space-separated tag list such as `site dis:"HQ" area:100`,
    /// optionally wrapped in braces.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed tags or trailing text.
    pub fn read_dict(&mut self) -> Result<Dict> {
        self.sc.skip_whitespace();
        let braced = self.sc.eat('{');
        let mut b = DictBuilder::new();
        self.read_meta(&mut b)?;
        if braced {
            self.sc.skip_whitespace();
            self.sc.expect('}')?;
        }
        self.expect_end()?;
        Ok(b.into_dict())
    }

    /// Parses a filter expression.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for an empty path segment, a `-` not followed
    /// by `>`, an unclosed `(`, a word where `and`/`or` was expected, or any
    /// other trailing input.
    pub fn read_filter(&mut self) -> Result<Filter> {
        let prev = std::mem::replace(&mut self.filter_mode, true);
        let res = self.read_filter_expr();
        self.filter_mode = prev;
        res
    }

    fn read_filter_expr(&mut self) -> Result<Filter> {
        self.sc.skip_whitespace();
        if self.sc.is_eof() {
            return Err(self.sc.err("Empty filter"));
        }
        let filter = self.filter_or()?;
        self.sc.skip_whitespace();
        match self.sc.peek() {
            None => {}
            Some(')') => return Err(self.sc.err("Unexpected ')'")),
            Some(c) if c.is_ascii_alphabetic() => {
                let word = self.sc.take_while(is_tag_char).to_string();
                return Err(self
                    .sc
                    .err(format!("Expected 'and' or 'or', not {:?}", word)));
            }
            Some(c) => return Err(self.sc.err(format!("Unexpected '{}' after filter", c))),
        }
        trace!(filter = %filter, "parsed filter");
        Ok(filter)
    }

    fn filter_or(&mut self) -> Result<Filter> {
        let mut q = self.filter_and()?;
        loop {
            self.sc.skip_whitespace();
            if !self.eat_keyword("or") {
                return Ok(q);
            }
            q = q.or(self.filter_and()?);
        }
    }

    fn filter_and(&mut self) -> Result<Filter> {
        let mut q = self.filter_atomic()?;
        loop {
            self.sc.skip_whitespace();
            if !self.eat_keyword("and") {
                return Ok(q);
            }
            q = q.and(self.filter_atomic()?);
        }
    }

    fn filter_atomic(&mut self) -> Result<Filter> {
        self.sc.skip_whitespace();
        if self.sc.eat('(') {
            let q = self.filter_or()?;
            self.sc.skip_whitespace();
            if !self.sc.eat(')') {
                return Err(self.sc.err("Expecting ')' to close '('"));
            }
            return Ok(q);
        }
        if self.eat_keyword("not") {
            self.sc.skip_whitespace();
            return Ok(Filter::Missing(self.read_path()?));
        }

        let path = self.read_path()?;
        self.sc.skip_whitespace();
        type Cmp = fn(Path, Value) -> Filter;
        let (len, make) = match (self.sc.peek(), self.sc.peek_next()) {
            (Some('='), Some('=')) => (2, Filter::Eq as Cmp),
            (Some('!'), Some('=')) => (2, Filter::Ne as Cmp),
            (Some('<'), Some('=')) => (2, Filter::Le as Cmp),
            (Some('>'), Some('=')) => (2, Filter::Ge as Cmp),
            (Some('<'), _) => (1, Filter::Lt as Cmp),
            (Some('>'), _) => (1, Filter::Gt as Cmp),
            _ => return Ok(Filter::Has(path)),
        };
        for _ in 0..len {
            self.sc.next_char();
        }
        self.sc.skip_whitespace();
        match self.read_val()? {
            Some(val) => Ok(make(path, val)),
            None => Err(self.sc.err("Expected a value to compare against, not N")),
        }
    }

    fn read_path(&mut self) -> Result<Path> {
        let mut names = vec![self.read_path_name()?];
        while self.sc.peek() == Some('-') {
            self.sc.next_char();
            if !self.sc.eat('>') {
                return Err(self.sc.err("Expected '>' after '-' in path"));
            }
            names.push(self.read_path_name()?);
        }
        let path = Path::new(names);
        self.lift(path)
    }

    fn read_path_name(&mut self) -> Result<String> {
        match self.sc.peek() {
            Some(c) if c.is_ascii_alphabetic() => Ok(self.sc.take_while(is_tag_char).to_string()),
            Some(c) => Err(self.sc.err(format!("Expected path name, not '{}'", c))),
            None => Err(self.sc.err("Expected path name, not end of input")),
        }
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        if !self.sc.at_keyword(word) {
            return false;
        }
        for _ in word.chars() {
            self.sc.next_char();
        }
        true
    }

    fn expect_end(&mut self) -> Result<()> {
        self.sc.skip_whitespace();
        match self.sc.peek() {
            None => Ok(()),
            Some(c) => Err(self.sc.err(format!("Expected end of input, not '{}'", c))),
        }
    }

    fn read_newline(&mut self) -> Result<()> {
        self.sc.skip_spaces();
        self.sc.eat('\r');
        if self.sc.eat('\n') || self.sc.is_eof() {
            return Ok(());
        }
        match self.sc.peek() {
            Some(c) => Err(self.sc.err(format!("Expecting newline, not '{}'", c))),
            None => Err(self.sc.err("Expecting newline")),
        }
    }

    fn read_id(&mut self) -> Result<String> {
        match self.sc.peek() {
            Some(c) if c.is_ascii_alphabetic() => Ok(self.sc.take_while(is_tag_char).to_string()),
            Some(c) => Err(self.sc.err(format!("Invalid name start char '{}'", c))),
            None => Err(self.sc.err("Expected name, not end of input")),
        }
    }

    /// Reads `name` or `name:val` pairs until something that cannot start a
    /// tag name.
    fn read_meta(&mut self, b: &mut DictBuilder) -> Result<()> {
        loop {
            self.sc.skip_spaces();
            match self.sc.peek() {
                Some(c) if c.is_ascii_lowercase() => {}
                _ => return Ok(()),
            }
            let line = self.sc.line();
            let name = self.read_id()?;
            self.sc.skip_spaces();
            let val = if self.sc.eat(':') {
                self.sc.skip_spaces();
                self.read_val()?
            } else {
                Some(Value::Marker)
            };
            b.add_opt(name, val).map_err(|e| at_line(line, e))?;
        }
    }

    fn read_val(&mut self) -> Result<Option<Value>> {
        let c = match self.sc.peek() {
            Some(c) => c,
            None => return Err(self.sc.err("Unexpected end of input")),
        };
        match c {
            '0'..='9' => self.read_num_val().map(Some),
            '-' => match self.sc.peek_next() {
                Some('I') => {
                    self.sc.next_char();
                    let word = self.sc.take_while(|c| c.is_ascii_alphanumeric()).to_string();
                    if word == "INF" {
                        Ok(Some(Value::Number(Number::new(f64::NEG_INFINITY))))
                    } else {
                        Err(self.sc.err(format!("Unexpected identifier -{}", word)))
                    }
                }
                Some(d) if d.is_ascii_digit() => self.read_num_val().map(Some),
                _ => Err(self.sc.err("Unexpected '-'")),
            },
            '"' => self.read_str().map(|s| Some(Value::Str(s))),
            '`' => self.read_uri().map(|s| Some(Value::Uri(s))),
            '@' => self.read_ref().map(Some),
            '^' => {
                self.sc.next_char();
                let name = self.sc.take_while(is_symbol_char).to_string();
                let sym = Symbol::new(name);
                self.lift(sym).map(|s| Some(Value::Symbol(s)))
            }
            '[' => self.read_list().map(Some),
            c if c.is_ascii_alphabetic() => self.read_word_val(),
            c => Err(self.sc.err(format!("Unexpected char '{}'", c))),
        }
    }

    fn read_word_val(&mut self) -> Result<Option<Value>> {
        let word = self
            .sc
            .take_while(|c| c.is_ascii_alphanumeric() || c == '_')
            .to_string();
        let paren = self.sc.peek() == Some('(');
        let val = match word.as_str() {
            "N" => return Ok(None),
            "M" => Value::Marker,
            "R" => Value::Remove,
            "NA" => Value::NA,
            "T" => Value::Bool(true),
            "F" => Value::Bool(false),
            "NaN" => Value::Number(Number::new(f64::NAN)),
            "INF" => Value::Number(Number::new(f64::INFINITY)),
            "true" if self.filter_mode => Value::Bool(true),
            "false" if self.filter_mode => Value::Bool(false),
            "Bin" if paren => self.read_bin()?,
            "C" if paren => self.read_coord()?,
            w if paren && w.starts_with(|c: char| c.is_ascii_uppercase()) => {
                self.sc.expect('(')?;
                let val = self.read_str()?;
                self.sc.expect(')')?;
                let xstr = XStr::new(w, val);
                Value::XStr(self.lift(xstr)?)
            }
            w => return Err(self.sc.err(format!("Unexpected identifier {:?}", w))),
        };
        Ok(Some(val))
    }

    fn read_bin(&mut self) -> Result<Value> {
        self.sc.expect('(')?;
        let mime = if self.sc.peek() == Some('"') {
            self.read_str()?
        } else {
            self.sc.take_while(|c| c != ')' && c != '\n').to_string()
        };
        self.sc.expect(')')?;
        let bin = Bin::new(mime);
        self.lift(bin).map(Value::Bin)
    }

    fn read_coord(&mut self) -> Result<Value> {
        self.sc.expect('(')?;
        let lat = self.read_decimal()?;
        self.sc.expect(',')?;
        let lng = self.read_decimal()?;
        self.sc.expect(')')?;
        let coord = Coord::make(lat, lng);
        self.lift(coord).map(Value::Coord)
    }

    fn read_decimal(&mut self) -> Result<f64> {
        self.sc.skip_spaces();
        let s = self
            .sc
            .take_while(|c| c.is_ascii_digit() || matches!(c, '-' | '+' | '.' | 'e' | 'E'))
            .to_string();
        s.parse()
            .map_err(|_| self.sc.err(format!("Invalid decimal {:?}", s)))
    }

    fn read_list(&mut self) -> Result<Value> {
        self.sc.expect('[')?;
        let mut items = Vec::new();
        loop {
            self.sc.skip_spaces();
            if self.sc.eat(']') {
                break;
            }
            match self.read_val()? {
                Some(v) => items.push(v),
                None => return Err(self.sc.err("N is not allowed inside a list")),
            }
            self.sc.skip_spaces();
            if !self.sc.eat(',') {
                self.sc.expect(']')?;
                break;
            }
        }
        Ok(Value::List(items))
    }

    fn read_ref(&mut self) -> Result<Value> {
        self.sc.expect('@')?;
        let id = self.sc.take_while(is_ref_char).to_string();
        if id.is_empty() {
            return Err(self.sc.err("Invalid empty ref"));
        }
        let r = if self.sc.peek() == Some(' ') && self.sc.peek_next() == Some('"') {
            self.sc.next_char();
            let dis = self.read_str()?;
            Ref::with_dis(id, dis)
        } else {
            Ref::new(id)
        };
        self.lift(r).map(Value::Ref)
    }

    fn read_str(&mut self) -> Result<String> {
        self.sc.expect('"')?;
        let mut s = String::new();
        loop {
            match self.sc.peek() {
                None => return Err(self.sc.err("Unexpected end of str")),
                Some('\n') => return Err(self.sc.err("Unexpected newline in str")),
                Some('"') => {
                    self.sc.next_char();
                    return Ok(s);
                }
                Some('\\') => {
                    self.sc.next_char();
                    s.push(self.read_escape()?);
                }
                Some(c) => {
                    self.sc.next_char();
                    s.push(c);
                }
            }
        }
    }

    fn read_uri(&mut self) -> Result<String> {
        self.sc.expect('`')?;
        let mut s = String::new();
        loop {
            match self.sc.peek() {
                None => return Err(self.sc.err("Unexpected end of uri")),
                Some('\n') => return Err(self.sc.err("Unexpected newline in uri")),
                Some('`') => {
                    self.sc.next_char();
                    return Ok(s);
                }
                Some('\\') => {
                    self.sc.next_char();
                    match self.sc.peek() {
                        Some(c @ (':' | '/' | '?' | '#' | '[' | ']' | '@' | '&' | '=' | ';')) => {
                            self.sc.next_char();
                            s.push('\\');
                            s.push(c);
                        }
                        _ => s.push(self.read_escape()?),
                    }
                }
                Some(c) => {
                    self.sc.next_char();
                    s.push(c);
                }
            }
        }
    }

    /// Reads the character after a backslash.
    fn read_escape(&mut self) -> Result<char> {
        let c = match self.sc.next_char() {
            Some(c) => c,
            None => return Err(self.sc.err("Unexpected end of input in escape")),
        };
        Ok(match c {
            'b' => '\u{0008}',
            'f' => '\u{000C}',
            'n' => '\n',
            'r' => '\r',
            't' => '\t',
            '"' | '\\' | '$' | '\'' | '`' => c,
            'u' => {
                let hi = self.read_hex4()?;
                if (0xD800..0xDC00).contains(&hi) && self.sc.rest().starts_with("\\u") {
                    self.sc.next_char();
                    self.sc.next_char();
                    let lo = self.read_hex4()?;
                    let code = 0x10000 + ((hi - 0xD800) << 10) + (lo.wrapping_sub(0xDC00) & 0x3FF);
                    return char::from_u32(code)
                        .ok_or_else(|| self.sc.err("Invalid unicode surrogate pair"));
                }
                return char::from_u32(hi)
                    .ok_or_else(|| self.sc.err(format!("Invalid unicode escape \\u{:04x}", hi)));
            }
            c => return Err(self.sc.err(format!("Invalid escape sequence \\{}", c))),
        })
    }

    fn read_hex4(&mut self) -> Result<u32> {
        let mut code = 0;
        for _ in 0..4 {
            match self.sc.next_char().and_then(|c| c.to_digit(16)) {
                Some(d) => code = code * 16 + d,
                None => return Err(self.sc.err("Invalid unicode escape, expected 4 hex digits")),
            }
        }
        Ok(code)
    }

    /// Reads a token starting with a digit or `-` and classifies it as a
    /// number, date, time or timestamp.
    fn read_num_val(&mut self) -> Result<Value> {
        if self.sc.peek() == Some('0') && self.sc.peek_next() == Some('x') {
            self.sc.next_char();
            self.sc.next_char();
            let hex: String = self
                .sc
                .take_while(|c| c.is_ascii_hexdigit() || c == '_')
                .chars()
                .filter(|&c| c != '_')
                .collect();
            let n = i64::from_str_radix(&hex, 16)
                .map_err(|_| self.sc.err(format!("Invalid hex literal 0x{}", hex)))?;
            return Ok(Value::Number(Number::new(n as f64)));
        }

        let mut s = String::new();
        if let Some(c) = self.sc.next_char() {
            s.push(c);
        }
        let mut colons = 0;
        let mut dashes = 0;
        let mut unit_index = 0;
        let mut exp = false;
        while let Some(c) = self.sc.peek() {
            let next = self.sc.peek_next();
            let next_digit = next.map_or(false, |n| n.is_ascii_digit());
            if !c.is_ascii_digit() {
                if exp && (c == '+' || c == '-') {
                } else if unit_index > 0 && (c == '-' || c == '*') {
                } else if c == '-' {
                    dashes += 1;
                } else if c == ':' && next_digit {
                    colons += 1;
                } else if (exp || colons >= 1) && c == '+' {
                } else if c == '.' {
                    if !next_digit {
                        break;
                    }
                } else if (c == 'e' || c == 'E')
                    && unit_index == 0
                    && (next_digit || matches!(next, Some('+' | '-')))
                {
                    exp = true;
                } else if c.is_alphabetic() || matches!(c, '%' | '$' | '/') || c as u32 > 127 {
                    if unit_index == 0 {
                        unit_index = s.len();
                    }
                } else if c == '_' {
                    if unit_index == 0 && next_digit {
                        self.sc.next_char();
                        continue;
                    }
                    if unit_index == 0 {
                        unit_index = s.len();
                    }
                } else {
                    break;
                }
            }
            s.push(c);
            self.sc.next_char();
        }

        if dashes == 2 && colons == 0 {
            return parse_date(&s)
                .map(Value::Date)
                .map_err(|msg| self.sc.err(msg));
        }
        if dashes == 0 && colons >= 1 {
            return parse_time(&s, colons == 1)
                .map(Value::Time)
                .map_err(|msg| self.sc.err(msg));
        }
        if dashes >= 2 {
            return self.read_datetime(&s).map(Value::DateTime);
        }

        let (num, unit) = if unit_index > 0 {
            s.split_at(unit_index)
        } else {
            (s.as_str(), "")
        };
        let val: f64 = num
            .parse()
            .map_err(|_| self.sc.err(format!("Invalid number literal {:?}", s)))?;
        if unit.is_empty() {
            return Ok(Value::Number(Number::new(val)));
        }
        let num = Number::with_unit(val, unit);
        self.lift(num).map(Value::Number)
    }

    /// Completes a timestamp token with the timezone name that may follow it.
    fn read_datetime(&mut self, s: &str) -> Result<DateTime> {
        let (date, time, offset, zulu) = parse_datetime(s).map_err(|msg| self.sc.err(msg))?;
        let tz = if self.sc.peek() == Some(' ')
            && self.sc.peek_next().map_or(false, |c| c.is_ascii_uppercase())
        {
            self.sc.next_char();
            let name = self.sc.take_while(is_tz_char).to_string();
            let tz = TimeZone::make(&name);
            self.lift(tz)?
        } else if zulu {
            TimeZone::utc()
        } else {
            return Err(self.sc.err(format!("Expected timezone name after {:?}", s)));
        };
        let ts = DateTime::new(date, time, tz, offset);
        self.lift(ts)
    }

    /// Reports invalid-argument failures from value constructors as parse
    /// errors at the current line.
    fn lift<T>(&self, r: Result<T>) -> Result<T> {
        r.map_err(|e| at_line(self.sc.line(), e))
    }
}

impl ZincReader<'static> {
    /// Creates a reader that takes its input from an I/O stream.
    ///
    /// The stream is read to the end up front.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if reading fails or the input is not UTF-8.
    pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Self> {
        let mut input = String::new();
        reader.read_to_string(&mut input)?;
        Ok(ZincReader {
            sc: Scanner::new(input),
            filter_mode: false,
        })
    }
}

fn at_line(line: usize, err: Error) -> Error {
    match err {
        Error::InvalidArgument(msg) => Error::parse(line, msg),
        other => other,
    }
}

fn digits(s: Option<&str>) -> Option<u32> {
    let s = s?;
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// Parses `YYYY-MM-DD`.
fn parse_date(s: &str) -> std::result::Result<Date, String> {
    let b = s.as_bytes();
    if b.len() != 10 || b[4] != b'-' || b[7] != b'-' {
        return Err(format!("Invalid date {:?}, expected YYYY-MM-DD", s));
    }
    let (year, month, day) = match (digits(s.get(0..4)), digits(s.get(5..7)), digits(s.get(8..10))) {
        (Some(y), Some(m), Some(d)) => (y, m, d),
        _ => return Err(format!("Invalid date {:?}, expected YYYY-MM-DD", s)),
    };
    Date::new(year as i32, month, day).map_err(|e| format!("Invalid date {:?}: {}", s, e))
}

/// Parses `hh:mm:ss[.fff]`, or `hh:mm` when `short` is set.
fn parse_time(s: &str, short: bool) -> std::result::Result<Time, String> {
    let full;
    let s = if short {
        full = format!("{}:00", s);
        full.as_str()
    } else {
        s
    };
    let b = s.as_bytes();
    if b.len() < 8 || b[2] != b':' || b[5] != b':' {
        return Err(format!("Invalid time {:?}, expected hh:mm:ss", s));
    }
    let (hour, min, sec) = match (digits(s.get(0..2)), digits(s.get(3..5)), digits(s.get(6..8))) {
        (Some(h), Some(m), Some(sec)) => (h, m, sec),
        _ => return Err(format!("Invalid time {:?}, expected hh:mm:ss", s)),
    };
    let mut ms = 0;
    if b.len() > 8 {
        let frac = match (b[8], s.get(9..)) {
            (b'.', Some(frac)) if (1..=3).contains(&frac.len()) => frac,
            _ => return Err(format!("Invalid time {:?}, expected 1-3 fraction digits", s)),
        };
        ms = digits(Some(frac))
            .ok_or_else(|| format!("Invalid time fraction {:?}", frac))?
            * 10u32.pow(3 - frac.len() as u32);
    }
    Time::new(hour, min, sec, ms).map_err(|e| format!("Invalid time {:?}: {}", s, e))
}

/// Parses `YYYY-MM-DDThh:mm:ss[.fff](Z|±hh:mm)` into its parts; the flag is
/// set for a `Z` suffix.
fn parse_datetime(s: &str) -> std::result::Result<(Date, Time, i32, bool), String> {
    let date = parse_date(s.get(0..10).unwrap_or(s))?;
    let rest = match s.get(10..) {
        Some(rest) if rest.starts_with('T') => &rest[1..],
        _ => return Err(format!("Invalid timestamp {:?}, expected 'T' after date", s)),
    };
    if let Some(time) = rest.strip_suffix('Z') {
        return Ok((date, parse_time(time, false)?, 0, true));
    }
    let split = rest.len().saturating_sub(6);
    let (time, off) = match (rest.get(..split), rest.get(split..)) {
        (Some(t), Some(o)) if !t.is_empty() => (t, o),
        _ => return Err(format!("Invalid timestamp {:?}, expected offset", s)),
    };
    let ob = off.as_bytes();
    let sign = match ob.first() {
        Some(b'+') => 1,
        Some(b'-') => -1,
        _ => return Err(format!("Invalid timestamp offset {:?}", off)),
    };
    let (hh, mm) = match (ob.get(3), digits(off.get(1..3)), digits(off.get(4..6))) {
        (Some(b':'), Some(h), Some(m)) => (h as i32, m as i32),
        _ => return Err(format!("Invalid timestamp offset {:?}", off)),
    };
    let time = parse_time(time, false)?;
    Ok((date, time, sign * (hh * 3600 + mm * 60), false))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar(s: &str) -> Value {
        ZincReader::from_str(s).read_scalar().unwrap().unwrap()
    }

    fn scalar_err(s: &str) -> Error {
        ZincReader::from_str(s).read_scalar().unwrap_err()
    }

    #[test]
    fn test_keywords() {
        assert_eq!(scalar("M"), Value::Marker);
        assert_eq!(scalar("R"), Value::Remove);
        assert_eq!(scalar("NA"), Value::NA);
        assert_eq!(scalar("T"), Value::Bool(true));
        assert_eq!(scalar("F"), Value::Bool(false));
        assert_eq!(scalar("INF").as_f64(), Some(f64::INFINITY));
        assert_eq!(scalar("-INF").as_f64(), Some(f64::NEG_INFINITY));
        assert!(scalar("NaN").as_f64().unwrap().is_nan());
        assert_eq!(ZincReader::from_str("N").read_scalar().unwrap(), None);
        assert!(matches!(scalar_err("true"), Error::Parse { .. }));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(scalar("42"), Value::from(42));
        assert_eq!(scalar("-3.5"), Value::from(-3.5));
        assert_eq!(scalar("1_000"), Value::from(1000));
        assert_eq!(scalar("1e3"), Value::from(1000));
        assert_eq!(scalar("2.5E-1"), Value::from(0.25));
        assert_eq!(scalar("0xff"), Value::from(255));
        assert_eq!(
            scalar("72.5°F"),
            Value::from(Number::with_unit(72.5, "°F").unwrap())
        );
        assert_eq!(
            scalar("10%"),
            Value::from(Number::with_unit(10.0, "%").unwrap())
        );
        assert_eq!(
            scalar("5kW/m²"),
            Value::from(Number::with_unit(5.0, "kW/m²").unwrap())
        );
    }

    #[test]
    fn test_dates_and_times() {
        assert_eq!(scalar("2024-02-29"), Value::from(Date::new(2024, 2, 29).unwrap()));
        assert_eq!(scalar("08:05:03"), Value::from(Time::new(8, 5, 3, 0).unwrap()));
        assert_eq!(scalar("08:05:03.5"), Value::from(Time::new(8, 5, 3, 500).unwrap()));
        assert_eq!(scalar("08:05:03.123"), Value::from(Time::new(8, 5, 3, 123).unwrap()));
        assert!(matches!(scalar_err("2023-02-29"), Error::Parse { .. }));
        assert!(matches!(scalar_err("2024-2-01"), Error::Parse { .. }));
        assert!(matches!(scalar_err("8:05:03"), Error::Parse { .. }));
        assert!(matches!(scalar_err("08:05:03.1234"), Error::Parse { .. }));
    }

    #[test]
    fn test_datetimes() {
        let v = scalar("2024-01-02T08:30:00-05:00 New_York");
        let ts = v.as_datetime().unwrap();
        assert_eq!(ts.tz().name(), "New_York");
        assert_eq!(ts.tz_offset(), -5 * 3600);
        assert_eq!(ts.time(), Time::new(8, 30, 0, 0).unwrap());

        let ts = scalar("2024-01-02T13:30:00.250Z").as_datetime().unwrap();
        assert!(ts.tz().is_utc());
        assert_eq!(ts.time().ms(), 250);

        let ts = scalar("2024-01-02T13:30:00Z London").as_datetime().unwrap();
        assert_eq!(ts.tz().name(), "London");

        assert!(matches!(
            scalar_err("2024-01-02T08:30:00-05:00"),
            Error::Parse { .. }
        ));
        assert!(matches!(
            scalar_err("2024-01-02T08:30:00Z Atlantis"),
            Error::Parse { .. }
        ));
    }

    #[test]
    fn test_strings_and_escapes() {
        assert_eq!(scalar(r#""a\"b\\c\n\t\$""#), Value::str("a\"b\\c\n\t$"));
        assert_eq!(scalar(r#""é\u0001""#), Value::str("é\u{1}"));
        assert_eq!(scalar(r#""😀""#), Value::str("😀"));
        assert!(matches!(scalar_err("\"abc"), Error::Parse { .. }));
        assert!(matches!(scalar_err(r#""\q""#), Error::Parse { .. }));
    }

    #[test]
    fn test_uris() {
        assert_eq!(scalar("`http://x.com/a b`"), Value::uri("http://x.com/a b"));
        assert_eq!(scalar(r"`a\`b`"), Value::uri("a`b"));
        assert_eq!(scalar(r"`a\#b`"), Value::uri(r"a\#b"));
        assert_eq!(scalar(r"`a\\b`"), Value::uri(r"a\b"));
    }

    #[test]
    fn test_refs_symbols_lists() {
        assert_eq!(scalar("@abc.1-2~x"), Value::from(Ref::new("abc.1-2~x").unwrap()));
        let r = scalar("@p1 \"Point 1\"");
        assert_eq!(r.as_ref().and_then(Ref::dis), Some("Point 1"));
        assert_eq!(scalar("^ph.equips:ahu"), Value::from(Symbol::new("ph.equips:ahu").unwrap()));
        assert_eq!(
            scalar("[1, \"two\", M]"),
            Value::List(vec![Value::from(1), Value::str("two"), Value::Marker])
        );
        assert_eq!(scalar("[]"), Value::List(vec![]));
        assert!(matches!(scalar_err("[1, N]"), Error::Parse { .. }));
        assert!(matches!(scalar_err("@"), Error::Parse { .. }));
    }

    #[test]
    fn test_bin_coord_xstr() {
        assert_eq!(scalar("Bin(\"text/plain\")"), Value::from(Bin::new("text/plain").unwrap()));
        assert_eq!(scalar("Bin(text/plain)"), Value::from(Bin::new("text/plain").unwrap()));
        assert_eq!(
            scalar("C(37.5458,-77.4)"),
            Value::from(Coord::make(37.5458, -77.4).unwrap())
        );
        assert_eq!(
            scalar("Span(\"today\")"),
            Value::from(XStr::new("Span", "today").unwrap())
        );
        assert!(matches!(scalar_err("C(91,0)"), Error::Parse { .. }));
    }

    #[test]
    fn test_read_grid() {
        let zinc = "ver:\"3.0\" dis:\"Test\" hisStart:2024-01-01\n\
                    id dis:\"Id\",val,flag\n\
                    @a,1,M\n\
                    @b,,\n\
                    N,\"x\",\n";
        let g = ZincReader::from_str(zinc).read_grid().unwrap();
        assert_eq!(g.meta().get("dis"), Some(&Value::str("Test")));
        assert_eq!(g.num_cols(), 3);
        assert_eq!(g.col("id").unwrap().dis(), "Id");
        assert_eq!(g.num_rows(), 3);
        assert_eq!(g.row(1).unwrap().len(), 1);
        assert_eq!(g.row(2).unwrap().get("id"), None);
        assert_eq!(g.row(2).unwrap().get("val"), Some(&Value::str("x")));
    }

    #[test]
    fn test_read_grid_version_two() {
        let g = ZincReader::from_str("ver:\"2.0\"\nval\nBin(image/png)\n")
            .read_grid()
            .unwrap();
        assert_eq!(g.row(0).unwrap().get("val"), Some(&Value::Bin(Bin::new("image/png").unwrap())));
        assert!(ZincReader::from_str("ver:\"4.0\"\na\n").read_grid().is_err());
        assert!(ZincReader::from_str("version:\"3.0\"\na\n").read_grid().is_err());
    }

    #[test]
    fn test_read_grid_cell_count_errors() {
        let err = ZincReader::from_str("ver:\"3.0\"\na,b\n1\n")
            .read_grid()
            .unwrap_err();
        assert_eq!(err.line(), Some(3));
        let err = ZincReader::from_str("ver:\"3.0\"\na,b\n1,2,3\n")
            .read_grid()
            .unwrap_err();
        assert_eq!(err.line(), Some(3));
    }

    #[test]
    fn test_read_grid_errors_report_line() {
        let err = ZincReader::from_str("ver:\"3.0\"\nname\n\"unterminated\n")
            .read_grid()
            .unwrap_err();
        assert_eq!(err.line(), Some(3));
        let err = ZincReader::from_str("ver:\"3.0\"\na,a\n").read_grid().unwrap_err();
        assert_eq!(err.line(), Some(2));
    }

    #[test]
    fn test_read_grids_sequentially() {
        let zinc = "ver:\"3.0\"\na\n1\n\nver:\"3.0\"\nb\n2\n3\n";
        let grids = ZincReader::from_str(zinc).read_grids().unwrap();
        assert_eq!(grids.len(), 2);
        assert_eq!(grids[1].num_rows(), 2);
    }

    #[test]
    fn test_read_dict() {
        let d = ZincReader::from_str("site dis:\"HQ\" area:100ft²").read_dict().unwrap();
        assert_eq!(d.len(), 3);
        assert_eq!(d.get("site"), Some(&Value::Marker));
        let d = ZincReader::from_str("{a:1 b}").read_dict().unwrap();
        assert_eq!(d.len(), 2);
        assert!(ZincReader::from_str("a:1 ,").read_dict().is_err());
    }

    #[test]
    fn test_read_filter_precedence() {
        let f = ZincReader::from_str("a or b and c").read_filter().unwrap();
        let expected = Filter::has(Path::parse("a").unwrap()).or(Filter::has(
            Path::parse("b").unwrap(),
        )
        .and(Filter::has(Path::parse("c").unwrap())));
        assert_eq!(f, expected);
    }

    #[test]
    fn test_read_filter_values() {
        let f = ZincReader::from_str("x == true").read_filter().unwrap();
        assert_eq!(f, Filter::eq(Path::parse("x").unwrap(), true));
        let f = ZincReader::from_str("ts >= 2024-01-01T00:00:00Z and n < -5kW")
            .read_filter()
            .unwrap();
        assert!(matches!(f, Filter::And(..)));
    }

    #[test]
    fn test_read_filter_errors() {
        for bad in ["a->", "a-b", "(a and b", "a b", "a and", "", "a == N", "a)"] {
            let err = ZincReader::from_str(bad).read_filter();
            assert!(matches!(err, Err(Error::Parse { .. })), "{:?} should fail", bad);
        }
    }

    #[test]
    fn test_filter_keywords_do_not_leak_into_scalars() {
        let mut r = ZincReader::from_str("a b true");
        assert!(r.read_filter().is_err());
        assert!(matches!(r.read_scalar(), Err(Error::Parse { .. })));

        let mut r = ZincReader::from_str("true");
        assert!(r.read_scalar().is_err());
    }

    #[test]
    fn test_from_reader() {
        let input: &[u8] = b"ver:\"3.0\"\na\n1\n";
        let g = ZincReader::from_reader(input).unwrap().read_grid().unwrap();
        assert_eq!(g.num_rows(), 1);
    }
}
