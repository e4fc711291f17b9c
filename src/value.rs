//! The Haystack value model.
//!
//! This module provides the [`Value`] enum, the closed set of scalar kinds a
//! Haystack tag can carry, and the payload types that enforce each kind's
//! invariants ([`Number`], [`Ref`], [`Coord`], [`Bin`], [`Symbol`], [`XStr`]).
//! Calendar payloads live in [`crate::temporal`].
//!
//! ## Creating Values
//!
//! ```rust
//! use serde_haystack::{Coord, Number, Ref, Value};
//!
//! let marker = Value::Marker;
//! let flag = Value::from(true);
//! let temp = Value::from(Number::with_unit(72.5, "°F").unwrap());
//! let site = Value::from(Ref::with_dis("site-1", "Main Campus").unwrap());
//! let geo = Value::from(Coord::make(37.5458, -77.4).unwrap());
//!
//! assert_eq!(temp.to_string(), "72.5°F");
//! assert_eq!(geo.to_string(), "C(37.5458,-77.4)");
//! assert!(marker.is_marker());
//! assert_eq!(flag.as_bool(), Some(true));
//! assert_eq!(site.as_ref().map(|r| r.id()), Some("site-1"));
//! ```
//!
//! ## Equality and Ordering
//!
//! Equality is structural within a kind and never holds across kinds.
//! [`Value::compare`] orders numbers, dates, times and timestamps by
//! magnitude and everything else lexically; values of different kinds are
//! incomparable.

use crate::{Date, DateTime, Error, Result, Time};
use std::cmp::Ordering;
use std::fmt;

/// A dynamically-typed Haystack value.
///
/// Every variant is immutable. Absent tags and blank grid cells are
/// represented by `Option<Value>::None`, never by a variant of this enum.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    /// Valueless presence indicator.
    Marker,
    /// Instruction to delete a tag.
    Remove,
    /// "Not available" sentinel.
    NA,
    Bool(bool),
    Number(Number),
    Str(String),
    Uri(String),
    Ref(Ref),
    Date(Date),
    Time(Time),
    DateTime(DateTime),
    Bin(Bin),
    Coord(Coord),
    Symbol(Symbol),
    List(Vec<Value>),
    XStr(XStr),
}

/// Kind names, as used in error messages and diagnostics.
const KIND_NAMES: [&str; 16] = [
    "Marker", "Remove", "NA", "Bool", "Number", "Str", "Uri", "Ref", "Date", "Time", "DateTime",
    "Bin", "Coord", "Symbol", "List", "XStr",
];

impl Value {
    fn kind_index(&self) -> usize {
        match self {
            Value::Marker => 0,
            Value::Remove => 1,
            Value::NA => 2,
            Value::Bool(_) => 3,
            Value::Number(_) => 4,
            Value::Str(_) => 5,
            Value::Uri(_) => 6,
            Value::Ref(_) => 7,
            Value::Date(_) => 8,
            Value::Time(_) => 9,
            Value::DateTime(_) => 10,
            Value::Bin(_) => 11,
            Value::Coord(_) => 12,
            Value::Symbol(_) => 13,
            Value::List(_) => 14,
            Value::XStr(_) => 15,
        }
    }

    /// The name of this value's kind, such as `"Number"` or `"Ref"`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::Value;
    ///
    /// assert_eq!(Value::from(1).kind(), "Number");
    /// assert_eq!(Value::Marker.kind(), "Marker");
    /// ```
    #[must_use]
    pub fn kind(&self) -> &'static str {
        KIND_NAMES[self.kind_index()]
    }

    /// Returns `true` if both values are of the same kind.
    #[inline]
    #[must_use]
    pub fn same_kind(&self, other: &Value) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }

    /// Orders two values of the same kind.
    ///
    /// Numbers compare by magnitude when their units match; dates and times
    /// chronologically; timestamps by the instant they denote. Strings, URIs,
    /// symbols and refs compare lexically and every other kind by its Zinc
    /// text. Returns `None` for values of different kinds, numbers with
    /// different units, and `NaN`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use std::cmp::Ordering;
    /// use serde_haystack::{Date, Value};
    ///
    /// let a = Value::from(Date::new(2024, 1, 2).unwrap());
    /// let b = Value::from(Date::new(2024, 3, 1).unwrap());
    /// assert_eq!(a.compare(&b), Some(Ordering::Less));
    /// assert_eq!(a.compare(&Value::from(1)), None);
    /// ```
    #[must_use]
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => {
                if a.unit == b.unit {
                    a.val.partial_cmp(&b.val)
                } else {
                    None
                }
            }
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Str(a), Value::Str(b)) | (Value::Uri(a), Value::Uri(b)) => Some(a.cmp(b)),
            (Value::Ref(a), Value::Ref(b)) => Some(a.id.cmp(&b.id)),
            (Value::Symbol(a), Value::Symbol(b)) => Some(a.0.cmp(&b.0)),
            (Value::Date(a), Value::Date(b)) => Some(a.cmp(b)),
            (Value::Time(a), Value::Time(b)) => Some(a.cmp(b)),
            (Value::DateTime(a), Value::DateTime(b)) => Some(a.cmp_instant(b)),
            (a, b) if a.same_kind(b) => Some(a.to_string().cmp(&b.to_string())),
            _ => None,
        }
    }

    /// Creates a `Str` value.
    pub fn str<S: Into<String>>(s: S) -> Value {
        Value::Str(s.into())
    }

    /// Creates a `Uri` value.
    pub fn uri<S: Into<String>>(s: S) -> Value {
        Value::Uri(s.into())
    }

    #[inline]
    #[must_use]
    pub const fn is_marker(&self) -> bool {
        matches!(self, Value::Marker)
    }

    #[inline]
    #[must_use]
    pub const fn is_remove(&self) -> bool {
        matches!(self, Value::Remove)
    }

    #[inline]
    #[must_use]
    pub const fn is_na(&self) -> bool {
        matches!(self, Value::NA)
    }

    #[inline]
    #[must_use]
    pub const fn is_number(&self) -> bool {
        matches!(self, Value::Number(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_str(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    #[inline]
    #[must_use]
    pub const fn is_ref(&self) -> bool {
        matches!(self, Value::Ref(_))
    }

    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_number(&self) -> Option<&Number> {
        match self {
            Value::Number(n) => Some(n),
            _ => None,
        }
    }

    /// The magnitude of a `Number`, ignoring its unit.
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        self.as_number().map(Number::val)
    }

    /// The text of a `Str`.
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_uri(&self) -> Option<&str> {
        match self {
            Value::Uri(s) => Some(s),
            _ => None,
        }
    }

    #[allow(clippy::should_implement_trait)]
    #[inline]
    #[must_use]
    pub fn as_ref(&self) -> Option<&Ref> {
        match self {
            Value::Ref(r) => Some(r),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_date(&self) -> Option<Date> {
        match self {
            Value::Date(d) => Some(*d),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_time(&self) -> Option<Time> {
        match self {
            Value::Time(t) => Some(*t),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_datetime(&self) -> Option<DateTime> {
        match self {
            Value::DateTime(t) => Some(*t),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_coord(&self) -> Option<Coord> {
        match self {
            Value::Coord(c) => Some(*c),
            _ => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }
}

/// A floating point number with an optional unit.
///
/// The unit is an opaque string; no conversion is ever performed. `NaN`
/// equals `NaN` so that every number survives an encode/decode round trip.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::Number;
///
/// let n = Number::with_unit(21.5, "°C").unwrap();
/// assert_eq!(n.val(), 21.5);
/// assert_eq!(n.unit(), Some("°C"));
/// assert_eq!(Number::new(f64::NAN), Number::new(f64::NAN));
/// assert!(Number::with_unit(1.0, "kW h").is_err());
/// assert!(Number::with_unit(f64::INFINITY, "kW").is_err());
/// ```
#[derive(Clone, Debug)]
pub struct Number {
    val: f64,
    unit: Option<String>,
}

impl Number {
    /// A unitless number.
    #[must_use]
    pub const fn new(val: f64) -> Number {
        Number { val, unit: None }
    }

    /// A number with a unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the unit is empty, starts with
    /// `-` or `*`, or contains a character that cannot appear in a Zinc
    /// unit. Also fails if `val` is not finite, since Zinc writes `INF`,
    /// `-INF` and `NaN` as bare keywords.
    pub fn with_unit<S: Into<String>>(val: f64, unit: S) -> Result<Number> {
        let unit = unit.into();
        let valid = unit.chars().all(is_unit_char) && !unit.starts_with(['-', '*']);
        if unit.is_empty() || !valid {
            return Err(Error::invalid(format!("Invalid unit name: {:?}", unit)));
        }
        if !val.is_finite() {
            return Err(Error::invalid(format!("{} cannot carry a unit", Number::new(val))));
        }
        Ok(Number {
            val,
            unit: Some(unit),
        })
    }

    #[inline]
    #[must_use]
    pub const fn val(&self) -> f64 {
        self.val
    }

    #[inline]
    #[must_use]
    pub fn unit(&self) -> Option<&str> {
        self.unit.as_deref()
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        let same_val = self.val == other.val || (self.val.is_nan() && other.val.is_nan());
        same_val && self.unit == other.unit
    }
}

/// Returns `true` for characters allowed in a unit name.
pub(crate) fn is_unit_char(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '%' | '_' | '/' | '$' | '-' | '*') || c as u32 > 127
}

/// A reference to another entity, with an optional display string.
///
/// Two refs are equal when their ids are equal; the display string is
/// presentation only.
#[derive(Clone, Debug)]
pub struct Ref {
    id: String,
    dis: Option<String>,
}

impl Ref {
    /// Creates a ref without a display string.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the id is empty or contains a
    /// character outside `[A-Za-z0-9_.~-]`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::Ref;
    ///
    /// assert!(Ref::new("site-1.a_b~c").is_ok());
    /// assert!(Ref::new("bad id").is_err());
    /// assert!(Ref::new("").is_err());
    /// ```
    pub fn new<S: Into<String>>(id: S) -> Result<Ref> {
        let id = id.into();
        if !is_ref_id(&id) {
            return Err(Error::invalid(format!("Invalid ref id: {:?}", id)));
        }
        Ok(Ref { id, dis: None })
    }

    /// Creates a ref with a display string.
    ///
    /// # Errors
    ///
    /// Same as [`Ref::new`].
    pub fn with_dis<S: Into<String>, D: Into<String>>(id: S, dis: D) -> Result<Ref> {
        let mut r = Ref::new(id)?;
        r.dis = Some(dis.into());
        Ok(r)
    }

    #[inline]
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    #[must_use]
    pub fn dis(&self) -> Option<&str> {
        self.dis.as_deref()
    }
}

impl PartialEq for Ref {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Returns `true` for characters allowed in a ref id.
#[inline]
pub(crate) fn is_ref_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '~' | '-')
}

fn is_ref_id(id: &str) -> bool {
    !id.is_empty() && id.chars().all(is_ref_char)
}

/// A geographic coordinate stored as micro-degrees.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::Coord;
///
/// let c = Coord::make(37.5458, -77.4).unwrap();
/// assert_eq!(c.micro_lat(), 37_545_800);
/// assert_eq!(c.to_string(), "C(37.5458,-77.4)");
/// assert!(Coord::make(91.0, 0.0).is_err());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Coord {
    micro_lat: i32,
    micro_lng: i32,
}

impl Coord {
    /// Creates a coordinate from decimal degrees.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if latitude is outside ±90 or
    /// longitude outside ±180.
    pub fn make(lat: f64, lng: f64) -> Result<Coord> {
        if !(-90.0..=90.0).contains(&lat) {
            return Err(Error::invalid(format!("Invalid lat > +/- 90: {}", lat)));
        }
        if !(-180.0..=180.0).contains(&lng) {
            return Err(Error::invalid(format!("Invalid lng > +/- 180: {}", lng)));
        }
        Coord::from_micro((lat * 1e6).round() as i32, (lng * 1e6).round() as i32)
    }

    /// Creates a coordinate from micro-degrees.
    ///
    /// # Errors
    ///
    /// Same range checks as [`Coord::make`].
    pub fn from_micro(micro_lat: i32, micro_lng: i32) -> Result<Coord> {
        if !(-90_000_000..=90_000_000).contains(&micro_lat) {
            return Err(Error::invalid(format!("Invalid lat > +/- 90: {}", micro_lat)));
        }
        if !(-180_000_000..=180_000_000).contains(&micro_lng) {
            return Err(Error::invalid(format!(
                "Invalid lng > +/- 180: {}",
                micro_lng
            )));
        }
        Ok(Coord {
            micro_lat,
            micro_lng,
        })
    }

    #[inline]
    #[must_use]
    pub const fn micro_lat(&self) -> i32 {
        self.micro_lat
    }

    #[inline]
    #[must_use]
    pub const fn micro_lng(&self) -> i32 {
        self.micro_lng
    }

    #[must_use]
    pub fn lat(&self) -> f64 {
        self.micro_lat as f64 / 1e6
    }

    #[must_use]
    pub fn lng(&self) -> f64 {
        self.micro_lng as f64 / 1e6
    }
}

/// Renders micro-degrees as decimal degrees without trailing zeros.
pub(crate) fn micro_to_str(out: &mut String, micro: i32) {
    let mut i = micro as i64;
    if i < 0 {
        out.push('-');
        i = -i;
    }
    let whole = i / 1_000_000;
    let frac = i % 1_000_000;
    out.push_str(&whole.to_string());
    if frac > 0 {
        let digits = format!("{:06}", frac);
        out.push('.');
        out.push_str(digits.trim_end_matches('0'));
    }
}

/// A MIME type naming the content of a binary blob.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Bin(String);

impl Bin {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the MIME string is empty, not
    /// ASCII, or contains `)`.
    pub fn new<S: Into<String>>(mime: S) -> Result<Bin> {
        let mime = mime.into();
        if mime.is_empty() || mime.chars().any(|c| !c.is_ascii() || c == ')' || c < ' ') {
            return Err(Error::invalid(format!("Invalid mime val: {:?}", mime)));
        }
        Ok(Bin(mime))
    }

    #[inline]
    #[must_use]
    pub fn mime(&self) -> &str {
        &self.0
    }
}

/// A def-namespace name such as `site` or `ph.equips:ahu`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Symbol(String);

impl Symbol {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless the name starts with a letter,
    /// uses only letters, digits, `_`, `-` and `.`, and contains at most one `:`.
    pub fn new<S: Into<String>>(name: S) -> Result<Symbol> {
        let name = name.into();
        let starts_ok = name.chars().next().map_or(false, |c| c.is_ascii_alphabetic());
        let chars_ok = name.chars().all(is_symbol_char);
        let colons = name.chars().filter(|&c| c == ':').count();
        if !starts_ok || !chars_ok || colons > 1 || name.ends_with(':') {
            return Err(Error::invalid(format!("Invalid symbol: {:?}", name)));
        }
        Ok(Symbol(name))
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.0
    }
}

#[inline]
pub(crate) fn is_symbol_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

/// A typed string for values this model has no dedicated kind for.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct XStr {
    type_name: String,
    val: String,
}

impl XStr {
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] unless the type name starts with an
    /// uppercase ASCII letter followed by letters, digits or `_`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::XStr;
    ///
    /// assert!(XStr::new("Span", "today").is_ok());
    /// assert!(XStr::new("span", "today").is_err());
    /// ```
    pub fn new<T: Into<String>, V: Into<String>>(type_name: T, val: V) -> Result<XStr> {
        let type_name = type_name.into();
        let mut chars = type_name.chars();
        let valid = chars.next().map_or(false, |c| c.is_ascii_uppercase())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
        if !valid {
            return Err(Error::invalid(format!("Invalid XStr type: {:?}", type_name)));
        }
        Ok(XStr {
            type_name,
            val: val.into(),
        })
    }

    #[inline]
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[inline]
    #[must_use]
    pub fn val(&self) -> &str {
        &self.val
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.val.is_nan() {
            return f.write_str("NaN");
        }
        if self.val == f64::INFINITY {
            return f.write_str("INF");
        }
        if self.val == f64::NEG_INFINITY {
            return f.write_str("-INF");
        }
        write!(f, "{}", self.val)?;
        if let Some(unit) = &self.unit {
            f.write_str(unit)?;
        }
        Ok(())
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = String::with_capacity(24);
        s.push_str("C(");
        micro_to_str(&mut s, self.micro_lat);
        s.push(',');
        micro_to_str(&mut s, self.micro_lng);
        s.push(')');
        f.write_str(&s)
    }
}

// From implementations for creating Value from host types
impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

macro_rules! from_numeric {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(value: $t) -> Self {
                    Value::Number(Number::new(value as f64))
                }
            }
        )*
    };
}

from_numeric!(i8, i16, i32, i64, u8, u16, u32, u64, f32, f64);

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}

impl From<Number> for Value {
    fn from(value: Number) -> Self {
        Value::Number(value)
    }
}

impl From<Ref> for Value {
    fn from(value: Ref) -> Self {
        Value::Ref(value)
    }
}

impl From<Date> for Value {
    fn from(value: Date) -> Self {
        Value::Date(value)
    }
}

impl From<Time> for Value {
    fn from(value: Time) -> Self {
        Value::Time(value)
    }
}

impl From<DateTime> for Value {
    fn from(value: DateTime) -> Self {
        Value::DateTime(value)
    }
}

impl From<Coord> for Value {
    fn from(value: Coord) -> Self {
        Value::Coord(value)
    }
}

impl From<Bin> for Value {
    fn from(value: Bin) -> Self {
        Value::Bin(value)
    }
}

impl From<Symbol> for Value {
    fn from(value: Symbol) -> Self {
        Value::Symbol(value)
    }
}

impl From<XStr> for Value {
    fn from(value: XStr) -> Self {
        Value::XStr(value)
    }
}

impl From<Vec<Value>> for Value {
    fn from(value: Vec<Value>) -> Self {
        Value::List(value)
    }
}

// TryFrom implementations for extracting host types from Value
impl TryFrom<Value> for f64 {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Number(n) => Ok(n.val),
            _ => Err(Error::invalid(format!(
                "expected Number, found {}",
                value.kind()
            ))),
        }
    }
}

impl TryFrom<Value> for bool {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Bool(b) => Ok(b),
            _ => Err(Error::invalid(format!(
                "expected Bool, found {}",
                value.kind()
            ))),
        }
    }
}

impl TryFrom<Value> for String {
    type Error = crate::Error;

    fn try_from(value: Value) -> crate::Result<Self> {
        match value {
            Value::Str(s) => Ok(s),
            _ => Err(Error::invalid(format!(
                "expected Str, found {}",
                value.kind()
            ))),
        }
    }
}
