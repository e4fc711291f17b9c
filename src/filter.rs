//! Haystack filter expressions.
//!
//! A [`Filter`] is a predicate over tagged records. Filters are parsed from
//! the Haystack filter syntax or built with the combinators on [`Filter`],
//! and evaluated with [`Filter::include`].
//!
//! ## Grammar
//!
//! ```text
//! filter  := or
//! or      := and ("or" and)*
//! and     := atomic ("and" atomic)*
//! atomic  := "(" filter ")" | "not" path | path op value | path
//! path    := name ("->" name)*
//! op      := "==" | "!=" | "<" | "<=" | ">" | ">="
//! ```
//!
//! Values use Zinc scalar syntax; `true` and `false` are accepted as well as
//! `T` and `F`.
//!
//! ## Evaluation
//!
//! Two-valued logic: a path that does not resolve makes every comparison
//! false. Every comparison, `!=` included, also requires the resolved value
//! to be of the same kind as the literal. Each `->` segment dereferences a [`Ref`] through a [`Resolver`].
//!
//! ```rust
//! use serde_haystack::{dict, Filter};
//! use std::collections::HashMap;
//!
//! let site = dict! { "id" => serde_haystack::Ref::new("s1").unwrap(), "dis" => "HQ" }.unwrap();
//! let equip = dict! { "equip", "siteRef" => serde_haystack::Ref::new("s1").unwrap() }.unwrap();
//!
//! let mut db = HashMap::new();
//! db.insert("s1".to_string(), site);
//!
//! let f: Filter = "equip and siteRef->dis == \"HQ\"".parse().unwrap();
//! assert!(f.include(&equip, &db));
//! ```

use crate::de::ZincReader;
use crate::{Dict, Error, Ref, Result, Tags, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Looks up records by id while evaluating `->` path segments.
pub trait Resolver {
    /// Returns the record with the given id, if known.
    fn find(&self, id: &Ref) -> Option<Dict>;

    /// Like [`Resolver::find`] but fails for unknown ids.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRec`] if the id does not resolve.
    fn find_checked(&self, id: &Ref) -> Result<Dict> {
        self.find(id)
            .ok_or_else(|| Error::UnknownRec(id.id().to_string()))
    }
}

impl<F> Resolver for F
where
    F: Fn(&Ref) -> Option<Dict>,
{
    fn find(&self, id: &Ref) -> Option<Dict> {
        self(id)
    }
}

impl Resolver for HashMap<String, Dict> {
    fn find(&self, id: &Ref) -> Option<Dict> {
        self.get(id.id()).cloned()
    }
}

/// A resolver that knows no records; every `->` path fails to resolve.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoResolver;

impl Resolver for NoResolver {
    fn find(&self, _id: &Ref) -> Option<Dict> {
        None
    }
}

/// A tag name or a chain of names joined by `->`.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::Path;
///
/// let p = Path::parse("equipRef->siteRef->dis").unwrap();
/// assert_eq!(p.len(), 3);
/// assert_eq!(p.to_string(), "equipRef->siteRef->dis");
/// assert!(Path::parse("a->").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Path(Vec<String>);

impl Path {
    /// Builds a path from its segment names.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if there are no segments or any
    /// segment is not a valid tag name. `and`, `or` and `not` are reserved.
    pub fn new<I, S>(names: I) -> Result<Path>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(Error::invalid("Path has no segments"));
        }
        if let Some(bad) = names.iter().find(|n| !is_path_name(n)) {
            return Err(Error::invalid(format!("Invalid path segment: {:?}", bad)));
        }
        Ok(Path(names))
    }

    /// Parses `a->b->c`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] on an empty segment or a `-` not followed by `>`.
    pub fn parse(s: &str) -> Result<Path> {
        let mut names = Vec::new();
        for (i, seg) in s.split("->").enumerate() {
            if seg.is_empty() {
                return Err(Error::parse(1, format!("Empty path segment {} in {:?}", i, s)));
            }
            if !is_path_name(seg) {
                return Err(Error::parse(1, format!("Invalid path segment {:?}", seg)));
            }
            names.push(seg.to_string());
        }
        Ok(Path(names))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; a path has at least one segment.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Follows the path from `rec`, dereferencing refs through `resolver`.
    pub fn resolve<T, R>(&self, rec: &T, resolver: &R) -> Option<Value>
    where
        T: Tags + ?Sized,
        R: Resolver + ?Sized,
    {
        let (first, rest) = self.0.split_first()?;
        let mut val = rec.tag(first)?.clone();
        for name in rest {
            let target = val.as_ref()?;
            let next = resolver.find(target)?;
            val = next.get(name)?.clone();
        }
        Some(val)
    }
}

/// A tag name that is not one of the filter keywords.
fn is_path_name(s: &str) -> bool {
    let mut chars = s.chars();
    chars.next().map_or(false, |c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !matches!(s, "and" | "or" | "not")
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("->"))
    }
}

impl FromStr for Path {
    type Err = Error;

    fn from_str(s: &str) -> Result<Path> {
        Path::parse(s)
    }
}

/// A compiled filter expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Filter {
    /// The path resolves to a value.
    Has(Path),
    /// The path does not resolve.
    Missing(Path),
    Eq(Path, Value),
    Ne(Path, Value),
    Lt(Path, Value),
    Le(Path, Value),
    Gt(Path, Value),
    Ge(Path, Value),
    And(Box<Filter>, Box<Filter>),
    Or(Box<Filter>, Box<Filter>),
}

impl Filter {
    /// Parses filter syntax.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Parse`] for malformed input.
    pub fn parse(s: &str) -> Result<Filter> {
        ZincReader::from_str(s).read_filter()
    }

    #[must_use]
    pub fn has(path: Path) -> Filter {
        Filter::Has(path)
    }

    #[must_use]
    pub fn missing(path: Path) -> Filter {
        Filter::Missing(path)
    }

    pub fn eq<V: Into<Value>>(path: Path, val: V) -> Filter {
        Filter::Eq(path, val.into())
    }

    pub fn ne<V: Into<Value>>(path: Path, val: V) -> Filter {
        Filter::Ne(path, val.into())
    }

    pub fn lt<V: Into<Value>>(path: Path, val: V) -> Filter {
        Filter::Lt(path, val.into())
    }

    pub fn le<V: Into<Value>>(path: Path, val: V) -> Filter {
        Filter::Le(path, val.into())
    }

    pub fn gt<V: Into<Value>>(path: Path, val: V) -> Filter {
        Filter::Gt(path, val.into())
    }

    pub fn ge<V: Into<Value>>(path: Path, val: V) -> Filter {
        Filter::Ge(path, val.into())
    }

    #[must_use]
    pub fn and(self, other: Filter) -> Filter {
        Filter::And(Box::new(self), Box::new(other))
    }

    #[must_use]
    pub fn or(self, other: Filter) -> Filter {
        Filter::Or(Box::new(self), Box::new(other))
    }

    /// Returns `true` for `And` and `Or`.
    #[must_use]
    pub fn is_compound(&self) -> bool {
        matches!(self, Filter::And(..) | Filter::Or(..))
    }

    /// Evaluates the filter against a record.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::{dict, Filter, NoResolver};
    ///
    /// let rec = dict! { "point", "curVal" => 72 }.unwrap();
    /// let f = Filter::parse("point and curVal > 70").unwrap();
    /// assert!(f.include(&rec, &NoResolver));
    /// assert!(!Filter::parse("curVal > \"70\"").unwrap().include(&rec, &NoResolver));
    /// ```
    pub fn include<T, R>(&self, rec: &T, resolver: &R) -> bool
    where
        T: Tags + ?Sized,
        R: Resolver + ?Sized,
    {
        match self {
            Filter::Has(path) => path.resolve(rec, resolver).is_some(),
            Filter::Missing(path) => path.resolve(rec, resolver).is_none(),
            Filter::Eq(path, val) => path
                .resolve(rec, resolver)
                .map_or(false, |v| v == *val),
            Filter::Ne(path, val) => match path.resolve(rec, resolver) {
                Some(v) if v.same_kind(val) => v != *val,
                _ => false,
            },
            Filter::Lt(path, val) => cmp(path, val, rec, resolver, |o| o == Ordering::Less),
            Filter::Le(path, val) => cmp(path, val, rec, resolver, |o| o != Ordering::Greater),
            Filter::Gt(path, val) => cmp(path, val, rec, resolver, |o| o == Ordering::Greater),
            Filter::Ge(path, val) => cmp(path, val, rec, resolver, |o| o != Ordering::Less),
            Filter::And(a, b) => a.include(rec, resolver) && b.include(rec, resolver),
            Filter::Or(a, b) => a.include(rec, resolver) || b.include(rec, resolver),
        }
    }
}

fn cmp<T, R, F>(path: &Path, val: &Value, rec: &T, resolver: &R, test: F) -> bool
where
    T: Tags + ?Sized,
    R: Resolver + ?Sized,
    F: Fn(Ordering) -> bool,
{
    match path.resolve(rec, resolver) {
        Some(v) if v.same_kind(val) => v.compare(val).map_or(false, test),
        _ => false,
    }
}

impl FromStr for Filter {
    type Err = Error;

    fn from_str(s: &str) -> Result<Filter> {
        Filter::parse(s)
    }
}

struct Operand<'a>(&'a Filter);

impl fmt::Display for Operand<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_compound() {
            write!(f, "({})", self.0)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

struct Literal<'a>(&'a Value);

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Value::Bool(true) => f.write_str("true"),
            Value::Bool(false) => f.write_str("false"),
            v => write!(f, "{}", v),
        }
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Filter::Has(p) => write!(f, "{}", p),
            Filter::Missing(p) => write!(f, "not {}", p),
            Filter::Eq(p, v) => write!(f, "{} == {}", p, Literal(v)),
            Filter::Ne(p, v) => write!(f, "{} != {}", p, Literal(v)),
            Filter::Lt(p, v) => write!(f, "{} < {}", p, Literal(v)),
            Filter::Le(p, v) => write!(f, "{} <= {}", p, Literal(v)),
            Filter::Gt(p, v) => write!(f, "{} > {}", p, Literal(v)),
            Filter::Ge(p, v) => write!(f, "{} >= {}", p, Literal(v)),
            Filter::And(a, b) => write!(f, "{} and {}", Operand(a), Operand(b)),
            Filter::Or(a, b) => write!(f, "{} or {}", Operand(a), Operand(b)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DictBuilder, Number};

    fn path(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn rec() -> Dict {
        let mut b = DictBuilder::new();
        b.add_marker("point").unwrap();
        b.add("curVal", Number::with_unit(72.0, "°F").unwrap()).unwrap();
        b.add("dis", "Zone Temp").unwrap();
        b.add("equipRef", Ref::new("e1").unwrap()).unwrap();
        b.into_dict()
    }

    fn db() -> HashMap<String, Dict> {
        let mut equip = DictBuilder::new();
        equip.add("id", Ref::new("e1").unwrap()).unwrap();
        equip.add("siteRef", Ref::new("s1").unwrap()).unwrap();
        let mut site = DictBuilder::new();
        site.add("id", Ref::new("s1").unwrap()).unwrap();
        site.add("dis", "HQ").unwrap();
        let mut db = HashMap::new();
        db.insert("e1".to_string(), equip.into_dict());
        db.insert("s1".to_string(), site.into_dict());
        db
    }

    #[test]
    fn test_has_and_missing() {
        let r = rec();
        assert!(Filter::has(path("point")).include(&r, &NoResolver));
        assert!(!Filter::missing(path("point")).include(&r, &NoResolver));
        assert!(Filter::missing(path("equip")).include(&r, &NoResolver));
    }

    #[test]
    fn test_comparisons_need_same_unit_and_kind() {
        let r = rec();
        let f72 = Number::with_unit(70.0, "°F").unwrap();
        assert!(Filter::gt(path("curVal"), f72.clone()).include(&r, &NoResolver));
        assert!(!Filter::gt(path("curVal"), 70).include(&r, &NoResolver));
        assert!(!Filter::lt(path("dis"), 70).include(&r, &NoResolver));
        assert!(Filter::le(path("curVal"), Number::with_unit(72.0, "°F").unwrap())
            .include(&r, &NoResolver));
        assert!(!Filter::lt(path("nothing"), f72).include(&r, &NoResolver));
    }

    #[test]
    fn test_ne_semantics() {
        let r = rec();
        assert!(Filter::ne(path("dis"), "Other").include(&r, &NoResolver));
        assert!(!Filter::ne(path("dis"), 5).include(&r, &NoResolver));
        assert!(!Filter::ne(path("curVal"), "72°F").include(&r, &NoResolver));
        assert!(Filter::ne(path("curVal"), 72).include(&r, &NoResolver));
        assert!(!Filter::ne(path("dis"), "Zone Temp").include(&r, &NoResolver));
        assert!(!Filter::ne(path("missing"), "x").include(&r, &NoResolver));
    }

    #[test]
    fn test_path_dereference() {
        let r = rec();
        let db = db();
        assert!(Filter::eq(path("equipRef->siteRef->dis"), "HQ").include(&r, &db));
        assert!(!Filter::has(path("equipRef->siteRef->dis")).include(&r, &NoResolver));
        assert!(!Filter::has(path("dis->foo")).include(&r, &db));
    }

    #[test]
    fn test_closure_resolver() {
        let r = rec();
        let lookup = |id: &Ref| {
            if id.id() == "e1" {
                let mut b = DictBuilder::new();
                b.add_marker("ahu").unwrap();
                Some(b.into_dict())
            } else {
                None
            }
        };
        assert!(Filter::has(path("equipRef->ahu")).include(&r, &lookup));
        assert!(lookup.find_checked(&Ref::new("zz").unwrap()).is_err());
    }

    #[test]
    fn test_short_circuit() {
        struct Panicky;
        impl Resolver for Panicky {
            fn find(&self, _id: &Ref) -> Option<Dict> {
                panic!("resolver should not be consulted");
            }
        }
        let r = rec();
        let f = Filter::has(path("point")).or(Filter::has(path("equipRef->x")));
        assert!(f.include(&r, &Panicky));
        let f = Filter::has(path("nope")).and(Filter::has(path("equipRef->x")));
        assert!(!f.include(&r, &Panicky));
    }

    #[test]
    fn test_display_parenthesizes_compound_operands() {
        let f = Filter::has(path("a"))
            .and(Filter::has(path("b")))
            .or(Filter::missing(path("c")));
        assert_eq!(f.to_string(), "(a and b) or not c");
        let f = Filter::eq(path("x"), true).and(Filter::eq(path("y"), "s"));
        assert_eq!(f.to_string(), "x == true and y == \"s\"");
    }

    #[test]
    fn test_path_construction() {
        assert!(Path::new(["a", "b"]).is_ok());
        assert!(Path::new(Vec::<String>::new()).is_err());
        assert!(Path::new(["a b"]).is_err());
        assert!(Path::new(["not"]).is_err());
        assert!(Path::new(["equipRef", "or"]).is_err());
        assert!(Path::parse("and").is_err());
        assert!(Path::new(["note", "order"]).is_ok());
        assert!(matches!(Path::parse("a->->b"), Err(Error::Parse { .. })));
        assert_eq!("a->b".parse::<Path>().unwrap().get(1), Some("b"));
    }
}
