//! Ordered tag dictionaries.
//!
//! A [`Dict`] is an immutable mapping from tag name to [`Value`]. It is built
//! through a [`DictBuilder`], which validates tag names, coerces host values
//! into values, and sorts the tags by name when it is frozen.
//!
//! ## Why IndexMap?
//!
//! Tags are kept in an [`IndexMap`] sorted once on freeze. Lookups stay O(1)
//! while iteration and encoding are deterministic without re-sorting.
//!
//! ## Examples
//!
//! ```rust
//! use serde_haystack::{DictBuilder, Value};
//!
//! let mut b = DictBuilder::new();
//! b.add("site", Value::Marker).unwrap()
//!     .add("dis", "Main Campus").unwrap()
//!     .add("area", 12_000).unwrap();
//! let site = b.into_dict();
//!
//! let names: Vec<_> = site.keys().collect();
//! assert_eq!(names, vec!["area", "dis", "site"]);
//! assert!(site.has("site"));
//! assert_eq!(site.get("dis").and_then(|v| v.as_str()), Some("Main Campus"));
//! ```

use crate::{Error, Number, Ref, Result, Value};
use indexmap::IndexMap;

/// Anything that answers tag lookups by name: a [`Dict`] or a grid
/// [`Row`](crate::Row).
pub trait Tags {
    /// Returns the value of the named tag, or `None` if it is absent.
    fn tag(&self, name: &str) -> Option<&Value>;
}

/// Returns `true` if `name` is a valid tag name (`^[a-z][A-Za-z0-9_]*$`).
///
/// # Examples
///
/// ```rust
/// use serde_haystack::is_tag_name;
///
/// assert!(is_tag_name("siteRef"));
/// assert!(is_tag_name("a_1"));
/// assert!(!is_tag_name("Site"));
/// assert!(!is_tag_name("1st"));
/// assert!(!is_tag_name(""));
/// ```
#[must_use]
pub fn is_tag_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_lowercase() => {}
        _ => return false,
    }
    chars.all(is_tag_char)
}

#[inline]
pub(crate) fn is_tag_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// An immutable, name-sorted set of tags.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dict(IndexMap<String, Value>);

impl Dict {
    /// The empty dict.
    #[must_use]
    pub fn empty() -> Dict {
        Dict(IndexMap::new())
    }

    /// Returns the value of a tag, or `None` if it is absent.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Returns the value of a tag.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownName`] if the tag is absent.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::{Dict, Error};
    ///
    /// let d = Dict::empty();
    /// assert!(matches!(d.get_checked("dis"), Err(Error::UnknownName(_))));
    /// ```
    pub fn get_checked(&self, name: &str) -> Result<&Value> {
        self.0
            .get(name)
            .ok_or_else(|| Error::UnknownName(name.to_string()))
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    #[must_use]
    pub fn missing(&self, name: &str) -> bool {
        !self.has(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The `id` tag, if it holds a ref.
    #[must_use]
    pub fn id(&self) -> Option<&Ref> {
        self.get("id").and_then(Value::as_ref)
    }

    /// A human readable name for the entity.
    ///
    /// Uses the `dis` string when present, then the display text of the `id`
    /// ref, then the id itself, and finally an empty string.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::{DictBuilder, Ref};
    ///
    /// let mut b = DictBuilder::new();
    /// b.add("id", Ref::with_dis("ahu1", "AHU-1").unwrap()).unwrap();
    /// assert_eq!(b.into_dict().dis(), "AHU-1");
    /// ```
    #[must_use]
    pub fn dis(&self) -> String {
        if let Some(Value::Str(dis)) = self.get("dis") {
            return dis.clone();
        }
        match self.id() {
            Some(r) => r.dis().unwrap_or(r.id()).to_string(),
            None => String::new(),
        }
    }

    /// Iterates over tag names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Iterates over tags in name order.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Starts a builder pre-filled with this dict's tags.
    #[must_use]
    pub fn to_builder(&self) -> DictBuilder {
        DictBuilder { map: self.0.clone() }
    }
}

impl Tags for Dict {
    fn tag(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl<'a> IntoIterator for &'a Dict {
    type Item = (&'a String, &'a Value);
    type IntoIter = indexmap::map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Mutable accumulator that freezes into a [`Dict`].
///
/// Adding a tag that already exists replaces its value. The builder is
/// consumed by [`DictBuilder::into_dict`].
#[derive(Debug, Clone, Default)]
pub struct DictBuilder {
    map: IndexMap<String, Value>,
}

impl DictBuilder {
    #[must_use]
    pub fn new() -> Self {
        DictBuilder {
            map: IndexMap::new(),
        }
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        DictBuilder {
            map: IndexMap::with_capacity(capacity),
        }
    }

    /// Adds a tag, coercing host values (`bool`, numbers, strings) into
    /// their [`Value`] kind.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `name` is not a valid tag name.
    pub fn add<N, V>(&mut self, name: N, val: V) -> Result<&mut Self>
    where
        N: Into<String>,
        V: Into<Value>,
    {
        let name = name.into();
        if !is_tag_name(&name) {
            return Err(Error::invalid(format!("Invalid tag name: {:?}", name)));
        }
        self.map.insert(name, val.into());
        Ok(self)
    }

    /// Adds a marker tag.
    ///
    /// # Errors
    ///
    /// Same as [`DictBuilder::add`].
    pub fn add_marker<N: Into<String>>(&mut self, name: N) -> Result<&mut Self> {
        self.add(name, Value::Marker)
    }

    /// Adds a number tag with an optional unit.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for an invalid tag or unit name.
    pub fn add_num<N: Into<String>>(
        &mut self,
        name: N,
        val: f64,
        unit: Option<&str>,
    ) -> Result<&mut Self> {
        let num = match unit {
            Some(u) => Number::with_unit(val, u)?,
            None => Number::new(val),
        };
        self.add(name, num)
    }

    /// Adds a tag when `val` is present and does nothing otherwise.
    ///
    /// # Errors
    ///
    /// Same as [`DictBuilder::add`].
    pub fn add_opt<N: Into<String>>(&mut self, name: N, val: Option<Value>) -> Result<&mut Self> {
        match val {
            Some(v) => self.add(name, v),
            None => Ok(self),
        }
    }

    /// Copies every tag of `dict` into this builder.
    pub fn add_all(&mut self, dict: &Dict) -> &mut Self {
        for (k, v) in dict.iter() {
            self.map.insert(k.clone(), v.clone());
        }
        self
    }

    /// Removes a tag, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.map.shift_remove(name)
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.map.get(name)
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.map.contains_key(name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.map.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Freezes the builder into a name-sorted [`Dict`].
    #[must_use]
    pub fn into_dict(self) -> Dict {
        let mut map = self.map;
        map.sort_keys();
        Dict(map)
    }
}
