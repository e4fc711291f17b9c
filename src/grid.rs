//! Grids: immutable tables of tag rows.
//!
//! A [`Grid`] has grid-level metadata, an ordered set of uniquely named
//! columns each carrying its own metadata, and rows holding exactly one
//! optional cell per column. Grids are assembled with a [`GridBuilder`] or
//! from a list of dicts with [`dicts_to_grid`].
//!
//! ```rust
//! use serde_haystack::{GridBuilder, Value};
//!
//! let mut b = GridBuilder::new();
//! b.meta_mut().add("dis", "Sites").unwrap();
//! b.add_col("id").unwrap();
//! b.add_col("area").unwrap().add("unit", "ft²").unwrap();
//! b.add_row(vec![Some(Value::str("a")), Some(Value::from(100))]).unwrap();
//! b.add_row(vec![Some(Value::str("b")), None]).unwrap();
//! let grid = b.build().unwrap();
//!
//! assert_eq!(grid.num_cols(), 2);
//! assert_eq!(grid.num_rows(), 2);
//! assert!(grid.row(1).unwrap().missing("area"));
//! ```

use crate::dict::is_tag_name;
use crate::{Dict, DictBuilder, Error, Ref, Result, Tags, Value};
use indexmap::IndexMap;
use std::collections::BTreeSet;
use std::sync::Arc;

/// A grid column: position, name and metadata.
///
/// Columns are equal when their names and metadata are equal; the position
/// is identity within one grid only.
#[derive(Debug, Clone)]
pub struct Col {
    index: usize,
    name: String,
    meta: Dict,
}

impl Col {
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn meta(&self) -> &Dict {
        &self.meta
    }

    /// The column's `dis` meta tag, or its name.
    #[must_use]
    pub fn dis(&self) -> &str {
        match self.meta.get("dis") {
            Some(Value::Str(s)) => s,
            _ => &self.name,
        }
    }
}

impl PartialEq for Col {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name && self.meta == other.meta
    }
}

type Cols = IndexMap<String, Col>;

/// One grid row, viewed as a set of tags.
///
/// Blank cells are absent: they are skipped by iteration and ignored by
/// equality, just like tags missing from a [`Dict`].
#[derive(Debug, Clone)]
pub struct Row {
    cols: Arc<Cols>,
    cells: Vec<Option<Value>>,
}

impl Row {
    /// Returns the value in the named column, or `None` if the column does
    /// not exist or the cell is blank.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.cols
            .get_index_of(name)
            .and_then(|i| self.cells.get(i))
            .and_then(Option::as_ref)
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownName`] if the column does not exist or the
    /// cell is blank.
    pub fn get_checked(&self, name: &str) -> Result<&Value> {
        self.get(name)
            .ok_or_else(|| Error::UnknownName(name.to_string()))
    }

    /// Returns the cell at a column position.
    #[must_use]
    pub fn cell(&self, index: usize) -> Option<&Value> {
        self.cells.get(index).and_then(Option::as_ref)
    }

    /// All cells in column order, blanks included.
    #[must_use]
    pub fn cells(&self) -> &[Option<Value>] {
        &self.cells
    }

    #[must_use]
    pub fn has(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn missing(&self, name: &str) -> bool {
        self.get(name).is_none()
    }

    /// Number of non-blank cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.iter().filter(|c| c.is_some()).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(Option::is_none)
    }

    /// Iterates over `(column name, value)` pairs, skipping blank cells.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.cols
            .keys()
            .zip(self.cells.iter())
            .filter_map(|(name, cell)| cell.as_ref().map(|v| (name.as_str(), v)))
    }

    /// The `id` cell, if it holds a ref.
    #[must_use]
    pub fn id(&self) -> Option<&Ref> {
        self.get("id").and_then(Value::as_ref)
    }

    /// Copies the non-blank cells into a [`Dict`].
    #[must_use]
    pub fn to_dict(&self) -> Dict {
        let mut b = DictBuilder::with_capacity(self.cells.len());
        for (name, val) in self.iter() {
            // column names were validated when the grid was built
            let _ = b.add(name, val.clone());
        }
        b.into_dict()
    }
}

impl Tags for Row {
    fn tag(&self, name: &str) -> Option<&Value> {
        self.get(name)
    }
}

impl PartialEq for Row {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|(name, val)| other.get(name) == Some(val))
    }
}

/// An immutable two-dimensional table of tags.
#[derive(Debug, Clone)]
pub struct Grid {
    meta: Dict,
    cols: Arc<Cols>,
    rows: Vec<Row>,
}

impl Grid {
    /// The well-known empty grid: one column named `empty` and no rows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::Grid;
    ///
    /// let g = Grid::empty();
    /// assert_eq!(g.col_at(0).map(|c| c.name()), Some("empty"));
    /// assert!(g.is_empty());
    /// ```
    #[must_use]
    pub fn empty() -> Grid {
        let mut cols = Cols::new();
        cols.insert(
            "empty".to_string(),
            Col {
                index: 0,
                name: "empty".to_string(),
                meta: Dict::empty(),
            },
        );
        Grid {
            meta: Dict::empty(),
            cols: Arc::new(cols),
            rows: Vec::new(),
        }
    }

    /// Builds the error grid reported in place of a failed result.
    ///
    /// The grid meta carries an `err` marker, the `dis` message and the
    /// `errTrace` text; the single row repeats them for consumers that only
    /// look at rows.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use serde_haystack::{Error, Grid};
    ///
    /// let g = Grid::from_error(&Error::UnknownRec("p1".into()));
    /// assert!(g.is_err());
    /// assert!(matches!(g.into_result(), Err(Error::Call { .. })));
    /// ```
    #[must_use]
    pub fn from_error(err: &Error) -> Grid {
        let dis = err.to_string();
        let trace = format!("{:?}", err);
        let mut b = GridBuilder::new();
        let _ = b.meta_mut().add_marker("err");
        let _ = b.meta_mut().add("dis", dis.as_str());
        let _ = b.meta_mut().add("errTrace", trace.as_str());
        for name in ["err", "dis", "errTrace"] {
            let _ = b.add_col(name);
        }
        let _ = b.add_row(vec![
            Some(Value::Marker),
            Some(Value::Str(dis)),
            Some(Value::Str(trace)),
        ]);
        b.build().unwrap_or_else(|_| Grid::empty())
    }

    #[inline]
    #[must_use]
    pub fn meta(&self) -> &Dict {
        &self.meta
    }

    /// Columns in order.
    pub fn cols(&self) -> indexmap::map::Values<'_, String, Col> {
        self.cols.values()
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    #[must_use]
    pub fn col(&self, name: &str) -> Option<&Col> {
        self.cols.get(name)
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownName`] if no column has this name.
    pub fn col_checked(&self, name: &str) -> Result<&Col> {
        self.col(name)
            .ok_or_else(|| Error::UnknownName(name.to_string()))
    }

    #[must_use]
    pub fn col_at(&self, index: usize) -> Option<&Col> {
        self.cols.get_index(index).map(|(_, c)| c)
    }

    #[must_use]
    pub fn has_col(&self, name: &str) -> bool {
        self.cols.contains_key(name)
    }

    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    #[must_use]
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the grid has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// Returns `true` if this is an error grid (meta has the `err` marker).
    #[must_use]
    pub fn is_err(&self) -> bool {
        self.meta.has("err")
    }

    /// Converts an error grid into [`Error::Call`] and passes other grids through.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Call`] with the grid's `dis` and `errTrace` meta.
    pub fn into_result(self) -> Result<Grid> {
        if !self.is_err() {
            return Ok(self);
        }
        let dis = match self.meta.get("dis") {
            Some(Value::Str(s)) => s.clone(),
            _ => "server side error".to_string(),
        };
        let trace = match self.meta.get("errTrace") {
            Some(Value::Str(s)) => Some(s.clone()),
            _ => None,
        };
        Err(Error::Call { dis, trace })
    }

    /// Finds the row whose `id` equals the given ref.
    #[must_use]
    pub fn find_by_ref(&self, id: &Ref) -> Option<&Row> {
        self.rows.iter().find(|row| row.id() == Some(id))
    }

    /// # Errors
    ///
    /// Returns [`Error::UnknownRec`] if no row has that `id`.
    pub fn find_by_ref_checked(&self, id: &Ref) -> Result<&Row> {
        self.find_by_ref(id)
            .ok_or_else(|| Error::UnknownRec(id.id().to_string()))
    }

    /// The `watchId` of a watch subscription response.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownWatch`] if the meta has no string `watchId`.
    pub fn watch_id(&self) -> Result<&str> {
        match self.meta.get("watchId") {
            Some(Value::Str(id)) => Ok(id),
            _ => Err(Error::UnknownWatch(
                "grid meta has no watchId".to_string(),
            )),
        }
    }

    /// Copies every row into a [`Dict`].
    #[must_use]
    pub fn to_dicts(&self) -> Vec<Dict> {
        self.rows.iter().map(Row::to_dict).collect()
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.meta == other.meta
            && self.cols.len() == other.cols.len()
            && self.cols().zip(other.cols()).all(|(a, b)| a == b)
            && self.rows == other.rows
    }
}

impl<'a> IntoIterator for &'a Grid {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Mutable staging area for a [`Grid`].
///
/// All columns must be declared before the first row is added. The builder
/// is consumed by [`GridBuilder::build`].
#[derive(Debug, Default)]
pub struct GridBuilder {
    meta: DictBuilder,
    cols: Vec<(String, DictBuilder)>,
    rows: Vec<Vec<Option<Value>>>,
}

impl GridBuilder {
    #[must_use]
    pub fn new() -> Self {
        GridBuilder::default()
    }

    /// The grid metadata being built.
    pub fn meta_mut(&mut self) -> &mut DictBuilder {
        &mut self.meta
    }

    /// Replaces the grid metadata with the tags of `meta`.
    pub fn set_meta(&mut self, meta: &Dict) -> &mut Self {
        self.meta = meta.to_builder();
        self
    }

    /// Declares a column and returns the builder for its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if rows were already added, the
    /// name is not a valid tag name, or a column with that name exists.
    pub fn add_col<N: Into<String>>(&mut self, name: N) -> Result<&mut DictBuilder> {
        let name = name.into();
        if !self.rows.is_empty() {
            return Err(Error::invalid("Cannot add cols after rows have been added"));
        }
        if !is_tag_name(&name) {
            return Err(Error::invalid(format!("Invalid column name: {:?}", name)));
        }
        if self.cols.iter().any(|(n, _)| *n == name) {
            return Err(Error::invalid(format!("Duplicate column name: {}", name)));
        }
        self.cols.push((name, DictBuilder::new()));
        match self.cols.last_mut() {
            Some((_, meta)) => Ok(meta),
            None => Err(Error::invalid("column was not added")),
        }
    }

    /// Appends a row of cells, one per declared column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the cell count differs from the
    /// column count.
    pub fn add_row(&mut self, cells: Vec<Option<Value>>) -> Result<&mut Self> {
        if cells.len() != self.cols.len() {
            return Err(Error::invalid(format!(
                "Row cells size {} != cols size {}",
                cells.len(),
                self.cols.len()
            )));
        }
        self.rows.push(cells);
        Ok(self)
    }

    /// Appends a row taking each column's cell from the same-named tag of
    /// `dict`; tags without a column are ignored.
    ///
    /// # Errors
    ///
    /// Same as [`GridBuilder::add_row`].
    pub fn add_dict_row(&mut self, dict: &Dict) -> Result<&mut Self> {
        let cells = self
            .cols
            .iter()
            .map(|(name, _)| dict.get(name).cloned())
            .collect();
        self.add_row(cells)
    }

    #[must_use]
    pub fn num_cols(&self) -> usize {
        self.cols.len()
    }

    #[must_use]
    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    /// Freezes the builder into a [`Grid`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if no column was declared.
    pub fn build(self) -> Result<Grid> {
        if self.cols.is_empty() {
            return Err(Error::invalid("Grid has no columns"));
        }
        let cols: Cols = self
            .cols
            .into_iter()
            .enumerate()
            .map(|(index, (name, meta))| {
                let col = Col {
                    index,
                    name: name.clone(),
                    meta: meta.into_dict(),
                };
                (name, col)
            })
            .collect();
        let cols = Arc::new(cols);
        let rows = self
            .rows
            .into_iter()
            .map(|cells| Row {
                cols: Arc::clone(&cols),
                cells,
            })
            .collect();
        Ok(Grid {
            meta: self.meta.into_dict(),
            cols,
            rows,
        })
    }
}

/// Builds a grid with one row per dict.
///
/// The columns are the union of all tag names, sorted alphabetically except
/// that `id` comes first and `mod` last. A `None` entry yields a row with
/// every cell blank. With no tag names at all the grid gets the single
/// column `empty`.
///
/// # Examples
///
/// ```rust
/// use serde_haystack::{dicts_to_grid, Dict, DictBuilder, Ref};
///
/// let mut b = DictBuilder::new();
/// b.add("z", 1).unwrap().add("a", 2).unwrap().add_marker("mod").unwrap();
/// b.add("id", Ref::new("x").unwrap()).unwrap();
///
/// let grid = dicts_to_grid(&Dict::empty(), &[Some(b.into_dict()), None]);
/// let names: Vec<_> = grid.cols().map(|c| c.name()).collect();
/// assert_eq!(names, vec!["id", "a", "z", "mod"]);
/// assert!(grid.row(1).unwrap().is_empty());
/// ```
#[must_use]
pub fn dicts_to_grid(meta: &Dict, dicts: &[Option<Dict>]) -> Grid {
    let names: BTreeSet<&str> = dicts.iter().flatten().flat_map(Dict::keys).collect();

    let mut ordered: Vec<&str> = Vec::with_capacity(names.len());
    if names.contains("id") {
        ordered.push("id");
    }
    ordered.extend(names.iter().copied().filter(|n| *n != "id" && *n != "mod"));
    if names.contains("mod") {
        ordered.push("mod");
    }
    if ordered.is_empty() {
        ordered.push("empty");
    }

    let mut b = GridBuilder::new();
    b.set_meta(meta);
    for name in &ordered {
        // names come from validated dict keys
        let _ = b.add_col(*name);
    }
    for dict in dicts {
        let cells = ordered
            .iter()
            .map(|name| dict.as_ref().and_then(|d| d.get(name)).cloned())
            .collect();
        let _ = b.add_row(cells);
    }
    b.build().unwrap_or_else(|_| Grid::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(pairs: &[(&str, Value)]) -> Dict {
        let mut b = DictBuilder::new();
        for (k, v) in pairs {
            b.add(*k, v.clone()).unwrap();
        }
        b.into_dict()
    }

    #[test]
    fn test_no_cols_after_rows() {
        let mut b = GridBuilder::new();
        b.add_col("a").unwrap();
        b.add_row(vec![None]).unwrap();
        assert!(b.add_col("b").is_err());
    }

    #[test]
    fn test_duplicate_and_invalid_cols() {
        let mut b = GridBuilder::new();
        b.add_col("a").unwrap();
        assert!(b.add_col("a").is_err());
        assert!(b.add_col("Bad").is_err());
        assert_eq!(b.num_cols(), 1);
    }

    #[test]
    fn test_wrong_cell_count() {
        let mut b = GridBuilder::new();
        b.add_col("a").unwrap();
        b.add_col("b").unwrap();
        assert!(b.add_row(vec![Some(Value::Marker)]).is_err());
        assert!(b
            .add_row(vec![None, None, Some(Value::Marker)])
            .is_err());
        assert_eq!(b.num_rows(), 0);
    }

    #[test]
    fn test_build_requires_cols() {
        assert!(GridBuilder::new().build().is_err());
    }

    #[test]
    fn test_row_view() {
        let mut b = GridBuilder::new();
        b.add_col("a").unwrap();
        b.add_col("b").unwrap();
        b.add_row(vec![None, Some(Value::from(2))]).unwrap();
        let g = b.build().unwrap();
        let row = g.row(0).unwrap();
        assert_eq!(row.len(), 1);
        assert_eq!(row.iter().collect::<Vec<_>>(), vec![("b", &Value::from(2))]);
        assert_eq!(row.cell(0), None);
        assert!(row.get_checked("a").is_err());
        assert!(row.get_checked("zz").is_err());
        assert_eq!(row.to_dict(), dict(&[("b", Value::from(2))]));
    }

    #[test]
    fn test_row_equality_skips_blank_cells() {
        let mut b1 = GridBuilder::new();
        b1.add_col("a").unwrap();
        b1.add_col("b").unwrap();
        b1.add_row(vec![Some(Value::Marker), None]).unwrap();
        let mut b2 = GridBuilder::new();
        b2.add_col("a").unwrap();
        b2.add_row(vec![Some(Value::Marker)]).unwrap();
        let g1 = b1.build().unwrap();
        let g2 = b2.build().unwrap();
        assert_eq!(g1.row(0), g2.row(0));
        assert_ne!(g1, g2);
    }

    #[test]
    fn test_col_equality_ignores_index() {
        let mut b = GridBuilder::new();
        b.add_col("a").unwrap();
        b.add_col("b").unwrap();
        let g1 = b.build().unwrap();
        let mut b = GridBuilder::new();
        b.add_col("b").unwrap();
        let g2 = b.build().unwrap();
        assert_eq!(g1.col("b"), g2.col("b"));
        assert_ne!(g1.col("b").unwrap().index(), g2.col("b").unwrap().index());
    }

    #[test]
    fn test_col_dis() {
        let mut b = GridBuilder::new();
        b.add_col("a").unwrap().add("dis", "Alpha").unwrap();
        b.add_col("b").unwrap();
        let g = b.build().unwrap();
        assert_eq!(g.col("a").unwrap().dis(), "Alpha");
        assert_eq!(g.col("b").unwrap().dis(), "b");
        assert!(g.col_checked("c").is_err());
    }

    #[test]
    fn test_dicts_to_grid_order() {
        let d = dict(&[
            ("z", Value::from(1)),
            ("id", Value::Ref(Ref::new("x").unwrap())),
            ("a", Value::from(2)),
            ("mod", Value::Marker),
        ]);
        let g = dicts_to_grid(&Dict::empty(), &[Some(d)]);
        let names: Vec<_> = g.cols().map(Col::name).collect();
        assert_eq!(names, vec!["id", "a", "z", "mod"]);
    }

    #[test]
    fn test_dicts_to_grid_union_and_none() {
        let d1 = dict(&[("a", Value::from(1))]);
        let d2 = dict(&[("b", Value::from(2))]);
        let g = dicts_to_grid(&Dict::empty(), &[Some(d1), None, Some(d2)]);
        assert_eq!(g.num_cols(), 2);
        assert_eq!(g.num_rows(), 3);
        assert!(g.row(1).unwrap().is_empty());
        assert_eq!(g.row(2).unwrap().get("a"), None);
        for row in &g {
            assert_eq!(row.cells().len(), g.num_cols());
        }
    }

    #[test]
    fn test_dicts_to_grid_without_tags() {
        let g = dicts_to_grid(&Dict::empty(), &[]);
        assert_eq!(g, Grid::empty());
        let g = dicts_to_grid(&Dict::empty(), &[None]);
        assert_eq!(g.col_at(0).map(Col::name), Some("empty"));
        assert_eq!(g.num_rows(), 1);
    }

    #[test]
    fn test_error_grid() {
        let g = Grid::from_error(&Error::invalid("boom"));
        assert!(g.is_err());
        assert_eq!(g.num_rows(), 1);
        match g.into_result() {
            Err(Error::Call { dis, trace }) => {
                assert!(dis.contains("boom"));
                assert!(trace.is_some());
            }
            other => panic!("expected call error, got {:?}", other),
        }
        assert!(Grid::empty().into_result().is_ok());
    }

    #[test]
    fn test_find_by_ref_and_watch_id() {
        let d = dict(&[("id", Value::Ref(Ref::new("p1").unwrap()))]);
        let mut meta = DictBuilder::new();
        meta.add("watchId", "w-1").unwrap();
        let g = dicts_to_grid(&meta.into_dict(), &[Some(d)]);
        assert!(g.find_by_ref(&Ref::new("p1").unwrap()).is_some());
        assert_eq!(
            g.find_by_ref_checked(&Ref::new("p2").unwrap()).err(),
            Some(Error::UnknownRec("p2".to_string()))
        );
        assert_eq!(g.watch_id(), Ok("w-1"));
        assert!(matches!(
            Grid::empty().watch_id(),
            Err(Error::UnknownWatch(_))
        ));
    }
}
