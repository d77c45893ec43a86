//! Column-oriented in-memory table.
//!
//! A [`Table`] keeps, next to its columns, the load-time row identity of each
//! row ([`Table::row_index`]). Row selections preserve these identities, which
//! is what keeps the customer and probability datasets aligned after
//! filtering.

use std::{collections::BTreeSet, fmt};

/// Typed values of a single column. `None` marks a missing cell.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnValues {
    Integer(Vec<Option<i64>>),
    Float(Vec<Option<f64>>),
    Text(Vec<Option<String>>),
}

impl ColumnValues {
    fn len(&self) -> usize {
        match self {
            Self::Integer(v) => v.len(),
            Self::Float(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }

    fn select(&self, positions: &[usize]) -> Self {
        match self {
            Self::Integer(v) => Self::Integer(positions.iter().map(|&p| v[p]).collect()),
            Self::Float(v) => Self::Float(positions.iter().map(|&p| v[p]).collect()),
            Self::Text(v) => Self::Text(positions.iter().map(|&p| v[p].clone()).collect()),
        }
    }
}

/// A borrowed view of one cell.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell<'a> {
    Integer(i64),
    Float(f64),
    Text(&'a str),
    Missing,
}

impl Cell<'_> {
    /// Numeric value of the cell, if it holds one.
    #[expect(clippy::cast_precision_loss)]
    #[must_use]
    pub fn as_f64(self) -> Option<f64> {
        match self {
            Self::Integer(v) => Some(v as f64),
            Self::Float(v) => Some(v),
            Self::Text(_) | Self::Missing => None,
        }
    }

    #[must_use]
    pub fn is_missing(self) -> bool {
        matches!(self, Self::Missing)
    }

    /// String form used by discrete-set filters.
    ///
    /// Floats always carry a fractional part (`2.0`), missing cells render
    /// as `nan`.
    #[must_use]
    pub fn render(self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Cell<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(v) => write!(f, "{v}"),
            Self::Float(v) => fmt::Display::fmt(&render_float(*v), f),
            Self::Text(s) => fmt::Display::fmt(s, f),
            Self::Missing => f.write_str("nan"),
        }
    }
}

pub(crate) fn render_float(v: f64) -> String {
    if v.is_nan() {
        return "nan".to_owned();
    }
    if v.is_infinite() {
        return if v > 0.0 { "inf" } else { "-inf" }.to_owned();
    }
    let s = v.to_string();
    if s.contains('.') { s } else { format!("{s}.0") }
}

/// A named column.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    values: ColumnValues,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn integer<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<i64>>,
    {
        Self::new(name, ColumnValues::Integer(values.into_iter().collect()))
    }

    pub fn float<I>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<f64>>,
    {
        Self::new(name, ColumnValues::Float(values.into_iter().collect()))
    }

    pub fn text<I, S>(name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = Option<S>>,
        S: Into<String>,
    {
        Self::new(
            name,
            ColumnValues::Text(values.into_iter().map(|v| v.map(Into::into)).collect()),
        )
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether the column holds integer or float values.
    #[must_use]
    pub fn is_numeric(&self) -> bool {
        matches!(
            self.values,
            ColumnValues::Integer(_) | ColumnValues::Float(_)
        )
    }

    /// Returns the cell at a row position.
    ///
    /// # Panics
    ///
    /// Panics if `row` is out of bounds.
    #[must_use]
    pub fn get(&self, row: usize) -> Cell<'_> {
        match &self.values {
            ColumnValues::Integer(v) => v[row].map_or(Cell::Missing, Cell::Integer),
            ColumnValues::Float(v) => v[row].map_or(Cell::Missing, Cell::Float),
            ColumnValues::Text(v) => v[row].as_deref().map_or(Cell::Missing, Cell::Text),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell<'_>> + '_ {
        (0..self.len()).map(|row| self.get(row))
    }

    /// Non-missing numeric values of the column.
    pub fn numbers(&self) -> impl Iterator<Item = f64> + '_ {
        self.cells().filter_map(Cell::as_f64)
    }

    /// Sorted distinct rendered values, including `nan` when cells are missing.
    #[must_use]
    pub fn rendered_domain(&self) -> Vec<String> {
        self.cells()
            .map(Cell::render)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Number of distinct non-missing values.
    #[must_use]
    pub fn distinct_count(&self) -> usize {
        self.cells()
            .filter(|c| !c.is_missing())
            .map(Cell::render)
            .collect::<BTreeSet<_>>()
            .len()
    }

    /// Observed `(min, max)` over non-missing numeric values.
    #[must_use]
    pub fn numeric_range(&self) -> Option<(f64, f64)> {
        self.numbers().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        })
    }

    fn select(&self, positions: &[usize]) -> Self {
        Self {
            name: self.name.clone(),
            values: self.values.select(positions),
        }
    }
}

/// An ordered set of equally long columns plus the identity of every row.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    row_index: Vec<usize>,
    columns: Vec<Column>,
}

impl Table {
    /// Creates a table whose row identities are the positions `0..n`.
    ///
    /// # Panics
    ///
    /// Panics if the columns differ in length.
    #[must_use]
    pub fn new(columns: Vec<Column>) -> Self {
        let rows = columns.first().map_or(0, Column::len);
        assert!(
            columns.iter().all(|c| c.len() == rows),
            "all columns must have the same length"
        );
        Self {
            row_index: (0..rows).collect(),
            columns,
        }
    }

    #[must_use]
    pub fn row_count(&self) -> usize {
        self.row_index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_index.is_empty()
    }

    /// Load-time identity of each row, in row order.
    #[must_use]
    pub fn row_index(&self) -> &[usize] {
        &self.row_index
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(Column::name)
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Returns a copy of the table with the same-named column replaced, or
    /// the column appended if the name is new.
    ///
    /// # Panics
    ///
    /// Panics if the column length differs from the row count.
    #[must_use]
    pub fn with_column(mut self, column: Column) -> Self {
        assert_eq!(column.len(), self.row_count(), "column length mismatch");
        match self.column_position(&column.name) {
            Some(pos) => self.columns[pos] = column,
            None => self.columns.push(column),
        }
        self
    }

    /// Keeps only the rows at the given positions, in that order.
    ///
    /// Row identities travel with the rows.
    #[must_use]
    pub fn select_rows(&self, positions: &[usize]) -> Self {
        Self {
            row_index: positions.iter().map(|&p| self.row_index[p]).collect(),
            columns: self.columns.iter().map(|c| c.select(positions)).collect(),
        }
    }
}
