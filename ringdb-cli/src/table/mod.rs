//! In-memory tabular datasets
//!
//! Every sheet the engine touches is held as a [`Table`]: an ordered list of
//! column names plus rows of [`Value`] cells aligned to those columns.
//! Rows are addressed by position; splice operations rebuild row ranges
//! rather than mutating cells behind a reader's back.

mod value;

pub use value::*;

use serde::Serialize;

static NULL: Value = Value::Null;

/// Ordered columns and rows of cells
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    /// Create an empty table with the given columns
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Table {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: Vec::new(),
        }
    }

    /// Create a table from raw rows; rows are padded or truncated to the column count
    pub fn from_rows<S: Into<String>>(
        columns: impl IntoIterator<Item = S>,
        rows: Vec<Vec<Value>>,
    ) -> Self {
        let mut table = Table::new(columns);
        for row in rows {
            table.push_row(row);
        }
        table
    }

    /// An empty table sharing this table's columns
    pub fn empty_like(&self) -> Self {
        Table::new(self.columns.iter().cloned())
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Exact column lookup
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn row(&self, idx: usize) -> Option<&[Value]> {
        self.rows.get(idx).map(|r| r.as_slice())
    }

    /// Cell by row position and column name; missing cells read as null
    pub fn cell(&self, row: usize, column: &str) -> &Value {
        match (self.rows.get(row), self.column_index(column)) {
            (Some(r), Some(c)) => r.get(c).unwrap_or(&NULL),
            _ => &NULL,
        }
    }

    /// Set a cell; returns false when the column does not exist
    pub fn set(&mut self, row: usize, column: &str, value: impl Into<Value>) -> bool {
        let Some(col) = self.column_index(column) else {
            return false;
        };
        match self.rows.get_mut(row) {
            Some(r) => {
                r[col] = value.into();
                true
            }
            None => false,
        }
    }

    /// Append a row, padding or truncating it to the column count
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Null);
        self.rows.push(row);
    }

    /// Append a column filled with nulls (no-op when it already exists)
    pub fn add_column(&mut self, name: impl Into<String>) {
        let name = name.into();
        if self.has_column(&name) {
            return;
        }
        self.columns.push(name);
        for row in &mut self.rows {
            row.push(Value::Null);
        }
    }

    /// Rename a column; returns false when `from` does not exist
    pub fn rename_column(&mut self, from: &str, to: impl Into<String>) -> bool {
        match self.column_index(from) {
            Some(idx) => {
                self.columns[idx] = to.into();
                true
            }
            None => false,
        }
    }

    /// Replace the header row wholesale (length must match)
    pub(crate) fn set_columns(&mut self, columns: Vec<String>) {
        debug_assert_eq!(columns.len(), self.columns.len());
        self.columns = columns;
    }

    /// Keep only the columns whose index satisfies the predicate
    pub(crate) fn retain_columns(&mut self, mut keep: impl FnMut(usize, &str) -> bool) {
        let kept: Vec<usize> = self
            .columns
            .iter()
            .enumerate()
            .filter(|(i, c)| keep(*i, c))
            .map(|(i, _)| i)
            .collect();
        self.columns = kept.iter().map(|&i| self.columns[i].clone()).collect();
        for row in &mut self.rows {
            let narrowed: Vec<Value> = kept.iter().map(|&i| row[i].clone()).collect();
            *row = narrowed;
        }
    }

    /// Keep only the rows satisfying the predicate
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[Value]) -> bool) {
        self.rows.retain(|r| keep(r));
    }

    /// Drop the first `n` rows
    pub(crate) fn drop_leading_rows(&mut self, n: usize) {
        let n = n.min(self.rows.len());
        self.rows.drain(..n);
    }

    /// Positions of rows whose cell in `column` has the given identifier key
    pub fn positions_with_key(&self, column: &str, key: &str) -> Vec<usize> {
        let Some(col) = self.column_index(column) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, r)| r[col].key().as_deref() == Some(key))
            .map(|(i, _)| i)
            .collect()
    }

    /// Distinct identifier keys of a column, in first-appearance order
    pub fn unique_keys(&self, column: &str) -> Vec<String> {
        let Some(col) = self.column_index(column) else {
            return Vec::new();
        };
        let mut seen = std::collections::HashSet::new();
        self.rows
            .iter()
            .filter_map(|r| r[col].key())
            .filter(|k| seen.insert(k.clone()))
            .collect()
    }

    /// Replace a group of rows with new rows.
    ///
    /// The new rows are placed where the first listed position was; the
    /// remaining positions are removed. With an empty group the new rows are
    /// appended at the end.
    pub fn replace_rows(&mut self, positions: &[usize], new_rows: Vec<Vec<Value>>) {
        let width = self.columns.len();
        let new_rows: Vec<Vec<Value>> = new_rows
            .into_iter()
            .map(|mut r| {
                r.resize(width, Value::Null);
                r
            })
            .collect();

        let Some(&anchor) = positions.iter().min() else {
            self.rows.extend(new_rows);
            return;
        };

        let removed: std::collections::HashSet<usize> = positions.iter().copied().collect();
        let old = std::mem::take(&mut self.rows);
        let mut rebuilt = Vec::with_capacity(old.len() + new_rows.len());
        let mut pending = Some(new_rows);
        for (idx, row) in old.into_iter().enumerate() {
            if idx == anchor {
                if let Some(rows) = pending.take() {
                    rebuilt.extend(rows);
                }
            }
            if !removed.contains(&idx) {
                rebuilt.push(row);
            }
        }
        if let Some(rows) = pending {
            rebuilt.extend(rows);
        }
        self.rows = rebuilt;
    }

    /// Remove the rows at the given positions
    pub fn remove_rows(&mut self, positions: &[usize]) {
        self.replace_rows(positions, Vec::new());
    }

    /// Append rows of another table, aligning columns by exact name
    pub fn append_aligned(&mut self, other: &Table) {
        let mapping: Vec<Option<usize>> = self
            .columns
            .iter()
            .map(|c| other.column_index(c))
            .collect();
        for row in &other.rows {
            let aligned = mapping
                .iter()
                .map(|m| m.and_then(|i| row.get(i).cloned()).unwrap_or_default())
                .collect();
            self.rows.push(aligned);
        }
    }

    /// Write 1..=n into a column, if present
    pub fn renumber(&mut self, column: &str) {
        if let Some(col) = self.column_index(column) {
            for (i, row) in self.rows.iter_mut().enumerate() {
                row[col] = Value::Int(i as i64 + 1);
            }
        }
    }
}
