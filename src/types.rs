// Dynamic table model.
//
// The source CSVs have no fixed schema: the column set is data-driven and can
// change between exports. Instead of deserializing into fixed structs, a
// `Table` is an ordered list of named columns plus rows of `Value` cells, and
// every transformation checks column presence at runtime.
use chrono::NaiveDate;
use serde::Serialize;

/// A single cell. `Missing` is distinct from an empty string or zero.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
    Date(NaiveDate),
    Missing,
}

impl Value {
    pub fn is_missing(&self) -> bool {
        matches!(self, Value::Missing)
    }

    /// Numeric view of the cell. Only `Number` qualifies; text that merely
    /// looks numeric must go through an explicit parse first.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Text rendering used for display, CSV export and re-parsing.
    /// `Missing` renders as the empty string.
    pub fn render(&self) -> String {
        match self {
            Value::Text(s) => s.clone(),
            Value::Number(n) => format!("{}", n),
            Value::Date(d) => d.format("%Y-%m-%d").to_string(),
            Value::Missing => String::new(),
        }
    }

    /// Join/group key for this cell, or `None` for `Missing`. A missing key
    /// never matches anything, so rows with missing keys drop out of joins
    /// and groupings instead of clustering together.
    pub fn key(&self) -> Option<String> {
        match self {
            Value::Missing => None,
            Value::Number(n) => Some(format!("n{:?}", n)),
            Value::Text(s) => Some(format!("t{}", s)),
            Value::Date(d) => Some(format!("d{}", d)),
        }
    }
}

/// Rough runtime type of a column, derived by scanning its cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-missing cell is text (and there is at least one).
    Text,
    /// Every non-missing cell is numeric (and there is at least one).
    Number,
    /// Every non-missing cell is a date (and there is at least one).
    Date,
    /// No non-missing cells at all.
    Empty,
    /// A mixture of cell types.
    Mixed,
}

#[derive(Debug, Clone, Default)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub fn new(columns: Vec<String>) -> Self {
        Table { columns, rows: Vec::new() }
    }

    /// A table with no columns and no rows, used as the "soft failure"
    /// result when expected columns are absent.
    pub fn empty() -> Self {
        Table::default()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [Vec<Value>] {
        &mut self.rows
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Append a row, padding with `Missing` or truncating so its width
    /// always matches the header.
    pub fn push_row(&mut self, mut row: Vec<Value>) {
        row.resize(self.columns.len(), Value::Missing);
        self.rows.push(row);
    }

    pub fn rename_column(&mut self, from: &str, to: &str) {
        if let Some(idx) = self.column_index(from) {
            self.columns[idx] = to.to_string();
        }
    }

    /// Replace the named column's cells, or append it as a new column.
    /// `values` must have one entry per row.
    pub fn set_column(&mut self, name: &str, values: Vec<Value>) {
        debug_assert_eq!(values.len(), self.rows.len());
        match self.column_index(name) {
            Some(idx) => {
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row[idx] = value;
                }
            }
            None => {
                self.columns.push(name.to_string());
                for (row, value) in self.rows.iter_mut().zip(values) {
                    row.push(value);
                }
            }
        }
    }

    /// Runtime type of the named column; `None` if the column is absent.
    pub fn column_kind(&self, name: &str) -> Option<ColumnKind> {
        let idx = self.column_index(name)?;
        let mut kind = ColumnKind::Empty;
        for row in &self.rows {
            let cell = match &row[idx] {
                Value::Missing => continue,
                Value::Text(_) => ColumnKind::Text,
                Value::Number(_) => ColumnKind::Number,
                Value::Date(_) => ColumnKind::Date,
            };
            kind = match kind {
                ColumnKind::Empty => cell,
                k if k == cell => k,
                _ => return Some(ColumnKind::Mixed),
            };
        }
        Some(kind)
    }

    /// Remove rows that are exact duplicates of an earlier row, keeping the
    /// first occurrence. Only cell-for-cell identical rows are dropped.
    pub fn dedup_rows(&mut self) {
        let mut seen = std::collections::HashSet::new();
        self.rows.retain(|row| seen.insert(row_key(row)));
    }
}

// One key entry per cell, compared structurally. Concatenating cell keys
// into a single string would let text containing the separator collide
// across column boundaries.
fn row_key(row: &[Value]) -> Vec<Option<String>> {
    row.iter().map(Value::key).collect()
}

/// Global KPI stats over the cleaned table, exported as `summary.json`.
#[derive(Debug, Serialize)]
pub struct SummaryStats {
    pub total_listings: usize,
    pub avg_nightly_price: Option<f64>,
    pub avg_occupancy_days: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dedup_drops_only_identical_rows() {
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![Value::Text("x".into()), Value::Number(1.0)]);
        table.push_row(vec![Value::Text("x".into()), Value::Number(1.0)]);
        table.push_row(vec![Value::Text("x".into()), Value::Number(2.0)]);
        table.push_row(vec![Value::Text("x".into()), Value::Missing]);
        table.dedup_rows();
        assert_eq!(table.n_rows(), 3);
    }

    #[test]
    fn dedup_respects_cell_boundaries() {
        // Cell text that embeds another cell's key material must not make
        // two different rows compare equal.
        let mut table = Table::new(vec!["a".into(), "b".into()]);
        table.push_row(vec![Value::Text("a\u{1f}tb".into()), Value::Text("c".into())]);
        table.push_row(vec![Value::Text("a".into()), Value::Text("b\u{1f}tc".into())]);
        table.dedup_rows();
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn missing_is_not_empty_text() {
        let mut table = Table::new(vec!["a".into()]);
        table.push_row(vec![Value::Text(String::new())]);
        table.push_row(vec![Value::Missing]);
        table.dedup_rows();
        assert_eq!(table.n_rows(), 2);
    }

    #[test]
    fn set_column_replaces_in_place() {
        let mut table = Table::new(vec!["a".into()]);
        table.push_row(vec![Value::Text("1".into())]);
        table.set_column("a", vec![Value::Number(1.0)]);
        assert_eq!(table.columns().len(), 1);
        assert_eq!(table.rows()[0][0], Value::Number(1.0));
    }

    #[test]
    fn column_kind_scans_cells() {
        let mut table = Table::new(vec!["a".into(), "b".into(), "c".into()]);
        table.push_row(vec![Value::Number(1.0), Value::Text("x".into()), Value::Missing]);
        table.push_row(vec![Value::Missing, Value::Number(2.0), Value::Missing]);
        assert_eq!(table.column_kind("a"), Some(ColumnKind::Number));
        assert_eq!(table.column_kind("b"), Some(ColumnKind::Mixed));
        assert_eq!(table.column_kind("c"), Some(ColumnKind::Empty));
        assert_eq!(table.column_kind("nope"), None);
    }
}
