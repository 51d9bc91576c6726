//! In-memory tabular record sets.
//!
//! A [`Table`] is an ordered, column-named, row-major set of [`Cell`]s. Tables
//! are built once and never mutated; every operation returns a new table, and
//! row order is always preserved.

use std::borrow::Cow;
use std::collections::HashMap;
use std::ops::Range;

use crate::error::{ExportError, Result};

/// A single typed value.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Cell {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

/// Hashable form of a cell used as a join key. Integral floats collapse onto
/// integers so `1` and `1.0` join.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum JoinKey {
    Bool(bool),
    Int(i64),
    FloatBits(u64),
    Text(String),
}

impl Cell {
    pub fn text(value: impl Into<String>) -> Self {
        Cell::Text(value.into())
    }

    /// Null and NaN both count as missing.
    pub fn is_null(&self) -> bool {
        match self {
            Cell::Null => true,
            Cell::Float(f) => f.is_nan(),
            _ => false,
        }
    }

    /// Text form of a present value, `None` for a missing one.
    pub fn as_text(&self) -> Option<Cow<'_, str>> {
        if self.is_null() {
            return None;
        }
        Some(match self {
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
            other => Cow::Owned(other.to_csv_field().into_owned()),
        })
    }

    /// Render the cell the way a dataframe CSV export does: missing values are
    /// empty, booleans are `True`/`False`, integral floats keep a `.0`.
    pub fn to_csv_field(&self) -> Cow<'_, str> {
        match self {
            Cell::Null => Cow::Borrowed(""),
            Cell::Bool(true) => Cow::Borrowed("True"),
            Cell::Bool(false) => Cow::Borrowed("False"),
            Cell::Int(i) => Cow::Owned(i.to_string()),
            Cell::Float(f) => Cow::Owned(format_float(*f)),
            Cell::Text(s) => Cow::Borrowed(s.as_str()),
        }
    }

    pub fn join_key(&self) -> Option<JoinKey> {
        match self {
            Cell::Null => None,
            Cell::Bool(b) => Some(JoinKey::Bool(*b)),
            Cell::Int(i) => Some(JoinKey::Int(*i)),
            Cell::Float(f) if f.is_nan() => None,
            Cell::Float(f) if f.fract() == 0.0 && f.abs() < 9.0e15 => Some(JoinKey::Int(*f as i64)),
            Cell::Float(f) => Some(JoinKey::FloatBits(f.to_bits())),
            Cell::Text(s) => Some(JoinKey::Text(s.clone())),
        }
    }
}

/// Shortest round-trip form, switching to `1e-05` / `2.5e+16` notation
/// below 1e-4 and from 1e16 upwards.
fn format_float(f: f64) -> String {
    if f.is_nan() {
        return String::new();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf".to_string() } else { "-inf".to_string() };
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0".to_string() } else { "0.0".to_string() };
    }

    let scientific = format!("{:e}", f);
    let (mantissa, exponent) = match scientific.split_once('e') {
        Some((m, e)) => (m, e.parse::<i32>().unwrap_or(0)),
        None => (scientific.as_str(), 0),
    };
    if !(-4..16).contains(&exponent) {
        let sign = if exponent < 0 { '-' } else { '+' };
        format!("{}e{}{:02}", mantissa, sign, exponent.abs())
    } else if f.fract() == 0.0 {
        format!("{:.1}", f)
    } else {
        f.to_string()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    name: String,
    columns: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl Table {
    /// Build a table, checking that every row has one cell per column.
    pub fn new(name: impl Into<String>, columns: Vec<String>, rows: Vec<Vec<Cell>>) -> Result<Self> {
        let name = name.into();
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != columns.len()) {
            return Err(ExportError::RowWidth {
                table: name,
                row: i,
                expected: columns.len(),
                found: row.len(),
            });
        }
        Ok(Self { name, columns, rows })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Result<usize> {
        self.columns
            .iter()
            .position(|c| c == column)
            .ok_or_else(|| ExportError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Cells of one column, top to bottom.
    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = &Cell> + '_> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |r| &r[idx]))
    }

    /// Rows in `range`, clamped to the table length.
    pub fn row_range(&self, range: Range<usize>) -> &[Vec<Cell>] {
        let end = range.end.min(self.rows.len());
        let start = range.start.min(end);
        &self.rows[start..end]
    }

    /// Select `(source, target)` columns in the given order, renaming each.
    pub fn project(&self, mapping: &[(&str, &str)]) -> Result<Table> {
        let indices = mapping
            .iter()
            .map(|(src, _)| self.column_index(src))
            .collect::<Result<Vec<_>>>()?;
        let columns = mapping.iter().map(|(_, dst)| dst.to_string()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| indices.iter().map(|&i| row[i].clone()).collect())
            .collect();
        Ok(Table {
            name: self.name.clone(),
            columns,
            rows,
        })
    }

    /// Like [`Table::project`], but moves cells out of `self` instead of
    /// cloning them.
    pub fn into_projected(self, mapping: &[(&str, &str)]) -> Result<Table> {
        let indices = mapping
            .iter()
            .map(|(src, _)| self.column_index(src))
            .collect::<Result<Vec<_>>>()?;
        // A source column selected twice can only be moved once.
        if indices.iter().enumerate().any(|(i, idx)| indices[..i].contains(idx)) {
            return self.project(mapping);
        }
        let columns = mapping.iter().map(|(_, dst)| dst.to_string()).collect();
        let rows = self
            .rows
            .into_iter()
            .map(|mut row| indices.iter().map(|&i| std::mem::take(&mut row[i])).collect())
            .collect();
        Ok(Table {
            name: self.name,
            columns,
            rows,
        })
    }

    /// Consume the table, appending `cells` as a new trailing column.
    pub fn with_column(self, column: impl Into<String>, cells: Vec<Cell>) -> Result<Table> {
        let column = column.into();
        if cells.len() != self.rows.len() {
            return Err(ExportError::RowWidth {
                table: format!("{}.{}", self.name, column),
                row: cells.len().min(self.rows.len()),
                expected: self.rows.len(),
                found: cells.len(),
            });
        }
        let Table {
            name,
            mut columns,
            rows,
        } = self;
        columns.push(column);
        let rows = rows
            .into_iter()
            .zip(cells)
            .map(|(mut row, cell)| {
                row.push(cell);
                row
            })
            .collect();
        Ok(Table { name, columns, rows })
    }

    /// Inner join on `self.left_on == right.right_on`.
    ///
    /// Output follows the left table's row order; a left row with several
    /// matches emits them in the right table's order. Null keys never match.
    /// Result columns are all left columns followed by all right columns, with
    /// clashing names suffixed `_x` (left) and `_y` (right).
    pub fn inner_join(&self, left_on: &str, right: &Table, right_on: &str) -> Result<Table> {
        let left_idx = self.column_index(left_on)?;
        let right_idx = right.column_index(right_on)?;

        let mut index: HashMap<JoinKey, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            if let Some(key) = row[right_idx].join_key() {
                index.entry(key).or_default().push(i);
            }
        }

        let mut columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| {
                if right.columns.contains(c) {
                    format!("{}_x", c)
                } else {
                    c.clone()
                }
            })
            .collect();
        columns.extend(right.columns.iter().map(|c| {
            if self.columns.contains(c) {
                format!("{}_y", c)
            } else {
                c.clone()
            }
        }));

        let mut rows = Vec::new();
        for row in &self.rows {
            let Some(key) = row[left_idx].join_key() else {
                continue;
            };
            if let Some(matches) = index.get(&key) {
                for &m in matches {
                    let mut joined = Vec::with_capacity(columns.len());
                    joined.extend(row.iter().cloned());
                    joined.extend(right.rows[m].iter().cloned());
                    rows.push(joined);
                }
            }
        }

        Ok(Table {
            name: format!("{}_{}", self.name, right.name),
            columns,
            rows,
        })
    }
}
