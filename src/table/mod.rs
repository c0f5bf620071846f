//! Tabular projection of record collections.

mod join;

pub use join::*;

use std::collections::BTreeSet;

use crate::model::ID_FIELD;
use crate::model::Record;
use crate::model::Value;

/// A tabular projection of a collection: rows are records, columns are the
/// union of field names seen across the collection.
///
/// Column order is deterministic: `_id` first (when present), remaining
/// names sorted. Fields missing from an individual record render as
/// [`Value::Null`]. Row order follows record order.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Vec<String>,
    rows: Vec<Vec<Value>>,
}

impl Table {
    pub(crate) fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        Self { columns, rows }
    }

    /// Builds a table from a collection of records.
    pub fn from_records(records: &[Record]) -> Self {
        let mut names: BTreeSet<&str> = BTreeSet::new();
        for record in records {
            names.extend(record.fields().keys().map(String::as_str));
        }

        let mut columns = Vec::with_capacity(names.len());
        if names.remove(ID_FIELD) {
            columns.push(ID_FIELD.to_string());
        }
        columns.extend(names.into_iter().map(str::to_string));

        let rows = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|column| record.get(column).cloned().unwrap_or(Value::Null))
                    .collect()
            })
            .collect();

        Self { columns, rows }
    }

    /// Returns the column names.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Returns the rows, each parallel to [`columns`](Self::columns).
    pub fn rows(&self) -> &[Vec<Value>] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns `true` if the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the position of the named column, if present.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Returns the value at the given row and named column.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        let index = self.column_index(column)?;
        self.rows.get(row).map(|r| &r[index])
    }

    /// Returns a copy of the table without the named columns.
    ///
    /// Unknown names are ignored.
    pub fn without_columns(&self, names: &[&str]) -> Table {
        let kept: Vec<usize> = (0..self.columns.len())
            .filter(|&i| !names.contains(&self.columns[i].as_str()))
            .collect();

        let columns = kept.iter().map(|&i| self.columns[i].clone()).collect();
        let rows = self
            .rows
            .iter()
            .map(|row| kept.iter().map(|&i| row[i].clone()).collect())
            .collect();

        Table { columns, rows }
    }

    pub(crate) fn into_parts(self) -> (Vec<String>, Vec<Vec<Value>>) {
        (self.columns, self.rows)
    }
}
