use crate::error::DyntabError;
use crate::types::{Column, Row, TypeTag, Value};
use std::collections::HashSet;
use tracing::debug;

/// Separator between rendered cells.
const RENDER_SEPARATOR: &str = "|";

/// An ordered-column, ordered-row in-memory record collection.
///
/// Rows are positional: `rows[r].values[c]` belongs to `columns[c]`. Every
/// mutating operation validates fully before touching any state, so a failed
/// call leaves the table exactly as it was.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
    rows: Vec<Row>,
}

impl Table {
    /// Builds an empty table. Fails on repeated column names.
    pub fn new(columns: Vec<Column>) -> Result<Self, DyntabError> {
        let mut seen = HashSet::new();
        for column in &columns {
            if !seen.insert(column.name.as_str()) {
                return Err(DyntabError::DuplicateColumn(column.name.clone()));
            }
        }
        Ok(Self {
            columns,
            rows: Vec::new(),
        })
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn add_column(&mut self, name: &str, data_type: TypeTag) -> Result<(), DyntabError> {
        if self.column_index(name).is_some() {
            return Err(DyntabError::DuplicateColumn(name.to_string()));
        }
        self.columns.push(Column::new(name, data_type));
        for row in &mut self.rows {
            row.values.push(Value::Absent);
        }
        debug!(column = name, rows = self.rows.len(), "added column");
        Ok(())
    }

    pub fn delete_column(&mut self, name: &str) -> Result<(), DyntabError> {
        let idx = self
            .column_index(name)
            .ok_or_else(|| DyntabError::UnknownColumn(name.to_string()))?;
        self.columns.remove(idx);
        for row in &mut self.rows {
            row.values.remove(idx);
        }
        debug!(column = name, rows = self.rows.len(), "deleted column");
        Ok(())
    }

    pub fn add_row(&mut self, values: Vec<Value>) -> Result<(), DyntabError> {
        let row = self.validate(values)?;
        self.rows.push(row);
        Ok(())
    }

    /// Replaces the row at `index` wholesale.
    pub fn update_row(&mut self, index: usize, values: Vec<Value>) -> Result<(), DyntabError> {
        self.check_index(index)?;
        let row = self.validate(values)?;
        self.rows[index] = row;
        Ok(())
    }

    /// Removes the row at `index`; later rows shift down by one.
    pub fn delete_row(&mut self, index: usize) -> Result<Row, DyntabError> {
        self.check_index(index)?;
        Ok(self.rows.remove(index))
    }

    /// Drops every row equal to an earlier one, keeping first occurrences in
    /// their original order. Returns the number of rows removed.
    pub fn remove_duplicates(&mut self) -> usize {
        let before = self.rows.len();
        let mut seen: HashSet<Row> = HashSet::with_capacity(before);
        let mut unique = Vec::with_capacity(before);
        for row in self.rows.drain(..) {
            if !seen.contains(&row) {
                seen.insert(row.clone());
                unique.push(row);
            }
        }
        self.rows = unique;
        let removed = before - self.rows.len();
        debug!(removed, "removed duplicate rows");
        removed
    }

    /// Header line followed by one line per row. Recomputed on every call.
    pub fn render(&self) -> impl Iterator<Item = String> + '_ {
        let header = self
            .column_names()
            .collect::<Vec<_>>()
            .join(RENDER_SEPARATOR);
        std::iter::once(header).chain(self.rows.iter().map(|row| {
            row.values
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join(RENDER_SEPARATOR)
        }))
    }

    fn check_index(&self, index: usize) -> Result<(), DyntabError> {
        if index >= self.rows.len() {
            return Err(DyntabError::IndexOutOfBounds {
                index,
                len: self.rows.len(),
            });
        }
        Ok(())
    }

    fn validate(&self, values: Vec<Value>) -> Result<Row, DyntabError> {
        if values.len() != self.columns.len() {
            return Err(DyntabError::ArityMismatch {
                expected: self.columns.len(),
                actual: values.len(),
            });
        }
        for (column, value) in self.columns.iter().zip(&values) {
            let actual = value.type_tag();
            if actual != Some(column.data_type) {
                return Err(DyntabError::TypeMismatch {
                    column: column.name.clone(),
                    expected: column.data_type,
                    actual,
                });
            }
        }
        Ok(Row::new(values))
    }
}
