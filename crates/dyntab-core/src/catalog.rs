use crate::error::DyntabError;
use crate::table::Table;
use crate::types::{Column, Row, TypeTag, Value};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Shared handle to one table in a [`Catalog`].
///
/// Each method takes the table's lock for the duration of that single
/// operation, so schema and rows are never observed out of step.
#[derive(Debug, Clone)]
pub struct TableHandle {
    inner: Arc<Mutex<Table>>,
}

impl TableHandle {
    fn new(table: Table) -> Self {
        Self {
            inner: Arc::new(Mutex::new(table)),
        }
    }

    /// Runs `f` against a consistent view of the table.
    pub fn read<R>(&self, f: impl FnOnce(&Table) -> R) -> R {
        f(&self.inner.lock())
    }

    pub fn snapshot(&self) -> Table {
        self.inner.lock().clone()
    }

    pub fn rows(&self) -> Vec<Row> {
        self.inner.lock().rows().to_vec()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }

    pub fn add_column(&self, name: &str, data_type: TypeTag) -> Result<(), DyntabError> {
        self.inner.lock().add_column(name, data_type)
    }

    pub fn delete_column(&self, name: &str) -> Result<(), DyntabError> {
        self.inner.lock().delete_column(name)
    }

    pub fn add_row(&self, values: Vec<Value>) -> Result<(), DyntabError> {
        self.inner.lock().add_row(values)
    }

    pub fn update_row(&self, index: usize, values: Vec<Value>) -> Result<(), DyntabError> {
        self.inner.lock().update_row(index, values)
    }

    pub fn delete_row(&self, index: usize) -> Result<Row, DyntabError> {
        self.inner.lock().delete_row(index)
    }

    pub fn remove_duplicates(&self) -> usize {
        self.inner.lock().remove_duplicates()
    }

    /// Rendered lines, computed under the lock and released afterwards.
    pub fn render(&self) -> std::vec::IntoIter<String> {
        self.read(|table| table.render().collect::<Vec<_>>())
            .into_iter()
    }
}

/// Registry mapping table names to tables.
///
/// The map has its own lock, independent of the per-table locks; it is
/// released before any table lock is taken.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: Mutex<BTreeMap<String, TableHandle>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self {
            tables: Mutex::new(BTreeMap::new()),
        }
    }

    pub fn add_table(&self, name: &str, columns: Vec<Column>) -> Result<TableHandle, DyntabError> {
        let table = Table::new(columns)?;
        let mut tables = self.tables.lock();
        if tables.contains_key(name) {
            return Err(DyntabError::DuplicateTable(name.to_string()));
        }
        let handle = TableHandle::new(table);
        tables.insert(name.to_string(), handle.clone());
        debug!(table = name, "created table");
        Ok(handle)
    }

    pub fn remove_table(&self, name: &str) -> Result<(), DyntabError> {
        self.tables
            .lock()
            .remove(name)
            .ok_or_else(|| DyntabError::UnknownTable(name.to_string()))?;
        debug!(table = name, "removed table");
        Ok(())
    }

    pub fn get_table(&self, name: &str) -> Result<TableHandle, DyntabError> {
        self.tables
            .lock()
            .get(name)
            .cloned()
            .ok_or_else(|| DyntabError::UnknownTable(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tables.lock().contains_key(name)
    }

    /// `(name, handle)` pairs in ascending name order, taken from a snapshot
    /// of the map.
    pub fn list_tables(&self) -> impl Iterator<Item = (String, TableHandle)> {
        let snapshot: Vec<_> = self
            .tables
            .lock()
            .iter()
            .map(|(name, handle)| (name.clone(), handle.clone()))
            .collect();
        snapshot.into_iter()
    }

    pub fn table_names(&self) -> Vec<String> {
        self.tables.lock().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.tables.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.lock().is_empty()
    }
}
