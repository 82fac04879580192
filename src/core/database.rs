use std::collections::HashMap;
use super::error::DatabaseError;
use super::row::Row;
use super::table::{Schema, TableSchema};
use crate::storage::TableStore;

/// A database instance bound to one table store.
///
/// Rows are always read through the store; nothing is cached between
/// statements. Derived tables live in `transient` for the duration of the
/// statement that defines them and shadow stored tables of the same name.
pub struct Database<S: TableStore> {
    pub(crate) store: S,
    pub(crate) transient: HashMap<String, Vec<Row>>,
}

impl<S: TableStore> Database<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            transient: HashMap::new(),
        }
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Names of all stored tables, sorted
    pub fn list_table_names(&self) -> Result<Vec<String>, DatabaseError> {
        Ok(self.load_schema()?.into_keys().collect())
    }

    /// Removes every table and its rows
    pub fn clear_all(&mut self) -> Result<(), DatabaseError> {
        let schema = self.load_schema()?;
        for name in schema.keys() {
            self.store
                .remove_table(name)
                .inspect_err(|e| tracing::warn!(table = %name, error = %e, "failed to remove table"))?;
        }
        self.store
            .save_schema(&Schema::new())
            .inspect_err(|e| tracing::warn!(error = %e, "failed to save schema"))?;
        self.transient.clear();
        tracing::debug!(tables = schema.len(), "cleared database");
        Ok(())
    }

    pub(crate) fn load_schema(&self) -> Result<Schema, DatabaseError> {
        self.store
            .load_schema()
            .inspect_err(|e| tracing::warn!(error = %e, "failed to load schema"))
    }

    pub(crate) fn table_schema(&self, name: &str) -> Result<TableSchema, DatabaseError> {
        self.load_schema()?
            .remove(name)
            .ok_or_else(|| DatabaseError::table_not_found(name))
    }

    /// Rows of a table as seen by the running statement: a transient
    /// registration first, then the store.
    pub(crate) fn table_rows(&self, name: &str) -> Result<Vec<Row>, DatabaseError> {
        if let Some(rows) = self.transient.get(name) {
            return Ok(rows.clone());
        }
        if !self.load_schema()?.contains_key(name) {
            return Err(DatabaseError::table_not_found(name));
        }
        self.store
            .load_table_rows(name)
            .inspect_err(|e| tracing::warn!(table = %name, error = %e, "failed to load rows"))
    }

    pub(crate) fn save_rows(&mut self, name: &str, rows: &[Row]) -> Result<(), DatabaseError> {
        self.store
            .save_table_rows(name, rows)
            .inspect_err(|e| tracing::warn!(table = %name, error = %e, "failed to save rows"))
    }

    pub(crate) fn save_schema(&mut self, schema: &Schema) -> Result<(), DatabaseError> {
        self.store
            .save_schema(schema)
            .inspect_err(|e| tracing::warn!(error = %e, "failed to save schema"))
    }
}
