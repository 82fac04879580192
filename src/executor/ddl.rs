/// DDL (Data Definition Language) operations
///
/// CREATE TABLE only. Tables are never altered or dropped individually;
/// `Database::clear_all` removes all of them.

use crate::parser::ColumnDef;
use crate::storage::TableStore;
use crate::types::{Column, Database, DatabaseError, TableSchema};
use std::collections::HashSet;
use super::dispatcher::QueryResult;

pub struct DdlExecutor;

impl DdlExecutor {
    /// Execute CREATE TABLE statement
    ///
    /// Validates:
    /// - the table name is not taken
    /// - column names are unique
    /// - at most one column is the primary key
    pub fn create_table<S: TableStore>(
        db: &mut Database<S>,
        name: &str,
        column_defs: &[ColumnDef],
    ) -> Result<QueryResult, DatabaseError> {
        let mut schema = db.load_schema()?;
        if schema.contains_key(name) {
            return Err(DatabaseError::Schema(format!("Table '{name}' already exists")));
        }

        let mut seen = HashSet::new();
        if let Some(dup) = column_defs.iter().find(|def| !seen.insert(def.name.as_str())) {
            return Err(DatabaseError::Schema(format!(
                "column '{}' is defined more than once in table '{name}'",
                dup.name
            )));
        }

        let mut keys = column_defs.iter().filter(|def| def.primary_key);
        let primary_key = keys.next().map(|def| def.name.clone());
        if keys.next().is_some() {
            return Err(DatabaseError::Schema(format!(
                "table '{name}' declares more than one PRIMARY KEY"
            )));
        }

        let columns: Vec<Column> = column_defs
            .iter()
            .map(|def| Column::new(def.name.clone(), def.type_name.clone()))
            .collect();

        schema.insert(
            name.to_string(),
            TableSchema::new(name.to_string(), columns, primary_key),
        );
        // Rows first: a table is visible only once its schema is saved
        db.save_rows(name, &[])?;
        if let Err(e) = db.save_schema(&schema) {
            if let Err(cleanup) = db.store.remove_table(name) {
                tracing::warn!(table = name, error = %cleanup, "failed to remove rows of uncreated table");
            }
            return Err(e);
        }

        tracing::debug!(table = name, columns = column_defs.len(), "created table");
        Ok(QueryResult::Success {
            message: format!("Table '{name}' created"),
            affected: 0,
        })
    }
}
