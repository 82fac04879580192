use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use super::column::Column;

/// Whole-database schema: table name -> definition
pub type Schema = BTreeMap<String, TableSchema>;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<Column>,
    pub primary_key: Option<String>,
}

impl TableSchema {
    #[must_use]
    pub const fn new(name: String, columns: Vec<Column>, primary_key: Option<String>) -> Self {
        Self {
            name,
            columns,
            primary_key,
        }
    }

    #[must_use]
    pub fn get_column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}
