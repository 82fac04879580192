use super::TableStore;
use crate::types::{DatabaseError, Row, Schema};
use std::collections::HashMap;

/// Volatile store kept entirely in process memory
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    schema: Schema,
    tables: HashMap<String, Vec<Row>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TableStore for MemoryStore {
    fn load_schema(&self) -> Result<Schema, DatabaseError> {
        Ok(self.schema.clone())
    }

    fn save_schema(&mut self, schema: &Schema) -> Result<(), DatabaseError> {
        self.schema = schema.clone();
        Ok(())
    }

    fn load_table_rows(&self, name: &str) -> Result<Vec<Row>, DatabaseError> {
        Ok(self.tables.get(name).cloned().unwrap_or_default())
    }

    fn save_table_rows(&mut self, name: &str, rows: &[Row]) -> Result<(), DatabaseError> {
        self.tables.insert(name.to_string(), rows.to_vec());
        Ok(())
    }

    fn remove_table(&mut self, name: &str) -> Result<(), DatabaseError> {
        self.tables.remove(name);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Column, TableSchema, Value};

    #[test]
    fn test_rows_are_replaced_wholesale() {
        let mut store = MemoryStore::new();
        assert!(store.load_table_rows("users").unwrap().is_empty());

        let first: Row = [("id", Value::Integer(1))].into_iter().collect();
        let second: Row = [("id", Value::Integer(2))].into_iter().collect();
        store.save_table_rows("users", &[first, second.clone()]).unwrap();
        store.save_table_rows("users", &[second.clone()]).unwrap();
        assert_eq!(store.load_table_rows("users").unwrap(), vec![second]);

        store.remove_table("users").unwrap();
        assert!(store.load_table_rows("users").unwrap().is_empty());
    }

    #[test]
    fn test_schema_round_trip() {
        let mut store = MemoryStore::new();
        let mut schema = Schema::new();
        schema.insert(
            "users".to_string(),
            TableSchema::new(
                "users".to_string(),
                vec![Column::new("id", "INTEGER")],
                Some("id".to_string()),
            ),
        );
        store.save_schema(&schema).unwrap();
        assert_eq!(store.load_schema().unwrap(), schema);
    }
}
