use super::TableStore;
use crate::types::{DatabaseError, Row, Schema};
use std::fs;
use std::path::{Path, PathBuf};

const SCHEMA_FILE: &str = "schema.json";
const TABLES_DIR: &str = "tables";

/// Directory-backed store.
///
/// Layout:
/// - `schema.json`: every table definition, pretty-printed JSON
/// - `tables/<name>.rows`: bincode-encoded row sequence of one table
pub struct FileStore {
    data_dir: PathBuf,
}

impl FileStore {
    pub fn open<P: AsRef<Path>>(data_dir: P) -> Result<Self, DatabaseError> {
        let data_dir = data_dir.as_ref().to_path_buf();
        fs::create_dir_all(data_dir.join(TABLES_DIR))?;
        tracing::debug!(path = %data_dir.display(), "opened file store");
        Ok(Self { data_dir })
    }

    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    fn rows_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(TABLES_DIR).join(format!("{name}.rows"))
    }
}

impl TableStore for FileStore {
    fn load_schema(&self) -> Result<Schema, DatabaseError> {
        let path = self.data_dir.join(SCHEMA_FILE);
        if !path.exists() {
            return Ok(Schema::new());
        }
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    fn save_schema(&mut self, schema: &Schema) -> Result<(), DatabaseError> {
        let encoded = serde_json::to_string_pretty(schema)?;
        fs::write(self.data_dir.join(SCHEMA_FILE), encoded)?;
        Ok(())
    }

    fn load_table_rows(&self, name: &str) -> Result<Vec<Row>, DatabaseError> {
        let path = self.rows_path(name);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data = fs::read(path)?;
        bincode::deserialize(&data).map_err(|e| DatabaseError::BinarySerialization(e.to_string()))
    }

    fn save_table_rows(&mut self, name: &str, rows: &[Row]) -> Result<(), DatabaseError> {
        let encoded = bincode::serialize(rows)
            .map_err(|e| DatabaseError::BinarySerialization(e.to_string()))?;
        fs::write(self.rows_path(name), encoded)?;
        Ok(())
    }

    fn remove_table(&mut self, name: &str) -> Result<(), DatabaseError> {
        let path = self.rows_path(name);
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
