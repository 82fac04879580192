// Storage module - table schema and row persistence

mod disk;
mod memory;

pub use disk::FileStore;
pub use memory::MemoryStore;

use crate::types::{DatabaseError, Row, Schema};

/// Persistence collaborator for table definitions and row sequences.
///
/// The engine never caches rows across statements: every statement loads the
/// rows it reads and writes back a full replacement sequence for the table it
/// mutates. Any failure is fatal for the current statement.
pub trait TableStore {
    fn load_schema(&self) -> Result<Schema, DatabaseError>;

    fn save_schema(&mut self, schema: &Schema) -> Result<(), DatabaseError>;

    /// Rows of `name`; a table that was never saved has no rows
    fn load_table_rows(&self, name: &str) -> Result<Vec<Row>, DatabaseError>;

    fn save_table_rows(&mut self, name: &str, rows: &[Row]) -> Result<(), DatabaseError>;

    fn remove_table(&mut self, name: &str) -> Result<(), DatabaseError>;
}
