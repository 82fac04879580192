// kvsql - embedded SQL-like query engine over a pluggable table store
// Modular architecture: parser -> executor -> storage collaborator

// Clippy configuration - allow non-critical pedantic warnings
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::manual_let_else)]
#![allow(clippy::option_if_let_else)]
#![allow(clippy::items_after_statements)]

// Core data structures (values, rows, schemas, errors, the database handle)
pub mod core;

// Re-export all core types as types module
pub mod types {
    pub use crate::core::*;
}

// Statement parser (CREATE TABLE, INSERT, SELECT, UPDATE, DELETE)
pub mod parser;

// Statement execution (pipeline, predicates, joins, aggregates, subqueries)
pub mod executor;

// Table store collaborators (in-memory, file-backed)
pub mod storage;

// Configuration for the command-line runner
pub mod settings;

// Re-export commonly used types for convenience
pub use core::{Column, Database, DatabaseError, Row, Schema, TableSchema, Value};
pub use executor::QueryResult;
pub use parser::{parse_statement, split_statements, Statement};
pub use settings::Settings;
pub use storage::{FileStore, MemoryStore, TableStore};
