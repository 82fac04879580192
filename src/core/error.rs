use thiserror::Error;

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Syntax error: {0}")]
    Syntax(String),
    #[error("Schema error: {0}")]
    Schema(String),
    #[error("Arity error: {0}")]
    Arity(String),
    #[error("Evaluation error: {0}")]
    Evaluation(String),
    #[error("Evaluation error: subquery failed: {0}")]
    Subquery(#[source] Box<DatabaseError>),
    #[error("Unsupported: {0}")]
    Unsupported(String),
    #[error("Storage error: {0}")]
    Store(String),
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Binary Serialization error: {0}")]
    BinarySerialization(String),
    #[error("Query execution failed: {0}")]
    QueryFailed(#[source] Box<DatabaseError>),
}

impl DatabaseError {
    /// Table reference that does not resolve
    pub fn table_not_found(name: &str) -> Self {
        Self::Schema(format!("Table '{name}' not found"))
    }

    /// Strips the `QueryFailed` wrapper, if any
    #[must_use]
    pub fn root(&self) -> &Self {
        match self {
            Self::QueryFailed(inner) => inner.root(),
            other => other,
        }
    }
}
