use crate::parser::{parse_statement, Statement};
use crate::storage::TableStore;
use crate::types::{Database, DatabaseError, Row};

// Import modular executors
use super::ddl::DdlExecutor;
use super::dml::DmlExecutor;
use super::queries::QueryExecutor;

#[derive(Debug, Clone, PartialEq)]
pub enum QueryResult {
    Rows(Vec<Row>),
    Success { message: String, affected: usize },
}

impl QueryResult {
    /// Result rows of a SELECT; empty for other statements
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        match self {
            Self::Rows(rows) => rows,
            Self::Success { .. } => &[],
        }
    }

    #[must_use]
    pub fn into_rows(self) -> Vec<Row> {
        match self {
            Self::Rows(rows) => rows,
            Self::Success { .. } => Vec::new(),
        }
    }
}

impl<S: TableStore> Database<S> {
    /// Parses and executes one statement.
    ///
    /// Any failure comes back as `DatabaseError::QueryFailed` wrapping the
    /// underlying error.
    pub fn execute(&mut self, sql: &str) -> Result<QueryResult, DatabaseError> {
        tracing::debug!(sql = %sql.trim(), "executing statement");
        self.run_statement(sql).map_err(|e| {
            tracing::debug!(error = %e, "statement failed");
            DatabaseError::QueryFailed(Box::new(e))
        })
    }

    /// Statement path shared by top-level calls and bound subqueries
    pub(crate) fn run_statement(&mut self, sql: &str) -> Result<QueryResult, DatabaseError> {
        match parse_statement(sql)? {
            // DDL operations - delegate to DdlExecutor
            Statement::CreateTable { name, columns } => {
                DdlExecutor::create_table(self, &name, &columns)
            }

            // DML operations - delegate to DmlExecutor
            Statement::Insert {
                table,
                columns,
                values,
            } => DmlExecutor::insert(self, &table, columns.as_deref(), &values),
            Statement::Update {
                table,
                assignments,
                filter,
            } => DmlExecutor::update(self, &table, &assignments, filter.as_ref()),
            Statement::Delete { from, filter } => DmlExecutor::delete(self, &from, filter.as_ref()),

            // Queries - delegate to QueryExecutor
            Statement::Select(query) => QueryExecutor::execute(self, &query).map(QueryResult::Rows),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::types::Value;

    fn setup_test_table() -> Database<MemoryStore> {
        let mut db = Database::new(MemoryStore::new());
        db.execute("CREATE TABLE users (id INTEGER PRIMARY KEY, name VARCHAR(20), age INTEGER)")
            .unwrap();
        db.execute("INSERT INTO users (id, name, age) VALUES (1, 'John', 30)")
            .unwrap();
        db.execute("INSERT INTO users (id, name, age) VALUES (2, 'Jane', 25)")
            .unwrap();
        db
    }

    #[test]
    fn test_execute_create_table() {
        let mut db = Database::new(MemoryStore::new());
        let result = db.execute("CREATE TABLE users (id INTEGER)").unwrap();
        assert!(matches!(result, QueryResult::Success { affected: 0, .. }));
        assert_eq!(db.list_table_names().unwrap(), vec!["users".to_string()]);
    }

    #[test]
    fn test_execute_select() {
        let mut db = setup_test_table();
        let rows = db
            .execute("SELECT * FROM users WHERE age >= 30")
            .unwrap()
            .into_rows();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].value("name"), Value::from("John"));
    }

    #[test]
    fn test_errors_are_wrapped() {
        let mut db = setup_test_table();
        let err = db.execute("SELECT * FROM missing").unwrap_err();
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
        assert!(matches!(err.root(), DatabaseError::Schema(_)));
        assert!(err.to_string().starts_with("Query execution failed: "));
    }

    #[test]
    fn test_clear_all() {
        let mut db = setup_test_table();
        db.clear_all().unwrap();
        assert!(db.list_table_names().unwrap().is_empty());
        assert!(db.execute("SELECT * FROM users").is_err());
    }
}
