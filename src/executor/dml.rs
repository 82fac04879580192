/// DML (Data Manipulation Language) operations
///
/// INSERT, UPDATE, DELETE against one table's row sequence. Each statement
/// evaluates its WHERE clause against every row before anything changes,
/// then persists the full replacement sequence exactly once.

use crate::parser::Predicate;
use crate::storage::TableStore;
use crate::types::{Database, DatabaseError, Row, TableSchema, Value};
use super::conditions::ConditionEvaluator;
use super::dispatcher::QueryResult;

pub struct DmlExecutor;

impl DmlExecutor {
    /// Execute INSERT statement
    ///
    /// Without a column list the values follow the declared column order.
    pub fn insert<S: TableStore>(
        db: &mut Database<S>,
        table: &str,
        columns: Option<&[String]>,
        values: &[Value],
    ) -> Result<QueryResult, DatabaseError> {
        let schema = db.table_schema(table)?;

        let names: Vec<String> = match columns {
            Some(cols) => {
                for col in cols {
                    Self::check_column(&schema, col)?;
                }
                cols.iter()
                    .map(|col| Self::bare_column(table, col).to_string())
                    .collect()
            }
            None => schema.column_names().map(str::to_string).collect(),
        };

        if names.len() != values.len() {
            return Err(DatabaseError::Arity(format!(
                "table '{table}' expects {} values, got {}",
                names.len(),
                values.len()
            )));
        }

        let row: Row = names.into_iter().zip(values.iter().cloned()).collect();

        let mut rows = db.table_rows(table)?;
        rows.push(row);
        db.save_rows(table, &rows)?;

        Ok(QueryResult::Success {
            message: "1 row inserted".to_string(),
            affected: 1,
        })
    }

    /// Execute UPDATE statement
    pub fn update<S: TableStore>(
        db: &mut Database<S>,
        table: &str,
        assignments: &[(String, Value)],
        filter: Option<&Predicate>,
    ) -> Result<QueryResult, DatabaseError> {
        let schema = db.table_schema(table)?;
        for (col, _) in assignments {
            Self::check_column(&schema, col)?;
        }

        let mut rows = db.table_rows(table)?;
        let matched = Self::matching(db, table, &rows, filter)?;

        let mut updated = 0;
        for (row, _) in rows.iter_mut().zip(&matched).filter(|&(_, &m)| m) {
            for (col, value) in assignments {
                row.set(Self::bare_column(table, col), value.clone());
            }
            updated += 1;
        }

        db.save_rows(table, &rows)?;
        Ok(QueryResult::Success {
            message: Self::summary(updated, "updated"),
            affected: updated,
        })
    }

    /// Execute DELETE statement; no WHERE removes every row
    pub fn delete<S: TableStore>(
        db: &mut Database<S>,
        table: &str,
        filter: Option<&Predicate>,
    ) -> Result<QueryResult, DatabaseError> {
        db.table_schema(table)?;

        let rows = db.table_rows(table)?;
        let matched = Self::matching(db, table, &rows, filter)?;

        let before = rows.len();
        let remaining: Vec<Row> = rows
            .into_iter()
            .zip(&matched)
            .filter(|&(_, &m)| !m)
            .map(|(row, _)| row)
            .collect();
        let deleted = before - remaining.len();

        db.save_rows(table, &remaining)?;
        Ok(QueryResult::Success {
            message: Self::summary(deleted, "deleted"),
            affected: deleted,
        })
    }

    /// Predicate outcome for every row, computed before any row changes
    fn matching<S: TableStore>(
        db: &mut Database<S>,
        table: &str,
        rows: &[Row],
        filter: Option<&Predicate>,
    ) -> Result<Vec<bool>, DatabaseError> {
        let Some(predicate) = filter else {
            return Ok(vec![true; rows.len()]);
        };
        let outer = [table.to_string()];
        rows.iter()
            .map(|row| ConditionEvaluator::evaluate(db, row, predicate, &outer))
            .collect()
    }

    fn check_column(schema: &TableSchema, col: &str) -> Result<(), DatabaseError> {
        let bare = Self::bare_column(&schema.name, col);
        if schema.get_column_index(bare).is_none() {
            return Err(DatabaseError::Schema(format!(
                "column '{col}' does not exist in table '{}'",
                schema.name
            )));
        }
        Ok(())
    }

    /// `users.age` -> `age` when qualified with the target table
    fn bare_column<'a>(table: &str, col: &'a str) -> &'a str {
        match col.split_once('.') {
            Some((t, c)) if t == table => c,
            _ => col,
        }
    }

    fn summary(count: usize, verb: &str) -> String {
        if count == 1 {
            format!("1 row {verb}")
        } else {
            format!("{count} rows {verb}")
        }
    }
}
