// Subquery execution
//
// Subqueries are kept as text. Before one runs, every `outer.column`
// reference to an enclosing table is replaced with the current outer row's
// value as a literal, and the resulting statement goes through the ordinary
// statement path. Correlation therefore needs no shared evaluation context.

use crate::parser::Subquery;
use crate::storage::TableStore;
use crate::types::{Database, DatabaseError, Row, Value};
use super::dispatcher::QueryResult;

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Substitutes `<table>.<column>` occurrences outside quotes with literals
/// taken from `row`. Absent fields become `NULL`.
#[must_use]
pub fn bind_outer(sql: &str, table: &str, row: &Row) -> String {
    let prefix_len = table.len() + 1;
    let mut out = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;
    let mut i = 0;

    while i < sql.len() {
        let Some(c) = sql[i..].chars().next() else {
            break;
        };

        if let Some(q) = quote {
            if c == q {
                quote = None;
            }
            out.push(c);
            i += c.len_utf8();
            continue;
        }
        if c == '\'' || c == '"' {
            quote = Some(c);
            out.push(c);
            i += 1;
            continue;
        }

        let at_word_start = sql[..i].chars().next_back().is_none_or(|p| !is_ident_char(p));
        let matches_table = sql
            .get(i..i + prefix_len)
            .is_some_and(|s| {
                s.ends_with('.') && s.get(..table.len()).is_some_and(|t| t.eq_ignore_ascii_case(table))
            });

        if at_word_start && matches_table {
            let rest = &sql[i + prefix_len..];
            let column_len = rest.find(|ch: char| !is_ident_char(ch)).unwrap_or(rest.len());
            if column_len > 0 {
                let column = &rest[..column_len];
                let value = row
                    .get(&format!("{table}.{column}"))
                    .or_else(|| row.get(column))
                    .cloned()
                    .unwrap_or(Value::Null);
                out.push_str(&value.to_literal());
                i += prefix_len + column_len;
                continue;
            }
        }

        out.push(c);
        i += c.len_utf8();
    }

    out
}

pub struct SubqueryExecutor;

impl SubqueryExecutor {
    /// Run a subquery bound to `row` and return its result rows
    pub fn rows<S: TableStore>(
        db: &mut Database<S>,
        subquery: &Subquery,
        row: &Row,
        outer: &[String],
    ) -> Result<Vec<Row>, DatabaseError> {
        let sql = outer
            .iter()
            .fold(subquery.sql.clone(), |sql, table| bind_outer(&sql, table, row));
        tracing::trace!(subquery = %sql, "running bound subquery");

        match db.run_statement(&sql) {
            Ok(QueryResult::Rows(rows)) => Ok(rows),
            Ok(QueryResult::Success { .. }) => Err(DatabaseError::Subquery(Box::new(
                DatabaseError::Evaluation(format!("subquery returned no row set: {sql}")),
            ))),
            Err(e) => Err(DatabaseError::Subquery(Box::new(e))),
        }
    }

    /// First column of the first result row; `None` when there are no rows
    pub fn scalar<S: TableStore>(
        db: &mut Database<S>,
        subquery: &Subquery,
        row: &Row,
        outer: &[String],
    ) -> Result<Option<Value>, DatabaseError> {
        let rows = Self::rows(db, subquery, row, outer)?;
        Ok(rows
            .into_iter()
            .next()
            .map(|first| first.into_iter().next().map_or(Value::Null, |(_, v)| v)))
    }

    /// First column of every result row
    pub fn column<S: TableStore>(
        db: &mut Database<S>,
        subquery: &Subquery,
        row: &Row,
        outer: &[String],
    ) -> Result<Vec<Value>, DatabaseError> {
        let rows = Self::rows(db, subquery, row, outer)?;
        Ok(rows
            .into_iter()
            .filter_map(|r| r.into_iter().next().map(|(_, v)| v))
            .collect())
    }
}
