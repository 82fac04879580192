// Module declarations
mod statement;
mod common;
mod condition;
mod ddl;
mod dml;
mod queries;
mod scan;

// Re-export all public types
pub use statement::{
    AggregateFunction, ColumnDef, CompareOp, Condition, Connective, CountTarget, Expression,
    InSet, JoinClause, JoinType, Limit, Operand, Predicate, Query, ScalarFunction, SelectColumn,
    SelectStatement, SetOperator, SortOrder, Source, Statement, Subquery,
};
pub use scan::split_statements;

use crate::types::DatabaseError;
use common::{keyword, GrammarError};

fn into_database_error(sql: &str, error: GrammarError) -> DatabaseError {
    match error {
        GrammarError::Mismatch(near) if near.trim().is_empty() => {
            DatabaseError::Syntax(format!("unexpected end of statement: {sql}"))
        }
        GrammarError::Mismatch(near) => {
            let near: String = near.trim().chars().take(40).collect();
            DatabaseError::Syntax(format!("{sql} (near '{near}')"))
        }
        GrammarError::Arity(msg) => DatabaseError::Arity(msg),
        GrammarError::Unsupported(msg) => DatabaseError::Unsupported(msg),
        GrammarError::Condition(msg) => DatabaseError::Evaluation(msg),
    }
}

fn finish<T>(sql: &str, result: common::PResult<'_, T>) -> Result<T, DatabaseError> {
    match result {
        Ok((remaining, parsed)) if remaining.trim().is_empty() => Ok(parsed),
        Ok((remaining, _)) => Err(into_database_error(
            sql,
            GrammarError::Mismatch(remaining.to_string()),
        )),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(into_database_error(sql, e)),
        Err(nom::Err::Incomplete(_)) => Err(DatabaseError::Syntax(sql.to_string())),
    }
}

/// Parses one statement, dispatching on its leading keyword.
pub fn parse_statement(input: &str) -> Result<Statement, DatabaseError> {
    let sql = input.trim();
    let sql = sql.strip_suffix(';').unwrap_or(sql).trim_end();

    let leading = |word: &'static str| keyword(word)(sql).is_ok();

    if leading("CREATE") {
        finish(sql, ddl::create_table(sql))
    } else if leading("INSERT") {
        finish(sql, dml::insert(sql))
    } else if leading("SELECT") {
        queries::parse_query(sql)
            .map(Statement::Select)
            .map_err(|e| into_database_error(sql, e))
    } else if leading("UPDATE") {
        finish(sql, dml::update(sql))
    } else if leading("DELETE") {
        finish(sql, dml::delete(sql))
    } else {
        Err(DatabaseError::Syntax(format!("unrecognized statement: {sql}")))
    }
}

/// Parses a stand-alone WHERE-style condition.
pub fn parse_predicate(input: &str) -> Result<Predicate, DatabaseError> {
    condition::parse_predicate(input).map_err(|e| into_database_error(input.trim(), e))
}

/// Reads canonical aggregate text such as `COUNT(*)` back into a call.
#[must_use]
pub fn parse_aggregate(text: &str) -> Option<AggregateFunction> {
    nom::combinator::all_consuming(common::ws(queries::aggregate_function))(text)
        .ok()
        .map(|(_, agg)| agg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_parse_create_table() {
        let sql = "CREATE TABLE users (id INTEGER PRIMARY KEY, name TEXT NOT NULL, age INTEGER)";
        let stmt = parse_statement(sql).unwrap();
        assert!(matches!(stmt, Statement::CreateTable { .. }));
    }

    #[test]
    fn test_parse_insert() {
        let sql = "insert into users (id, name, age) values (1, 'Alice', 30);";
        let stmt = parse_statement(sql).unwrap();
        assert!(matches!(stmt, Statement::Insert { .. }));
    }

    #[test]
    fn test_parse_select() {
        let sql = "SELECT * FROM users WHERE id = 1";
        match parse_statement(sql).unwrap() {
            Statement::Select(query) => {
                assert!(query.chain.is_empty());
                assert!(query.head.is_select_all());
                match query.head.filter {
                    Some(Predicate {
                        first: Condition::Compare { left, op: CompareOp::Eq, operand: Operand::Literal(Value::Integer(1)) },
                        ..
                    }) => assert_eq!(left, Operand::Column("id".to_string())),
                    other => panic!("Expected id = 1, got {other:?}"),
                }
            }
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_select_with_order_by_and_limit() {
        let sql = "SELECT * FROM users ORDER BY age DESC LIMIT 5";
        match parse_statement(sql).unwrap() {
            Statement::Select(query) => {
                assert_eq!(query.head.order_by, vec![("age".to_string(), SortOrder::Desc)]);
                assert_eq!(query.head.limit, Some(Limit { count: 5, offset: 0 }));
            }
            other => panic!("Expected SELECT, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_aggregate() {
        assert_eq!(
            parse_aggregate("SUM(amount)"),
            Some(AggregateFunction::Sum("amount".to_string()))
        );
        assert_eq!(parse_aggregate("COUNT(*)"), Some(AggregateFunction::Count(CountTarget::All)));
        assert_eq!(parse_aggregate("amount"), None);
    }

    #[test]
    fn test_error_kinds() {
        assert!(matches!(
            parse_statement("DROP TABLE users"),
            Err(DatabaseError::Syntax(_))
        ));
        assert!(matches!(
            parse_statement("SELECT * FROM"),
            Err(DatabaseError::Syntax(_))
        ));
        assert!(matches!(
            parse_statement("INSERT INTO users (id) VALUES (1, 2)"),
            Err(DatabaseError::Arity(_))
        ));
        assert!(matches!(
            parse_statement("SELECT * FROM a JOIN b ON a.id = b.id RIGHT JOIN c ON b.id = c.id"),
            Err(DatabaseError::Unsupported(_))
        ));
        assert!(matches!(
            parse_statement("DELETE FROM users WHERE id == 2"),
            Err(DatabaseError::Evaluation(_))
        ));
    }

    #[test]
    fn test_syntax_error_carries_statement_text() {
        let err = parse_statement("UPDATE users age = 3").unwrap_err();
        assert!(err.to_string().contains("UPDATE users age = 3"));
    }
}
