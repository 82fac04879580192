use super::common::{
    balanced, column_ref, failure, keyword, literal, non_keyword_identifier, phrase, ws,
    GrammarError, PResult,
};
use super::condition::predicate_clause;
use super::statement::Statement;
use nom::{
    character::complete::char,
    combinator::{all_consuming, opt},
    multi::separated_list1,
    sequence::{delimited, tuple},
};

pub fn insert(input: &str) -> PResult<'_, Statement> {
    let (input, _) = ws(phrase("INSERT INTO"))(input)?;
    let (input, table) = ws(non_keyword_identifier)(input)?;
    let (input, columns) = opt(delimited(
        ws(char('(')),
        separated_list1(ws(char(',')), ws(column_ref)),
        ws(char(')')),
    ))(input)?;
    let (input, _) = ws(keyword("VALUES"))(input)?;

    // Quoted literals may contain commas and parentheses, so the value list
    // is taken by depth counting before it is split into literals
    let (input, body) = ws(balanced)(input)?;
    let values = match all_consuming(separated_list1(ws(char(',')), ws(literal)))(body) {
        Ok((_, values)) => values,
        Err(_) => {
            return failure(GrammarError::Mismatch(format!("VALUES ({body})")));
        }
    };

    if let Some(ref cols) = columns {
        if cols.len() != values.len() {
            return failure(GrammarError::Arity(format!(
                "INSERT has {} columns but {} values",
                cols.len(),
                values.len()
            )));
        }
    }

    Ok((
        input,
        Statement::Insert {
            table,
            columns,
            values,
        },
    ))
}

pub fn update(input: &str) -> PResult<'_, Statement> {
    let (input, _) = ws(keyword("UPDATE"))(input)?;
    let (input, table) = ws(non_keyword_identifier)(input)?;
    let (input, _) = ws(keyword("SET"))(input)?;
    let (input, assignments) = separated_list1(
        ws(char(',')),
        tuple((ws(column_ref), ws(char('=')), ws(literal))),
    )(input)?;
    let assignments = assignments
        .into_iter()
        .map(|(col, _, val)| (col, val))
        .collect();
    let (input, filter) = predicate_clause("WHERE")(input)?;

    Ok((
        input,
        Statement::Update {
            table,
            assignments,
            filter,
        },
    ))
}

pub fn delete(input: &str) -> PResult<'_, Statement> {
    let (input, _) = ws(phrase("DELETE FROM"))(input)?;
    let (input, from) = ws(non_keyword_identifier)(input)?;
    let (input, filter) = predicate_clause("WHERE")(input)?;

    Ok((input, Statement::Delete { from, filter }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    #[test]
    fn test_insert_respects_quotes() {
        let (_, stmt) = insert("INSERT INTO notes (id, body) VALUES (1, 'a, (b), c')").unwrap();
        assert_eq!(
            stmt,
            Statement::Insert {
                table: "notes".to_string(),
                columns: Some(vec!["id".to_string(), "body".to_string()]),
                values: vec![Value::Integer(1), Value::Text("a, (b), c".to_string())],
            }
        );
    }

    #[test]
    fn test_insert_arity_mismatch() {
        assert!(matches!(
            insert("INSERT INTO users (id, name) VALUES (1)"),
            Err(nom::Err::Failure(GrammarError::Arity(_)))
        ));
    }

    #[test]
    fn test_update_and_delete() {
        let (rest, stmt) = update("UPDATE users SET age = 31, name = \"Jo\" WHERE id = 1").unwrap();
        assert!(rest.is_empty());
        match stmt {
            Statement::Update { assignments, filter, .. } => {
                assert_eq!(assignments.len(), 2);
                assert_eq!(assignments[1], ("name".to_string(), Value::Text("Jo".to_string())));
                assert!(filter.is_some());
            }
            other => panic!("Expected UPDATE, got {other:?}"),
        }

        let (_, stmt) = delete("DELETE FROM users").unwrap();
        assert_eq!(
            stmt,
            Statement::Delete {
                from: "users".to_string(),
                filter: None
            }
        );
    }
}
