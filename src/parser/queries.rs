use super::common::{
    balanced, column_ref, failure, identifier, keyword, literal, non_keyword_identifier, phrase,
    ws, GrammarError, PResult,
};
use super::condition::predicate_clause;
use super::scan::split_union;
use super::statement::{
    AggregateFunction, CountTarget, Expression, JoinClause, JoinType, Limit, Query,
    ScalarFunction, SelectColumn, SelectStatement, SortOrder, Source,
};
use nom::{
    branch::alt,
    character::complete::{char, digit1},
    combinator::{map, map_res, opt, peek},
    multi::separated_list1,
    sequence::{delimited, preceded, tuple},
};

fn function_argument(input: &str) -> PResult<'_, String> {
    delimited(ws(char('(')), ws(column_ref), char(')'))(input)
}

// Parse aggregate functions: COUNT(*), COUNT(col), SUM(col), AVG(col), MIN(col), MAX(col)
pub fn aggregate_function(input: &str) -> PResult<'_, AggregateFunction> {
    alt((
        map(
            preceded(
                keyword("COUNT"),
                delimited(
                    ws(char('(')),
                    alt((
                        map(ws(char('*')), |_| CountTarget::All),
                        map(ws(column_ref), CountTarget::Column),
                    )),
                    char(')'),
                ),
            ),
            AggregateFunction::Count,
        ),
        map(preceded(keyword("SUM"), function_argument), AggregateFunction::Sum),
        map(preceded(keyword("AVG"), function_argument), AggregateFunction::Avg),
        map(preceded(keyword("MIN"), function_argument), AggregateFunction::Min),
        map(preceded(keyword("MAX"), function_argument), AggregateFunction::Max),
    ))(input)
}

fn scalar_function(input: &str) -> PResult<'_, ScalarFunction> {
    alt((
        map(preceded(keyword("UPPER"), function_argument), ScalarFunction::Upper),
        map(preceded(keyword("LOWER"), function_argument), ScalarFunction::Lower),
        map(preceded(keyword("LENGTH"), function_argument), ScalarFunction::Length),
        map(preceded(keyword("ABS"), function_argument), ScalarFunction::Abs),
        map(preceded(keyword("ROUND"), function_argument), ScalarFunction::Round),
    ))(input)
}

fn expression(input: &str) -> PResult<'_, Expression> {
    alt((
        map(aggregate_function, Expression::Aggregate),
        map(scalar_function, Expression::Scalar),
        map(literal, Expression::Literal),
        map(column_ref, Expression::Column),
    ))(input)
}

// Parse select column: *, or an expression with an optional AS alias
fn select_column(input: &str) -> PResult<'_, SelectColumn> {
    alt((
        map(ws(char('*')), |_| SelectColumn::Wildcard),
        map(
            tuple((
                ws(expression),
                opt(preceded(ws(keyword("AS")), ws(identifier))),
            )),
            |(expr, alias)| SelectColumn::Expr { expr, alias },
        ),
    ))(input)
}

fn join_type(input: &str) -> PResult<'_, JoinType> {
    ws(alt((
        map(phrase("INNER JOIN"), |()| JoinType::Inner),
        map(phrase("LEFT OUTER JOIN"), |()| JoinType::Left),
        map(phrase("LEFT JOIN"), |()| JoinType::Left),
        map(phrase("RIGHT OUTER JOIN"), |()| JoinType::Right),
        map(phrase("RIGHT JOIN"), |()| JoinType::Right),
        map(phrase("CROSS JOIN"), |()| JoinType::Cross),
        map(keyword("JOIN"), |_| JoinType::Inner), // Default to INNER
    )))(input)
}

// Parse ON left.col = right.col; a present but malformed ON is an arity error
fn join_condition(input: &str) -> PResult<'_, (String, String)> {
    let (input, _) = ws(keyword("ON"))(input)?;
    let parsed: PResult<'_, (String, String)> = map(
        tuple((ws(column_ref), ws(char('=')), ws(column_ref))),
        |(left, _, right)| (left, right),
    )(input);
    match parsed {
        Ok(pair) => Ok(pair),
        Err(nom::Err::Error(_)) => failure(GrammarError::Arity(format!(
            "malformed ON clause: {}",
            input.trim()
        ))),
        Err(e) => Err(e),
    }
}

fn table_or_join(input: &str) -> PResult<'_, Source> {
    let (input, left) = ws(non_keyword_identifier)(input)?;
    let (input, kind) = opt(join_type)(input)?;
    let Some(kind) = kind else {
        return Ok((input, Source::Table(left)));
    };

    let (input, right) = ws(non_keyword_identifier)(input)?;
    let (input, on) = if kind == JoinType::Cross {
        (input, None)
    } else {
        match opt(join_condition)(input)? {
            (rest, Some(pair)) => (rest, Some(pair)),
            (_, None) => {
                return failure(GrammarError::Arity(format!(
                    "{kind:?} JOIN requires an ON clause"
                )))
            }
        }
    };

    if peek(join_type)(input).is_ok() {
        return failure(GrammarError::Unsupported(
            "only two-way joins are supported".to_string(),
        ));
    }

    Ok((
        input,
        Source::Join(JoinClause {
            left,
            join_type: kind,
            right,
            on,
        }),
    ))
}

// Parse derived table: ( SELECT ... ) [AS] alias
fn derived_table(input: &str) -> PResult<'_, Source> {
    let (input, inner) = ws(balanced)(input)?;
    let query = match parse_query(inner) {
        Ok(query) => query,
        Err(e) => return failure(e),
    };
    let (input, _) = opt(ws(keyword("AS")))(input)?;
    let (input, alias) = ws(non_keyword_identifier)(input)?;
    Ok((
        input,
        Source::Derived {
            query: Box::new(query),
            alias,
        },
    ))
}

fn source(input: &str) -> PResult<'_, Source> {
    let (input, source) = alt((derived_table, table_or_join))(input)?;
    if peek(ws(char(',')))(input).is_ok() {
        return failure(GrammarError::Unsupported(
            "multi-table FROM lists are not supported".to_string(),
        ));
    }
    Ok((input, source))
}

// Parse optional GROUP BY clause
pub fn group_by(input: &str) -> PResult<'_, Option<Vec<String>>> {
    opt(preceded(
        ws(phrase("GROUP BY")),
        separated_list1(ws(char(',')), ws(column_ref)),
    ))(input)
}

fn order_item(input: &str) -> PResult<'_, (String, SortOrder)> {
    map(
        tuple((
            ws(alt((map(aggregate_function, |agg| agg.to_string()), column_ref))),
            opt(ws(alt((
                map(keyword("ASC"), |_| SortOrder::Asc),
                map(keyword("DESC"), |_| SortOrder::Desc),
            )))),
        )),
        |(col, order)| (col, order.unwrap_or(SortOrder::Asc)),
    )(input)
}

// Parse optional ORDER BY clause with any number of keys
pub fn order_by(input: &str) -> PResult<'_, Vec<(String, SortOrder)>> {
    map(
        opt(preceded(
            ws(phrase("ORDER BY")),
            separated_list1(ws(char(',')), order_item),
        )),
        Option::unwrap_or_default,
    )(input)
}

fn count(input: &str) -> PResult<'_, usize> {
    ws(map_res(digit1, str::parse::<usize>))(input)
}

// Parse optional LIMIT: `LIMIT n`, `LIMIT n OFFSET m`, or legacy `LIMIT m, n`
pub fn limit(input: &str) -> PResult<'_, Option<Limit>> {
    opt(preceded(
        ws(keyword("LIMIT")),
        alt((
            map(
                tuple((count, ws(char(',')), count)),
                |(offset, _, count)| Limit { count, offset },
            ),
            map(
                tuple((count, opt(preceded(ws(keyword("OFFSET")), count)))),
                |(count, offset)| Limit {
                    count,
                    offset: offset.unwrap_or(0),
                },
            ),
        )),
    ))(input)
}

pub fn select(input: &str) -> PResult<'_, SelectStatement> {
    let (input, _) = ws(keyword("SELECT"))(input)?;

    // Parse optional DISTINCT keyword
    let (input, distinct) = opt(ws(keyword("DISTINCT")))(input)?;
    let distinct = distinct.is_some();

    let (input, columns) = separated_list1(ws(char(',')), select_column)(input)?;
    let (input, _) = ws(keyword("FROM"))(input)?;
    let (input, source) = source(input)?;
    let (input, filter) = predicate_clause("WHERE")(input)?;
    let (input, group_by) = group_by(input)?;
    let (input, having) = predicate_clause("HAVING")(input)?;
    let (input, order_by) = order_by(input)?;
    let (input, limit) = limit(input)?;

    Ok((
        input,
        SelectStatement {
            distinct,
            columns,
            source,
            filter,
            group_by,
            having,
            order_by,
            limit,
        },
    ))
}

fn select_all(text: &str) -> Result<SelectStatement, GrammarError> {
    match select(text) {
        Ok((rest, stmt)) if rest.trim().is_empty() => Ok(stmt),
        Ok((rest, _)) => Err(GrammarError::Mismatch(rest.trim().to_string())),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => Err(GrammarError::Mismatch(text.to_string())),
    }
}

/// Parses a full query, splitting it at top-level UNION / UNION ALL first.
pub fn parse_query(text: &str) -> Result<Query, GrammarError> {
    let mut parts = split_union(text).into_iter();
    let Some((_, head)) = parts.next() else {
        return Err(GrammarError::Mismatch(text.to_string()));
    };
    let head = select_all(head)?;
    let chain = parts
        .map(|(op, part)| {
            let op = op.ok_or_else(|| GrammarError::Mismatch(part.to_string()))?;
            Ok((op, select_all(part)?))
        })
        .collect::<Result<Vec<_>, GrammarError>>()?;
    Ok(Query { head, chain })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::statement::SetOperator;
    use crate::types::Value;

    fn parse(text: &str) -> Query {
        parse_query(text).unwrap()
    }

    #[test]
    fn test_select_clauses_in_order() {
        let q = parse(
            "SELECT DISTINCT user_id, COUNT(*) AS n FROM orders WHERE amount > 10 \
             GROUP BY user_id HAVING COUNT(*) > 1 ORDER BY n DESC, user_id LIMIT 5 OFFSET 2",
        );
        let s = q.head;
        assert!(s.distinct);
        assert_eq!(s.columns.len(), 2);
        assert_eq!(s.columns[1].output_name(), "n");
        assert_eq!(s.source, Source::Table("orders".to_string()));
        assert!(s.filter.is_some());
        assert_eq!(s.group_by, Some(vec!["user_id".to_string()]));
        assert_eq!(s.having.unwrap().first.column(), Some("COUNT(*)"));
        assert_eq!(
            s.order_by,
            vec![("n".to_string(), SortOrder::Desc), ("user_id".to_string(), SortOrder::Asc)]
        );
        assert_eq!(s.limit, Some(Limit { count: 5, offset: 2 }));
    }

    #[test]
    fn test_legacy_limit_is_offset_first() {
        let q = parse("SELECT * FROM t LIMIT 1, 2");
        assert_eq!(q.head.limit, Some(Limit { count: 2, offset: 1 }));
    }

    #[test]
    fn test_join_sources() {
        let q = parse("SELECT * FROM users LEFT JOIN orders ON users.id = orders.user_id");
        assert_eq!(
            q.head.source,
            Source::Join(JoinClause {
                left: "users".to_string(),
                join_type: JoinType::Left,
                right: "orders".to_string(),
                on: Some(("users.id".to_string(), "orders.user_id".to_string())),
            })
        );

        let q = parse("SELECT * FROM a CROSS JOIN b");
        assert!(matches!(
            q.head.source,
            Source::Join(JoinClause { join_type: JoinType::Cross, on: None, .. })
        ));
    }

    #[test]
    fn test_join_errors() {
        assert!(matches!(
            parse_query("SELECT * FROM a JOIN b"),
            Err(GrammarError::Arity(_))
        ));
        assert!(matches!(
            parse_query("SELECT * FROM a JOIN b ON a.id"),
            Err(GrammarError::Arity(_))
        ));
        assert!(matches!(
            parse_query("SELECT * FROM a JOIN b ON a.id = b.id JOIN c ON b.id = c.id"),
            Err(GrammarError::Unsupported(_))
        ));
        assert!(matches!(
            parse_query("SELECT * FROM a, b"),
            Err(GrammarError::Unsupported(_))
        ));
    }

    #[test]
    fn test_derived_table() {
        let q = parse("SELECT name FROM (SELECT * FROM users WHERE age > 20) AS adults");
        match q.head.source {
            Source::Derived { query, alias } => {
                assert_eq!(alias, "adults");
                assert_eq!(query.head.source, Source::Table("users".to_string()));
            }
            other => panic!("Expected derived table, got {other:?}"),
        }
    }

    #[test]
    fn test_union_chain() {
        let q = parse("SELECT a FROM x UNION SELECT a FROM y UNION ALL SELECT a FROM z");
        assert_eq!(q.chain.len(), 2);
        assert_eq!(q.chain[0].0, SetOperator::Union);
        assert_eq!(q.chain[1].0, SetOperator::UnionAll);
    }

    #[test]
    fn test_projection_expressions() {
        let q = parse("SELECT users.name, UPPER(name), 1, sum(amount) FROM users");
        let names: Vec<String> = q.head.columns.iter().map(SelectColumn::output_name).collect();
        assert_eq!(names, vec!["users.name", "UPPER(name)", "1", "SUM(amount)"]);
        assert!(matches!(
            q.head.columns[2],
            SelectColumn::Expr { expr: Expression::Literal(Value::Integer(1)), .. }
        ));
    }

    #[test]
    fn test_trailing_garbage_is_mismatch() {
        assert!(matches!(
            parse_query("SELECT * FROM users users2 extra"),
            Err(GrammarError::Mismatch(_))
        ));
    }
}
