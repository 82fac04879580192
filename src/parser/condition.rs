use super::common::{
    balanced, column_ref, failure, is_subquery, keyword, literal, string_literal, ws,
    GrammarError, PResult,
};
use super::queries::aggregate_function;
use super::statement::{CompareOp, Condition, Connective, InSet, Operand, Predicate, Subquery};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::char,
    combinator::{all_consuming, map, opt},
    multi::{many0, separated_list1},
    sequence::{pair, tuple},
};

/// Left side of a leaf: aggregate text for HAVING, a column reference, or a
/// literal left behind by outer-row binding (`7 = orders.user_id`)
fn left_operand(input: &str) -> PResult<'_, Operand> {
    alt((
        map(aggregate_function, |agg| Operand::Column(agg.to_string())),
        map(column_ref, Operand::Column),
        map(literal, Operand::Literal),
    ))(input)
}

fn negation(input: &str) -> PResult<'_, bool> {
    map(opt(ws(keyword("NOT"))), |not| not.is_some())(input)
}

fn exists_condition(input: &str) -> PResult<'_, Condition> {
    let (input, negated) = negation(input)?;
    let (input, _) = ws(keyword("EXISTS"))(input)?;
    let (input, inner) = balanced(input)?;
    Ok((
        input,
        Condition::Exists {
            subquery: Subquery::new(inner),
            negated,
        },
    ))
}

fn is_null_condition(input: &str) -> PResult<'_, Condition> {
    map(
        tuple((
            ws(left_operand),
            ws(keyword("IS")),
            negation,
            ws(keyword("NULL")),
        )),
        |(left, _, negated, _)| Condition::IsNull { left, negated },
    )(input)
}

fn between_condition(input: &str) -> PResult<'_, Condition> {
    map(
        tuple((
            ws(left_operand),
            ws(keyword("BETWEEN")),
            ws(literal),
            ws(keyword("AND")),
            ws(literal),
        )),
        |(left, _, low, _, high)| Condition::Between { left, low, high },
    )(input)
}

fn like_condition(input: &str) -> PResult<'_, Condition> {
    map(
        tuple((
            ws(left_operand),
            negation,
            ws(keyword("LIKE")),
            ws(string_literal),
        )),
        |(left, negated, _, pattern)| Condition::Like {
            left,
            pattern,
            negated,
        },
    )(input)
}

fn in_condition(input: &str) -> PResult<'_, Condition> {
    let (input, (left, negated, _)) =
        tuple((ws(left_operand), negation, ws(keyword("IN"))))(input)?;
    let (input, inner) = ws(balanced)(input)?;

    let set = if is_subquery(inner) {
        InSet::Subquery(Subquery::new(inner))
    } else {
        let parsed = all_consuming(separated_list1(ws(char(',')), ws(literal)))(inner);
        match parsed {
            Ok((_, values)) => InSet::List(values),
            Err(_) => {
                return failure(GrammarError::Condition(format!(
                    "malformed IN list: ({inner})"
                )))
            }
        }
    };

    Ok((input, Condition::In { left, set, negated }))
}

fn compare_op(input: &str) -> PResult<'_, CompareOp> {
    alt((
        map(tag(">="), |_| CompareOp::GtEq),
        map(tag("<="), |_| CompareOp::LtEq),
        map(tag("!="), |_| CompareOp::NotEq),
        map(tag("<>"), |_| CompareOp::NotEq),
        map(tag("="), |_| CompareOp::Eq),
        map(tag(">"), |_| CompareOp::Gt),
        map(tag("<"), |_| CompareOp::Lt),
    ))(input)
}

fn scalar_subquery(input: &str) -> PResult<'_, Subquery> {
    let (rest, inner) = balanced(input)?;
    if is_subquery(inner) {
        Ok((rest, Subquery::new(inner)))
    } else {
        failure(GrammarError::Condition(format!(
            "expected a subquery in ({inner})"
        )))
    }
}

fn compare_condition(input: &str) -> PResult<'_, Condition> {
    let (input, left) = ws(left_operand)(input)?;
    let (input, op) = ws(compare_op)(input)?;
    let (input, operand) = ws(alt((
        map(scalar_subquery, Operand::Subquery),
        map(literal, Operand::Literal),
        map(column_ref, Operand::Column),
    )))(input)?;
    Ok((input, Condition::Compare { left, op, operand }))
}

pub fn condition_term(input: &str) -> PResult<'_, Condition> {
    alt((
        exists_condition,
        is_null_condition,
        between_condition,
        like_condition,
        in_condition,
        compare_condition,
    ))(input)
}

fn connective(input: &str) -> PResult<'_, Connective> {
    ws(alt((
        map(keyword("AND"), |_| Connective::And),
        map(keyword("OR"), |_| Connective::Or),
    )))(input)
}

pub fn predicate(input: &str) -> PResult<'_, Predicate> {
    map(
        pair(ws(condition_term), many0(pair(connective, ws(condition_term)))),
        |(first, rest)| Predicate { first, rest },
    )(input)
}

/// Keywords that may legally follow a WHERE or HAVING condition
const CLAUSE_FOLLOWERS: &[&str] = &["GROUP", "HAVING", "ORDER", "LIMIT"];

/// `<anchor> predicate`; once the anchor matched, anything that is not a
/// well-formed condition is reported as a condition error.
pub fn predicate_clause<'a>(
    anchor: &'static str,
) -> impl FnMut(&'a str) -> PResult<'a, Option<Predicate>> {
    move |input: &'a str| {
        let Ok((after_anchor, _)) = ws(keyword(anchor))(input) else {
            return Ok((input, None));
        };
        let (rest, pred) = match predicate(after_anchor) {
            Ok(parsed) => parsed,
            Err(nom::Err::Error(_)) => {
                return failure(GrammarError::Condition(format!(
                    "malformed condition: {}",
                    after_anchor.trim()
                )))
            }
            Err(e) => return Err(e),
        };
        let trailing = rest.trim_start();
        let well_terminated = trailing.is_empty()
            || CLAUSE_FOLLOWERS
                .iter()
                .any(|&kw| keyword(kw)(trailing).is_ok());
        if !well_terminated {
            return failure(GrammarError::Condition(format!(
                "malformed condition near: {trailing}"
            )));
        }
        Ok((rest, Some(pred)))
    }
}

/// Bare predicate text, e.g. for callers that evaluate a stand-alone condition
pub fn parse_predicate(input: &str) -> Result<Predicate, GrammarError> {
    match all_consuming(ws(predicate))(input) {
        Ok((_, pred)) => Ok(pred),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(e),
        Err(nom::Err::Incomplete(_)) => Err(GrammarError::Mismatch(input.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Value;

    fn parse(text: &str) -> Predicate {
        parse_predicate(text).unwrap()
    }

    #[test]
    fn test_comparison_operators() {
        for (text, op) in [
            ("age = 1", CompareOp::Eq),
            ("age != 1", CompareOp::NotEq),
            ("age <> 1", CompareOp::NotEq),
            ("age >= 1", CompareOp::GtEq),
            ("age <= 1", CompareOp::LtEq),
            ("age > 1", CompareOp::Gt),
            ("age < 1", CompareOp::Lt),
        ] {
            match parse(text).first {
                Condition::Compare { op: parsed, .. } => assert_eq!(parsed, op, "{text}"),
                other => panic!("Expected comparison, got {other:?}"),
            }
        }
    }

    #[test]
    fn test_flat_chain_keeps_source_order() {
        let pred = parse("a = 1 OR b = 2 AND c = 3");
        assert_eq!(pred.rest.len(), 2);
        assert_eq!(pred.rest[0].0, Connective::Or);
        assert_eq!(pred.rest[1].0, Connective::And);
    }

    #[test]
    fn test_between_consumes_its_and() {
        let pred = parse("age BETWEEN 20 AND 30 AND name = 'x'");
        assert_eq!(pred.rest.len(), 1);
        assert!(matches!(
            pred.first,
            Condition::Between { low: Value::Integer(20), high: Value::Integer(30), .. }
        ));
    }

    #[test]
    fn test_in_list_and_subquery() {
        let pred = parse("id NOT IN (1, 'a,b', 3)");
        match pred.first {
            Condition::In { set: InSet::List(values), negated: true, .. } => {
                assert_eq!(values[1], Value::Text("a,b".to_string()));
                assert_eq!(values.len(), 3);
            }
            other => panic!("Expected NOT IN list, got {other:?}"),
        }

        let pred = parse("id IN (SELECT user_id FROM orders WHERE amount IN (1, 2))");
        match pred.first {
            Condition::In { set: InSet::Subquery(sub), negated: false, .. } => {
                assert_eq!(sub.sql, "SELECT user_id FROM orders WHERE amount IN (1, 2)");
            }
            other => panic!("Expected IN subquery, got {other:?}"),
        }
    }

    #[test]
    fn test_exists_and_null_checks() {
        let pred = parse("NOT EXISTS (SELECT * FROM orders WHERE orders.user_id = users.id) AND name IS NOT NULL");
        assert!(matches!(pred.first, Condition::Exists { negated: true, .. }));
        assert!(matches!(
            pred.rest[0].1,
            Condition::IsNull { negated: true, .. }
        ));
    }

    #[test]
    fn test_like_and_having_aggregate() {
        assert!(matches!(
            parse("name NOT LIKE 'J%'").first,
            Condition::Like { negated: true, .. }
        ));
        match parse("count(*) > 1").first {
            Condition::Compare { left, .. } => {
                assert_eq!(left, Operand::Column("COUNT(*)".to_string()));
            }
            other => panic!("Expected comparison, got {other:?}"),
        }
    }

    #[test]
    fn test_scalar_subquery_and_column_operands() {
        match parse("amount > (SELECT AVG(amount) FROM orders)").first {
            Condition::Compare { operand: Operand::Subquery(sub), .. } => {
                assert_eq!(sub.sql, "SELECT AVG(amount) FROM orders");
            }
            other => panic!("Expected scalar subquery, got {other:?}"),
        }
        match parse("orders.user_id = users.id").first {
            Condition::Compare { operand: Operand::Column(col), .. } => assert_eq!(col, "users.id"),
            other => panic!("Expected column operand, got {other:?}"),
        }
    }

    #[test]
    fn test_bound_literal_on_the_left() {
        match parse("7 = orders.user_id").first {
            Condition::Compare { left, operand, .. } => {
                assert_eq!(left, Operand::Literal(Value::Integer(7)));
                assert_eq!(operand, Operand::Column("orders.user_id".to_string()));
            }
            other => panic!("Expected comparison, got {other:?}"),
        }
        assert!(matches!(
            parse("'Jane' LIKE 'J%'").first,
            Condition::Like { left: Operand::Literal(_), .. }
        ));
        assert!(matches!(
            parse("NULL IS NULL").first,
            Condition::IsNull { left: Operand::Literal(Value::Null), negated: false }
        ));
        assert!(matches!(
            parse("30 BETWEEN 20 AND 40").first,
            Condition::Between { left: Operand::Literal(Value::Integer(30)), .. }
        ));
        assert!(matches!(
            parse("3 IN (1, 2, 3)").first,
            Condition::In { left: Operand::Literal(Value::Integer(3)), .. }
        ));
    }

    #[test]
    fn test_malformed_clause_is_condition_error() {
        let mut clause = predicate_clause("WHERE");
        assert!(matches!(
            clause("WHERE age ~ 3"),
            Err(nom::Err::Failure(GrammarError::Condition(_)))
        ));
        assert!(matches!(
            clause("WHERE age = 3 AND"),
            Err(nom::Err::Failure(GrammarError::Condition(_)))
        ));
        assert!(clause("WHERE age = 3 ORDER BY age").is_ok());
        assert_eq!(clause("ORDER BY age").unwrap().1, None);
    }
}
