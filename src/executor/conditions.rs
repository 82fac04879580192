/// Condition evaluation for WHERE and HAVING clauses
///
/// Supports: =, !=, <>, >, <, >=, <=, BETWEEN, [NOT] LIKE, [NOT] IN (list or
/// subquery), IS [NOT] NULL, [NOT] EXISTS and scalar subqueries, chained with
/// AND/OR strictly left to right.

use crate::parser::{self, CompareOp, Condition, Connective, InSet, Operand, Predicate};
use crate::storage::TableStore;
use crate::types::{Database, DatabaseError, Row, Value};
use std::cmp::Ordering;
use super::subquery::SubqueryExecutor;

pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Evaluate a predicate against a row.
    ///
    /// `outer` names the tables whose `table.column` references inside a
    /// subquery are bound to this row before the subquery runs.
    pub fn evaluate<S: TableStore>(
        db: &mut Database<S>,
        row: &Row,
        predicate: &Predicate,
        outer: &[String],
    ) -> Result<bool, DatabaseError> {
        let mut result = Self::evaluate_condition(db, row, &predicate.first, outer)?;
        for (connective, condition) in &predicate.rest {
            result = match connective {
                Connective::And => result && Self::evaluate_condition(db, row, condition, outer)?,
                Connective::Or => result || Self::evaluate_condition(db, row, condition, outer)?,
            };
        }
        Ok(result)
    }

    /// Parse and evaluate condition text such as `age >= 30 AND name LIKE 'J%'`
    pub fn evaluate_text<S: TableStore>(
        db: &mut Database<S>,
        row: &Row,
        text: &str,
        outer: &[String],
    ) -> Result<bool, DatabaseError> {
        let predicate = parser::parse_predicate(text).map_err(|e| match e {
            DatabaseError::Evaluation(_) => e,
            other => DatabaseError::Evaluation(other.to_string()),
        })?;
        Self::evaluate(db, row, &predicate, outer)
    }

    fn evaluate_condition<S: TableStore>(
        db: &mut Database<S>,
        row: &Row,
        condition: &Condition,
        outer: &[String],
    ) -> Result<bool, DatabaseError> {
        match condition {
            Condition::Compare { left, op, operand } => {
                let Some(left) = Self::resolve(db, row, left, outer)? else {
                    return Ok(false);
                };
                let Some(right) = Self::resolve(db, row, operand, outer)? else {
                    return Ok(false);
                };
                Ok(Self::compare(&left, *op, &right))
            }
            Condition::Like { left, pattern, negated } => {
                let value = Self::resolve(db, row, left, outer)?.unwrap_or(Value::Null);
                if value.is_null() {
                    return Ok(false);
                }
                Ok(Self::match_like(&value, pattern) != *negated)
            }
            Condition::Between { left, low, high } => {
                let value = Self::resolve(db, row, left, outer)?.unwrap_or(Value::Null);
                let ge_low = matches!(value.compare(low), Some(Ordering::Greater | Ordering::Equal));
                let le_high = matches!(value.compare(high), Some(Ordering::Less | Ordering::Equal));
                Ok(ge_low && le_high)
            }
            Condition::In { left, set, negated } => {
                let value = Self::resolve(db, row, left, outer)?.unwrap_or(Value::Null);
                if value.is_null() {
                    return Ok(false);
                }
                let found = match set {
                    InSet::List(values) => values.iter().any(|v| value.loose_eq(v)),
                    InSet::Subquery(subquery) => SubqueryExecutor::column(db, subquery, row, outer)?
                        .iter()
                        .any(|v| value.loose_eq(v)),
                };
                Ok(found != *negated)
            }
            Condition::IsNull { left, negated } => {
                let value = Self::resolve(db, row, left, outer)?.unwrap_or(Value::Null);
                Ok(value.is_null() != *negated)
            }
            Condition::Exists { subquery, negated } => {
                let rows = SubqueryExecutor::rows(db, subquery, row, outer)?;
                Ok(rows.is_empty() == *negated)
            }
        }
    }

    /// Value of one side of a leaf; `None` when a scalar subquery yields no rows
    fn resolve<S: TableStore>(
        db: &mut Database<S>,
        row: &Row,
        operand: &Operand,
        outer: &[String],
    ) -> Result<Option<Value>, DatabaseError> {
        match operand {
            Operand::Literal(value) => Ok(Some(value.clone())),
            Operand::Column(name) => Ok(Some(row.value(name))),
            Operand::Subquery(subquery) => SubqueryExecutor::scalar(db, subquery, row, outer),
        }
    }

    /// Coercing comparison; null on either side is never true
    fn compare(left: &Value, op: CompareOp, right: &Value) -> bool {
        let Some(ordering) = left.compare(right) else {
            return false;
        };
        match op {
            CompareOp::Eq => ordering == Ordering::Equal,
            CompareOp::NotEq => ordering != Ordering::Equal,
            CompareOp::Gt => ordering == Ordering::Greater,
            CompareOp::Lt => ordering == Ordering::Less,
            CompareOp::GtEq => ordering != Ordering::Less,
            CompareOp::LtEq => ordering != Ordering::Greater,
        }
    }

    /// Match LIKE pattern against the value's text rendering
    fn match_like(value: &Value, pattern: &str) -> bool {
        let text = value.to_string();
        Self::like_pattern_match(&text, pattern)
    }

    /// Simple LIKE pattern matching
    /// % matches zero or more characters
    /// _ matches exactly one character
    pub(crate) fn like_pattern_match(text: &str, pattern: &str) -> bool {
        let text: Vec<char> = text.chars().collect();
        let pattern: Vec<char> = pattern.chars().collect();

        let (mut ti, mut pi) = (0, 0);
        // Position of the last `%` and the text index it currently absorbs up to
        let mut backtrack: Option<(usize, usize)> = None;

        while ti < text.len() {
            match pattern.get(pi).copied() {
                Some('%') => {
                    backtrack = Some((pi, ti));
                    pi += 1;
                }
                Some(c) if c == '_' || c == text[ti] => {
                    ti += 1;
                    pi += 1;
                }
                _ => match backtrack {
                    Some((star, absorbed)) => {
                        pi = star + 1;
                        ti = absorbed + 1;
                        backtrack = Some((star, ti));
                    }
                    None => return false,
                },
            }
        }

        pattern[pi..].iter().all(|&c| c == '%')
    }
}
