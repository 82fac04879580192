/// Query (SELECT) operations
///
/// Every SELECT runs the same fixed pipeline:
/// 1. Resolve the source (table, two-way join or derived table)
/// 2. WHERE filter
/// 3. GROUP BY + HAVING, or one implicit group when aggregates are used
/// 4. ORDER BY (stable, multi-key)
/// 5. OFFSET + LIMIT
/// 6. DISTINCT over the projected tuple
/// 7. Projection
///
/// UNION / UNION ALL chains combine the results of whole pipelines.

use crate::parser::{
    self, AggregateFunction, Expression, Predicate, Query, SelectColumn, SelectStatement,
    SetOperator, SortOrder, Source,
};
use crate::storage::TableStore;
use crate::types::{Database, DatabaseError, Row, Value};
use std::cmp::Ordering;
use std::collections::HashSet;
use super::aggregate::AggregateExecutor;
use super::conditions::ConditionEvaluator;
use super::functions::ScalarFunctions;
use super::join::JoinExecutor;

pub struct QueryExecutor;

impl QueryExecutor {
    /// Run a query and its UNION chain, left to right
    pub fn execute<S: TableStore>(
        db: &mut Database<S>,
        query: &Query,
    ) -> Result<Vec<Row>, DatabaseError> {
        let mut result = Self::select(db, &query.head)?;

        for (op, select) in &query.chain {
            let rows = Self::select(db, select)?;
            result.extend(rows);
            if *op == SetOperator::Union {
                result = Self::dedupe(result);
            }
        }

        Ok(result)
    }

    /// Main SELECT entry point
    pub fn select<S: TableStore>(
        db: &mut Database<S>,
        stmt: &SelectStatement,
    ) -> Result<Vec<Row>, DatabaseError> {
        match &stmt.source {
            Source::Table(name) => {
                let rows = db.table_rows(name)?;
                Self::run_pipeline(db, stmt, rows, &[name.clone()])
            }
            Source::Join(join) => {
                let left = db.table_rows(&join.left)?;
                let right = db.table_rows(&join.right)?;
                let rows = JoinExecutor::join(&left, &right, join);
                Self::run_pipeline(db, stmt, rows, &[join.left.clone(), join.right.clone()])
            }
            Source::Derived { query, alias } => Self::select_derived(db, stmt, query, alias),
        }
    }

    /// Register the derived result under its alias for the rest of the
    /// statement, then restore whatever was registered before.
    fn select_derived<S: TableStore>(
        db: &mut Database<S>,
        stmt: &SelectStatement,
        query: &Query,
        alias: &str,
    ) -> Result<Vec<Row>, DatabaseError> {
        let rows = Self::execute(db, query)?;
        tracing::debug!(alias, rows = rows.len(), "registering derived table");

        let previous = db.transient.insert(alias.to_string(), rows.clone());
        let result = Self::run_pipeline(db, stmt, rows, &[alias.to_string()]);

        match previous {
            Some(rows) => {
                db.transient.insert(alias.to_string(), rows);
            }
            None => {
                db.transient.remove(alias);
            }
        }

        result
    }

    fn run_pipeline<S: TableStore>(
        db: &mut Database<S>,
        stmt: &SelectStatement,
        rows: Vec<Row>,
        outer: &[String],
    ) -> Result<Vec<Row>, DatabaseError> {
        let mut rows = match &stmt.filter {
            Some(predicate) => Self::filter(db, rows, predicate, outer)?,
            None => rows,
        };

        if Self::is_grouped(stmt) {
            let aggregates = Self::collect_aggregates(stmt);
            let group_by = stmt.group_by.as_deref().unwrap_or_default();
            rows = AggregateExecutor::aggregate(rows, group_by, &aggregates);
            if let Some(having) = &stmt.having {
                rows = Self::filter(db, rows, having, outer)?;
            }
        }

        if !stmt.order_by.is_empty() {
            rows = Self::sort(rows, stmt);
        }

        if let Some(limit) = stmt.limit {
            rows = rows.into_iter().skip(limit.offset).take(limit.count).collect();
        }

        let projected: Vec<Row> = rows.iter().map(|row| Self::project(row, &stmt.columns)).collect();
        Ok(if stmt.distinct {
            Self::dedupe(projected)
        } else {
            projected
        })
    }

    /// Keep rows matching the predicate, in order
    pub fn filter<S: TableStore>(
        db: &mut Database<S>,
        rows: Vec<Row>,
        predicate: &Predicate,
        outer: &[String],
    ) -> Result<Vec<Row>, DatabaseError> {
        let mut kept = Vec::with_capacity(rows.len());
        for row in rows {
            if ConditionEvaluator::evaluate(db, &row, predicate, outer)? {
                kept.push(row);
            }
        }
        Ok(kept)
    }

    fn is_grouped(stmt: &SelectStatement) -> bool {
        stmt.group_by.is_some()
            || stmt.having.is_some()
            || stmt.columns.iter().any(|c| {
                matches!(
                    c,
                    SelectColumn::Expr {
                        expr: Expression::Aggregate(_),
                        ..
                    }
                )
            })
    }

    /// Aggregates named anywhere in the projection, HAVING or ORDER BY
    fn collect_aggregates(stmt: &SelectStatement) -> Vec<AggregateFunction> {
        let projected = stmt.columns.iter().filter_map(|c| match c {
            SelectColumn::Expr {
                expr: Expression::Aggregate(agg),
                ..
            } => Some(agg.clone()),
            _ => None,
        });
        let in_having = stmt
            .having
            .iter()
            .flat_map(|p| p.conditions())
            .filter_map(|c| c.column().and_then(parser::parse_aggregate));
        let in_order = stmt
            .order_by
            .iter()
            .filter_map(|(key, _)| parser::parse_aggregate(key));

        let mut aggregates: Vec<AggregateFunction> = Vec::new();
        for agg in projected.chain(in_having).chain(in_order) {
            if !aggregates.contains(&agg) {
                aggregates.push(agg);
            }
        }
        aggregates
    }

    /// Stable multi-key sort; nulls first when ascending
    fn sort(rows: Vec<Row>, stmt: &SelectStatement) -> Vec<Row> {
        let mut keyed: Vec<(Vec<Value>, Row)> = rows
            .into_iter()
            .map(|row| {
                let keys = stmt
                    .order_by
                    .iter()
                    .map(|(key, _)| Self::sort_value(&row, key, &stmt.columns))
                    .collect();
                (keys, row)
            })
            .collect();

        keyed.sort_by(|(a, _), (b, _)| {
            for ((x, y), (_, order)) in a.iter().zip(b).zip(&stmt.order_by) {
                let ordering = match order {
                    SortOrder::Asc => x.sort_cmp(y),
                    SortOrder::Desc => y.sort_cmp(x),
                };
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        keyed.into_iter().map(|(_, row)| row).collect()
    }

    /// ORDER BY key value: a field of the row, else a projection alias
    fn sort_value(row: &Row, key: &str, columns: &[SelectColumn]) -> Value {
        if let Some(value) = row.resolve(key) {
            return value.clone();
        }
        columns
            .iter()
            .find_map(|c| match c {
                SelectColumn::Expr {
                    expr,
                    alias: Some(alias),
                } if alias == key => Some(Self::evaluate_expression(row, expr)),
                _ => None,
            })
            .unwrap_or(Value::Null)
    }

    fn project(row: &Row, columns: &[SelectColumn]) -> Row {
        let mut out = Row::new();
        for column in columns {
            match column {
                SelectColumn::Wildcard => {
                    for (key, value) in row.iter() {
                        out.set(key, value.clone());
                    }
                }
                SelectColumn::Expr { expr, .. } => {
                    out.set(column.output_name(), Self::evaluate_expression(row, expr));
                }
            }
        }
        out
    }

    fn evaluate_expression(row: &Row, expr: &Expression) -> Value {
        match expr {
            Expression::Column(name) => row.value(name),
            Expression::Aggregate(agg) => row.value(&agg.to_string()),
            Expression::Scalar(function) => ScalarFunctions::evaluate(function, row),
            Expression::Literal(value) => value.clone(),
        }
    }

    /// Drop later duplicates by full-row structural equality
    fn dedupe(rows: Vec<Row>) -> Vec<Row> {
        let mut seen: HashSet<Row> = HashSet::new();
        rows.into_iter().filter(|row| seen.insert(row.clone())).collect()
    }
}
