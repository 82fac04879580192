/// Grouping and aggregate functions (COUNT, SUM, AVG, MIN, MAX)
///
/// Groups are discovered in first-seen order. Each output row starts from
/// the first row of its group, so a projected column that is neither grouped
/// nor aggregated takes that row's value, and carries one extra field per
/// aggregate keyed by the aggregate's canonical text.

use crate::parser::{AggregateFunction, CountTarget};
use crate::types::{Row, Value};
use std::collections::HashMap;

pub struct AggregateExecutor;

impl AggregateExecutor {
    /// Group `rows` by `group_by` and compute `aggregates` per group.
    ///
    /// An empty `group_by` aggregates everything as one group, which yields a
    /// row even when `rows` is empty.
    pub fn aggregate(rows: Vec<Row>, group_by: &[String], aggregates: &[AggregateFunction]) -> Vec<Row> {
        let groups = if group_by.is_empty() {
            vec![rows]
        } else {
            Self::group(rows, group_by)
        };
        tracing::debug!(groups = groups.len(), aggregates = aggregates.len(), "grouped rows");

        groups
            .into_iter()
            .map(|group| {
                let mut out = group.first().cloned().unwrap_or_default();
                for agg in aggregates {
                    out.set(agg.to_string(), Self::compute_aggregate(agg, &group));
                }
                out
            })
            .collect()
    }

    fn group(rows: Vec<Row>, group_by: &[String]) -> Vec<Vec<Row>> {
        let mut index: HashMap<Vec<Value>, usize> = HashMap::new();
        let mut groups: Vec<Vec<Row>> = Vec::new();

        for row in rows {
            let key: Vec<Value> = group_by.iter().map(|col| row.value(col)).collect();
            match index.get(&key) {
                Some(&i) => groups[i].push(row),
                None => {
                    index.insert(key, groups.len());
                    groups.push(vec![row]);
                }
            }
        }

        groups
    }

    /// Compute aggregate function over one group
    pub fn compute_aggregate(agg: &AggregateFunction, rows: &[Row]) -> Value {
        match agg {
            AggregateFunction::Count(CountTarget::All) => Self::count_value(rows.len()),
            AggregateFunction::Count(CountTarget::Column(col)) => {
                Self::count_value(rows.iter().filter(|row| !row.value(col).is_null()).count())
            }
            AggregateFunction::Sum(col) => Self::sum(&Self::numeric(rows, col)),
            AggregateFunction::Avg(col) => {
                let values = Self::numeric(rows, col);
                if values.is_empty() {
                    return Value::Null;
                }
                let total: f64 = values.iter().filter_map(Value::as_number).sum();
                Value::Real(total / values.len() as f64)
            }
            AggregateFunction::Min(col) => Self::extreme(Self::numeric(rows, col), std::cmp::Ordering::Less),
            AggregateFunction::Max(col) => {
                Self::extreme(Self::numeric(rows, col), std::cmp::Ordering::Greater)
            }
        }
    }

    fn count_value(count: usize) -> Value {
        Value::Integer(i64::try_from(count).unwrap_or(i64::MAX))
    }

    /// Non-null values of `col` that read as numbers
    fn numeric(rows: &[Row], col: &str) -> Vec<Value> {
        rows.iter()
            .map(|row| row.value(col))
            .filter(|v| v.as_number().is_some())
            .collect()
    }

    /// Integer while every input is an integer, real otherwise
    fn sum(values: &[Value]) -> Value {
        let mut sum_int: Option<i64> = Some(0);
        let mut sum_real = 0.0;

        for value in values {
            sum_int = match (sum_int, value) {
                (Some(acc), Value::Integer(i)) => acc.checked_add(*i),
                _ => None,
            };
            sum_real += value.as_number().unwrap_or(0.0);
        }

        sum_int.map_or(Value::Real(sum_real), Value::Integer)
    }

    fn extreme(values: Vec<Value>, wanted: std::cmp::Ordering) -> Value {
        values
            .into_iter()
            .reduce(|best, v| if v.compare(&best) == Some(wanted) { v } else { best })
            .unwrap_or(Value::Null)
    }
}
