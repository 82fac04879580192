/// Two-way joins (INNER, LEFT, RIGHT, CROSS)
///
/// Nested loop over both row sequences. Merged rows are keyed
/// `table.column` so both sides stay addressable after the merge.

use crate::parser::{JoinClause, JoinType};
use crate::types::{Row, Value};

pub struct JoinExecutor;

impl JoinExecutor {
    pub fn join(left_rows: &[Row], right_rows: &[Row], join: &JoinClause) -> Vec<Row> {
        tracing::debug!(
            join_type = ?join.join_type,
            left = %join.left,
            right = %join.right,
            left_rows = left_rows.len(),
            right_rows = right_rows.len(),
            "executing join"
        );

        let mut result = Vec::new();

        if join.join_type == JoinType::Right {
            // Mirror of LEFT: right-major, unmatched right rows in place
            let nulls = Self::null_row(left_rows.first());
            for right_row in right_rows {
                let before = result.len();
                for left_row in left_rows {
                    let merged = Self::merge(&join.left, left_row, &join.right, right_row);
                    if Self::matches(&merged, join) {
                        result.push(merged);
                    }
                }
                if result.len() == before {
                    result.push(Self::merge(&join.left, &nulls, &join.right, right_row));
                }
            }
            return result;
        }

        for left_row in left_rows {
            let before = result.len();
            for right_row in right_rows {
                let merged = Self::merge(&join.left, left_row, &join.right, right_row);
                if Self::matches(&merged, join) {
                    result.push(merged);
                }
            }

            // For LEFT JOIN, include non-matching rows with NULLs
            if result.len() == before && join.join_type == JoinType::Left {
                let nulls = Self::null_row(right_rows.first());
                result.push(Self::merge(&join.left, left_row, &join.right, &nulls));
            }
        }

        result
    }

    /// Whether a merged pair satisfies the join's equality; null never matches
    fn matches(merged: &Row, join: &JoinClause) -> bool {
        match (&join.join_type, &join.on) {
            (JoinType::Cross, _) | (_, None) => true,
            (_, Some((left_col, right_col))) => {
                merged.value(left_col).loose_eq(&merged.value(right_col))
            }
        }
    }

    fn merge(left_name: &str, left: &Row, right_name: &str, right: &Row) -> Row {
        let mut merged = Row::new();
        left.extend_qualified(left_name, &mut merged);
        right.extend_qualified(right_name, &mut merged);
        merged
    }

    /// Null-valued row shaped like `template`; empty when there is no template
    fn null_row(template: Option<&Row>) -> Row {
        template
            .map(|row| row.keys().map(|k| (k, Value::Null)).collect::<Row>())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(pairs: &[(i64, &str)], key: &str) -> Vec<Row> {
        pairs
            .iter()
            .map(|(id, text)| {
                [(key, Value::Integer(*id)), ("label", Value::Text((*text).to_string()))]
                    .into_iter()
                    .collect()
            })
            .collect()
    }

    fn clause(join_type: JoinType) -> JoinClause {
        JoinClause {
            left: "a".to_string(),
            join_type,
            right: "b".to_string(),
            on: (join_type != JoinType::Cross).then(|| ("a.id".to_string(), "b.ref".to_string())),
        }
    }

    #[test]
    fn test_cross_join_is_left_major_product() {
        let left = rows(&[(1, "x"), (2, "y")], "id");
        let right = rows(&[(1, "p"), (3, "q"), (4, "r")], "ref");
        let result = JoinExecutor::join(&left, &right, &clause(JoinType::Cross));
        assert_eq!(result.len(), 6);
        assert_eq!(result[0].get("a.id"), Some(&Value::Integer(1)));
        assert_eq!(result[2].get("b.ref"), Some(&Value::Integer(4)));
        assert_eq!(result[3].get("a.id"), Some(&Value::Integer(2)));
    }

    #[test]
    fn test_inner_join_keys_are_qualified() {
        let left = rows(&[(1, "x"), (2, "y")], "id");
        let right = rows(&[(1, "p"), (1, "q"), (3, "r")], "ref");
        let result = JoinExecutor::join(&left, &right, &clause(JoinType::Inner));
        assert_eq!(result.len(), 2);
        let keys: Vec<&str> = result[0].keys().collect();
        assert_eq!(keys, vec!["a.id", "a.label", "b.ref", "b.label"]);
    }

    #[test]
    fn test_left_join_null_fills() {
        let left = rows(&[(1, "x"), (2, "y")], "id");
        let right = rows(&[(1, "p")], "ref");
        let result = JoinExecutor::join(&left, &right, &clause(JoinType::Left));
        assert_eq!(result.len(), 2);
        assert_eq!(result[1].get("b.label"), Some(&Value::Null));

        let result = JoinExecutor::join(&left, &[], &clause(JoinType::Left));
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].len(), 2);
    }

    #[test]
    fn test_right_join_follows_right_order() {
        let left = rows(&[(1, "x"), (2, "y")], "id");
        let right = rows(&[(3, "r"), (1, "p"), (1, "q")], "ref");
        let result = JoinExecutor::join(&left, &right, &clause(JoinType::Right));
        assert_eq!(result.len(), 3);
        assert_eq!(result[0].get("a.id"), Some(&Value::Null));
        assert_eq!(result[0].get("b.ref"), Some(&Value::Integer(3)));
        assert_eq!(result[1].get("b.label"), Some(&Value::Text("p".to_string())));
        assert_eq!(result[2].get("a.id"), Some(&Value::Integer(1)));
        let keys: Vec<&str> = result[0].keys().collect();
        assert_eq!(keys, vec!["a.id", "a.label", "b.ref", "b.label"]);
    }
}
