/// Scalar functions evaluated per row during projection
///
/// - `UPPER(col)` / `LOWER(col)` - case conversion of the text rendering
/// - `LENGTH(col)` - character count of the text rendering
/// - `ABS(col)` - absolute value of a number
/// - `ROUND(col)` - nearest whole number
///
/// Null input gives null output; ABS and ROUND of non-numeric input are null.
use crate::parser::ScalarFunction;
use crate::types::{Row, Value};

pub struct ScalarFunctions;

impl ScalarFunctions {
    #[must_use]
    pub fn evaluate(function: &ScalarFunction, row: &Row) -> Value {
        match function {
            ScalarFunction::Upper(col) => Self::map_text(row.value(col), |s| s.to_uppercase()),
            ScalarFunction::Lower(col) => Self::map_text(row.value(col), |s| s.to_lowercase()),
            ScalarFunction::Length(col) => match row.value(col) {
                Value::Null => Value::Null,
                value => {
                    let len = value.to_string().chars().count();
                    Value::Integer(i64::try_from(len).unwrap_or(i64::MAX))
                }
            },
            ScalarFunction::Abs(col) => match row.value(col) {
                Value::Integer(i) => i.checked_abs().map_or(Value::Real((i as f64).abs()), Value::Integer),
                value => value.as_number().map_or(Value::Null, |n| Value::Real(n.abs())),
            },
            ScalarFunction::Round(col) => match row.value(col) {
                Value::Integer(i) => Value::Integer(i),
                value => value.as_number().map_or(Value::Null, |n| Value::Real(n.round())),
            },
        }
    }

    fn map_text(value: Value, f: impl Fn(&str) -> String) -> Value {
        match value {
            Value::Null => Value::Null,
            Value::Text(s) => Value::Text(f(&s)),
            other => Value::Text(f(&other.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row() -> Row {
        [
            ("name", Value::Text("Zoë".to_string())),
            ("delta", Value::Integer(-4)),
            ("price", Value::Real(2.5)),
            ("code", Value::Text("-7.4".to_string())),
            ("gone", Value::Null),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_text_functions() {
        let row = row();
        assert_eq!(
            ScalarFunctions::evaluate(&ScalarFunction::Upper("name".into()), &row),
            Value::Text("ZOË".to_string())
        );
        assert_eq!(
            ScalarFunctions::evaluate(&ScalarFunction::Length("name".into()), &row),
            Value::Integer(3)
        );
        assert_eq!(
            ScalarFunctions::evaluate(&ScalarFunction::Lower("gone".into()), &row),
            Value::Null
        );
    }

    #[test]
    fn test_numeric_functions() {
        let row = row();
        assert_eq!(
            ScalarFunctions::evaluate(&ScalarFunction::Abs("delta".into()), &row),
            Value::Integer(4)
        );
        assert_eq!(
            ScalarFunctions::evaluate(&ScalarFunction::Round("price".into()), &row),
            Value::Real(3.0)
        );
        assert_eq!(
            ScalarFunctions::evaluate(&ScalarFunction::Abs("code".into()), &row),
            Value::Real(7.4)
        );
        assert_eq!(
            ScalarFunctions::evaluate(&ScalarFunction::Abs("name".into()), &row),
            Value::Null
        );
    }
}
