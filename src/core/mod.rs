// Module declarations
pub mod error;
pub mod value;
pub mod column;
pub mod row;
pub mod table;
pub mod database;

// Re-exports for convenience
pub use error::DatabaseError;
pub use value::Value;
pub use column::Column;
pub use row::Row;
pub use table::{Schema, TableSchema};
pub use database::Database;

#[cfg(test)]
mod tests {
    use super::*;
    use std::cmp::Ordering;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_string(), "NULL");
        assert_eq!(Value::Integer(42).to_string(), "42");
        assert_eq!(Value::Real(3.5).to_string(), "3.5");
        assert_eq!(Value::Text("hello".to_string()).to_string(), "hello");
    }

    #[test]
    fn test_value_compare_coerces_numbers() {
        assert_eq!(Value::Integer(2).compare(&Value::Real(2.0)), Some(Ordering::Equal));
        assert_eq!(Value::Integer(10).compare(&Value::Text("9".into())), Some(Ordering::Greater));
        assert_eq!(Value::Text("b".into()).compare(&Value::Text("a".into())), Some(Ordering::Greater));
        assert_eq!(Value::Null.compare(&Value::Integer(1)), None);
    }

    #[test]
    fn test_value_structural_equality() {
        use std::collections::HashSet;

        assert_eq!(Value::Integer(1), Value::Real(1.0));
        assert_eq!(Value::Real(0.0), Value::Real(-0.0));
        assert_ne!(Value::Integer(1), Value::Real(1.5));
        assert_ne!(Value::Integer(1), Value::Text("1".into()));
        assert_eq!(Value::Null, Value::Null);
        assert!(!Value::Null.loose_eq(&Value::Null));

        let set: HashSet<Value> = [Value::Integer(2), Value::Real(2.0), Value::Real(2.5)]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_value_to_literal() {
        assert_eq!(Value::Null.to_literal(), "NULL");
        assert_eq!(Value::Integer(-3).to_literal(), "-3");
        assert_eq!(Value::Real(2.0).to_literal(), "2.0");
        assert_eq!(Value::Text("it's".into()).to_literal(), "\"it's\"");
        assert_eq!(Value::Text("plain".into()).to_literal(), "'plain'");
    }

    #[test]
    fn test_row_resolve() {
        let row: Row = vec![
            ("users.id", Value::Integer(1)),
            ("orders.amount", Value::Integer(100)),
        ]
        .into_iter()
        .collect();

        assert_eq!(row.resolve("users.id"), Some(&Value::Integer(1)));
        assert_eq!(row.resolve("amount"), Some(&Value::Integer(100)));
        assert_eq!(row.resolve("missing"), None);
        assert_eq!(row.value("missing"), Value::Null);

        let plain: Row = vec![("id", Value::Integer(7))].into_iter().collect();
        assert_eq!(plain.resolve("users.id"), Some(&Value::Integer(7)));
    }

    #[test]
    fn test_row_set_keeps_order() {
        let mut row = Row::new();
        row.set("a", Value::Integer(1));
        row.set("b", Value::Integer(2));
        row.set("a", Value::Integer(3));
        let keys: Vec<&str> = row.keys().collect();
        assert_eq!(keys, vec!["a", "b"]);
        assert_eq!(row.get("a"), Some(&Value::Integer(3)));
    }

    #[test]
    fn test_table_schema_lookup() {
        let table = TableSchema::new(
            "users".to_string(),
            vec![Column::new("id", "INTEGER PRIMARY KEY"), Column::new("name", "TEXT")],
            Some("id".to_string()),
        );
        assert_eq!(table.get_column_index("name"), Some(1));
        assert_eq!(table.get_column_index("age"), None);
        assert_eq!(table.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
    }
}
