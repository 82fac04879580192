use serde::{Deserialize, Serialize};
use super::value::Value;

/// Ordered mapping of field name to value.
///
/// Fields keep the order they were given in, which is also the order a
/// `SELECT *` reports them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Row {
    fields: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub const fn new() -> Self {
        Self { fields: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Exact-key lookup
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Sets a field, replacing it in place when it already exists.
    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        let name = name.into();
        match self.fields.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    /// Column lookup used by predicates, ordering and projection.
    ///
    /// Tries the exact key, then the bare column of a qualified `t.c`, then the
    /// first `*.c` key for a bare `c`.
    #[must_use]
    pub fn resolve(&self, name: &str) -> Option<&Value> {
        if let Some(v) = self.get(name) {
            return Some(v);
        }
        if let Some((_, column)) = name.rsplit_once('.') {
            return self.get(column);
        }
        self.fields
            .iter()
            .find(|(k, _)| k.rsplit_once('.').is_some_and(|(_, c)| c == name))
            .map(|(_, v)| v)
    }

    /// Resolved value, or null when the field is absent
    #[must_use]
    pub fn value(&self, name: &str) -> Value {
        self.resolve(name).cloned().unwrap_or(Value::Null)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Copies every field into `target`, prefixing keys with `table.`
    pub fn extend_qualified(&self, table: &str, target: &mut Self) {
        for (k, v) in &self.fields {
            target.fields.push((format!("{table}.{k}"), v.clone()));
        }
    }
}

impl FromIterator<(String, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut row = Self::new();
        for (k, v) in iter {
            row.set(k, v);
        }
        row
    }
}

impl<'a> FromIterator<(&'a str, Value)> for Row {
    fn from_iter<I: IntoIterator<Item = (&'a str, Value)>>(iter: I) -> Self {
        iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }
}

impl IntoIterator for Row {
    type Item = (String, Value);
    type IntoIter = std::vec::IntoIter<(String, Value)>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.into_iter()
    }
}
