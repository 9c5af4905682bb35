//! Ordered records and column references.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Addresses a column by header name or by zero-based position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ColumnRef {
    Index(usize),
    Name(String),
}

impl ColumnRef {
    pub fn name(name: impl Into<String>) -> Self {
        ColumnRef::Name(name.into())
    }

    pub fn index(index: usize) -> Self {
        ColumnRef::Index(index)
    }
}

impl fmt::Display for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColumnRef::Name(name) => f.write_str(name),
            ColumnRef::Index(index) => write!(f, "#{index}"),
        }
    }
}

impl From<&str> for ColumnRef {
    fn from(value: &str) -> Self {
        ColumnRef::Name(value.to_string())
    }
}

impl From<String> for ColumnRef {
    fn from(value: String) -> Self {
        ColumnRef::Name(value)
    }
}

impl From<usize> for ColumnRef {
    fn from(value: usize) -> Self {
        ColumnRef::Index(value)
    }
}

/// One row of a contract feed, keeping the column order of its source.
///
/// Header names are not required to be unique. Lookup by name returns the
/// first occurrence, lookup by index addresses the exact position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    fields: Vec<(String, String)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(key, value)| (key.into(), value.into()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|idx| self.fields[idx].1.as_str())
    }

    pub fn get_index(&self, index: usize) -> Option<&str> {
        self.fields.get(index).map(|(_, value)| value.as_str())
    }

    pub fn get_ref(&self, column: &ColumnRef) -> Option<&str> {
        match column {
            ColumnRef::Name(name) => self.get(name),
            ColumnRef::Index(index) => self.get_index(*index),
        }
    }

    /// Returns the trimmed value, or `None` when absent or blank.
    pub fn get_non_empty(&self, name: &str) -> Option<&str> {
        self.get(name)
            .map(str::trim)
            .filter(|value| !value.is_empty())
    }

    /// Overwrites the first field with this name, appending it when absent.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.position(name) {
            Some(idx) => self.fields[idx].1 = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(_, value)| value.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|(key, _)| key == name)
    }
}

impl FromIterator<(String, String)> for Record {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_occurrence_wins_for_duplicate_names() {
        let record = Record::from_pairs([("TEL", "090"), ("TEL", "080")]);
        assert_eq!(record.get("TEL"), Some("090"));
        assert_eq!(record.get_index(1), Some("080"));
    }

    #[test]
    fn set_replaces_or_appends() {
        let mut record = Record::from_pairs([("a", "1")]);
        record.set("a", "2");
        record.set("b", "3");
        assert_eq!(record.get("a"), Some("2"));
        assert_eq!(record.names().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn column_ref_parses_names_and_indices() {
        let refs: Vec<ColumnRef> = serde_json::from_str(r#"["TEL携帯", 27]"#).unwrap();
        assert_eq!(refs, vec![ColumnRef::name("TEL携帯"), ColumnRef::index(27)]);
        assert_eq!(refs[1].to_string(), "#27");
    }

    #[test]
    fn blank_values_are_not_non_empty() {
        let record = Record::from_pairs([("a", "  "), ("b", " x ")]);
        assert_eq!(record.get_non_empty("a"), None);
        assert_eq!(record.get_non_empty("b"), Some("x"));
        assert_eq!(record.get_non_empty("missing"), None);
    }
}
