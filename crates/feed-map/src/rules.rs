//! Mapping rules and default tables.
//!
//! A [`RuleTable`] is the ordered output layout: every output field appears
//! once, in output order, with an optional [`MappingRule`]. Fields without a
//! rule take their value from the [`DefaultTable`], or stay empty.

use std::collections::BTreeMap;
use std::fmt;

use feed_ingest::blank_column_name;
use feed_model::{ColumnRef, Record};

use crate::error::TransformError;

/// Signature of a named transform.
pub type TransformFn = fn(&Record) -> Result<String, TransformError>;

/// A pure function over the whole input record, named for logs.
#[derive(Clone, Copy)]
pub struct NamedTransform {
    pub name: &'static str,
    pub func: TransformFn,
}

impl NamedTransform {
    pub const fn new(name: &'static str, func: TransformFn) -> Self {
        Self { name, func }
    }

    pub fn apply(&self, input: &Record) -> Result<String, TransformError> {
        (self.func)(input)
    }
}

impl fmt::Debug for NamedTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamedTransform").field(&self.name).finish()
    }
}

impl PartialEq for NamedTransform {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MappingRule {
    /// Copy the source column verbatim.
    ColumnCopy(ColumnRef),
    Constant(String),
    Transform(NamedTransform),
}

/// Ordered output fields and the rule, if any, that fills each one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RuleTable {
    fields: Vec<(String, Option<MappingRule>)>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table with the given layout and no rules.
    ///
    /// Empty names become blank placeholder columns, numbered in order.
    pub fn from_layout(layout: &[&str]) -> Self {
        let mut blanks = 0;
        let fields = layout
            .iter()
            .map(|name| {
                if name.is_empty() {
                    blanks += 1;
                    (blank_column_name(blanks), None)
                } else {
                    ((*name).to_string(), None)
                }
            })
            .collect();
        Self { fields }
    }

    /// Sets the rule for `field`, appending the field when the layout lacks it.
    pub fn set(&mut self, field: &str, rule: MappingRule) {
        match self.fields.iter_mut().find(|(name, _)| name == field) {
            Some((_, slot)) => *slot = Some(rule),
            None => self.fields.push((field.to_string(), Some(rule))),
        }
    }

    pub fn copy(mut self, field: &str, source: impl Into<ColumnRef>) -> Self {
        self.set(field, MappingRule::ColumnCopy(source.into()));
        self
    }

    pub fn constant(mut self, field: &str, value: impl Into<String>) -> Self {
        self.set(field, MappingRule::Constant(value.into()));
        self
    }

    pub fn transform(mut self, field: &str, transform: NamedTransform) -> Self {
        self.set(field, MappingRule::Transform(transform));
        self
    }

    pub fn rule(&self, field: &str) -> Option<&MappingRule> {
        self.fields
            .iter()
            .find(|(name, _)| name == field)
            .and_then(|(_, rule)| rule.as_ref())
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, Option<&MappingRule>)> {
        self.fields
            .iter()
            .map(|(name, rule)| (name.as_str(), rule.as_ref()))
    }

    /// Output column names, placeholders included.
    pub fn headers(&self) -> Vec<String> {
        self.fields.iter().map(|(name, _)| name.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Fallback values by output field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DefaultTable {
    values: BTreeMap<String, String>,
}

impl DefaultTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: &str, value: impl Into<String>) -> Self {
        self.values.insert(field.to_string(), value.into());
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.values.get(field).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for DefaultTable {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        }
    }
}
