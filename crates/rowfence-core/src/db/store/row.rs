use crate::{traits::FieldValue, value::Value};
use derive_more::Deref;
use std::collections::BTreeMap;

static NULL: Value = Value::Null;

///
/// Row
///
/// Column name → value map for one stored row.
/// Reading a column the row does not carry yields `Null`.
///

#[derive(Clone, Debug, Default, Deref, Eq, PartialEq)]
pub struct Row(BTreeMap<String, Value>);

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style column assignment.
    #[must_use]
    pub fn with(mut self, field: impl Into<String>, value: impl FieldValue) -> Self {
        self.set(field, value);
        self
    }

    pub fn set(&mut self, field: impl Into<String>, value: impl FieldValue) {
        self.0.insert(field.into(), value.to_value());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> &Value {
        self.0.get(field).unwrap_or(&NULL)
    }

    /// Column names this row carries.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: FieldValue> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.to_value()))
                .collect(),
        )
    }
}

///
/// TESTS
///
