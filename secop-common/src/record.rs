//! Flat record model for open-data query results
//!
//! A [`Record`] is one JSON object from the dataset endpoint. Field names vary
//! between datasets and any field may be missing, so every accessor returns an
//! `Option`. A [`RecordSet`] keeps the rows in the order the endpoint
//! returned them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashSet;

use crate::time::parse_timestamp;

/// One flat record (contract or procurement process)
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Record(Map<String, Value>);

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style field insertion
    pub fn with(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.0.insert(field.to_string(), value.into());
        self
    }

    /// True when the record carries the key, even with a null value
    pub fn has_field(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    /// Field rendered as text. Null and missing fields are `None`.
    pub fn text(&self, field: &str) -> Option<String> {
        match self.0.get(field)? {
            Value::Null => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            Value::Bool(b) => Some(b.to_string()),
            other => Some(other.to_string()),
        }
    }

    /// Field coerced to a finite number.
    ///
    /// Accepts JSON numbers and numeric strings; anything else is absent.
    pub fn number(&self, field: &str) -> Option<f64> {
        let value = match self.0.get(field)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        }?;
        value.is_finite().then_some(value)
    }

    /// Field parsed as a timestamp
    pub fn timestamp(&self, field: &str) -> Option<NaiveDateTime> {
        match self.0.get(field)? {
            Value::String(s) => parse_timestamp(s),
            _ => None,
        }
    }
}

impl From<Map<String, Value>> for Record {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Ordered rows returned by one query
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct RecordSet(Vec<Record>);

impl RecordSet {
    pub fn new(records: Vec<Record>) -> Self {
        Self(records)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.0.iter()
    }

    /// Keep only the records for which `keep` returns true, in order
    pub fn retain(&mut self, keep: impl FnMut(&Record) -> bool) {
        self.0.retain(keep);
    }

    /// A field is a column of the set when any record carries it
    pub fn has_column(&self, field: &str) -> bool {
        self.0.iter().any(|r| r.has_field(field))
    }

    /// Columns from `fields` that no record carries, in the given order
    pub fn missing_columns<'a>(&self, fields: &[&'a str]) -> Vec<&'a str> {
        fields
            .iter()
            .copied()
            .filter(|f| !self.has_column(f))
            .collect()
    }

    /// Number of distinct non-null text values of a field
    pub fn distinct_count(&self, field: &str) -> usize {
        self.0
            .iter()
            .filter_map(|r| r.text(field))
            .collect::<HashSet<_>>()
            .len()
    }
}

impl From<Vec<Record>> for RecordSet {
    fn from(records: Vec<Record>) -> Self {
        Self(records)
    }
}

impl IntoIterator for RecordSet {
    type Item = Record;
    type IntoIter = std::vec::IntoIter<Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
