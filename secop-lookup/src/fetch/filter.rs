//! Supplier filter predicate and its SoQL rendering
//!
//! The predicate is kept structured until the last moment. User input only
//! ever appears inside a quoted SoQL string literal with embedded quotes
//! doubled, so it cannot close the literal and append clauses. The rendered
//! expression travels as a query-string parameter and is percent-encoded by
//! the HTTP client.
//!
//! SoQL `like` has no escape for `%` and `_`, so the remote query can match
//! more than the term says. [`SupplierFilter::retain_matches`] narrows a
//! fetched set to the literal predicate.

use secop_common::{Error, Record, RecordSet, Result};

/// "upper(name) contains upper(term) OR id == term"
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupplierFilter {
    name_field: &'static str,
    id_field: &'static str,
    term: String,
}

impl SupplierFilter {
    /// Build a filter over the given name/id fields.
    ///
    /// The term is kept exactly as entered; blank terms are rejected.
    pub fn new(name_field: &'static str, id_field: &'static str, term: &str) -> Result<Self> {
        for field in [name_field, id_field] {
            if !is_valid_identifier(field) {
                return Err(Error::InvalidInput(format!("Invalid field name: {}", field)));
            }
        }
        if term.trim().is_empty() {
            return Err(Error::InvalidInput("Empty supplier search term".to_string()));
        }
        Ok(Self {
            name_field,
            id_field,
            term: term.to_string(),
        })
    }

    pub fn term(&self) -> &str {
        &self.term
    }

    /// Literal predicate: the upper-cased name contains the upper-cased
    /// term, or the id equals the term exactly
    pub fn matches(&self, record: &Record) -> bool {
        let name_hit = record
            .text(self.name_field)
            .is_some_and(|name| name.to_uppercase().contains(&self.term.to_uppercase()));
        name_hit || record.text(self.id_field).as_deref() == Some(self.term.as_str())
    }

    /// Drop records the remote `like` let through but the literal predicate rejects
    pub fn retain_matches(&self, mut records: RecordSet) -> RecordSet {
        records.retain(|r| self.matches(r));
        records
    }

    /// Render as a SoQL `$where` expression
    pub fn to_soql(&self) -> String {
        let pattern = format!("%{}%", self.term.to_uppercase());
        format!(
            "upper({}) like {} OR {} = {}",
            self.name_field,
            soql_string_literal(&pattern),
            self.id_field,
            soql_string_literal(&self.term),
        )
    }
}

/// Quote a value as a SoQL string literal
pub fn soql_string_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Dataset field names: ASCII letters, digits and underscore
fn is_valid_identifier(name: &str) -> bool {
    !name.is_empty()
        && name.len() < 100
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}
