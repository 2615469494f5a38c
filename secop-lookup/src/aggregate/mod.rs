//! Record aggregation for the lookup report
//!
//! Turns a raw [`RecordSet`] into everything the report needs: supplier
//! identity, summary scalars, per-year counts, status distribution and a
//! relabeled display table. Aggregation is a pure function of the records
//! and a reference instant; it never fails, it degrades and records a
//! [`Notice`] instead.

pub mod contracts;
pub mod processes;

use chrono::{Datelike, NaiveDateTime};
use secop_common::format::{format_date_dmy, format_money_or_na};
use secop_common::{Record, RecordSet};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use crate::dataset::Dataset;
use crate::notice::Notice;

/// Representative supplier of a result set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SupplierIdentity {
    /// Upper-cased display name
    pub name: String,
    /// Kind of identifier ("NIT", "CÉDULA DE CIUDADANÍA", ...)
    pub id_label: String,
    pub id_value: String,
}

/// Summary scalars shown above the charts
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_value: f64,
    pub record_count: usize,
    pub entity_count: usize,
    /// Contracts only: active contracts beyond the first one
    pub simultaneous: Option<usize>,
}

impl SummaryStats {
    fn zero(dataset: Dataset) -> Self {
        Self {
            total_value: 0.0,
            record_count: 0,
            entity_count: 0,
            simultaneous: match dataset {
                Dataset::Contracts => Some(0),
                Dataset::Processes => None,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: usize,
}

/// Relabeled rows ready for display and export
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl DisplayTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Everything derived from one result set
#[derive(Debug, Clone, PartialEq)]
pub struct Aggregation {
    pub dataset: Dataset,
    pub identity: Option<SupplierIdentity>,
    /// Number of distinct identity tuples seen (0 when identity columns are absent)
    pub distinct_identities: usize,
    pub stats: SummaryStats,
    /// Ascending by year, only years that occur
    pub by_year: Vec<YearCount>,
    /// Descending by count; empty when the status field is absent
    pub status: Vec<StatusCount>,
    /// Absent when a strict view is missing a column
    pub table: Option<DisplayTable>,
    pub notices: Vec<Notice>,
}

impl Aggregation {
    /// Result for a query that matched nothing
    pub fn empty(dataset: Dataset) -> Self {
        Self {
            dataset,
            identity: None,
            distinct_identities: 0,
            stats: SummaryStats::zero(dataset),
            by_year: Vec::new(),
            status: Vec::new(),
            table: None,
            notices: vec![Notice::empty_result()],
        }
    }

    pub fn is_empty_result(&self) -> bool {
        self.stats.record_count == 0
    }
}

/// Aggregate a result set of the given dataset relative to `now`
pub fn aggregate(dataset: Dataset, records: &RecordSet, now: NaiveDateTime) -> Aggregation {
    match dataset {
        Dataset::Contracts => contracts::aggregate(records, now),
        Dataset::Processes => processes::aggregate(records),
    }
}

// ============================================================================
// Shared building blocks
// ============================================================================

/// How a table cell is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CellFormat {
    Text,
    Upper,
    Date,
    Money,
}

/// Raw field → display label mapping for one table column
#[derive(Debug, Clone, Copy)]
pub(crate) struct ColumnSpec {
    pub field: &'static str,
    pub label: &'static str,
    pub format: CellFormat,
}

impl ColumnSpec {
    pub(crate) const fn new(field: &'static str, label: &'static str, format: CellFormat) -> Self {
        Self { field, label, format }
    }

    fn render(&self, record: &Record) -> String {
        match self.format {
            CellFormat::Text => record.text(self.field).unwrap_or_default(),
            CellFormat::Upper => record
                .text(self.field)
                .map(|s| s.to_uppercase())
                .unwrap_or_default(),
            CellFormat::Date => record
                .timestamp(self.field)
                .map(|d| format_date_dmy(&d))
                .unwrap_or_default(),
            CellFormat::Money => format_money_or_na(record.number(self.field)),
        }
    }
}

pub(crate) fn build_table<'a>(
    columns: &[ColumnSpec],
    rows: impl IntoIterator<Item = &'a Record>,
) -> DisplayTable {
    DisplayTable {
        columns: columns.iter().map(|c| c.label.to_string()).collect(),
        rows: rows
            .into_iter()
            .map(|r| columns.iter().map(|c| c.render(r)).collect())
            .collect(),
    }
}

/// First distinct identity tuple and the number of distinct tuples.
///
/// `None` unless every identity field exists as a column. Tuples are compared
/// as raw text, nulls included, in first-seen order.
pub(crate) fn first_identity(
    records: &RecordSet,
    fields: &[&str],
) -> Option<(Vec<Option<String>>, usize)> {
    if !records.missing_columns(fields).is_empty() {
        return None;
    }

    let mut distinct: Vec<Vec<Option<String>>> = Vec::new();
    for record in records {
        let tuple: Vec<Option<String>> = fields.iter().map(|f| record.text(f)).collect();
        if !distinct.contains(&tuple) {
            distinct.push(tuple);
        }
    }

    let count = distinct.len();
    distinct.into_iter().next().map(|first| (first, count))
}

/// Sum of the numeric values of a field; absent values are skipped
pub(crate) fn sum_values<'a>(rows: impl IntoIterator<Item = &'a Record>, field: &str) -> f64 {
    rows.into_iter().filter_map(|r| r.number(field)).sum()
}

/// Occurrences per calendar year, ascending, without zero-filled gaps
pub(crate) fn year_counts(dates: impl IntoIterator<Item = NaiveDateTime>) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for date in dates {
        *counts.entry(date.year()).or_insert(0) += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// Counts of each non-null value of a field, most frequent first.
///
/// Ties keep the order in which values were first seen.
pub(crate) fn status_counts<'a>(
    rows: impl IntoIterator<Item = &'a Record>,
    field: &str,
) -> Vec<StatusCount> {
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in rows.into_iter().filter_map(|r| r.text(field)) {
        match counts.get_mut(&value) {
            Some(count) => *count += 1,
            None => {
                counts.insert(value.clone(), 1);
                order.push(value);
            }
        }
    }

    let mut result: Vec<StatusCount> = order
        .into_iter()
        .map(|status| {
            let count = counts.get(&status).copied().unwrap_or(0);
            StatusCount { status, count }
        })
        .collect();
    // Stable: ties stay in first-seen order
    result.sort_by(|a, b| b.count.cmp(&a.count));
    result
}
