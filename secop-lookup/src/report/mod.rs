//! Report rendering
//!
//! Pure shaping of an [`Aggregation`] into what the page shows. Sections
//! with nothing to show are left out rather than rendered empty.

pub mod charts;
pub mod export;

use secop_common::format::format_money;
use serde::Serialize;

use crate::aggregate::{Aggregation, DisplayTable, SummaryStats, SupplierIdentity};
use crate::dataset::Dataset;
use crate::fetch::FetchError;
use crate::notice::Notice;

pub use charts::{BarChart, PieChart};

/// One labeled figure in the summary block
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryItem {
    pub label: String,
    pub value: String,
}

impl SummaryItem {
    fn new(label: &str, value: impl ToString) -> Self {
        Self {
            label: label.to_string(),
            value: value.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBlock {
    /// Total monetary value
    pub headline: SummaryItem,
    pub items: Vec<SummaryItem>,
}

/// Download offered under the table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExportInfo {
    pub file_name: String,
}

/// Everything the page renders for one search
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub dataset: Dataset,
    pub title: String,
    pub query: String,
    pub notices: Vec<Notice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub identity: Option<SupplierIdentity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<SummaryBlock>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_chart: Option<BarChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pie_chart: Option<PieChart>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<DisplayTable>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export: Option<ExportInfo>,
}

impl Report {
    fn bare(dataset: Dataset, query: &str, notices: Vec<Notice>) -> Self {
        Self {
            dataset,
            title: dataset.title().to_string(),
            query: query.to_string(),
            notices,
            identity: None,
            summary: None,
            bar_chart: None,
            pie_chart: None,
            table: None,
            export: None,
        }
    }

    /// Report for a search whose fetch failed: the error notice and nothing else
    pub fn fetch_failed(dataset: Dataset, query: &str, error: &FetchError) -> Self {
        Self::bare(dataset, query, vec![Notice::fetch_failed(error)])
    }

    /// Render an aggregation
    pub fn render(query: &str, aggregation: Aggregation) -> Self {
        let dataset = aggregation.dataset;
        if aggregation.is_empty_result() {
            return Self::bare(dataset, query, aggregation.notices);
        }

        let export = aggregation.table.as_ref().map(|_| ExportInfo {
            file_name: dataset.export_file_name().to_string(),
        });

        Self {
            dataset,
            title: dataset.title().to_string(),
            query: query.to_string(),
            identity: aggregation.identity,
            summary: Some(summary_block(dataset, &aggregation.stats)),
            bar_chart: charts::year_chart(dataset, &aggregation.by_year),
            pie_chart: charts::status_chart(dataset, &aggregation.status),
            table: aggregation.table,
            export,
            notices: aggregation.notices,
        }
    }
}

fn summary_block(dataset: Dataset, stats: &SummaryStats) -> SummaryBlock {
    let total = format_money(stats.total_value);
    match dataset {
        Dataset::Contracts => SummaryBlock {
            headline: SummaryItem::new("Valor Total de Contratos", total),
            items: vec![
                SummaryItem::new("Número de Contratos", stats.record_count),
                SummaryItem::new("Total Entidades", stats.entity_count),
                SummaryItem::new("Contratos Simultáneos", stats.simultaneous.unwrap_or(0)),
            ],
        },
        Dataset::Processes => SummaryBlock {
            headline: SummaryItem::new("Valor Total de Procesos", total),
            items: vec![
                SummaryItem::new("Número de Procesos", stats.record_count),
                SummaryItem::new("Total Entidades", stats.entity_count),
            ],
        },
    }
}
