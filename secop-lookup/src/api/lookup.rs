//! Supplier lookup and spreadsheet download
//!
//! Both routes run the whole pipeline for one request: build the filter,
//! fetch once, aggregate against the injected clock, render.

use axum::{
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use secop_common::RecordSet;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info, warn};

use crate::aggregate::aggregate;
use crate::dataset::Dataset;
use crate::error::{ApiError, ApiResult};
use crate::fetch::{FetchError, SupplierFilter};
use crate::report::export::{table_to_xlsx, XLSX_CONTENT_TYPE};
use crate::report::Report;
use crate::AppState;

/// Query parameters shared by search and export
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Supplier name fragment or document number
    #[serde(default)]
    pub q: String,
}

fn supplier_filter(dataset: Dataset, term: &str) -> ApiResult<SupplierFilter> {
    if term.trim().is_empty() {
        return Err(ApiError::BadRequest(
            "Ingrese el nombre o identificador del proveedor".to_string(),
        ));
    }
    Ok(SupplierFilter::new(
        dataset.supplier_name_field(),
        dataset.supplier_id_field(),
        term,
    )?)
}

/// Run the query and keep only rows that literally match the term
async fn fetch_matching(
    state: &AppState,
    dataset: Dataset,
    filter: &SupplierFilter,
) -> Result<RecordSet, FetchError> {
    let fetched = state.source(dataset).fetch(filter).await?;
    let fetched_count = fetched.len();
    let records = filter.retain_matches(fetched);
    if records.len() < fetched_count {
        debug!(
            dataset = %dataset,
            fetched = fetched_count,
            kept = records.len(),
            "Dropped rows matched only through like wildcards"
        );
    }
    Ok(records)
}

/// GET /api/:dataset/search?q=...
///
/// Fetch failures and empty results still answer 200 with a report that
/// carries only the corresponding notice.
pub async fn search(
    State(state): State<AppState>,
    Path(dataset): Path<Dataset>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Json<Report>> {
    let filter = supplier_filter(dataset, &query.q)?;
    let started = Instant::now();

    let report = match fetch_matching(&state, dataset, &filter).await {
        Ok(records) => {
            let aggregation = aggregate(dataset, &records, (state.clock)());
            info!(
                dataset = %dataset,
                records = records.len(),
                notices = aggregation.notices.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Supplier search complete"
            );
            Report::render(&query.q, aggregation)
        }
        Err(e) => {
            warn!(dataset = %dataset, error = %e, "Supplier search fetch failed");
            Report::fetch_failed(dataset, &query.q, &e)
        }
    };

    Ok(Json(report))
}

/// GET /api/:dataset/export?q=...
///
/// Re-runs the search and streams the display table as an xlsx download.
pub async fn export(
    State(state): State<AppState>,
    Path(dataset): Path<Dataset>,
    Query(query): Query<LookupQuery>,
) -> ApiResult<Response> {
    let filter = supplier_filter(dataset, &query.q)?;

    let records = fetch_matching(&state, dataset, &filter).await.map_err(|e| {
        warn!(dataset = %dataset, error = %e, "Export fetch failed");
        ApiError::Upstream(e)
    })?;

    let aggregation = aggregate(dataset, &records, (state.clock)());
    if aggregation.is_empty_result() {
        return Err(ApiError::NotFound(
            "No se encontraron datos para el proveedor ingresado.".to_string(),
        ));
    }

    let table = aggregation.table.ok_or_else(|| {
        ApiError::Unprocessable("El listado no está disponible para exportar".to_string())
    })?;

    let bytes = table_to_xlsx(&table).map_err(|e| ApiError::Internal(e.to_string()))?;
    info!(
        dataset = %dataset,
        rows = table.row_count(),
        bytes = bytes.len(),
        "Spreadsheet export generated"
    );

    let disposition = format!("attachment; filename=\"{}\"", dataset.export_file_name());
    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}
