//! Contracts (SECOP II electronic contracts) aggregation
//!
//! The contracts view is strict: the listing needs all seven labeled
//! columns and is withheld when any is missing. Rows whose signing date does
//! not parse are dropped from the listing, the charts and the concurrency
//! count, but still count toward the totals.

use chrono::NaiveDateTime;
use secop_common::time::add_months;
use secop_common::{Record, RecordSet};

use super::{
    build_table, first_identity, status_counts, sum_values, year_counts, Aggregation,
    CellFormat, ColumnSpec, SummaryStats, SupplierIdentity,
};
use crate::dataset::Dataset;
use crate::notice::Notice;

const SUPPLIER_NAME: &str = "proveedor_adjudicado";
const SUPPLIER_ID: &str = "documento_proveedor";
const SUPPLIER_ID_TYPE: &str = "tipodocproveedor";

/// Preferred value field first
const VALUE_FIELDS: [&str; 2] = ["valor_total_adjudicado", "valor_del_contrato"];
const ENTITY_FIELD: &str = "nombre_entidad";
const STATUS_FIELD: &str = "estado_contrato";
const SIGNING_DATE: &str = "fecha_de_firma";

/// Explicit end-date fields; the first one present in the result set is used
const END_DATE_FIELDS: [&str; 2] = ["fecha_de_fin_del_contrato", "fecha_fin"];

/// Execution window assumed when the result set has no end-date column
pub const DEFAULT_EXECUTION_MONTHS: u32 = 6;

const TABLE_COLUMNS: [ColumnSpec; 7] = [
    ColumnSpec::new("nombre_entidad", "Entidad", CellFormat::Text),
    ColumnSpec::new("id_contrato", "ID Contrato", CellFormat::Text),
    ColumnSpec::new("estado_contrato", "Estado", CellFormat::Text),
    ColumnSpec::new("justificacion_modalidad_de", "Justificación", CellFormat::Text),
    ColumnSpec::new("fecha_de_firma", "Fecha de Firma", CellFormat::Date),
    ColumnSpec::new("valor_del_contrato", "Valor del Contrato", CellFormat::Money),
    ColumnSpec::new("objeto_del_contrato", "Objeto del Contrato", CellFormat::Text),
];

pub fn aggregate(records: &RecordSet, now: NaiveDateTime) -> Aggregation {
    if records.is_empty() {
        return Aggregation::empty(Dataset::Contracts);
    }

    let mut notices = Vec::new();

    let (identity, distinct_identities) =
        match first_identity(records, &[SUPPLIER_NAME, SUPPLIER_ID, SUPPLIER_ID_TYPE]) {
            Some((first, count)) => {
                if count > 1 {
                    notices.push(Notice::ambiguous_identity());
                }
                (Some(identity_from_tuple(&first)), count)
            }
            None => (None, 0),
        };

    let total_value = match VALUE_FIELDS.iter().copied().find(|f| records.has_column(f)) {
        Some(field) => sum_values(records, field),
        None => {
            tracing::warn!(dataset = "contracts", "No contract value column in response");
            notices.push(Notice::missing_column(
                "No se encontró la columna de valor adjudicado en los datos.",
            ));
            0.0
        }
    };

    let record_count = records.len();
    let entity_count = records.distinct_count(ENTITY_FIELD);

    let (rows, simultaneous, by_year) = if records.has_column(SIGNING_DATE) {
        let signed = signed_rows(records);
        let end_field = END_DATE_FIELDS.iter().copied().find(|f| records.has_column(f));
        let simultaneous = simultaneous_count(&signed, end_field, now);
        let by_year = year_counts(signed.iter().map(|(date, _)| *date));
        let rows: Vec<&Record> = signed.into_iter().map(|(_, r)| r).collect();
        (rows, simultaneous, by_year)
    } else {
        (records.iter().collect(), 0, Vec::new())
    };

    let status = status_counts(rows.iter().copied(), STATUS_FIELD);

    let required: Vec<&str> = TABLE_COLUMNS.iter().map(|c| c.field).collect();
    let missing = records.missing_columns(&required);
    let table = if missing.is_empty() {
        Some(build_table(&TABLE_COLUMNS, rows.iter().copied()))
    } else {
        tracing::warn!(dataset = "contracts", missing = ?missing, "Contract listing withheld");
        notices.push(Notice::missing_column(format!(
            "No se puede mostrar el listado de contratos; faltan columnas: {}",
            missing.join(", ")
        )));
        None
    };

    Aggregation {
        dataset: Dataset::Contracts,
        identity,
        distinct_identities,
        stats: SummaryStats {
            total_value,
            record_count,
            entity_count,
            simultaneous: Some(simultaneous),
        },
        by_year,
        status,
        table,
        notices,
    }
}

fn identity_from_tuple(tuple: &[Option<String>]) -> SupplierIdentity {
    let field = |i: usize| tuple.get(i).cloned().flatten().unwrap_or_default();
    SupplierIdentity {
        name: field(0).to_uppercase(),
        id_value: field(1),
        id_label: field(2).to_uppercase(),
    }
}

/// Rows with a parseable signing date, ascending by that date (stable)
fn signed_rows(records: &RecordSet) -> Vec<(NaiveDateTime, &Record)> {
    let mut signed: Vec<(NaiveDateTime, &Record)> = records
        .iter()
        .filter_map(|r| r.timestamp(SIGNING_DATE).map(|d| (d, r)))
        .collect();
    signed.sort_by_key(|(date, _)| *date);
    signed
}

/// End of a contract's execution window. With an end-date column in the
/// set, a row whose value is absent or unparseable has no window at all.
fn end_date(
    record: &Record,
    end_field: Option<&str>,
    signed: NaiveDateTime,
) -> Option<NaiveDateTime> {
    match end_field {
        Some(field) => record.timestamp(field),
        None => Some(add_months(signed, DEFAULT_EXECUTION_MONTHS)),
    }
}

/// Contracts whose window covers `now`, beyond the first one
fn simultaneous_count(
    signed: &[(NaiveDateTime, &Record)],
    end_field: Option<&str>,
    now: NaiveDateTime,
) -> usize {
    signed
        .iter()
        .filter(|(start, record)| {
            *start <= now && end_date(record, end_field, *start).is_some_and(|end| end >= now)
        })
        .count()
        .saturating_sub(1)
}
