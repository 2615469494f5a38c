//! Procurement processes aggregation
//!
//! Lenient counterpart of the contracts view: every labeled column is
//! optional and no row is ever dropped from the listing. A publication date
//! that does not parse only keeps that row out of the per-year chart.

use secop_common::RecordSet;

use super::{
    build_table, first_identity, status_counts, sum_values, year_counts, Aggregation,
    CellFormat, ColumnSpec, SummaryStats, SupplierIdentity,
};
use crate::dataset::Dataset;
use crate::notice::Notice;

const SUPPLIER_NAME: &str = "nombre_del_proveedor";
const SUPPLIER_NIT: &str = "nit_del_proveedor_adjudicado";
const VALUE_FIELD: &str = "precio_base";
const ENTITY_FIELD: &str = "entidad";
const STATUS_FIELD: &str = "estado_proceso";
const PUBLISHED_DATE: &str = "fecha_de_publicacion_del_proceso";

/// Label shown next to the supplier's tax id
const NIT_LABEL: &str = "NIT";

const TABLE_COLUMNS: [ColumnSpec; 5] = [
    ColumnSpec::new("entidad", "Entidad", CellFormat::Text),
    ColumnSpec::new("nombre_del_proveedor", "Proveedor", CellFormat::Upper),
    ColumnSpec::new("nit_del_proveedor_adjudicado", "NIT Proveedor", CellFormat::Text),
    ColumnSpec::new(
        "fecha_de_publicacion_del_proceso",
        "Fecha de Publicación",
        CellFormat::Date,
    ),
    ColumnSpec::new("precio_base", "Precio Base", CellFormat::Money),
];

pub fn aggregate(records: &RecordSet) -> Aggregation {
    if records.is_empty() {
        return Aggregation::empty(Dataset::Processes);
    }

    let mut notices = Vec::new();

    let (identity, distinct_identities) =
        match first_identity(records, &[SUPPLIER_NAME, SUPPLIER_NIT]) {
            Some((first, count)) => {
                if count > 1 {
                    notices.push(Notice::ambiguous_identity());
                }
                let field = |i: usize| first.get(i).cloned().flatten().unwrap_or_default();
                let identity = SupplierIdentity {
                    name: field(0).to_uppercase(),
                    id_label: NIT_LABEL.to_string(),
                    id_value: field(1),
                };
                (Some(identity), count)
            }
            None => (None, 0),
        };

    let total_value = if records.has_column(VALUE_FIELD) {
        sum_values(records, VALUE_FIELD)
    } else {
        tracing::warn!(dataset = "processes", "No base price column in response");
        notices.push(Notice::missing_column(
            "No se encontró la columna de precio base en los datos.",
        ));
        0.0
    };

    let by_year = year_counts(records.iter().filter_map(|r| r.timestamp(PUBLISHED_DATE)));
    let status = status_counts(records, STATUS_FIELD);

    let present: Vec<ColumnSpec> = TABLE_COLUMNS
        .iter()
        .copied()
        .filter(|c| records.has_column(c.field))
        .collect();
    // No labeled column at all: nothing to list or export
    let table = (!present.is_empty()).then(|| build_table(&present, records));

    Aggregation {
        dataset: Dataset::Processes,
        identity,
        distinct_identities,
        stats: SummaryStats {
            total_value,
            record_count: records.len(),
            entity_count: records.distinct_count(ENTITY_FIELD),
            simultaneous: None,
        },
        by_year,
        status,
        table,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notice::NoticeKind;
    use secop_common::Record;

    fn process(published: &str, price: &str) -> Record {
        Record::new()
            .with("entidad", "MINISTERIO DE SALUD")
            .with("nombre_del_proveedor", "Acme sas")
            .with("nit_del_proveedor_adjudicado", "900123456")
            .with("fecha_de_publicacion_del_proceso", published)
            .with("precio_base", price)
            .with("estado_proceso", "Adjudicado")
    }

    #[test]
    fn test_full_columns() {
        let records = RecordSet::new(vec![
            process("2022-03-10T00:00:00.000", "2000000"),
            process("2023-07-01T00:00:00.000", "500.5"),
            process("2023-08-01T00:00:00.000", "no definido"),
        ]);
        let agg = aggregate(&records);

        assert_eq!(agg.stats.total_value, 2_000_500.5);
        assert_eq!(agg.stats.record_count, 3);
        assert_eq!(agg.stats.entity_count, 1);
        assert_eq!(agg.stats.simultaneous, None);
        assert_eq!(
            agg.by_year.iter().map(|y| (y.year, y.count)).collect::<Vec<_>>(),
            vec![(2022, 1), (2023, 2)]
        );
        assert_eq!(agg.status[0].status, "Adjudicado");
        assert_eq!(agg.status[0].count, 3);

        let identity = agg.identity.unwrap();
        assert_eq!(identity.name, "ACME SAS");
        assert_eq!(identity.id_label, "NIT");
        assert_eq!(identity.id_value, "900123456");

        let table = agg.table.unwrap();
        assert_eq!(
            table.columns,
            vec!["Entidad", "Proveedor", "NIT Proveedor", "Fecha de Publicación", "Precio Base"]
        );
        assert_eq!(
            table.rows[0],
            vec!["MINISTERIO DE SALUD", "ACME SAS", "900123456", "10/03/2022", "$2,000,000.00 COP"]
        );
        assert_eq!(table.rows[2][4], "N/A");
    }

    #[test]
    fn test_missing_columns_degrade_gracefully() {
        let records = RecordSet::new(vec![
            Record::new().with("entidad", "A").with("precio_base", "10"),
            Record::new().with("entidad", "B"),
        ]);
        let agg = aggregate(&records);

        assert!(agg.identity.is_none());
        assert!(agg.by_year.is_empty());
        assert!(agg.status.is_empty());
        assert_eq!(agg.stats.entity_count, 2);

        let table = agg.table.unwrap();
        assert_eq!(table.columns, vec!["Entidad", "Precio Base"]);
        assert_eq!(table.rows, vec![vec!["A", "$10.00 COP"], vec!["B", "N/A"]]);
        assert!(agg.notices.is_empty());
    }

    #[test]
    fn test_missing_price_column_warns() {
        let records = RecordSet::new(vec![Record::new().with("entidad", "A")]);
        let agg = aggregate(&records);

        assert_eq!(agg.stats.total_value, 0.0);
        assert_eq!(agg.notices.len(), 1);
        assert_eq!(agg.notices[0].kind, NoticeKind::MissingColumn);
    }

    #[test]
    fn test_unparseable_dates_never_drop_rows() {
        let records = RecordSet::new(vec![
            process("2023-01-01", "1"),
            process("fecha invalida", "1"),
            process("", "1"),
        ]);
        let agg = aggregate(&records);

        assert_eq!(agg.table.as_ref().unwrap().row_count(), 3);
        assert_eq!(agg.table.unwrap().rows[1][3], "");
        assert_eq!(agg.by_year.len(), 1);
        assert_eq!(agg.by_year[0].count, 1);
    }

    #[test]
    fn test_ambiguous_nit() {
        let records = RecordSet::new(vec![
            process("2023-01-01", "1"),
            process("2023-01-01", "1").with("nit_del_proveedor_adjudicado", "800111222"),
        ]);
        let agg = aggregate(&records);

        assert_eq!(agg.distinct_identities, 2);
        assert_eq!(agg.notices[0].kind, NoticeKind::AmbiguousIdentity);
        assert_eq!(agg.identity.unwrap().id_value, "900123456");
    }

    #[test]
    fn test_no_labeled_columns_omits_table() {
        let records = RecordSet::new(vec![
            Record::new().with("modalidad_de_contratacion", "Mínima cuantía"),
            Record::new().with("modalidad_de_contratacion", "Licitación pública"),
        ]);
        let agg = aggregate(&records);

        assert!(agg.table.is_none());
        assert_eq!(agg.stats.record_count, 2);
    }

    #[test]
    fn test_empty_set() {
        let agg = aggregate(&RecordSet::default());
        assert!(agg.is_empty_result());
        assert!(agg.table.is_none());
        assert_eq!(agg.notices[0].kind, NoticeKind::EmptyResult);
    }
}
