//! Integration tests for secop-lookup API endpoints
//!
//! Tests cover:
//! - Search over both datasets with stubbed record sources
//! - Empty results and fetch failures rendered as notices
//! - Spreadsheet export status codes and headers
//! - Health, build info and page serving

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use chrono::{NaiveDate, NaiveDateTime};
use secop_common::{Record, RecordSet};
use secop_lookup::fetch::{FetchError, RecordSource, SupplierFilter};
use secop_lookup::{build_router, AppState};
use serde_json::Value;
use std::sync::Mutex;
use tower::util::ServiceExt; // for `oneshot` method

/// Stub source answering every query the same way
struct StubSource {
    outcome: Result<RecordSet, String>,
    last_term: Mutex<Option<String>>,
}

impl StubSource {
    fn records(records: Vec<Record>) -> Arc<Self> {
        Arc::new(Self {
            outcome: Ok(RecordSet::new(records)),
            last_term: Mutex::new(None),
        })
    }

    fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            outcome: Err(message.to_string()),
            last_term: Mutex::new(None),
        })
    }

    fn last_term(&self) -> Option<String> {
        self.last_term.lock().unwrap().clone()
    }
}

#[async_trait]
impl RecordSource for StubSource {
    async fn fetch(&self, filter: &SupplierFilter) -> Result<RecordSet, FetchError> {
        *self.last_term.lock().unwrap() = Some(filter.term().to_string());
        match &self.outcome {
            Ok(records) => Ok(records.clone()),
            Err(message) => Err(FetchError::Network(message.clone())),
        }
    }
}

fn march_2023() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2023, 3, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Test helper: Create app over the given sources with "now" pinned to 2023-03-01
fn setup_app(contracts: Arc<dyn RecordSource>, processes: Arc<dyn RecordSource>) -> axum::Router {
    let state = AppState::new(contracts, processes).with_clock(march_2023);
    build_router(state)
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Test helper: Extract JSON body from response
async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

fn contract(signed: &str, value: &str, id_contrato: &str) -> Record {
    Record::new()
        .with("proveedor_adjudicado", "Acme S.A.S.")
        .with("documento_proveedor", "900123456")
        .with("tipodocproveedor", "NIT")
        .with("nombre_entidad", "ALCALDIA DE MEDELLIN")
        .with("id_contrato", id_contrato)
        .with("estado_contrato", "En ejecución")
        .with("justificacion_modalidad_de", "Servicios profesionales")
        .with("fecha_de_firma", signed)
        .with("valor_del_contrato", value)
        .with("objeto_del_contrato", "Consultoría")
}

fn scenario_a_contracts() -> Vec<Record> {
    vec![
        contract("2023-01-01T00:00:00.000", "500", "CO1.PCCNTR.1"),
        contract("2023-01-01T00:00:00.000", "500", "CO1.PCCNTR.2"),
        contract("2024-01-01T00:00:00.000", "500", "CO1.PCCNTR.3"),
    ]
}

fn process(name: &str, nit: &str, price: &str, published: &str) -> Record {
    Record::new()
        .with("nombre_del_proveedor", name)
        .with("nit_del_proveedor_adjudicado", nit)
        .with("precio_base", price)
        .with("entidad", "GOBERNACION DE ANTIOQUIA")
        .with("estado_proceso", "Adjudicado")
        .with("fecha_de_publicacion_del_proceso", published)
}

fn summary_value(body: &Value, label: &str) -> Value {
    body["summary"]["items"]
        .as_array()
        .expect("summary items")
        .iter()
        .find(|item| item["label"] == label)
        .map(|item| item["value"].clone())
        .unwrap_or(Value::Null)
}

// =============================================================================
// Health / Build Info / UI
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(StubSource::records(vec![]), StubSource::records(vec![]));

    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "secop-lookup");
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_buildinfo_endpoint() {
    let app = setup_app(StubSource::records(vec![]), StubSource::records(vec![]));

    let response = app.oneshot(test_request("/api/buildinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["git_hash"].is_string());
    assert!(body["build_profile"].is_string());
}

#[tokio::test]
async fn test_index_and_script_served() {
    let app = setup_app(StubSource::records(vec![]), StubSource::records(vec![]));

    let response = app.clone().oneshot(test_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("text/html"));

    let response = app.oneshot(test_request("/static/app.js")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert!(content_type.starts_with("application/javascript"));
}

// =============================================================================
// Search
// =============================================================================

#[tokio::test]
async fn test_contract_search_full_report() {
    let app = setup_app(
        StubSource::records(scenario_a_contracts()),
        StubSource::records(vec![]),
    );

    let response = app
        .oneshot(test_request("/api/contracts/search?q=acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["dataset"], "contracts");
    assert_eq!(body["title"], "Contratos Electrónicos SECOP II");
    assert_eq!(body["notices"].as_array().unwrap().len(), 0);

    assert_eq!(body["identity"]["name"], "ACME S.A.S.");
    assert_eq!(body["identity"]["id_label"], "NIT");
    assert_eq!(body["identity"]["id_value"], "900123456");

    assert_eq!(body["summary"]["headline"]["value"], "$1,500.00 COP");
    assert_eq!(summary_value(&body, "Número de Contratos"), "3");
    assert_eq!(summary_value(&body, "Total Entidades"), "1");
    assert_eq!(summary_value(&body, "Contratos Simultáneos"), "1");

    let bars = body["bar_chart"]["bars"].as_array().unwrap();
    assert_eq!(bars.len(), 2);
    assert_eq!(bars[0]["year"], 2023);
    assert_eq!(bars[0]["count"], 2);
    assert_eq!(bars[1]["year"], 2024);
    assert_eq!(bars[1]["count"], 1);

    assert_eq!(body["pie_chart"]["slices"][0]["label"], "En ejecución");
    assert_eq!(body["table"]["columns"].as_array().unwrap().len(), 7);
    assert_eq!(body["table"]["rows"].as_array().unwrap().len(), 3);
    assert!(body["export"]["file_name"].is_string());
}

#[tokio::test]
async fn test_process_search_ambiguous_identity() {
    let processes = StubSource::records(vec![
        process("Acme SAS", "900123456", "1000", "2022-05-10T00:00:00.000"),
        process("ACME Ltda", "900123456", "2000", "2023-07-01T00:00:00.000"),
    ]);
    let app = setup_app(StubSource::records(vec![]), processes);

    let response = app
        .oneshot(test_request("/api/processes/search?q=900123456"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let notices = body["notices"].as_array().unwrap();
    assert!(notices.iter().any(|n| n["kind"] == "ambiguous_identity"));
    assert_eq!(body["identity"]["name"], "ACME SAS");
    assert_eq!(body["summary"]["headline"]["value"], "$3,000.00 COP");
    assert!(body["summary"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .all(|item| item["label"] != "Contratos Simultáneos"));
}

#[tokio::test]
async fn test_search_empty_result_only_notice() {
    let app = setup_app(StubSource::records(vec![]), StubSource::records(vec![]));

    let response = app
        .oneshot(test_request("/api/contracts/search?q=nadie"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let notices = body["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["kind"], "empty_result");
    assert!(body.get("summary").is_none());
    assert!(body.get("bar_chart").is_none());
    assert!(body.get("pie_chart").is_none());
    assert!(body.get("table").is_none());
}

#[tokio::test]
async fn test_search_fetch_failure_is_notice() {
    let app = setup_app(
        StubSource::failing("connection refused"),
        StubSource::records(vec![]),
    );

    let response = app
        .oneshot(test_request("/api/contracts/search?q=acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let notices = body["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["kind"], "fetch_failed");
    assert_eq!(notices[0]["severity"], "error");
    assert!(notices[0]["message"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
    assert!(body.get("table").is_none());
    assert!(body.get("summary").is_none());
}

#[tokio::test]
async fn test_search_blank_query_rejected() {
    let contracts = StubSource::records(scenario_a_contracts());
    let app = setup_app(contracts.clone(), StubSource::records(vec![]));

    let response = app
        .clone()
        .oneshot(test_request("/api/contracts/search?q=%20%20"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "BAD_REQUEST");

    let response = app
        .oneshot(test_request("/api/contracts/search"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert!(contracts.last_term().is_none(), "blank query must not reach the source");
}

#[tokio::test]
async fn test_search_passes_term_verbatim() {
    let contracts = StubSource::records(scenario_a_contracts());
    let app = setup_app(contracts.clone(), StubSource::records(vec![]));

    let response = app
        .oneshot(test_request("/api/contracts/search?q=O%27Brien%20Ltda"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(contracts.last_term().as_deref(), Some("O'Brien Ltda"));
}

#[tokio::test]
async fn test_unknown_dataset_rejected() {
    let app = setup_app(StubSource::records(vec![]), StubSource::records(vec![]));

    let response = app
        .oneshot(test_request("/api/tenders/search?q=acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// Export
// =============================================================================

#[tokio::test]
async fn test_export_returns_xlsx() {
    let app = setup_app(
        StubSource::records(scenario_a_contracts()),
        StubSource::records(vec![]),
    );

    let response = app
        .oneshot(test_request("/api/contracts/export?q=acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let content_type = response.headers()[header::CONTENT_TYPE].to_str().unwrap();
    assert_eq!(
        content_type,
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\""));
    assert!(disposition.ends_with(".xlsx\""));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn test_export_processes_lenient_columns() {
    let processes = StubSource::records(vec![Record::new()
        .with("nombre_del_proveedor", "Acme SAS")
        .with("entidad", "GOBERNACION DE ANTIOQUIA")]);
    let app = setup_app(StubSource::records(vec![]), processes);

    let response = app
        .oneshot(test_request("/api/processes/export?q=acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_export_empty_result_not_found() {
    let app = setup_app(StubSource::records(vec![]), StubSource::records(vec![]));

    let response = app
        .oneshot(test_request("/api/processes/export?q=nadie"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_export_fetch_failure_bad_gateway() {
    let app = setup_app(
        StubSource::failing("timed out"),
        StubSource::records(vec![]),
    );

    let response = app
        .oneshot(test_request("/api/contracts/export?q=acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "UPSTREAM_ERROR");
}

#[tokio::test]
async fn test_export_missing_contract_column_unprocessable() {
    let incomplete = Record::new()
        .with("proveedor_adjudicado", "Acme S.A.S.")
        .with("nombre_entidad", "ALCALDIA DE MEDELLIN")
        .with("fecha_de_firma", "2023-01-01T00:00:00.000")
        .with("valor_del_contrato", "500");
    let app = setup_app(
        StubSource::records(vec![incomplete]),
        StubSource::records(vec![]),
    );

    let response = app
        .clone()
        .oneshot(test_request("/api/contracts/export?q=acme"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The search itself still renders, with the listing withheld
    let response = app
        .oneshot(test_request("/api/contracts/search?q=acme"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    assert!(body.get("table").is_none());
    assert!(body.get("export").is_none());
    assert!(body["notices"]
        .as_array()
        .unwrap()
        .iter()
        .any(|n| n["kind"] == "missing_column"));
    assert_eq!(body["summary"]["headline"]["value"], "$500.00 COP");
}

#[tokio::test]
async fn test_wildcard_term_matches_literally() {
    let contracts = StubSource::records(vec![
        contract("2023-01-01T00:00:00.000", "500", "CO1.PCCNTR.1"),
        contract("2023-01-01T00:00:00.000", "700", "CO1.PCCNTR.2")
            .with("proveedor_adjudicado", "100% Obras S.A.S."),
    ]);
    let app = setup_app(contracts, StubSource::records(vec![]));

    // "%" only hits the supplier whose name contains a percent sign
    let response = app
        .clone()
        .oneshot(test_request("/api/contracts/search?q=%25"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = extract_json(response.into_body()).await;
    assert_eq!(body["identity"]["name"], "100% OBRAS S.A.S.");
    assert_eq!(summary_value(&body, "Número de Contratos"), "1");
    assert_eq!(body["summary"]["headline"]["value"], "$700.00 COP");

    // "_" is not a single-character wildcard
    let response = app
        .oneshot(test_request("/api/contracts/search?q=ac_e"))
        .await
        .unwrap();
    let body = extract_json(response.into_body()).await;
    let notices = body["notices"].as_array().unwrap();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0]["kind"], "empty_result");
}
