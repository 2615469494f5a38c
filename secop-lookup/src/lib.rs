//! secop-lookup library - supplier lookup over the SECOP open datasets
//!
//! Each request runs one pipeline: a [`fetch::RecordSource`] retrieves the
//! supplier's rows, [`aggregate::aggregate`] summarizes them and
//! [`report::Report`] shapes the result for the browser or the xlsx download.

use std::sync::Arc;

use axum::Router;
use chrono::NaiveDateTime;
use secop_common::config::SourcesConfig;
use tower_http::trace::TraceLayer;

pub mod aggregate;
pub mod api;
pub mod dataset;
pub mod error;
pub mod fetch;
pub mod notice;
pub mod report;

use dataset::Dataset;
use fetch::{FetchError, RecordSource, SocrataClient};

/// Source of "now" for the simultaneous-contracts count
pub type Clock = fn() -> NaiveDateTime;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Electronic contracts dataset
    pub contracts: Arc<dyn RecordSource>,
    /// Contracting processes dataset
    pub processes: Arc<dyn RecordSource>,
    pub clock: Clock,
}

impl AppState {
    /// Create state over the given sources, reading the local wall clock
    pub fn new(contracts: Arc<dyn RecordSource>, processes: Arc<dyn RecordSource>) -> Self {
        Self {
            contracts,
            processes,
            clock: secop_common::time::local_now,
        }
    }

    /// Replace the clock (tests pin "now" to a fixed instant)
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Build Socrata clients for both configured endpoints
    pub fn from_config(sources: &SourcesConfig) -> Result<Self, FetchError> {
        let contracts = SocrataClient::new(sources.contracts_url.clone(), sources.timeout())?;
        let processes = SocrataClient::new(sources.processes_url.clone(), sources.timeout())?;
        Ok(Self::new(Arc::new(contracts), Arc::new(processes)))
    }

    pub fn source(&self, dataset: Dataset) -> &dyn RecordSource {
        match dataset {
            Dataset::Contracts => self.contracts.as_ref(),
            Dataset::Processes => self.processes.as_ref(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::get;

    let lookup = Router::new()
        .route("/api/:dataset/search", get(api::search))
        .route("/api/:dataset/export", get(api::export));

    let public = Router::new()
        .route("/", get(api::serve_index))
        .route("/static/app.js", get(api::serve_app_js))
        .merge(api::service_routes());

    Router::new()
        .merge(lookup)
        .merge(public)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
