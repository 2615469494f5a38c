//! Query builder and fetcher for the open-data endpoints

pub mod filter;
pub mod socrata;

use async_trait::async_trait;
use secop_common::RecordSet;
use thiserror::Error;

pub use filter::SupplierFilter;
pub use socrata::SocrataClient;

/// Dataset fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP client setup failed: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Dataset API returned HTTP {0}: {1}")]
    Status(u16, String),

    #[error("Unexpected response body: {0}")]
    Decode(String),
}

/// Anything that can answer a supplier query with a set of records
#[async_trait]
pub trait RecordSource: Send + Sync {
    /// Run one query. An empty set is a successful answer.
    async fn fetch(&self, filter: &SupplierFilter) -> Result<RecordSet, FetchError>;
}
