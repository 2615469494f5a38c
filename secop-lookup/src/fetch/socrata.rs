//! Socrata (datos.gov.co) dataset client
//!
//! One GET per lookup with a single `$where` parameter. No paging, no
//! retries, no caching: every search goes back to the endpoint.

use async_trait::async_trait;
use secop_common::RecordSet;
use std::time::{Duration, Instant};

use super::{FetchError, RecordSource, SupplierFilter};

const USER_AGENT: &str = concat!("secop-lookup/", env!("CARGO_PKG_VERSION"));

/// Longest slice of an error body kept in a `FetchError::Status`
const MAX_ERROR_BODY: usize = 512;

/// Client for one dataset endpoint
#[derive(Debug, Clone)]
pub struct SocrataClient {
    http_client: reqwest::Client,
    endpoint: String,
}

impl SocrataClient {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl RecordSource for SocrataClient {
    async fn fetch(&self, filter: &SupplierFilter) -> Result<RecordSet, FetchError> {
        let where_clause = filter.to_soql();
        tracing::debug!(endpoint = %self.endpoint, soql = %where_clause, "Querying dataset");

        let started = Instant::now();
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("$where", where_clause.as_str())])
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY {
                let cut = (0..=MAX_ERROR_BODY)
                    .rev()
                    .find(|i| body.is_char_boundary(*i))
                    .unwrap_or(0);
                body.truncate(cut);
            }
            return Err(FetchError::Status(status.as_u16(), body));
        }

        let records: RecordSet = response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))?;

        tracing::info!(
            endpoint = %self.endpoint,
            records = records.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Dataset query complete"
        );

        Ok(records)
    }
}
