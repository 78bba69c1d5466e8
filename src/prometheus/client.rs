//! Prometheus query client
//!
//! Issues instant queries against the Temporal Cloud metrics endpoint over
//! the shared mTLS transport. One request per call, no retries.

use reqwest::StatusCode;
use tracing::{debug, warn};
use url::Url;

use crate::error::QueryError;
use crate::prometheus::response::PrometheusResponse;
use crate::transport::SecureTransport;

const QUERY_PATH: &str = "/api/v1/query";

/// Client for the backend's instant query API
#[derive(Debug, Clone)]
pub struct PrometheusClient {
    endpoint: String,
    transport: SecureTransport,
}

impl PrometheusClient {
    /// Create a client for `endpoint`
    ///
    /// The endpoint is used verbatim; the query path is appended to it.
    pub fn new(endpoint: impl Into<String>, transport: SecureTransport) -> Self {
        Self {
            endpoint: endpoint.into(),
            transport,
        }
    }

    /// Configured endpoint
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Build `<endpoint>/api/v1/query?query=<query>` with the query
    /// form-encoded once
    pub fn query_url(&self, query: &str) -> Result<Url, QueryError> {
        let mut url = Url::parse(&format!("{}{}", self.endpoint, QUERY_PATH)).map_err(|e| {
            QueryError::InvalidUrl {
                endpoint: self.endpoint.clone(),
                reason: e.to_string(),
            }
        })?;
        url.query_pairs_mut().append_pair("query", query);
        Ok(url)
    }

    /// Run an instant query and decode the response envelope
    ///
    /// A 200 response is returned as decoded, whatever its `status` field says.
    pub async fn query(&self, query: &str) -> Result<PrometheusResponse, QueryError> {
        let url = self.query_url(query)?;

        debug!(
            endpoint = %self.endpoint,
            query = %query,
            "Querying metrics backend"
        );

        let response = self
            .transport
            .client()
            .get(url)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    QueryError::Transport(format!(
                        "request timed out after {:?}: {}",
                        self.transport.timeout(),
                        e
                    ))
                } else {
                    QueryError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            warn!(
                endpoint = %self.endpoint,
                status = status.as_u16(),
                "Metrics backend returned unexpected status"
            );
            return Err(QueryError::Status {
                code: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| QueryError::Transport(format!("failed to read response body: {}", e)))?;

        let envelope: PrometheusResponse =
            serde_json::from_slice(&body).map_err(|e| QueryError::Decode(e.to_string()))?;

        if !envelope.is_success() {
            warn!(
                status = %envelope.status,
                error_type = envelope.error_type.as_deref().unwrap_or(""),
                error = envelope.error.as_deref().unwrap_or(""),
                "Metrics backend reported a failed query"
            );
        }

        Ok(envelope)
    }
}
