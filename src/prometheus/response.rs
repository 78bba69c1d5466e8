//! Prometheus HTTP API response envelope
//!
//! Shape of `GET /api/v1/query` responses:
//!
//! ```json
//! {
//!   "status": "success",
//!   "data": {
//!     "resultType": "vector",
//!     "result": [{ "metric": { "k": "v" }, "value": [1717611392.57, "0.05"] }]
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::labels::Labels;

/// Top-level response body
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrometheusResponse {
    /// `success` or `error`, as reported by the backend
    pub status: String,

    /// Query result
    #[serde(default)]
    pub data: ResponseData,

    /// Error class reported alongside `status: error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,

    /// Error message reported alongside `status: error`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PrometheusResponse {
    /// Whether the backend reported success
    pub fn is_success(&self) -> bool {
        self.status == "success"
    }
}

/// Query result payload
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseData {
    /// `vector`, `scalar`, `matrix` or `string`
    #[serde(default)]
    pub result_type: String,

    /// Series in backend order
    #[serde(default)]
    pub result: Vec<QueryResult>,
}

/// One series of an instant vector
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QueryResult {
    /// Series labels
    #[serde(default)]
    pub metric: Labels,

    /// Latest sample
    #[serde(default)]
    pub value: Sample,
}

/// Positional `[timestamp, "value"]` pair
///
/// Kept as raw JSON so malformed samples surface as conversion errors
/// rather than failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct Sample(pub Vec<serde_json::Value>);

impl Sample {
    /// Build a well-formed sample
    pub fn new(timestamp: f64, value: impl Into<String>) -> Self {
        Self(vec![
            serde_json::Value::from(timestamp),
            serde_json::Value::String(value.into()),
        ])
    }
}
