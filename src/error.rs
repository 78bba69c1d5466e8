//! Error types for the Temporal Cloud metrics adapter
//!
//! Startup errors (`ConfigLoadError`, `ConnectionError`, `ScopeLoadError`) are
//! fatal: the adapter never serves requests with a partial context. Request
//! errors (`QueryError`, `ValueError`) abort only the request that raised them.

use thiserror::Error;

/// Main error type for the adapter
#[derive(Error, Debug)]
pub enum AdapterError {
    /// Configuration file unreadable or malformed
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigLoadError),

    /// TLS material missing or unparsable
    #[error("Connection error: {0}")]
    Connection(#[from] ConnectionError),

    /// Namespace file unreadable
    #[error("Scope error: {0}")]
    Scope(#[from] ScopeLoadError),

    /// Backend query failed
    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    /// Backend sample could not be converted
    #[error("Value error: {0}")]
    Value(#[from] ValueError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigLoadError {
    /// Configuration file could not be read
    #[error("Failed to read config file {path}: {source}")]
    Unreadable {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration document could not be decoded
    #[error("Failed to parse YAML: {0}")]
    Malformed(#[from] serde_yaml::Error),

    /// Configuration decoded but holds invalid values
    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// TLS material errors raised while building the secure transport
#[derive(Error, Debug)]
pub enum ConnectionError {
    /// A certificate, key or CA file could not be read
    #[error("Failed to read {kind} from {path}: {source}")]
    Unreadable {
        /// Which piece of material (client certificate, client key, CA bundle)
        kind: &'static str,
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The client certificate/key pair is unusable
    #[error("Invalid client identity: {0}")]
    InvalidIdentity(String),

    /// The CA bundle holds no usable certificates
    #[error("Invalid CA bundle {path}: {reason}")]
    InvalidCa {
        /// Path of the CA bundle
        path: String,
        /// Why the bundle was rejected
        reason: String,
    },

    /// The HTTP client could not be assembled from the material
    #[error("Failed to build HTTP client: {0}")]
    ClientBuild(String),
}

/// Namespace loading errors
#[derive(Error, Debug)]
pub enum ScopeLoadError {
    /// Namespace file could not be read
    #[error("Failed to read namespace file {path}: {source}")]
    Unreadable {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Namespace file is not valid UTF-8
    #[error("Namespace file {path} is not valid UTF-8")]
    NotUtf8 {
        /// Path that was read
        path: String,
    },
}

/// Backend query errors
#[derive(Error, Debug)]
pub enum QueryError {
    /// The request URL could not be assembled from the endpoint
    #[error("Invalid metrics endpoint {endpoint}: {reason}")]
    InvalidUrl {
        /// Configured endpoint
        endpoint: String,
        /// Parser message
        reason: String,
    },

    /// The backend could not be reached or the connection failed mid-request
    #[error("Request to metrics backend failed: {0}")]
    Transport(String),

    /// The backend answered with a non-200 status
    #[error("unexpected status from Temporal Cloud: {code}")]
    Status {
        /// HTTP status code
        code: u16,
    },

    /// The response body is not the expected JSON envelope
    #[error("Failed to decode metrics backend response: {0}")]
    Decode(String),
}

impl QueryError {
    /// HTTP status code carried by the error, if any
    pub fn status_code(&self) -> Option<u16> {
        match self {
            QueryError::Status { code } => Some(*code),
            _ => None,
        }
    }
}

/// Sample conversion errors
#[derive(Error, Debug, PartialEq)]
pub enum ValueError {
    /// The sample does not carry both timestamp and value
    #[error("invalid metric response from Temporal Cloud: expected 2 sample fields, found {found}")]
    MissingFields {
        /// Number of fields present
        found: usize,
    },

    /// The timestamp field is not a number
    #[error("invalid metric timestamp from Temporal Cloud")]
    InvalidTimestamp,

    /// The timestamp is not representable as an absolute time
    #[error("metric timestamp {0} is out of range")]
    TimestampOutOfRange(f64),

    /// The value field is not a string
    #[error("invalid metric value from Temporal Cloud")]
    InvalidValue,

    /// The value string is not a valid quantity
    #[error("invalid quantity {input:?}: {reason}")]
    InvalidQuantity {
        /// Offending input
        input: String,
        /// Parser message
        reason: String,
    },
}
