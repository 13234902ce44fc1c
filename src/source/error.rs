//! Data source error types

use thiserror::Error;

/// Errors that can occur while fetching from the occupancy backend
#[derive(Error, Debug)]
pub enum SourceError {
    /// No answer within the configured request timeout
    #[error("Request timeout")]
    Timeout,

    /// Connection refused or unreachable host
    #[error("Backend unavailable")]
    Unavailable,

    /// Any other transport-level failure
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Non-success HTTP status without a usable body
    #[error("Backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// Body was not the JSON shape the endpoint promises
    #[error("Malformed response: {0}")]
    Malformed(String),
}

impl SourceError {
    /// Classify a reqwest error the same way for every endpoint
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SourceError::Timeout
        } else if err.is_connect() {
            SourceError::Unavailable
        } else {
            SourceError::Request(err)
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

/// Result type alias for data source operations
pub type SourceResult<T> = Result<T, SourceError>;
