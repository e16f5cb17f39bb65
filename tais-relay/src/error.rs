//! Error types for tais-relay
//!
//! None of these are fatal to the running service: ingestion, the altimeter
//! refresh task and the stream publishers log them and carry on.

use thiserror::Error;

/// Main error type for tais-relay
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Ingestion batch could not be decoded
    #[error("Malformed batch: {0}")]
    MalformedBatch(String),

    /// Update payload serialization errors
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// HTTP server errors
    #[error("HTTP server error: {0}")]
    Http(String),
}

impl From<tais_common::Error> for Error {
    fn from(err: tais_common::Error) -> Self {
        Error::Config(err.to_string())
    }
}

/// Reasons a reference-pressure fetch can fail
///
/// Kept apart from [`Error`]: the refresh task logs these and keeps the last
/// good setting, so they never cross the service boundary.
#[derive(Error, Debug)]
pub enum AltimeterError {
    /// Request exceeded its timeout
    #[error("request timed out")]
    Timeout,

    /// Source answered with a non-success status
    #[error("API error: HTTP {0}")]
    Status(u16),

    /// Transport-level failure
    #[error("network error: {0}")]
    Network(String),

    /// Response body has no altimeter value
    #[error("response has no altimeter value")]
    MissingValue,

    /// Response body could not be decoded
    #[error("parse error: {0}")]
    Parse(String),
}

/// Convenience Result type using tais-relay Error
pub type Result<T> = std::result::Result<T, Error>;
