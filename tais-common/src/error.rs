//! Common error types for the TAIS services

use thiserror::Error;

/// Common result type for TAIS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across TAIS services
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),
}
