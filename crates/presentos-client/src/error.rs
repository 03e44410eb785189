//! Client error types.

use thiserror::Error;

/// Result type for client operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors that can occur in the client.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Identity provider error.
    #[error("identity error: {0}")]
    Identity(#[from] presentos_identity::IdentityError),

    /// Scheduling backend error.
    #[error("backend error: {0}")]
    Api(#[from] presentos_api::ApiError),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Browser open or redirect round-trip failure.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// User input rejected before any network call.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
