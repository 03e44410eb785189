//! Error types for identity-provider operations.

use std::fmt;

use thiserror::Error;

/// The category of an identity error.
///
/// Only [`ConfigurationError`](IdentityErrorCode::ConfigurationError) is
/// fatal to initialization; everything else is recoverable and handled at
/// the call site that issued the operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IdentityErrorCode {
    /// Missing or invalid provider credentials/config.
    ConfigurationError,
    /// Sign-in failed, was cancelled, or tokens are invalid/expired.
    AuthenticationFailed,
    /// Connection failed, timeout, DNS resolution.
    NetworkError,
    /// Unexpected response from the provider.
    InvalidResponse,
    /// Unexpected internal state.
    InternalError,
}

impl IdentityErrorCode {
    /// Human-readable name for this code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ConfigurationError => "configuration_error",
            Self::AuthenticationFailed => "authentication_failed",
            Self::NetworkError => "network_error",
            Self::InvalidResponse => "invalid_response",
            Self::InternalError => "internal_error",
        }
    }
}

impl fmt::Display for IdentityErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An error from the identity provider.
#[derive(Debug, Error)]
pub struct IdentityError {
    code: IdentityErrorCode,
    message: String,
    #[source]
    source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl IdentityError {
    /// Creates a new error with the given code and message.
    pub fn new(code: IdentityErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            source: None,
        }
    }

    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorCode::ConfigurationError, message)
    }

    /// Creates an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorCode::AuthenticationFailed, message)
    }

    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorCode::NetworkError, message)
    }

    /// Creates an invalid-response error.
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorCode::InvalidResponse, message)
    }

    /// Creates an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(IdentityErrorCode::InternalError, message)
    }

    /// Attaches the underlying cause.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error code.
    pub fn code(&self) -> IdentityErrorCode {
        self.code
    }

    /// Returns the error message.
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns true if this error is fatal to initialization.
    pub fn is_fatal(&self) -> bool {
        self.code == IdentityErrorCode::ConfigurationError
    }
}

impl fmt::Display for IdentityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

/// A specialized Result type for identity operations.
pub type IdentityResult<T> = Result<T, IdentityError>;
