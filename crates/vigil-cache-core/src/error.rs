//! Error types for cache operations

use thiserror::Error;

/// Main error type for all cache operations
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Store unreachable, or retries against it exhausted
    #[error("connection error: {0}")]
    Connection(String),

    /// A bounded network call exceeded its deadline
    #[error("operation timed out")]
    Timeout,

    /// The store understood the request but rejected it (e.g. wrong type)
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Serialization failed
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(String),
}

impl CacheError {
    /// Whether this failure class is worth reconnecting and retrying.
    ///
    /// Only connectivity-class failures qualify; protocol rejections and
    /// codec failures are terminal for the operation that hit them.
    pub fn is_transient(&self) -> bool {
        matches!(self, CacheError::Connection(_) | CacheError::Timeout)
    }
}

/// Result type alias for cache operations
pub type Result<T> = std::result::Result<T, CacheError>;

/// Error raised when environment configuration cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that does not parse
    #[error("invalid value for {var}: {message}")]
    Invalid { var: String, message: String },
}
