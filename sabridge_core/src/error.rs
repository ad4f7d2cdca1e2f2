//! Error types for the sabridge_core library.

use std::io;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Result type returned by every `AnalyticsEngine` entry point
pub type EngineResult<T> = std::result::Result<T, EngineError>;

/// Failure raised by the analytics engine behind the bridge
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// Engine is not initialised or has been shut down
    #[error("engine unavailable: {0}")]
    Unavailable(String),

    /// Engine rejected an argument (e.g. empty property name)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Anything else the engine reports
    #[error("engine failure: {0}")]
    Internal(String),
}

/// Core error type for sabridge_core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A single property entry could not be converted
    #[error("Conversion error for key '{key}': {reason}")]
    Conversion { key: String, reason: String },

    /// Forwarded engine call failed
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Engine or callback panicked inside a bridge call
    #[error("Panic: {0}")]
    Panic(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Malformed inbound call (unknown method or bad arguments)
    #[error("Invalid call to '{method}': {reason}")]
    Call { method: String, reason: String },

    /// Configuration validation error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    pub(crate) fn conversion(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Conversion {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn call(method: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Call {
            method: method.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_error_message_is_kept() {
        let err: Error = EngineError::Unavailable("not started".into()).into();
        assert_eq!(err.to_string(), "Engine error: engine unavailable: not started");
    }

    #[test]
    fn test_conversion_error_names_key() {
        let err = Error::conversion("price", "non-finite number");
        assert!(err.to_string().contains("'price'"));
    }
}
