//! Unified error types for pensive.
//!
//! Placeholder lifecycle operations never surface errors to their caller;
//! failures are logged and swallowed there. The fallible surface below
//! covers the ambient operations that do propagate: transport calls,
//! completion calls, configuration IO.

use crate::reaction::ProviderError;

// ============================================================================
// Main Error Type
// ============================================================================

/// The main error type for pensive operations.
///
/// Consolidates the module-specific errors into a single type usable at the
/// crate boundary.
#[derive(Debug, thiserror::Error)]
pub enum PensiveError {
    /// Transport error.
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    /// Completion provider error.
    #[error("provider: {0}")]
    Provider(#[from] ProviderError),

    /// Configuration error.
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("json: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic internal error.
    #[error("{0}")]
    Internal(String),
}

impl PensiveError {
    /// Create an internal error.
    #[inline]
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}

/// Result type alias for pensive operations.
pub type Result<T> = std::result::Result<T, PensiveError>;

// ============================================================================
// Transport Errors
// ============================================================================

/// Error type for transport operations.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to send a message.
    #[error("send failed: {0}")]
    SendFailed(String),

    /// Failed to edit a message.
    #[error("edit failed: {0}")]
    EditFailed(String),

    /// Failed to delete a message.
    #[error("delete failed: {0}")]
    DeleteFailed(String),

    /// A chat or message identifier could not be interpreted.
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// Transport is not connected.
    #[error("not connected")]
    NotConnected,
}

impl TransportError {
    /// Create a send failed error.
    #[inline]
    pub fn send(msg: impl Into<String>) -> Self {
        Self::SendFailed(msg.into())
    }

    /// Create an edit failed error.
    #[inline]
    pub fn edit(msg: impl Into<String>) -> Self {
        Self::EditFailed(msg.into())
    }

    /// Create a delete failed error.
    #[inline]
    pub fn delete(msg: impl Into<String>) -> Self {
        Self::DeleteFailed(msg.into())
    }
}

/// Result type for transport operations.
pub type TransportResult<T> = std::result::Result<T, TransportError>;

// ============================================================================
// Configuration Errors
// ============================================================================

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error.
    #[error("parse: {0}")]
    Parse(#[from] serde_json::Error),

    /// Missing required field.
    #[error("missing: {0}")]
    Missing(String),

    /// Invalid value.
    #[error("invalid: {0}")]
    Invalid(String),
}

impl ConfigError {
    /// Create a missing field error.
    #[inline]
    pub fn missing(field: impl Into<String>) -> Self {
        Self::Missing(field.into())
    }

    /// Create an invalid value error.
    #[inline]
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::Invalid(msg.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversions() {
        let transport_err = TransportError::NotConnected;
        let err: PensiveError = transport_err.into();
        assert!(matches!(err, PensiveError::Transport(_)));

        let config_err = ConfigError::missing("model");
        let err: PensiveError = config_err.into();
        assert!(matches!(err, PensiveError::Config(_)));
    }

    #[test]
    fn test_transport_error_helpers() {
        let err = TransportError::send("boom");
        assert!(matches!(err, TransportError::SendFailed(_)));
        assert_eq!(err.to_string(), "send failed: boom");

        let err = TransportError::delete("gone");
        assert!(matches!(err, TransportError::DeleteFailed(_)));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::invalid("timeout_ms must be positive");
        assert_eq!(err.to_string(), "invalid: timeout_ms must be positive");
    }
}
