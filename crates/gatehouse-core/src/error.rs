//! Error types for the Gatehouse application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire Gatehouse application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum GatehouseError {
    /// Authentication failure reported by the hosted service
    /// (bad credentials, rejected password, expired token).
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Local input validation failure. Raised before any network call.
    #[error("Validation error: {field} - {message}")]
    Validation { field: String, message: String },

    /// Data access error (failed read/write against a backend table)
    #[error("Data access error: {0}")]
    DataAccess(String),

    /// IO error (config file access)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl GatehouseError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates an Auth error
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth(message.into())
    }

    /// Creates a Validation error for a named input field
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Creates a DataAccess error
    pub fn data_access(message: impl Into<String>) -> Self {
        Self::DataAccess(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is an Auth error
    pub fn is_auth(&self) -> bool {
        matches!(self, Self::Auth(_))
    }

    /// Check if this is a Validation error
    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Check if this is a DataAccess error
    pub fn is_data_access(&self) -> bool {
        matches!(self, Self::DataAccess(_))
    }

    /// Check if this is a Config error
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns the message a user-facing surface should display inline.
    ///
    /// Validation and auth errors carry text meant for the user; everything
    /// else collapses to a generic message so internals never leak into the
    /// console.
    pub fn display_message(&self) -> String {
        match self {
            Self::Auth(message) => message.clone(),
            Self::Validation { message, .. } => message.clone(),
            _ => "something went wrong, please try again".to_string(),
        }
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for GatehouseError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for GatehouseError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for GatehouseError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// Conversion from anyhow::Error (transitional, should be removed eventually)
impl From<anyhow::Error> for GatehouseError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

/// A type alias for `Result<T, GatehouseError>`.
pub type Result<T> = std::result::Result<T, GatehouseError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructor_helpers() {
        assert!(GatehouseError::auth("invalid login credentials").is_auth());
        assert!(GatehouseError::validation("password", "too short").is_validation());
        assert!(GatehouseError::data_access("profiles insert failed").is_data_access());
        assert!(GatehouseError::config("missing backend url").is_config());
    }

    #[test]
    fn test_display_message_passes_user_facing_text_through() {
        let err = GatehouseError::auth("invalid login credentials");
        assert_eq!(err.display_message(), "invalid login credentials");

        let err = GatehouseError::validation("password", "password must be at least 6 characters");
        assert_eq!(
            err.display_message(),
            "password must be at least 6 characters"
        );
    }

    #[test]
    fn test_display_message_hides_internals() {
        let err = GatehouseError::data_access("PATCH /rest/v1/subscriptions returned 500");
        assert_eq!(err.display_message(), "something went wrong, please try again");
    }

    #[test]
    fn test_from_io_error() {
        let err: GatehouseError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, GatehouseError::Io { .. }));
    }
}
