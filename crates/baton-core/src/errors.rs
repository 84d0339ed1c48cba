//! Unified error type for route-data operations
//!
//! Every fallible operation in the workspace returns [`BatonError`]. A retrieval
//! that finds no usable key is not an error: it surfaces as `Ok(None)`.

use serde::{Deserialize, Serialize};

/// Errors raised by key derivation, storage, rewriting and the router facade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum BatonError {
    /// Invalid configuration value, rejected at assignment or validation time
    #[error("Configuration error: {message}")]
    Configuration {
        /// What was wrong with the configuration
        message: String,
    },

    /// A structured value reached a place where only a flat transport value may appear
    #[error("Transport violation on `{field}`: {message}")]
    TransportViolation {
        /// Parameter or query field that carried the value
        field: String,
        /// Description of the rejected value
        message: String,
    },

    /// Payload could not be encoded to or decoded from its JSON form
    #[error("Serialization error: {message}")]
    Serialization {
        /// Underlying encoder/decoder message
        message: String,
    },

    /// Storage medium or external state container failed
    #[error("Storage error: {message}")]
    Storage {
        /// Error message describing the storage failure
        message: String,
    },

    /// The navigation engine rejected or aborted a transition
    #[error("Navigation error: {message}")]
    Navigation {
        /// Error reported by the engine
        message: String,
    },
}

impl BatonError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a transport violation for the given field
    pub fn transport_violation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::TransportViolation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a navigation error
    pub fn navigation(message: impl Into<String>) -> Self {
        Self::Navigation {
            message: message.into(),
        }
    }

    /// True for the two fail-fast categories that abort before any navigation
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::TransportViolation { .. }
        )
    }
}

/// Standard Result type for route-data operations
pub type Result<T> = std::result::Result<T, BatonError>;

impl From<serde_json::Error> for BatonError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BatonError {
    fn from(err: toml::de::Error) -> Self {
        Self::configuration(format!("Invalid TOML: {err}"))
    }
}

impl From<std::io::Error> for BatonError {
    fn from(err: std::io::Error) -> Self {
        Self::storage(err.to_string())
    }
}
