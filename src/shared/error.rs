//! Shared Error Types
//!
//! Errors produced while turning a raw socket frame into a typed event.
//! None of these are ever sent back to the client: the relay logs them and
//! drops the frame.
//!
//! # Error Categories
//!
//! - `SerializationError` - The frame is not valid JSON or does not match any event schema
//! - `ValidationError` - The frame decoded but a field is unusable (empty identity, etc.)
//! - `UnknownEvent` - The frame names an event the relay does not handle
//!
//! # Usage
//!
//! ```rust
//! use agora::shared::error::SharedError;
//!
//! let error = SharedError::validation("receiver", "receiver cannot be empty");
//! ```
use thiserror::Error;

/// Errors raised at the protocol boundary
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SharedError {
    /// JSON serialization or deserialization error
    #[error("Serialization error: {message}")]
    SerializationError {
        /// Human-readable error message
        message: String,
    },

    /// Data validation error
    #[error("Validation error in field '{field}': {message}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Human-readable error message
        message: String,
    },

    /// The frame names an event outside the protocol
    #[error("Unknown event: {name}")]
    UnknownEvent {
        /// Event name as it appeared on the wire
        name: String,
    },
}

impl SharedError {
    /// Create a new serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::SerializationError {
            message: message.into(),
        }
    }

    /// Create a new validation error
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ValidationError {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a new unknown-event error
    pub fn unknown_event(name: impl Into<String>) -> Self {
        Self::UnknownEvent { name: name.into() }
    }
}

impl From<serde_json::Error> for SharedError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(format!("JSON error: {}", err))
    }
}
