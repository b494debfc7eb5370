//! Shared Module
//!
//! This module contains the wire protocol spoken on the real-time channel.
//! These types are used by the relay server and by any Rust client that
//! wants to talk to it, so nothing in here depends on the `ssr` feature.
//!
//! # Overview
//!
//! - **`event`** - Client→server and server→client events plus the JSON frame codec
//! - **`message`** - Payload records carried by those events
//! - **`error`** - Decoding and validation errors
//! - **`config`** - Relay configuration and its builder

/// Message and notification payloads
pub mod message;

/// Real-time event system
pub mod event;

/// Shared error types
pub mod error;

/// Relay configuration
pub mod config;

/// Re-export commonly used types for convenience
pub use message::{
    MessageDelete, MessageEdit, MessageEnvelope, MessageUpdate, NotificationPush, PresenceStatus,
    UserStatusUpdate,
};
pub use event::{ClientEvent, ServerEvent};
pub use error::SharedError;
pub use config::{ConfigError, RelayConfig, RelayConfigBuilder};
