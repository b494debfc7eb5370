//! Backend Module
//!
//! This module contains all server-side code for the Agora relay: an Axum
//! HTTP server hosting the WebSocket endpoint, the relay task that owns the
//! connection registry, and a small HTTP bridge.
//!
//! This module is only compiled when the `ssr` feature is enabled.
//!
//! # Architecture
//!
//! - **`server`** - Application state, configuration loading, app creation
//! - **`routes`** - HTTP route configuration and router assembly
//! - **`realtime`** - Registry, relay task, socket transport, bridge handlers
//! - **`auth`** - Access token verification and handshake policy
//! - **`middleware`** - Request extractors (`AuthUser`)
//! - **`error`** - Backend error types and HTTP conversion
//!
//! # Module Structure
//!
//! ```text
//! backend/
//! ├── mod.rs          - Module exports and documentation
//! ├── main.rs         - `agora-relay` binary
//! ├── server/         - Server initialization and state
//! ├── routes/         - Route configuration
//! ├── realtime/       - Presence and event relay
//! ├── auth/           - Tokens and handshake
//! ├── middleware/     - Request extractors
//! └── error/          - Error types
//! ```
//!
//! # State Management
//!
//! Relay state is owned by one task and reached through `RelayHandle`, a
//! cloneable command sender. Handlers never lock anything; the relay task
//! applies commands one at a time.
//!
//! # Error Handling
//!
//! - `BackendError` for HTTP handlers and the socket handshake, rendered as
//!   `{"error": ..., "status": ...}`
//! - Socket-level problems (bad frames, offline recipients) are logged and
//!   the event is dropped; the socket never receives an error event

/// Server setup and configuration
pub mod server;

/// Route configuration
pub mod routes;

/// Presence tracking and event relay
pub mod realtime;

/// Backend error types
pub mod error;

/// Token verification and handshake policy
pub mod auth;

/// Request extractors
pub mod middleware;

pub use error::BackendError;
pub use realtime::{spawn_relay, EventRelay, RelayHandle};
pub use server::create_app;
