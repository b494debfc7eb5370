//! Agora - Presence and Message Relay
//!
//! Agora is the real-time half of a social-networking backend. REST handlers
//! elsewhere persist users, friendships, posts, messages and notifications;
//! this crate keeps track of who is connected right now and forwards
//! point-to-point events to them over WebSockets.
//!
//! # Module Structure
//!
//! - **`shared`** - Wire protocol types usable from any client
//!   - Client and server event enums (`{"event": ..., "data": ...}` frames)
//!   - Message, edit, delete and notification payload records
//!   - Relay configuration and error types
//!
//! - **`backend`** - The relay server (only compiled with `ssr` feature)
//!   - Connection registry and event relay running on a single task
//!   - Axum WebSocket transport with keepalive
//!   - Optional JWT handshake and HTTP bridge for server-side pushes
//!
//! # Feature Flags
//!
//! - **`ssr`** (default) - Enables the `backend` module and the
//!   `agora-relay` binary
//!
//! # Usage
//!
//! ```rust,no_run
//! use agora::backend::server::{config::load_config, create_app};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config()?;
//! let app = create_app(&config);
//! let listener = tokio::net::TcpListener::bind(config.socket_addr()?).await?;
//! axum::serve(listener, app).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Delivery Guarantees
//!
//! Events go only to recipients that are connected when the event is
//! processed. Offline recipients miss them; there is no queue. Events from
//! one connection are applied in the order they were sent.

/// Shared types and data structures
pub mod shared;

/// Backend server-side code
#[cfg(feature = "ssr")]
pub mod backend;
