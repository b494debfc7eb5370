//! Real-time Relay Module
//!
//! Presence tracking and point-to-point event relay over WebSockets.
//!
//! # Architecture
//!
//! - **`connection`** - Connection handles, per-connection state and outbound channel
//! - **`registry`** - Identity to connection mapping (last writer wins)
//! - **`presence`** - Online/offline broadcast and snapshot helpers
//! - **`relay`** - `EventRelay`, applies client events to the registry
//! - **`actor`** - Relay task and the cloneable `RelayHandle`
//! - **`socket`** - `GET /ws` upgrade, reader/writer tasks and keepalive
//! - **`bridge`** - HTTP endpoints for health, presence and server-side pushes
//!
//! # Module Structure
//!
//! ```text
//! realtime/
//! ├── mod.rs          - Module exports and documentation
//! ├── connection.rs   - Connection handle and state
//! ├── registry.rs     - Connection registry
//! ├── presence.rs     - Presence fan-out
//! ├── relay.rs        - Event dispatch
//! ├── actor.rs        - Relay task and handle
//! ├── socket.rs       - WebSocket transport
//! └── bridge.rs       - HTTP bridge handlers
//! ```
//!
//! # Event Flow
//!
//! ```text
//! socket reader --ClientEvent--> RelayHandle --RelayCommand--> relay task
//!                                                                 |
//! socket writer <--ServerEvent-- connection channel <-------------+
//! ```
//!
//! Events for users who are not connected are dropped. There is no outbox.

pub mod actor;
pub mod bridge;
pub mod connection;
pub mod presence;
pub mod registry;
pub mod relay;
pub mod socket;

pub use actor::{spawn_relay, RelayCommand, RelayHandle};
pub use connection::{ConnectionId, ConnectionReceiver, ConnectionState, RejectReason};
pub use registry::ConnectionRegistry;
pub use relay::{DispatchOutcome, EventRelay};
pub use socket::{ws_upgrade, Keepalive, SocketQuery};
