/**
 * Live Connections
 *
 * A `Connection` is the relay's view of one socket session: an opaque
 * handle, the outbound channel drained by the socket's writer task, and the
 * identity announced on it.
 *
 * # Lifecycle
 *
 * ```text
 * Anonymous --add-user--> Identified(identity) --disconnect--> (dropped)
 * ```
 *
 * The transition to `Identified` is one-way. Announcing the same identity
 * again is allowed (it refreshes presence); announcing a different one is
 * rejected.
 */

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc;

use crate::shared::ServerEvent;

/// Outbound half of a connection's event channel
pub type ConnectionSender = mpsc::UnboundedSender<ServerEvent>;

/// Inbound half, owned by the socket writer task
pub type ConnectionReceiver = mpsc::UnboundedReceiver<ServerEvent>;

static NEXT_CONNECTION_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-local connection handle, allocated in increasing order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

impl ConnectionId {
    pub fn new() -> Self {
        Self(NEXT_CONNECTION_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Identification state of a connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connected, nothing announced yet
    Anonymous,
    /// Announced as this identity
    Identified(String),
}

/// Why the relay refused an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    /// The event came from a handle the relay does not know (already closed)
    UnknownConnection,
    /// The connection is already identified as someone else
    AlreadyIdentified { current: String, requested: String },
    /// The handshake proved a different identity
    IdentityMismatch { verified: String, requested: String },
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::UnknownConnection => write!(f, "unknown connection"),
            RejectReason::AlreadyIdentified { current, requested } => write!(
                f,
                "connection already identified as {}, refused {}",
                current, requested
            ),
            RejectReason::IdentityMismatch { verified, requested } => write!(
                f,
                "token identity {} does not match announced {}",
                verified, requested
            ),
        }
    }
}

#[derive(Debug)]
pub struct Connection {
    id: ConnectionId,
    sender: ConnectionSender,
    state: ConnectionState,
    verified_identity: Option<String>,
}

impl Connection {
    pub fn new(id: ConnectionId, sender: ConnectionSender, verified_identity: Option<String>) -> Self {
        Self {
            id,
            sender,
            state: ConnectionState::Anonymous,
            verified_identity,
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn state(&self) -> &ConnectionState {
        &self.state
    }

    pub fn identity(&self) -> Option<&str> {
        match &self.state {
            ConnectionState::Anonymous => None,
            ConnectionState::Identified(identity) => Some(identity),
        }
    }

    /// Attach `identity` to this connection
    pub fn identify(&mut self, identity: &str) -> Result<(), RejectReason> {
        if let Some(verified) = &self.verified_identity {
            if verified != identity {
                return Err(RejectReason::IdentityMismatch {
                    verified: verified.clone(),
                    requested: identity.to_string(),
                });
            }
        }

        if let ConnectionState::Identified(current) = &self.state {
            if current != identity {
                return Err(RejectReason::AlreadyIdentified {
                    current: current.clone(),
                    requested: identity.to_string(),
                });
            }
        }

        self.state = ConnectionState::Identified(identity.to_string());
        Ok(())
    }

    /// Queue an event for the writer task; false once the writer is gone
    pub fn send(&self, event: ServerEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}
