/**
 * Event Relay
 *
 * The relay owns the connection registry and the table of live connections,
 * and turns each inbound `ClientEvent` into at most a handful of outbound
 * `ServerEvent`s:
 *
 * - `add-user` registers the identity, replies with the online snapshot and
 *   tells everyone else the user is online
 * - point-to-point events are looked up by recipient and forwarded only when
 *   the recipient is connected
 * - a disconnect unregisters the handle and tells everyone else the user is
 *   offline, if the handle still owned the identity
 *
 * Nothing is queued for offline users. Every call returns synchronously;
 * the relay task in `actor` serializes access.
 */

use std::collections::HashMap;

use crate::backend::realtime::connection::{
    Connection, ConnectionId, ConnectionReceiver, RejectReason,
};
use crate::backend::realtime::presence;
use crate::backend::realtime::registry::ConnectionRegistry;
use crate::shared::{ClientEvent, ServerEvent, UserStatusUpdate};

/// What happened to a dispatched event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Forwarded to this connection
    Delivered(ConnectionId),
    /// Recipient not connected; the event was dropped
    RecipientOffline,
    /// Identity registered on the sending connection
    Announced {
        identity: String,
        /// Connection that previously served the identity, now unreachable
        displaced: Option<ConnectionId>,
        /// Number of connections that got the online broadcast
        notified: usize,
    },
    /// Event refused
    Rejected(RejectReason),
}

impl DispatchOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DispatchOutcome::Delivered(_))
    }
}

#[derive(Debug, Default)]
pub struct EventRelay {
    registry: ConnectionRegistry,
    connections: HashMap<ConnectionId, Connection>,
}

impl EventRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a connection and hand back the receiver its writer drains
    ///
    /// `verified_identity` is the identity proven by the socket handshake,
    /// if any; announces on this connection are then pinned to it.
    pub fn connect(&mut self, verified_identity: Option<String>) -> (ConnectionId, ConnectionReceiver) {
        let id = ConnectionId::new();
        let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
        self.connections
            .insert(id, Connection::new(id, tx, verified_identity));

        tracing::debug!(
            connection = %id,
            "[Relay] Connection opened ({} live)",
            self.connections.len()
        );
        (id, rx)
    }

    /// Apply one client event sent on connection `from`
    pub fn dispatch(&mut self, from: ConnectionId, event: ClientEvent) -> DispatchOutcome {
        if !self.connections.contains_key(&from) {
            tracing::debug!(
                connection = %from,
                recipient = ?event.recipient(),
                "[Relay] Event {} from closed connection",
                event.name()
            );
            return DispatchOutcome::Rejected(RejectReason::UnknownConnection);
        }

        match event {
            ClientEvent::AddUser(identity) => self.announce(from, identity),
            ClientEvent::SendMsg(envelope) => {
                let recipient = envelope.receiver.clone();
                self.forward(&recipient, ServerEvent::MsgReceive(envelope.stamped()))
            }
            ClientEvent::SendNotification(push) => {
                self.forward(&push.receiver, ServerEvent::NotificationReceive(push.content))
            }
            ClientEvent::DeleteMsg(delete) => {
                self.forward(&delete.receiver, ServerEvent::DeleteMsg(delete.message_id))
            }
            ClientEvent::UpdateMsg(update) => {
                let edit = update.edit();
                self.forward(&update.receiver, ServerEvent::UpdateMsg(edit))
            }
        }
    }

    /// Server-side push to whichever connection serves `recipient`
    pub fn deliver(&self, recipient: &str, event: ServerEvent) -> DispatchOutcome {
        self.forward(recipient, event)
    }

    /// Close connection `id`
    ///
    /// Returns the identity that went offline, or `None` when the handle was
    /// anonymous, displaced, or already gone. Safe to call more than once.
    pub fn disconnect(&mut self, id: ConnectionId) -> Option<String> {
        let closed = self.connections.remove(&id);
        let identity = self.registry.unregister_by_handle(id);

        match &identity {
            Some(identity) => {
                let notified = presence::broadcast_status(
                    &self.connections,
                    id,
                    &UserStatusUpdate::offline(identity.as_str()),
                );
                tracing::info!(
                    connection = %id,
                    user_id = %identity,
                    "[Relay] User offline, notified {} connection(s)",
                    notified
                );
            }
            None if closed.is_some() => {
                tracing::debug!(connection = %id, "[Relay] Connection closed without a registered identity");
            }
            None => {}
        }

        identity
    }

    pub fn online_users(&self) -> Vec<String> {
        self.registry.online_identities()
    }

    pub fn lookup(&self, identity: &str) -> Option<ConnectionId> {
        self.registry.lookup(identity)
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    fn announce(&mut self, from: ConnectionId, identity: String) -> DispatchOutcome {
        let Some(connection) = self.connections.get_mut(&from) else {
            return DispatchOutcome::Rejected(RejectReason::UnknownConnection);
        };

        if let Err(reason) = connection.identify(&identity) {
            tracing::warn!(connection = %from, "[Relay] Announce refused: {}", reason);
            return DispatchOutcome::Rejected(reason);
        }

        let displaced = self.registry.register(identity.as_str(), from);
        if let Some(old) = displaced {
            tracing::info!(
                user_id = %identity,
                connection = %from,
                displaced = %old,
                "[Relay] Identity moved to a newer connection"
            );
        }

        if let Some(connection) = self.connections.get(&from) {
            presence::send_snapshot(connection, self.registry.online_identities());
        }
        let notified = presence::broadcast_status(
            &self.connections,
            from,
            &UserStatusUpdate::online(identity.as_str()),
        );

        tracing::info!(
            connection = %from,
            user_id = %identity,
            "[Relay] User online ({} online)",
            self.registry.len()
        );

        DispatchOutcome::Announced {
            identity,
            displaced,
            notified,
        }
    }

    fn forward(&self, recipient: &str, event: ServerEvent) -> DispatchOutcome {
        let Some(handle) = self.registry.lookup(recipient) else {
            tracing::info!(user_id = %recipient, "[Relay] {} dropped, recipient offline", event.name());
            return DispatchOutcome::RecipientOffline;
        };

        let name = event.name();
        match self.connections.get(&handle) {
            Some(connection) if connection.send(event) => {
                tracing::debug!(user_id = %recipient, connection = %handle, "[Relay] {} forwarded", name);
                DispatchOutcome::Delivered(handle)
            }
            _ => {
                tracing::debug!(
                    user_id = %recipient,
                    connection = %handle,
                    "[Relay] {} dropped, writer already closed",
                    name
                );
                DispatchOutcome::RecipientOffline
            }
        }
    }
}
