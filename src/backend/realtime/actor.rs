/**
 * Relay Task
 *
 * Runs an `EventRelay` on its own tokio task and exposes it through a
 * cloneable `RelayHandle`. Every socket and HTTP handler sends commands on
 * one unbounded channel; the task applies them one at a time, so the
 * registry needs no lock and the events of one connection are applied in the
 * order that connection sent them.
 *
 * The task stops when the last handle is dropped.
 */

use tokio::sync::{mpsc, oneshot};

use crate::backend::error::BackendError;
use crate::backend::realtime::connection::{ConnectionId, ConnectionReceiver};
use crate::backend::realtime::relay::{DispatchOutcome, EventRelay};
use crate::shared::{ClientEvent, ServerEvent};

/// Commands accepted by the relay task
#[derive(Debug)]
pub enum RelayCommand {
    Connect {
        verified_identity: Option<String>,
        reply: oneshot::Sender<(ConnectionId, ConnectionReceiver)>,
    },
    Inbound {
        connection: ConnectionId,
        event: ClientEvent,
    },
    Disconnect {
        connection: ConnectionId,
    },
    Deliver {
        recipient: String,
        event: ServerEvent,
        reply: oneshot::Sender<DispatchOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<String>>,
    },
    Lookup {
        identity: String,
        reply: oneshot::Sender<Option<ConnectionId>>,
    },
}

/// Start the relay task and return a handle to it
pub fn spawn_relay(relay: EventRelay) -> RelayHandle {
    let (tx, rx) = mpsc::unbounded_channel();
    tokio::spawn(run_relay(relay, rx));
    RelayHandle { commands: tx }
}

async fn run_relay(mut relay: EventRelay, mut commands: mpsc::UnboundedReceiver<RelayCommand>) {
    tracing::info!("[Relay] Task started");

    while let Some(command) = commands.recv().await {
        match command {
            RelayCommand::Connect {
                verified_identity,
                reply,
            } => {
                let (id, rx) = relay.connect(verified_identity);
                if reply.send((id, rx)).is_err() {
                    // the socket went away before it got its handle
                    relay.disconnect(id);
                }
            }
            RelayCommand::Inbound { connection, event } => {
                relay.dispatch(connection, event);
            }
            RelayCommand::Disconnect { connection } => {
                relay.disconnect(connection);
            }
            RelayCommand::Deliver {
                recipient,
                event,
                reply,
            } => {
                let _ = reply.send(relay.deliver(&recipient, event));
            }
            RelayCommand::Snapshot { reply } => {
                let _ = reply.send(relay.online_users());
            }
            RelayCommand::Lookup { identity, reply } => {
                let _ = reply.send(relay.lookup(&identity));
            }
        }
    }

    tracing::info!(
        "[Relay] Task stopped with {} connection(s) open",
        relay.connection_count()
    );
}

/// Cloneable handle to the relay task
#[derive(Debug, Clone)]
pub struct RelayHandle {
    commands: mpsc::UnboundedSender<RelayCommand>,
}

impl RelayHandle {
    /// Register a new connection
    ///
    /// Fails only when the relay task is gone, which happens during shutdown.
    pub async fn connect(
        &self,
        verified_identity: Option<String>,
    ) -> Result<(ConnectionId, ConnectionReceiver), BackendError> {
        let (reply, response) = oneshot::channel();
        self.send(RelayCommand::Connect {
            verified_identity,
            reply,
        })?;
        response.await.map_err(|_| BackendError::RelayUnavailable)
    }

    /// Queue a decoded client event from `connection`
    pub fn inbound(&self, connection: ConnectionId, event: ClientEvent) {
        if self.send(RelayCommand::Inbound { connection, event }).is_err() {
            tracing::warn!(connection = %connection, "[Relay] Task gone, inbound event dropped");
        }
    }

    /// Tell the relay `connection` closed
    pub fn disconnect(&self, connection: ConnectionId) {
        if self.send(RelayCommand::Disconnect { connection }).is_err() {
            tracing::warn!(connection = %connection, "[Relay] Task gone, disconnect dropped");
        }
    }

    /// Push an event to `recipient`; true when it was forwarded
    pub async fn deliver(&self, recipient: impl Into<String>, event: ServerEvent) -> bool {
        let (reply, response) = oneshot::channel();
        let sent = self.send(RelayCommand::Deliver {
            recipient: recipient.into(),
            event,
            reply,
        });
        if sent.is_err() {
            return false;
        }
        matches!(response.await, Ok(outcome) if outcome.is_delivered())
    }

    /// Sorted list of online identities
    pub async fn online_users(&self) -> Vec<String> {
        let (reply, response) = oneshot::channel();
        if self.send(RelayCommand::Snapshot { reply }).is_err() {
            return Vec::new();
        }
        response.await.unwrap_or_default()
    }

    pub async fn lookup(&self, identity: impl Into<String>) -> Option<ConnectionId> {
        let (reply, response) = oneshot::channel();
        self.send(RelayCommand::Lookup {
            identity: identity.into(),
            reply,
        })
        .ok()?;
        response.await.ok().flatten()
    }

    pub fn is_closed(&self) -> bool {
        self.commands.is_closed()
    }

    fn send(&self, command: RelayCommand) -> Result<(), BackendError> {
        self.commands.send(command).map_err(|_| {
            tracing::warn!("[Relay] Task is not running");
            BackendError::RelayUnavailable
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::UserStatusUpdate;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_handle_round_trip() {
        let relay = spawn_relay(EventRelay::new());
        let (alice, mut rx) = relay.connect(None).await.unwrap();

        relay.inbound(alice, ClientEvent::AddUser("alice".into()));
        assert_eq!(relay.online_users().await, vec!["alice".to_string()]);
        assert_eq!(relay.lookup("alice").await, Some(alice));
        assert_eq!(
            rx.recv().await,
            Some(ServerEvent::CurrentOnlineUsers(vec!["alice".into()]))
        );

        assert!(relay.deliver("alice", ServerEvent::DeleteMsg("m1".into())).await);
        assert_eq!(rx.recv().await, Some(ServerEvent::DeleteMsg("m1".into())));
        assert!(!relay.deliver("bob", ServerEvent::DeleteMsg("m1".into())).await);
    }

    #[tokio::test]
    async fn test_disconnect_closes_receiver() {
        let relay = spawn_relay(EventRelay::new());
        let (watcher, mut watcher_rx) = relay.connect(None).await.unwrap();
        let (bob, mut bob_rx) = relay.connect(None).await.unwrap();
        relay.inbound(bob, ClientEvent::AddUser("bob".into()));

        relay.disconnect(bob);
        assert!(relay.online_users().await.is_empty());

        // the relay dropped bob's sender
        assert!(matches!(bob_rx.recv().await, Some(ServerEvent::CurrentOnlineUsers(_))));
        assert_eq!(bob_rx.recv().await, None);

        assert_eq!(
            watcher_rx.recv().await,
            Some(ServerEvent::UpdateUserStatus(UserStatusUpdate::online("bob")))
        );
        assert_eq!(
            watcher_rx.recv().await,
            Some(ServerEvent::UpdateUserStatus(UserStatusUpdate::offline("bob")))
        );
        relay.disconnect(watcher);
    }
}
