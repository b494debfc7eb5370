/**
 * Presence Fan-out
 *
 * Helpers the relay uses to publish presence transitions. Presence events
 * are never stored; each transition is broadcast once to every connection
 * other than the one that caused it.
 */

use std::collections::HashMap;

use crate::backend::realtime::connection::{Connection, ConnectionId};
use crate::shared::{ServerEvent, UserStatusUpdate};

/// Send `update` to every connection except `except`
///
/// Anonymous connections receive presence too, matching a plain socket
/// broadcast. Returns how many writers accepted the event.
pub fn broadcast_status(
    connections: &HashMap<ConnectionId, Connection>,
    except: ConnectionId,
    update: &UserStatusUpdate,
) -> usize {
    let delivered = connections
        .values()
        .filter(|conn| conn.id() != except)
        .filter(|conn| conn.send(ServerEvent::UpdateUserStatus(update.clone())))
        .count();

    tracing::debug!(
        user_id = %update.user_id,
        status = update.status.as_str(),
        "[Presence] Broadcast to {} connection(s)",
        delivered
    );
    delivered
}

/// Reply to an announcer with who is online right now
pub fn send_snapshot(connection: &Connection, online: Vec<String>) -> bool {
    let count = online.len();
    let sent = connection.send(ServerEvent::CurrentOnlineUsers(online));
    tracing::debug!(
        connection = %connection.id(),
        "[Presence] Snapshot of {} user(s) sent={}",
        count,
        sent
    );
    sent
}
