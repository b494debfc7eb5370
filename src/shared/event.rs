/**
 * Real-time Event System
 *
 * This module defines the events exchanged over the real-time socket.
 * Every frame is a JSON text message of the form
 *
 * ```json
 * {"event": "send-msg", "data": { ... }}
 * ```
 *
 * Inbound frames are decoded into `ClientEvent` and validated before they
 * ever reach the relay; outbound `ServerEvent`s are encoded the same way.
 */
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;
use crate::shared::message::{
    require_identity, MessageDelete, MessageEdit, MessageEnvelope, MessageUpdate,
    NotificationPush, UserStatusUpdate,
};

/// Event names a client is allowed to send
pub const CLIENT_EVENT_NAMES: [&str; 5] = [
    "add-user",
    "send-msg",
    "send-notification",
    "delete-msg",
    "update-msg",
];

/// Events sent from a client to the relay
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Announce the identity behind this connection
    AddUser(String),
    /// Mirror a stored chat message to its recipient
    SendMsg(MessageEnvelope),
    /// Push a notification record to its recipient
    SendNotification(NotificationPush),
    /// Mirror a message deletion
    DeleteMsg(MessageDelete),
    /// Mirror a message edit
    UpdateMsg(MessageUpdate),
}

impl ClientEvent {
    /// Decode and validate a raw text frame
    ///
    /// Unknown event names are reported as `UnknownEvent` rather than a
    /// generic serialization failure so the socket log says what was sent.
    pub fn decode(frame: &str) -> Result<Self, SharedError> {
        let value: serde_json::Value = serde_json::from_str(frame)?;

        let name = value
            .get("event")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SharedError::validation("event", "frame has no event name"))?;

        if !CLIENT_EVENT_NAMES.contains(&name) {
            return Err(SharedError::unknown_event(name));
        }

        let event: ClientEvent = serde_json::from_value(value)?;
        event.validate()?;
        Ok(event)
    }

    /// Check the routing fields of the payload
    pub fn validate(&self) -> Result<(), SharedError> {
        match self {
            ClientEvent::AddUser(identity) => require_identity("userId", identity),
            ClientEvent::SendMsg(envelope) => envelope.validate(),
            ClientEvent::SendNotification(push) => push.validate(),
            ClientEvent::DeleteMsg(delete) => delete.validate(),
            ClientEvent::UpdateMsg(update) => update.validate(),
        }
    }

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::AddUser(_) => "add-user",
            ClientEvent::SendMsg(_) => "send-msg",
            ClientEvent::SendNotification(_) => "send-notification",
            ClientEvent::DeleteMsg(_) => "delete-msg",
            ClientEvent::UpdateMsg(_) => "update-msg",
        }
    }

    /// Identity the event is addressed to, if it is point-to-point
    pub fn recipient(&self) -> Option<&str> {
        match self {
            ClientEvent::AddUser(_) => None,
            ClientEvent::SendMsg(envelope) => Some(&envelope.receiver),
            ClientEvent::SendNotification(push) => Some(&push.receiver),
            ClientEvent::DeleteMsg(delete) => Some(&delete.receiver),
            ClientEvent::UpdateMsg(update) => Some(&update.receiver),
        }
    }
}

/// Events sent from the relay to a client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ServerEvent {
    /// Snapshot of announced identities, sent once per announce to the announcer
    CurrentOnlineUsers(Vec<String>),
    /// Presence transition of another user
    UpdateUserStatus(UserStatusUpdate),
    /// A chat message addressed to this connection's user
    MsgReceive(MessageEnvelope),
    /// A notification record addressed to this connection's user
    NotificationReceive(serde_json::Value),
    /// Id of a message that was deleted
    DeleteMsg(String),
    /// A message that was edited
    UpdateMsg(MessageEdit),
}

impl ServerEvent {
    /// Encode into a text frame
    pub fn encode(&self) -> Result<String, SharedError> {
        Ok(serde_json::to_string(self)?)
    }

    /// Wire name of the event
    pub fn name(&self) -> &'static str {
        match self {
            ServerEvent::CurrentOnlineUsers(_) => "current-online-users",
            ServerEvent::UpdateUserStatus(_) => "update-user-status",
            ServerEvent::MsgReceive(_) => "msg-receive",
            ServerEvent::NotificationReceive(_) => "notification-receive",
            ServerEvent::DeleteMsg(_) => "delete-msg",
            ServerEvent::UpdateMsg(_) => "update-msg",
        }
    }
}
