/**
 * Relay Payload Records
 *
 * This module defines the records carried by the real-time events. The REST
 * layer builds and persists these records before mirroring them over the
 * socket, so the relay treats `content` as opaque JSON and only looks at the
 * routing fields (`receiver`, `messageId`).
 *
 * Field names follow the JSON the web client already speaks (camelCase, with
 * the document id exposed as `_id`).
 */
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::shared::error::SharedError;

/// A chat message as mirrored over the relay
///
/// Sent by the client in a `send-msg` event and forwarded verbatim to the
/// recipient in a `msg-receive` event.
///
/// # Fields
/// * `id` - Document id assigned by the REST layer (`_id` on the wire)
/// * `sender` - Identity of the author
/// * `receiver` - Identity of the recipient, used for routing
/// * `content` - Opaque message body
/// * `date` / `time` - Display strings pre-formatted by the client
/// * `timestamp` - RFC3339 creation time, stamped by the relay when absent
/// * `last_modified` - RFC3339 time of the last edit
///
/// # Example
/// ```rust
/// use agora::shared::MessageEnvelope;
///
/// let envelope = MessageEnvelope::new("alice", "bob", serde_json::json!("hi bob"));
/// assert!(envelope.validate().is_ok());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageEnvelope {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub sender: String,
    pub receiver: String,
    #[serde(default)]
    pub content: serde_json::Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<DateTime<Utc>>,
}

impl MessageEnvelope {
    /// Create an envelope with only the routing fields and content set
    pub fn new(
        sender: impl Into<String>,
        receiver: impl Into<String>,
        content: serde_json::Value,
    ) -> Self {
        Self {
            id: None,
            sender: sender.into(),
            receiver: receiver.into(),
            content,
            date: None,
            time: None,
            timestamp: None,
            last_modified: None,
        }
    }

    /// Check the routing fields; `content` is forwarded whatever it holds
    pub fn validate(&self) -> Result<(), SharedError> {
        require_identity("sender", &self.sender)?;
        require_identity("receiver", &self.receiver)
    }

    /// Return the envelope with `timestamp` filled in if the client left it out
    pub fn stamped(mut self) -> Self {
        if self.timestamp.is_none() {
            self.timestamp = Some(Utc::now());
        }
        self
    }
}

/// Client request to mirror an edit (`update-msg`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageUpdate {
    pub message_id: String,
    pub updated_content: serde_json::Value,
    pub receiver: String,
}

impl MessageUpdate {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_identity("messageId", &self.message_id)?;
        require_identity("receiver", &self.receiver)
    }

    /// The part of the update the recipient gets to see
    pub fn edit(&self) -> MessageEdit {
        MessageEdit {
            message_id: self.message_id.clone(),
            updated_content: self.updated_content.clone(),
        }
    }
}

/// Edit notice delivered to the recipient (`update-msg`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MessageEdit {
    pub message_id: String,
    pub updated_content: serde_json::Value,
}

/// Client request to mirror a deletion (`delete-msg`)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageDelete {
    pub message_id: String,
    pub receiver: String,
}

impl MessageDelete {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_identity("messageId", &self.message_id)?;
        require_identity("receiver", &self.receiver)
    }
}

/// Client request to push a notification (`send-notification`)
///
/// `content` is the notification record exactly as the REST layer shaped it;
/// the recipient receives it unchanged in `notification-receive`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NotificationPush {
    pub receiver: String,
    pub content: serde_json::Value,
}

impl NotificationPush {
    pub fn validate(&self) -> Result<(), SharedError> {
        require_identity("receiver", &self.receiver)
    }
}

/// Presence state of a user
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum PresenceStatus {
    /// User has a live, announced connection
    Online,
    /// User's connection went away
    Offline,
}

impl PresenceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PresenceStatus::Online => "online",
            PresenceStatus::Offline => "offline",
        }
    }
}

/// Presence transition broadcast in `update-user-status`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserStatusUpdate {
    pub user_id: String,
    pub status: PresenceStatus,
}

impl UserStatusUpdate {
    pub fn online(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            status: PresenceStatus::Online,
        }
    }

    pub fn offline(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            status: PresenceStatus::Offline,
        }
    }
}

/// Reject identities and ids that are empty or whitespace only
pub fn require_identity(field: &str, value: &str) -> Result<(), SharedError> {
    if value.trim().is_empty() {
        return Err(SharedError::validation(field, format!("{} cannot be empty", field)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_wire_names() {
        let raw = json!({
            "_id": "m1",
            "sender": "alice",
            "receiver": "bob",
            "content": "hello",
            "date": "2024-05-01",
            "time": "10:15",
            "timestamp": "2024-05-01T10:15:00Z",
            "lastModified": "2024-05-01T10:16:00Z"
        });
        let envelope: MessageEnvelope = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(envelope.id.as_deref(), Some("m1"));
        assert_eq!(envelope.content, json!("hello"));
        assert!(envelope.last_modified.is_some());

        let back = serde_json::to_value(&envelope).unwrap();
        assert_eq!(back["_id"], "m1");
        assert_eq!(back["lastModified"], "2024-05-01T10:16:00Z");
    }

    #[test]
    fn test_envelope_validation() {
        assert!(MessageEnvelope::new("alice", "bob", json!("hi")).validate().is_ok());

        let missing_receiver = MessageEnvelope::new("alice", "  ", json!("hi"));
        assert_eq!(
            missing_receiver.validate(),
            Err(SharedError::validation("receiver", "receiver cannot be empty"))
        );

        let null_content = MessageEnvelope::new("alice", "bob", serde_json::Value::Null);
        assert_eq!(null_content.validate(), Ok(()));
    }

    #[test]
    fn test_stamped_keeps_client_timestamp() {
        let mut envelope = MessageEnvelope::new("alice", "bob", json!("hi"));
        assert!(envelope.clone().stamped().timestamp.is_some());

        let fixed = "2024-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        envelope.timestamp = Some(fixed);
        assert_eq!(envelope.stamped().timestamp, Some(fixed));
    }

    #[test]
    fn test_update_edit_drops_receiver() {
        let update = MessageUpdate {
            message_id: "m1".to_string(),
            updated_content: json!("fixed typo"),
            receiver: "bob".to_string(),
        };
        let edit = serde_json::to_value(update.edit()).unwrap();
        assert_eq!(edit, json!({"messageId": "m1", "updatedContent": "fixed typo"}));
    }

    #[test]
    fn test_delete_requires_message_id() {
        let delete = MessageDelete {
            message_id: String::new(),
            receiver: "bob".to_string(),
        };
        assert!(matches!(
            delete.validate(),
            Err(SharedError::ValidationError { ref field, .. }) if field == "messageId"
        ));
    }

    #[test]
    fn test_status_update_serialization() {
        let update = UserStatusUpdate::offline("bob");
        assert_eq!(
            serde_json::to_value(&update).unwrap(),
            json!({"userId": "bob", "status": "offline"})
        );
        assert_eq!(PresenceStatus::Online.as_str(), "online");
    }
}
