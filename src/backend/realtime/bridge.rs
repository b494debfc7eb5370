/**
 * HTTP Bridge
 *
 * Small HTTP surface next to the socket. It lets the REST layer (which
 * persists messages and notifications) push the stored records through the
 * relay, and lets anyone ask who is online.
 *
 * # Routes
 *
 * - `GET /health` - liveness plus the number of online users
 * - `GET /api/presence` - sorted list of online identities
 * - `GET /api/presence/{user_id}` - presence of one identity
 * - `POST /api/relay/notifications` - push `notification-receive` (auth)
 * - `POST /api/relay/messages` - push `msg-receive` (auth, sender = caller)
 *
 * Pushes never queue: `{"delivered": false}` means the recipient was offline
 * and the event is gone.
 */

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::backend::error::BackendError;
use crate::backend::middleware::AuthUser;
use crate::backend::realtime::actor::RelayHandle;
use crate::shared::{MessageEnvelope, NotificationPush, PresenceStatus, ServerEvent};

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub online: usize,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct OnlineUsersResponse {
    pub users: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PresenceResponse {
    pub user_id: String,
    pub status: PresenceStatus,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeliveryResponse {
    pub delivered: bool,
}

/// GET /health
pub async fn health(State(relay): State<RelayHandle>) -> Result<Json<HealthResponse>, BackendError> {
    if relay.is_closed() {
        return Err(BackendError::RelayUnavailable);
    }
    let online = relay.online_users().await.len();
    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        online,
    }))
}

/// GET /api/presence
pub async fn list_online(State(relay): State<RelayHandle>) -> Json<OnlineUsersResponse> {
    Json(OnlineUsersResponse {
        users: relay.online_users().await,
    })
}

/// GET /api/presence/{user_id}
pub async fn user_presence(
    State(relay): State<RelayHandle>,
    Path(user_id): Path<String>,
) -> Json<PresenceResponse> {
    let status = match relay.lookup(user_id.as_str()).await {
        Some(_) => PresenceStatus::Online,
        None => PresenceStatus::Offline,
    };
    Json(PresenceResponse { user_id, status })
}

/// POST /api/relay/notifications
pub async fn push_notification(
    State(relay): State<RelayHandle>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<NotificationPush>, JsonRejection>,
) -> Result<Json<DeliveryResponse>, BackendError> {
    let Json(push) = payload.map_err(bad_request)?;
    push.validate()?;

    let delivered = relay
        .deliver(push.receiver.as_str(), ServerEvent::NotificationReceive(push.content))
        .await;

    tracing::info!(
        caller = %caller.user_id,
        user_id = %push.receiver,
        "[Bridge] Notification pushed, delivered={}",
        delivered
    );
    Ok(Json(DeliveryResponse { delivered }))
}

/// POST /api/relay/messages
///
/// The caller may only push messages it authored.
pub async fn push_message(
    State(relay): State<RelayHandle>,
    AuthUser(caller): AuthUser,
    payload: Result<Json<MessageEnvelope>, JsonRejection>,
) -> Result<Json<DeliveryResponse>, BackendError> {
    let Json(envelope) = payload.map_err(bad_request)?;
    envelope.validate()?;

    if envelope.sender != caller.user_id {
        tracing::warn!(
            caller = %caller.user_id,
            sender = %envelope.sender,
            "[Bridge] Refused message pushed on behalf of another user"
        );
        return Err(BackendError::handler(
            StatusCode::FORBIDDEN,
            "sender does not match the authenticated user",
        ));
    }

    let receiver = envelope.receiver.clone();
    let delivered = relay
        .deliver(receiver.as_str(), ServerEvent::MsgReceive(envelope.stamped()))
        .await;

    tracing::info!(
        caller = %caller.user_id,
        user_id = %receiver,
        "[Bridge] Message pushed, delivered={}",
        delivered
    );
    Ok(Json(DeliveryResponse { delivered }))
}

fn bad_request(rejection: JsonRejection) -> BackendError {
    tracing::debug!("[Bridge] Rejected body: {}", rejection.body_text());
    BackendError::handler(StatusCode::BAD_REQUEST, rejection.body_text())
}
