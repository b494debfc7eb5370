//! Relay scenarios driven through `RelayHandle`

#![cfg(feature = "ssr")]

mod common;

use agora::backend::realtime::{spawn_relay, EventRelay};
use agora::shared::{
    ClientEvent, MessageEnvelope, MessageUpdate, NotificationPush, ServerEvent, UserStatusUpdate,
};
use common::{announce, drain};
use pretty_assertions::assert_eq;
use serde_json::json;

#[tokio::test]
async fn message_reaches_recipient_exactly_once() {
    let relay = spawn_relay(EventRelay::new());
    let (a, mut rx_a) = announce(&relay, "alice").await;
    let (_b, mut rx_b) = announce(&relay, "bob").await;
    drain(&relay, &mut rx_a).await;

    relay.inbound(
        a,
        ClientEvent::SendMsg(MessageEnvelope::new("alice", "bob", json!("hello bob"))),
    );

    let events = drain(&relay, &mut rx_b).await;
    assert_eq!(events.len(), 1);
    match &events[0] {
        ServerEvent::MsgReceive(envelope) => {
            assert_eq!(envelope.sender, "alice");
            assert_eq!(envelope.content, json!("hello bob"));
        }
        other => panic!("unexpected event {:?}", other),
    }
    assert!(drain(&relay, &mut rx_a).await.is_empty());
}

#[tokio::test]
async fn events_for_absent_users_vanish() {
    let relay = spawn_relay(EventRelay::new());
    let (a, mut rx_a) = announce(&relay, "alice").await;
    let (b, mut rx_b) = announce(&relay, "bob").await;
    relay.disconnect(b);
    drain(&relay, &mut rx_a).await;

    for receiver in ["bob", "never-connected"] {
        relay.inbound(
            a,
            ClientEvent::SendMsg(MessageEnvelope::new("alice", receiver, json!("anyone?"))),
        );
        relay.inbound(
            a,
            ClientEvent::SendNotification(NotificationPush {
                receiver: receiver.to_string(),
                content: json!({"kind": "like"}),
            }),
        );
    }

    assert!(drain(&relay, &mut rx_a).await.is_empty());
    // bob's receiver only ever saw what arrived before the disconnect
    assert!(drain(&relay, &mut rx_b)
        .await
        .iter()
        .all(|event| matches!(event, ServerEvent::UpdateUserStatus(_))));
}

#[tokio::test]
async fn reannounce_moves_identity_and_orphan_close_is_silent() {
    let relay = spawn_relay(EventRelay::new());
    let (_w, mut rx_w) = announce(&relay, "watcher").await;
    let (c1, _rx1) = announce(&relay, "u1").await;
    assert_eq!(relay.lookup("u1").await, Some(c1));

    let (c2, mut rx2) = announce(&relay, "u1").await;
    assert_eq!(relay.lookup("u1").await, Some(c2));
    drain(&relay, &mut rx_w).await;

    relay.disconnect(c1);
    assert_eq!(relay.lookup("u1").await, Some(c2));
    assert!(drain(&relay, &mut rx_w).await.is_empty());

    // the current connection still gets u1's traffic
    assert!(relay.deliver("u1", ServerEvent::DeleteMsg("m9".into())).await);
    assert_eq!(
        drain(&relay, &mut rx2).await,
        vec![ServerEvent::DeleteMsg("m9".into())]
    );
}

#[tokio::test]
async fn departure_is_broadcast_once_to_everyone_else() {
    let relay = spawn_relay(EventRelay::new());
    let (_a, mut rx_a) = announce(&relay, "alice").await;
    let (b, _rx_b) = announce(&relay, "bob").await;
    let (c, mut rx_c) = announce(&relay, "carol").await;
    drain(&relay, &mut rx_a).await;

    relay.disconnect(b);
    relay.disconnect(b);

    let offline = ServerEvent::UpdateUserStatus(UserStatusUpdate::offline("bob"));
    assert_eq!(drain(&relay, &mut rx_a).await, vec![offline.clone()]);
    assert_eq!(drain(&relay, &mut rx_c).await, vec![offline]);
    assert_eq!(relay.lookup("bob").await, None);
    assert_eq!(relay.online_users().await, vec!["alice", "carol"]);

    relay.inbound(
        c,
        ClientEvent::UpdateMsg(MessageUpdate {
            message_id: "m1".into(),
            updated_content: json!("edited"),
            receiver: "bob".into(),
        }),
    );
    assert!(drain(&relay, &mut rx_a).await.is_empty());
}

#[tokio::test]
async fn per_connection_order_is_preserved() {
    let relay = spawn_relay(EventRelay::new());
    let (a, _rx_a) = announce(&relay, "alice").await;
    let (_b, mut rx_b) = announce(&relay, "bob").await;

    for i in 0..20 {
        relay.inbound(a, ClientEvent::SendMsg(MessageEnvelope::new("alice", "bob", json!(i))));
    }

    let contents: Vec<_> = drain(&relay, &mut rx_b)
        .await
        .into_iter()
        .filter_map(|event| match event {
            ServerEvent::MsgReceive(envelope) => Some(envelope.content),
            _ => None,
        })
        .collect();
    assert_eq!(contents, (0..20).map(|i| json!(i)).collect::<Vec<_>>());
}

#[tokio::test]
async fn pinned_identity_cannot_be_spoofed() {
    let relay = spawn_relay(EventRelay::new());
    let (c, mut rx) = relay.connect(Some("alice".into())).await.unwrap();

    relay.inbound(c, ClientEvent::AddUser("mallory".into()));
    assert!(relay.online_users().await.is_empty());
    assert!(drain(&relay, &mut rx).await.is_empty());

    relay.inbound(c, ClientEvent::AddUser("alice".into()));
    assert_eq!(relay.lookup("alice").await, Some(c));
}
