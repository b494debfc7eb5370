//! Common test utilities and helpers
//!
//! - Configuration and token fixtures
//! - A real server on an ephemeral port for socket tests
//! - Helpers to read events off connection receivers

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use agora::backend::auth::{TokenVerifier, DEFAULT_TOKEN_TTL};
use agora::backend::realtime::{ConnectionId, ConnectionReceiver, RelayHandle};
use agora::backend::server::{create_app_with_state, AppState};
use agora::shared::{ClientEvent, RelayConfig, ServerEvent};
use tokio::net::TcpListener;

pub const SECRET: &str = "integration-test-secret";

/// Config with a token secret and keepalive off
pub fn test_config() -> RelayConfig {
    RelayConfig::builder()
        .host("127.0.0.1")
        .port(0)
        .jwt_secret(SECRET)
        .ping_interval(Duration::ZERO)
        .build()
        .unwrap()
}

/// Same, but `/ws` requires a token
pub fn auth_config() -> RelayConfig {
    RelayConfig::builder()
        .host("127.0.0.1")
        .port(0)
        .jwt_secret(SECRET)
        .require_auth(true)
        .ping_interval(Duration::ZERO)
        .build()
        .unwrap()
}

pub fn token_for(user_id: &str) -> String {
    TokenVerifier::new(SECRET)
        .create_token(user_id, DEFAULT_TOKEN_TTL)
        .unwrap()
}

/// Start the full app on 127.0.0.1:0
pub async fn spawn_server(config: RelayConfig) -> (SocketAddr, AppState) {
    let state = AppState::from_config(&config);
    let app = create_app_with_state(state.clone(), &config);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, state)
}

/// Connect and announce `identity` through the handle, discarding the snapshot
pub async fn announce(relay: &RelayHandle, identity: &str) -> (ConnectionId, ConnectionReceiver) {
    let (id, mut rx) = relay.connect(None).await.unwrap();
    relay.inbound(id, ClientEvent::AddUser(identity.to_string()));
    match next_event(&mut rx).await {
        Some(ServerEvent::CurrentOnlineUsers(_)) => {}
        other => panic!("expected snapshot, got {:?}", other),
    }
    (id, rx)
}

/// Wait briefly for the next event
pub async fn next_event(rx: &mut ConnectionReceiver) -> Option<ServerEvent> {
    tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .ok()
        .flatten()
}

/// Everything already queued, after letting the relay catch up
pub async fn drain(relay: &RelayHandle, rx: &mut ConnectionReceiver) -> Vec<ServerEvent> {
    // a round trip through the relay task flushes earlier commands
    relay.online_users().await;
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
