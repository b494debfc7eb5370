/**
 * Application State Management
 *
 * This module defines the application state shared by every route and
 * implements the `FromRef` traits for Axum state extraction.
 *
 * # Architecture
 *
 * The `AppState` struct holds:
 * - The handle to the relay task (the relay state itself lives in that task)
 * - The socket handshake policy
 * - The token verifier for the bridge routes, if a secret is configured
 * - Socket keepalive settings
 *
 * Everything in here is cheap to clone; no field needs a lock.
 *
 * # Example
 *
 * ```rust,no_run
 * use agora::backend::realtime::RelayHandle;
 * use axum::extract::State;
 *
 * async fn handler(State(relay): State<RelayHandle>) -> usize {
 *     relay.online_users().await.len()
 * }
 * ```
 */

use axum::extract::FromRef;

use crate::backend::auth::{HandshakePolicy, TokenVerifier};
use crate::backend::realtime::{spawn_relay, EventRelay, Keepalive, RelayHandle};
use crate::shared::RelayConfig;

/// Application state
///
/// # Fields
///
/// * `relay` - Handle to the relay task
/// * `handshake` - Whether `/ws` requires a bearer token
/// * `tokens` - Verifier for bridge routes; `None` when no secret is set
/// * `keepalive` - Ping/pong settings for sockets
#[derive(Clone, Debug)]
pub struct AppState {
    pub relay: RelayHandle,
    pub handshake: HandshakePolicy,
    pub tokens: Option<TokenVerifier>,
    pub keepalive: Keepalive,
}

impl AppState {
    /// Build the state for `config` and start a fresh relay task
    ///
    /// Must be called inside a tokio runtime.
    pub fn from_config(config: &RelayConfig) -> Self {
        let tokens = config.jwt_secret.as_deref().map(TokenVerifier::new);
        let handshake = match (&tokens, config.require_auth) {
            (Some(verifier), true) => HandshakePolicy::RequireToken(verifier.clone()),
            _ => HandshakePolicy::Open,
        };

        Self {
            relay: spawn_relay(EventRelay::new()),
            handshake,
            tokens,
            keepalive: Keepalive::from_config(config),
        }
    }
}

/// Allows handlers to extract `State<RelayHandle>` directly
impl FromRef<AppState> for RelayHandle {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.relay.clone()
    }
}

impl FromRef<AppState> for HandshakePolicy {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.handshake.clone()
    }
}

impl FromRef<AppState> for Keepalive {
    fn from_ref(app_state: &AppState) -> Self {
        app_state.keepalive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_state_without_secret() {
        let state = AppState::from_config(&RelayConfig::default());
        assert!(!state.handshake.requires_token());
        assert!(state.tokens.is_none());
        assert!(state.keepalive.is_enabled());
    }

    #[tokio::test]
    async fn test_secret_enables_bridge_and_handshake() {
        let config = RelayConfig::builder()
            .require_auth(true)
            .jwt_secret("secret")
            .build()
            .unwrap();
        let state = AppState::from_config(&config);
        assert!(state.handshake.requires_token());
        assert!(state.tokens.is_some());

        // secret alone keeps the socket open
        let config = RelayConfig::builder().jwt_secret("secret").build().unwrap();
        let state = AppState::from_config(&config);
        assert!(!state.handshake.requires_token());
        assert!(state.tokens.is_some());
    }

    #[tokio::test]
    async fn test_state_slices_for_socket_route() {
        let config = RelayConfig::builder()
            .require_auth(true)
            .jwt_secret("secret")
            .ping_interval(std::time::Duration::ZERO)
            .build()
            .unwrap();
        let state = AppState::from_config(&config);

        assert!(HandshakePolicy::from_ref(&state).requires_token());
        assert!(!Keepalive::from_ref(&state).is_enabled());
        assert!(!RelayHandle::from_ref(&state).is_closed());
    }
}
