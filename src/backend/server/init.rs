/**
 * Server Initialization
 *
 * Builds the application state (starting the relay task) and the router.
 *
 * # Initialization Process
 *
 * 1. Start the relay task
 * 2. Pick the socket handshake policy from the configuration
 * 3. Create the router with all routes and layers
 */

use axum::Router;

use crate::backend::routes::router::create_router;
use crate::backend::server::state::AppState;
use crate::shared::RelayConfig;

/// Create and configure the Axum application
///
/// Must be called inside a tokio runtime; the relay task is spawned here.
pub fn create_app(config: &RelayConfig) -> Router<()> {
    let app_state = AppState::from_config(config);
    create_app_with_state(app_state, config)
}

/// Same as `create_app`, for callers that keep a handle to the state
pub fn create_app_with_state(app_state: AppState, config: &RelayConfig) -> Router<()> {
    tracing::info!(
        "[Startup] Relay configured: socket auth {}, bridge pushes {}, keepalive {}",
        if app_state.handshake.requires_token() { "required" } else { "off" },
        if app_state.tokens.is_some() { "enabled" } else { "disabled (no ACCESS_JWT_SECRET)" },
        if app_state.keepalive.is_enabled() {
            format!("{:?}/{:?}", app_state.keepalive.ping_interval, app_state.keepalive.pong_timeout)
        } else {
            "off".to_string()
        }
    );

    create_router(app_state, config.frontend_url.as_deref())
}
