/**
 * API Routes
 *
 * # Routes
 *
 * ## Presence
 * - `GET /api/presence` - Online identities
 * - `GET /api/presence/{user_id}` - Presence of one identity
 *
 * ## Relay pushes (require a bearer token)
 * - `POST /api/relay/notifications` - Push a notification record
 * - `POST /api/relay/messages` - Push a stored chat message
 */

use axum::{
    routing::{get, post},
    Router,
};

use crate::backend::realtime::bridge::{list_online, push_message, push_notification, user_presence};
use crate::backend::server::state::AppState;

/// Configure API routes
///
/// Authentication for the push routes is enforced by the `AuthUser`
/// extractor in each handler.
pub fn configure_api_routes(router: Router<AppState>) -> Router<AppState> {
    router
        // Presence lookups
        .route("/api/presence", get(list_online))
        .route("/api/presence/{user_id}", get(user_presence))
        // Server-side pushes from the REST layer
        .route("/api/relay/notifications", post(push_notification))
        .route("/api/relay/messages", post(push_message))
}
