/**
 * Router Configuration
 *
 * This module provides the main router creation function that combines
 * all route configurations into a single Axum router.
 *
 * # Route Order
 *
 * 1. Socket route (`GET /ws`)
 * 2. Health check
 * 3. API routes (presence, bridge pushes)
 * 4. Fallback handler (404 JSON)
 *
 * # Layers
 *
 * Every route is wrapped in a `TraceLayer` and a `CorsLayer`. The CORS
 * origin is `FRONTEND_URL` when set, any origin otherwise.
 */

use axum::{
    http::{HeaderValue, StatusCode},
    routing::get,
    Json, Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::backend::realtime::{bridge::health, ws_upgrade};
use crate::backend::routes::api_routes::configure_api_routes;
use crate::backend::server::state::AppState;

/// Create the Axum router with all routes configured
///
/// # Arguments
///
/// * `app_state` - Application state
/// * `frontend_url` - Allowed CORS origin, `None` for any
pub fn create_router(app_state: AppState, frontend_url: Option<&str>) -> Router<()> {
    let router = Router::new()
        .route("/ws", get(ws_upgrade))
        .route("/health", get(health));

    let router = configure_api_routes(router);

    let router = router.fallback(|| async {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"error": "Not Found", "status": 404})),
        )
    });

    router
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(frontend_url)),
        )
        .with_state(app_state)
}

fn cors_layer(frontend_url: Option<&str>) -> CorsLayer {
    let origin = match frontend_url.map(HeaderValue::from_str) {
        Some(Ok(origin)) => AllowOrigin::exact(origin),
        Some(Err(_)) => {
            tracing::warn!("[Startup] FRONTEND_URL is not a valid origin, allowing any origin");
            AllowOrigin::from(Any)
        }
        None => AllowOrigin::from(Any),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}
