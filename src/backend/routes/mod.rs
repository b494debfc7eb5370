//! Route Configuration Module
//!
//! This module configures all HTTP routes for the relay server.
//!
//! - **`router`** - Main router creation, layers and fallback
//! - **`api_routes`** - Presence and bridge push endpoints
//!
//! # Module Structure
//!
//! ```text
//! routes/
//! ├── mod.rs          - Module exports and documentation
//! ├── router.rs       - Main router creation
//! └── api_routes.rs   - API endpoints
//! ```
//!
//! # Routes
//!
//! - `GET /ws` - WebSocket upgrade
//! - `GET /health` - Liveness and online count
//! - `GET /api/presence`, `GET /api/presence/{user_id}` - Presence queries
//! - `POST /api/relay/notifications`, `POST /api/relay/messages` - Pushes

/// Main router creation
pub mod router;

/// API endpoint configuration
pub mod api_routes;

pub use router::create_router;
