//! Authentication Module
//!
//! The relay does not log anyone in; the REST layer issues access tokens.
//! This module verifies those tokens for the socket handshake and for the
//! bridge routes.
//!
//! # Module Structure
//!
//! ```text
//! auth/
//! ├── mod.rs        - Module exports and documentation
//! ├── sessions.rs   - JWT claims, verification and minting
//! └── handshake.rs  - Socket handshake policy (open or token-required)
//! ```
//!
//! # Security
//!
//! - Tokens are HS256 JWTs signed with `ACCESS_JWT_SECRET`
//! - The `userId` claim is the identity used everywhere in the relay
//! - Expired or tampered tokens are rejected with 401

/// JWT token verification
pub mod sessions;

/// Socket handshake policy
pub mod handshake;

pub use handshake::HandshakePolicy;
pub use sessions::{Claims, TokenVerifier, DEFAULT_TOKEN_TTL};
