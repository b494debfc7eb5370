//! Middleware Module
//!
//! Request processing shared by several routes.
//!
//! - **`auth`** - Bearer token parsing and the `AuthUser` extractor

pub mod auth;

pub use auth::{bearer_token, AuthUser, AuthenticatedUser};
