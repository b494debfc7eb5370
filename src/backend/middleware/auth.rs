/**
 * Authentication Extractor
 *
 * This module provides the `AuthUser` extractor for routes that require a
 * caller identity, and the bearer-token parsing shared with the socket
 * handshake.
 */

use axum::http::{header::AUTHORIZATION, request::Parts, HeaderMap, StatusCode};

use crate::backend::error::BackendError;
use crate::backend::server::state::AppState;

/// Authenticated caller extracted from the access token
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuthenticatedUser {
    pub user_id: String,
}

/// Return the token of an `Authorization: Bearer <token>` header, if any
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Axum extractor for authenticated user
///
/// Rejects with 401 when the header is missing or the token does not verify,
/// and with 503 when the server runs without a token secret.
#[derive(Clone, Debug)]
pub struct AuthUser(pub AuthenticatedUser);

impl axum::extract::FromRequestParts<AppState> for AuthUser {
    type Rejection = BackendError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let verifier = state.tokens.as_ref().ok_or_else(|| {
            tracing::warn!("[Auth] Token verification requested but ACCESS_JWT_SECRET is not set");
            BackendError::handler(
                StatusCode::SERVICE_UNAVAILABLE,
                "token verification is not configured",
            )
        })?;

        let token = bearer_token(&parts.headers).ok_or_else(|| {
            tracing::warn!("[Auth] Missing Authorization header");
            BackendError::auth("missing bearer token")
        })?;

        let user_id = verifier.user_id(token)?;
        Ok(AuthUser(AuthenticatedUser { user_id }))
    }
}
