/**
 * Socket Handshake Policy
 *
 * Decides whether a WebSocket upgrade request may proceed and which identity,
 * if any, it has proven. With `Open` every upgrade is accepted and the client
 * announces whatever identity it likes. With `RequireToken` the request must
 * carry a bearer token (header or `?token=` query) and later announces are
 * pinned to the token's `userId`.
 */

use axum::http::HeaderMap;

use crate::backend::auth::sessions::TokenVerifier;
use crate::backend::error::BackendError;
use crate::backend::middleware::auth::bearer_token;

#[derive(Debug, Clone)]
pub enum HandshakePolicy {
    /// Accept every connection, identities are self-announced
    Open,
    /// Require a valid access token on the upgrade request
    RequireToken(TokenVerifier),
}

impl HandshakePolicy {
    /// Returns the verified identity, `None` under `Open`
    pub fn authorize(
        &self,
        headers: &HeaderMap,
        query_token: Option<&str>,
    ) -> Result<Option<String>, BackendError> {
        match self {
            HandshakePolicy::Open => Ok(None),
            HandshakePolicy::RequireToken(verifier) => {
                let token = bearer_token(headers)
                    .or(query_token)
                    .ok_or_else(|| BackendError::auth("missing bearer token"))?;
                verifier.user_id(token).map(Some)
            }
        }
    }

    pub fn requires_token(&self) -> bool {
        matches!(self, HandshakePolicy::RequireToken(_))
    }
}
