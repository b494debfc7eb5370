/**
 * Access Tokens
 *
 * This module verifies the HS256 access tokens issued by the REST layer's
 * login flow. The relay only needs the `userId` claim: it becomes the
 * verified identity of a socket connection or the caller of a bridge route.
 *
 * Token creation lives here too so tests and local tooling can mint tokens
 * signed with the same secret.
 */

use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::backend::error::BackendError;

/// Default lifetime of tokens minted by `create_token`
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// JWT claims structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Identity of the user the token was issued to
    #[serde(rename = "userId")]
    pub user_id: String,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// Issued at time (Unix timestamp)
    pub iat: u64,
}

/// Verifies (and mints) access tokens with a shared secret
#[derive(Clone)]
pub struct TokenVerifier {
    secret: Arc<str>,
}

impl std::fmt::Debug for TokenVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenVerifier").finish_non_exhaustive()
    }
}

impl TokenVerifier {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: Arc::from(secret.into()),
        }
    }

    /// Create a token for `user_id` valid for `ttl`
    pub fn create_token(
        &self,
        user_id: &str,
        ttl: Duration,
    ) -> Result<String, jsonwebtoken::errors::Error> {
        let now = unix_now();
        let claims = Claims {
            user_id: user_id.to_string(),
            exp: now + ttl.as_secs(),
            iat: now,
        };
        let key = EncodingKey::from_secret(self.secret.as_bytes());
        encode(&Header::default(), &claims, &key)
    }

    /// Verify and decode a token
    pub fn verify_token(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());
        let token_data = decode::<Claims>(token, &key, &Validation::default())?;
        Ok(token_data.claims)
    }

    /// Verify a token and return its identity
    pub fn user_id(&self, token: &str) -> Result<String, BackendError> {
        let claims = self.verify_token(token).map_err(|e| {
            tracing::warn!("[Auth] Invalid token: {}", e);
            BackendError::auth("invalid or expired token")
        })?;

        if claims.user_id.trim().is_empty() {
            return Err(BackendError::auth("token carries no user id"));
        }
        Ok(claims.user_id)
    }
}

fn unix_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
