//! Per-request credential check and access token renewal.
//!
//! 1. Allow-listed path: pass through untouched.
//! 2. No access token: reject.
//! 3. Access token valid: authenticated as its subject.
//! 4. Access token expired: renew from the `Refresh-Token` header. The refresh
//!    token must verify on its own, name the same user, and be that user's
//!    live refresh record. The new access token goes on the response.
//! 5. Anything else: reject.

use axum::http::HeaderMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::errors::AuthErrorKind;
use super::headers::{access_token, refresh_token};
use super::paths::PublicPaths;
use crate::db::Database;
use crate::jwt::{Claims, Decoded, TokenCodec, TokenType};

/// Outcome of authenticating one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthResult {
    /// Path is public; no credentials were examined.
    Allowed,
    /// Valid access token for this username.
    Authenticated(String),
    /// Access token had expired; this newly minted access token is returned
    /// on the response and carries the caller's identity.
    Renewed(String),
    /// Request must not reach business logic.
    Rejected(AuthErrorKind),
}

impl AuthResult {
    /// Username for this request. For a renewal it is read back from the new token.
    pub fn identity(&self, jwt: &TokenCodec) -> Option<String> {
        match self {
            AuthResult::Authenticated(username) => Some(username.clone()),
            AuthResult::Renewed(token) => jwt.parse_identity(token).ok(),
            AuthResult::Allowed | AuthResult::Rejected(_) => None,
        }
    }
}

/// Authenticates requests against the token codec and the refresh token store.
#[derive(Clone)]
pub struct SessionAuthenticator {
    jwt: Arc<TokenCodec>,
    db: Database,
    public_paths: Arc<PublicPaths>,
}

impl SessionAuthenticator {
    pub fn new(jwt: Arc<TokenCodec>, db: Database, public_paths: PublicPaths) -> Self {
        Self {
            jwt,
            db,
            public_paths: Arc::new(public_paths),
        }
    }

    pub fn jwt(&self) -> &TokenCodec {
        &self.jwt
    }

    /// Authenticate a request for `path` carrying `headers`.
    pub async fn authenticate(&self, path: &str, headers: &HeaderMap) -> AuthResult {
        if self.public_paths.matches(path) {
            return AuthResult::Allowed;
        }

        let Some(token) = access_token(headers) else {
            debug!(path = %path, "Rejected request without access token");
            return AuthResult::Rejected(AuthErrorKind::CredentialMissing);
        };

        match self.jwt.decode(token, TokenType::Access) {
            Decoded::Valid(claims) => AuthResult::Authenticated(claims.sub),
            Decoded::Expired(claims) => match self.renew(&claims, headers).await {
                Ok(new_token) => AuthResult::Renewed(new_token),
                Err(kind) => AuthResult::Rejected(kind),
            },
            Decoded::Invalid => {
                debug!(path = %path, "Rejected request with invalid access token");
                AuthResult::Rejected(AuthErrorKind::MalformedToken)
            }
        }
    }

    /// Exchange the request's refresh token for a new access token.
    /// Nothing is minted until the refresh token has been fully checked.
    async fn renew(&self, expired: &Claims, headers: &HeaderMap) -> Result<String, AuthErrorKind> {
        let refresh = refresh_token(headers).ok_or_else(|| {
            debug!(username = %expired.sub, "Access token expired without refresh token");
            AuthErrorKind::RefreshMissing
        })?;

        let claims = match self.jwt.decode(refresh, TokenType::Refresh) {
            Decoded::Valid(claims) => claims,
            Decoded::Expired(_) | Decoded::Invalid => {
                debug!(username = %expired.sub, "Refresh token did not verify");
                return Err(AuthErrorKind::RefreshInvalid);
            }
        };

        if claims.sub != expired.sub {
            warn!(
                access_user = %expired.sub,
                refresh_user = %claims.sub,
                "Refresh token belongs to a different user"
            );
            return Err(AuthErrorKind::RefreshInvalid);
        }

        let live = self
            .db
            .refresh_tokens()
            .latest_for_username(&claims.sub)
            .await
            .map_err(|e| {
                error!("Failed to look up refresh token: {}", e);
                AuthErrorKind::Internal
            })?;

        if live.as_ref().map(|record| record.token.as_str()) != Some(refresh) {
            debug!(username = %claims.sub, "Refresh token is not the live record");
            return Err(AuthErrorKind::RefreshInvalid);
        }

        let issued = self.jwt.issue_access(&claims.sub).map_err(|e| {
            error!("Failed to generate access token: {}", e);
            AuthErrorKind::Internal
        })?;

        debug!(username = %claims.sub, "Renewed access token");
        Ok(issued.token)
    }
}
