//! JWT token generation and validation.
//!
//! Signature checks are delegated to `jsonwebtoken`; expiry is checked here
//! against an injected [`Clock`] so an expired token can still be read back
//! for its identity.

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::clock::{Clock, SystemClock};

/// Token type for distinguishing access vs refresh tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived access token - stateless, never stored
    Access,
    /// Long-lived refresh token - stored as the user's refresh record
    Refresh,
}

/// JWT claims shared by both token types.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Token type
    #[serde(rename = "typ")]
    pub token_type: TokenType,
    /// Issued at (Unix timestamp)
    pub iat: u64,
    /// Expiration time (Unix timestamp)
    pub exp: u64,
    /// JWT ID, set on refresh tokens so two issued in the same second differ
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,
}

/// Access token duration: 5 minutes
pub const ACCESS_TOKEN_DURATION_SECS: u64 = 5 * 60;

/// Refresh token duration: 2 weeks
pub const REFRESH_TOKEN_DURATION_SECS: u64 = 14 * 24 * 60 * 60;

/// Lifetimes applied when issuing tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenLifetimes {
    pub access_secs: u64,
    pub refresh_secs: u64,
}

impl Default for TokenLifetimes {
    fn default() -> Self {
        Self {
            access_secs: ACCESS_TOKEN_DURATION_SECS,
            refresh_secs: REFRESH_TOKEN_DURATION_SECS,
        }
    }
}

/// A freshly signed token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    /// The JWT token string
    pub token: String,
    /// Issued at timestamp (Unix seconds)
    pub issued_at: u64,
    /// Expiration timestamp (Unix seconds)
    pub expires_at: u64,
}

/// Outcome of decoding a token for a given expected type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Signature verifies, type matches and the token has not expired.
    Valid(Claims),
    /// Signature verifies and type matches, but `exp` has passed.
    Expired(Claims),
    /// Bad signature, unparsable structure or wrong token type.
    Invalid,
}

/// Signs and verifies access and refresh tokens with one shared secret.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetimes: TokenLifetimes,
    clock: Arc<dyn Clock>,
}

impl TokenCodec {
    /// Create a codec with the given secret, default lifetimes and the wall clock.
    pub fn new(secret: &[u8]) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetimes: TokenLifetimes::default(),
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_lifetimes(mut self, lifetimes: TokenLifetimes) -> Self {
        self.lifetimes = lifetimes;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn lifetimes(&self) -> TokenLifetimes {
        self.lifetimes
    }

    /// Issue a short-lived access token for `username`.
    pub fn issue_access(&self, username: &str) -> Result<IssuedToken, JwtError> {
        self.issue(username, TokenType::Access)
    }

    /// Issue a long-lived refresh token for `username`.
    pub fn issue_refresh(&self, username: &str) -> Result<IssuedToken, JwtError> {
        self.issue(username, TokenType::Refresh)
    }

    fn issue(&self, username: &str, token_type: TokenType) -> Result<IssuedToken, JwtError> {
        let now = self.clock.now();
        let (duration, jti) = match token_type {
            TokenType::Access => (self.lifetimes.access_secs, None),
            TokenType::Refresh => (
                self.lifetimes.refresh_secs,
                Some(uuid::Uuid::new_v4().to_string()),
            ),
        };
        let exp = now + duration;

        let claims = Claims {
            sub: username.to_string(),
            token_type,
            iat: now,
            exp,
            jti,
        };

        let token = jsonwebtoken::encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(JwtError::Encoding)?;

        Ok(IssuedToken {
            token,
            issued_at: now,
            expires_at: exp,
        })
    }

    /// Verify the signature and structure only; expiry is left to the caller.
    fn verify_signature(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.leeway = 0;

        let token_data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(JwtError::Malformed)?;

        Ok(token_data.claims)
    }

    fn is_live(&self, claims: &Claims) -> bool {
        self.clock.now() < claims.exp
    }

    /// Decode a token that must be of type `expected`.
    pub fn decode(&self, token: &str, expected: TokenType) -> Decoded {
        match self.verify_signature(token) {
            Ok(claims) if claims.token_type != expected => Decoded::Invalid,
            Ok(claims) if self.is_live(&claims) => Decoded::Valid(claims),
            Ok(claims) => Decoded::Expired(claims),
            Err(_) => Decoded::Invalid,
        }
    }

    /// Extract the username from a token of either type, ignoring expiry.
    pub fn parse_identity(&self, token: &str) -> Result<String, JwtError> {
        self.verify_signature(token).map(|claims| claims.sub)
    }

    /// True iff the signature verifies and the token has not expired.
    /// A well-formed expired token yields `Ok(false)`.
    pub fn validate(&self, token: &str) -> Result<bool, JwtError> {
        let claims = self.verify_signature(token)?;
        Ok(self.is_live(&claims))
    }
}

/// Errors that can occur during JWT operations.
#[derive(Debug)]
pub enum JwtError {
    /// Error encoding the token
    Encoding(jsonwebtoken::errors::Error),
    /// Signature or structure did not verify
    Malformed(jsonwebtoken::errors::Error),
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::Encoding(e) => write!(f, "Failed to encode token: {}", e),
            JwtError::Malformed(e) => write!(f, "Malformed token: {}", e),
        }
    }
}

impl std::error::Error for JwtError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    fn codec_at(clock: &ManualClock) -> TokenCodec {
        TokenCodec::new(b"test-secret-key-for-testing").with_clock(Arc::new(clock.clone()))
    }

    #[test]
    fn test_access_token_valid_until_expiry() {
        let clock = ManualClock::new(1_700_000_000);
        let codec = codec_at(&clock);

        let issued = codec.issue_access("alice").unwrap();
        assert_eq!(issued.expires_at - issued.issued_at, ACCESS_TOKEN_DURATION_SECS);
        assert!(codec.validate(&issued.token).unwrap());

        clock.advance(ACCESS_TOKEN_DURATION_SECS - 1);
        assert!(codec.validate(&issued.token).unwrap());

        clock.advance(1);
        assert!(!codec.validate(&issued.token).unwrap());
    }

    #[test]
    fn test_parse_identity_ignores_expiry() {
        let clock = ManualClock::new(1_700_000_000);
        let codec = codec_at(&clock);

        let issued = codec.issue_access("alice").unwrap();
        clock.advance(ACCESS_TOKEN_DURATION_SECS * 10);

        assert!(!codec.validate(&issued.token).unwrap());
        assert_eq!(codec.parse_identity(&issued.token).unwrap(), "alice");
    }

    #[test]
    fn test_decode_states() {
        let clock = ManualClock::new(1_700_000_000);
        let codec = codec_at(&clock);
        let issued = codec.issue_access("bob").unwrap();

        match codec.decode(&issued.token, TokenType::Access) {
            Decoded::Valid(claims) => assert_eq!(claims.sub, "bob"),
            other => panic!("expected valid, got {:?}", other),
        }

        clock.advance(ACCESS_TOKEN_DURATION_SECS);
        match codec.decode(&issued.token, TokenType::Access) {
            Decoded::Expired(claims) => assert_eq!(claims.sub, "bob"),
            other => panic!("expected expired, got {:?}", other),
        }

        assert_eq!(codec.decode("not.a.jwt", TokenType::Access), Decoded::Invalid);
    }

    #[test]
    fn test_wrong_token_type_is_invalid() {
        let codec = TokenCodec::new(b"test-secret-key-for-testing");

        let access = codec.issue_access("alice").unwrap();
        let refresh = codec.issue_refresh("alice").unwrap();

        assert_eq!(codec.decode(&access.token, TokenType::Refresh), Decoded::Invalid);
        assert_eq!(codec.decode(&refresh.token, TokenType::Access), Decoded::Invalid);
        assert!(matches!(
            codec.decode(&refresh.token, TokenType::Refresh),
            Decoded::Valid(_)
        ));
    }

    #[test]
    fn test_refresh_lifetime_and_unique_jti() {
        let codec = TokenCodec::new(b"test-secret-key-for-testing");

        let first = codec.issue_refresh("alice").unwrap();
        let second = codec.issue_refresh("alice").unwrap();

        assert_eq!(first.expires_at - first.issued_at, REFRESH_TOKEN_DURATION_SECS);
        assert_ne!(
            first.token, second.token,
            "Each refresh token should carry a unique jti"
        );
    }

    #[test]
    fn test_custom_lifetimes() {
        let codec = TokenCodec::new(b"secret").with_lifetimes(TokenLifetimes {
            access_secs: 10,
            refresh_secs: 20,
        });

        let access = codec.issue_access("alice").unwrap();
        let refresh = codec.issue_refresh("alice").unwrap();
        assert_eq!(access.expires_at - access.issued_at, 10);
        assert_eq!(refresh.expires_at - refresh.issued_at, 20);
    }

    #[test]
    fn test_invalid_token() {
        let codec = TokenCodec::new(b"test-secret-key-for-testing");

        assert!(matches!(
            codec.validate("invalid-token"),
            Err(JwtError::Malformed(_))
        ));
        assert!(codec.parse_identity("invalid-token").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let codec1 = TokenCodec::new(b"secret-1");
        let codec2 = TokenCodec::new(b"secret-2");

        let issued = codec1.issue_access("alice").unwrap();

        assert!(codec2.validate(&issued.token).is_err());
        assert!(codec2.parse_identity(&issued.token).is_err());
        assert_eq!(codec2.decode(&issued.token, TokenType::Access), Decoded::Invalid);
    }
}
