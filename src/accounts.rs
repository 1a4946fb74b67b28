//! Signup and login: creates accounts and issues the initial token pair.
//!
//! Login reuses the user's live refresh token while it still validates, so
//! repeated logins do not multiply long-lived credentials. Two concurrent
//! first logins may both insert a refresh record; the newest one wins and the
//! other is orphaned until it expires.

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::db::Database;
use crate::jwt::{JwtError, TokenCodec};
use crate::password::{hash_password, verify_password};

/// Access + refresh pair returned by a successful login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Signup/login over the user and refresh token stores.
#[derive(Clone)]
pub struct Accounts {
    db: Database,
    jwt: Arc<TokenCodec>,
}

impl Accounts {
    pub fn new(db: Database, jwt: Arc<TokenCodec>) -> Self {
        Self { db, jwt }
    }

    /// Create an account. Returns the stored username.
    pub async fn signup(&self, username: &str, password: &str) -> Result<String, AccountError> {
        if self
            .db
            .users()
            .exists(username)
            .await
            .map_err(AccountError::Database)?
        {
            return Err(AccountError::DuplicateIdentity);
        }

        let hash = hash_password(password).map_err(|e| AccountError::Hashing(e.to_string()))?;

        // The unique index still rejects a racing signup that passed the check above.
        self.db
            .users()
            .create(username, &hash)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                    AccountError::DuplicateIdentity
                }
                e => AccountError::Database(e),
            })?;

        info!(username = %username, "User signed up");
        Ok(username.to_string())
    }

    /// Check the password and issue tokens.
    pub async fn login(&self, username: &str, password: &str) -> Result<TokenPair, AccountError> {
        let user = self
            .db
            .users()
            .get_by_username(username)
            .await
            .map_err(AccountError::Database)?
            .ok_or(AccountError::UnknownIdentity)?;

        let matches = verify_password(password, &user.password_hash).map_err(|e| {
            error!(username = %username, "Stored password hash unreadable: {}", e);
            AccountError::Hashing(e.to_string())
        })?;
        if !matches {
            return Err(AccountError::WrongPassword);
        }

        let existing = self
            .db
            .refresh_tokens()
            .latest_for_user(user.id)
            .await
            .map_err(AccountError::Database)?;

        if let Some(record) = existing {
            // Codec errors here mean the stored token is unusable, so fall through to a new one.
            if self.jwt.validate(&record.token).unwrap_or(false) {
                let access = self.jwt.issue_access(&user.username)?;
                debug!(username = %username, "Reusing live refresh token");
                return Ok(TokenPair {
                    access_token: access.token,
                    refresh_token: record.token,
                });
            }
        }

        let access = self.jwt.issue_access(&user.username)?;
        let refresh = self.jwt.issue_refresh(&user.username)?;

        self.db
            .refresh_tokens()
            .create(user.id, &refresh.token, refresh.issued_at, refresh.expires_at)
            .await
            .map_err(AccountError::Database)?;

        info!(username = %username, "Issued new refresh token");
        Ok(TokenPair {
            access_token: access.token,
            refresh_token: refresh.token,
        })
    }
}

/// Errors from signup and login.
#[derive(Debug)]
pub enum AccountError {
    /// Signup for a username that already exists
    DuplicateIdentity,
    /// Login for a username that does not exist
    UnknownIdentity,
    /// Login with a password that does not match
    WrongPassword,
    /// Token signing failed
    Token(JwtError),
    /// Password hashing failed
    Hashing(String),
    /// Store access failed
    Database(sqlx::Error),
}

impl From<JwtError> for AccountError {
    fn from(e: JwtError) -> Self {
        AccountError::Token(e)
    }
}

impl std::fmt::Display for AccountError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AccountError::DuplicateIdentity => write!(f, "Username is already taken"),
            AccountError::UnknownIdentity => write!(f, "User not found"),
            AccountError::WrongPassword => write!(f, "Wrong password"),
            AccountError::Token(e) => write!(f, "{}", e),
            AccountError::Hashing(e) => write!(f, "Password hashing failed: {}", e),
            AccountError::Database(e) => write!(f, "Database error: {}", e),
        }
    }
}

impl std::error::Error for AccountError {}
