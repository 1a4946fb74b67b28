//! Refresh token records.
//!
//! Every issuance inserts a new row; rows are never updated. The row with the
//! highest id for a user is that user's live refresh token. Access tokens are
//! stateless and never stored.

use sqlx::sqlite::SqlitePool;

/// A persisted refresh token issuance.
#[derive(Debug, Clone)]
pub struct RefreshRecord {
    pub id: i64,
    pub user_id: i64,
    pub token: String,
    pub issued_at: i64,
    pub expires_at: i64,
    pub created_at: String,
}

#[derive(sqlx::FromRow)]
struct RefreshRecordRow {
    id: i64,
    user_id: i64,
    token: String,
    issued_at: i64,
    expires_at: i64,
    created_at: String,
}

impl From<RefreshRecordRow> for RefreshRecord {
    fn from(row: RefreshRecordRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            token: row.token,
            issued_at: row.issued_at,
            expires_at: row.expires_at,
            created_at: row.created_at,
        }
    }
}

/// Store for refresh token records.
#[derive(Clone)]
pub struct RefreshTokenStore {
    pool: SqlitePool,
}

impl RefreshTokenStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a new refresh token record. Returns the record ID.
    pub async fn create(
        &self,
        user_id: i64,
        token: &str,
        issued_at: u64,
        expires_at: u64,
    ) -> Result<i64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO refresh_tokens (user_id, token, issued_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(user_id)
        .bind(token)
        .bind(issued_at as i64)
        .bind(expires_at as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Get the most recently created record for a user.
    pub async fn latest_for_user(&self, user_id: i64) -> Result<Option<RefreshRecord>, sqlx::Error> {
        let row: Option<RefreshRecordRow> = sqlx::query_as(
            "SELECT id, user_id, token, issued_at, expires_at, created_at FROM refresh_tokens WHERE user_id = ? ORDER BY id DESC LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RefreshRecord::from))
    }

    /// Get the most recently created record for a username.
    pub async fn latest_for_username(
        &self,
        username: &str,
    ) -> Result<Option<RefreshRecord>, sqlx::Error> {
        let row: Option<RefreshRecordRow> = sqlx::query_as(
            "SELECT t.id, t.user_id, t.token, t.issued_at, t.expires_at, t.created_at
             FROM refresh_tokens t JOIN users u ON u.id = t.user_id
             WHERE u.username = ? ORDER BY t.id DESC LIMIT 1",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(RefreshRecord::from))
    }

    /// Count all records (live or superseded) for a user.
    pub async fn count_for_user(&self, user_id: i64) -> Result<i64, sqlx::Error> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM refresh_tokens WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    /// Delete records whose token has expired as of `now` (Unix seconds).
    pub async fn delete_expired(&self, now: u64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM refresh_tokens WHERE expires_at <= ?")
            .bind(now as i64)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
