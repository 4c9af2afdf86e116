//! Session validation
//!
//! Signup and login live in the auth subsystem. This service only resolves
//! an opaque session token to a user id: once per HTTP request, and once
//! per websocket connection at upgrade time. Tokens can be issued here for
//! the collaborator and for tests.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

/// Session token bound to a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
}

pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Issue a new token for a user. `ttl = None` means no expiry.
    pub async fn issue(&self, user_id: i64, ttl: Option<Duration>) -> Result<Session> {
        let created_at = Utc::now();
        let session = Session {
            token: Uuid::new_v4().to_string(),
            user_id,
            created_at,
            expires_at: ttl.map(|ttl| created_at + ttl),
        };

        sqlx::query(
            "INSERT INTO sessions (token, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&session.token)
        .bind(session.user_id)
        .bind(session.created_at.to_rfc3339())
        .bind(session.expires_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await?;

        info!("[Sessions] Issued token for user {}", user_id);
        Ok(session)
    }

    /// Resolve a token to its user id, if the session exists and has not
    /// expired.
    pub async fn validate(&self, token: &str) -> Result<Option<i64>> {
        let row: Option<(i64, Option<String>)> =
            sqlx::query_as("SELECT user_id, expires_at FROM sessions WHERE token = ?")
                .bind(token)
                .fetch_optional(&self.pool)
                .await?;

        let Some((user_id, expires_at)) = row else {
            return Ok(None);
        };

        if let Some(expires_at) = expires_at {
            let expires: DateTime<Utc> = expires_at
                .parse()
                .map_err(|_| anyhow::anyhow!("Invalid session expiry"))?;
            if expires <= Utc::now() {
                return Ok(None);
            }
        }

        Ok(Some(user_id))
    }

    /// Drop a session.
    pub async fn revoke(&self, token: &str) -> Result<()> {
        sqlx::query("DELETE FROM sessions WHERE token = ?")
            .bind(token)
            .execute(&self.pool)
            .await?;

        info!("[Sessions] Session invalidated");
        Ok(())
    }
}
