//! Direct messages
//!
//! Messages between user pairs, immutable once written. The conversation is
//! identified by the unordered pair; ordering is by server-assigned
//! timestamp, tie-broken by insertion order.

use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

/// Stored direct message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DirectMessage {
    pub id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub body: String,
    pub sent_at: DateTime<Utc>,
}

pub struct MessageStore {
    pool: SqlitePool,
}

impl MessageStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a message with a server-assigned timestamp.
    pub async fn append(&self, sender_id: i64, receiver_id: i64, body: &str) -> Result<DirectMessage> {
        let sent_at = Utc::now();

        let result = sqlx::query(
            "INSERT INTO messages (sender_id, receiver_id, body, sent_at) VALUES (?, ?, ?, ?)",
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(body)
        .bind(sent_at.to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(DirectMessage {
            id: result.last_insert_rowid(),
            sender_id,
            receiver_id,
            body: body.to_string(),
            sent_at,
        })
    }

    /// All messages for the unordered pair `(a, b)`, oldest first.
    ///
    /// Symmetric in its arguments: `conversation(a, b)` and
    /// `conversation(b, a)` return the same rows.
    pub async fn conversation(&self, a: i64, b: i64) -> Result<Vec<DirectMessage>> {
        let rows: Vec<(i64, i64, i64, String, String)> = sqlx::query_as(
            r#"
            SELECT id, sender_id, receiver_id, body, sent_at
            FROM messages
            WHERE (sender_id = ?1 AND receiver_id = ?2)
               OR (sender_id = ?2 AND receiver_id = ?1)
            ORDER BY sent_at ASC, id ASC
            "#,
        )
        .bind(a)
        .bind(b)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, sender_id, receiver_id, body, sent_at)| DirectMessage {
                id,
                sender_id,
                receiver_id,
                body,
                sent_at: sent_at.parse().unwrap_or_else(|_| Utc::now()),
            })
            .collect())
    }
}
