//! Friend graph
//!
//! Directed edges between users with a pending/accepted status, stored in
//! the same SQLite database as the user directory. A pending edge A→B is a
//! request from A awaiting B; acceptance flips it and mirrors an accepted
//! edge B→A, so an established friendship is two accepted rows.

use anyhow::Result;
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::info;

use crate::users::UserSummary;

/// Result of a friend request. The latter two are no-ops, not errors; the
/// caller decides whether to surface them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Requested,
    AlreadyLinked,
    SelfReference,
}

/// Result of an accept. Accepting without a matching pending request is a
/// no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Accepted,
    NoPendingRequest,
}

pub struct FriendStore {
    pool: SqlitePool,
}

impl FriendStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a pending edge from `from_id` to `to_id`.
    ///
    /// The existence check and the insert are one statement, so two racing
    /// requests for the same pair cannot both succeed.
    pub async fn request_friend(&self, from_id: i64, to_id: i64) -> Result<RequestOutcome> {
        if from_id == to_id {
            return Ok(RequestOutcome::SelfReference);
        }

        let result = sqlx::query(
            r#"
            INSERT INTO friend_edges (requester_id, recipient_id, status, created_at)
            SELECT ?1, ?2, 'pending', ?3
            WHERE NOT EXISTS (
                SELECT 1 FROM friend_edges
                WHERE (requester_id = ?1 AND recipient_id = ?2)
                   OR (requester_id = ?2 AND recipient_id = ?1)
            )
            "#,
        )
        .bind(from_id)
        .bind(to_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(RequestOutcome::AlreadyLinked);
        }

        info!("[Friends] Request sent: {} -> {}", from_id, to_id);
        Ok(RequestOutcome::Requested)
    }

    /// Accept a pending request from `friend_id`.
    ///
    /// Flips the pending edge friend→user and upserts the reciprocal
    /// accepted edge user→friend in one transaction, keeping the friendship
    /// symmetric.
    pub async fn accept_friend(&self, user_id: i64, friend_id: i64) -> Result<AcceptOutcome> {
        let mut tx = self.pool.begin().await?;

        let flipped = sqlx::query(
            r#"
            UPDATE friend_edges SET status = 'accepted'
            WHERE requester_id = ? AND recipient_id = ? AND status = 'pending'
            "#,
        )
        .bind(friend_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

        if flipped.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(AcceptOutcome::NoPendingRequest);
        }

        sqlx::query(
            r#"
            INSERT INTO friend_edges (requester_id, recipient_id, status, created_at)
            VALUES (?, ?, 'accepted', ?)
            ON CONFLICT(requester_id, recipient_id) DO UPDATE SET status = 'accepted'
            "#,
        )
        .bind(user_id)
        .bind(friend_id)
        .bind(Utc::now().to_rfc3339())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!("[Friends] Request accepted: {} <-> {}", user_id, friend_id);
        Ok(AcceptOutcome::Accepted)
    }

    /// Users with an accepted edge to or from `user_id`, deduplicated.
    pub async fn list_friends(&self, user_id: i64) -> Result<Vec<UserSummary>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT DISTINCT u.id, u.name
            FROM users u
            JOIN friend_edges e
              ON (e.requester_id = ?1 AND e.recipient_id = u.id)
              OR (e.recipient_id = ?1 AND e.requester_id = u.id)
            WHERE e.status = 'accepted'
            ORDER BY u.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| UserSummary { id, name })
            .collect())
    }

    /// Users who sent `user_id` a still-pending request, newest first.
    pub async fn list_pending_requests(&self, user_id: i64) -> Result<Vec<UserSummary>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT u.id, u.name
            FROM users u
            JOIN friend_edges e ON e.requester_id = u.id
            WHERE e.recipient_id = ? AND e.status = 'pending'
            ORDER BY e.created_at DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| UserSummary { id, name })
            .collect())
    }

    /// Users with no edge to or from `user_id`, excluding the user itself.
    pub async fn list_suggestions(&self, user_id: i64) -> Result<Vec<UserSummary>> {
        let rows: Vec<(i64, String)> = sqlx::query_as(
            r#"
            SELECT u.id, u.name
            FROM users u
            WHERE u.id != ?1
              AND NOT EXISTS (
                SELECT 1 FROM friend_edges e
                WHERE (e.requester_id = ?1 AND e.recipient_id = u.id)
                   OR (e.recipient_id = ?1 AND e.requester_id = u.id)
              )
            ORDER BY u.name
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| UserSummary { id, name })
            .collect())
    }
}
