//! User directory
//!
//! Users are owned by the profile subsystem; this service reads them for
//! friend lists and suggestions. `create` exists for the collaborator and
//! for test fixtures, not as a public signup path.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use tracing::info;

/// Public slice of a user record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: i64,
    pub name: String,
}

pub struct UserDirectory {
    pool: SqlitePool,
}

impl UserDirectory {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert a user and return its id.
    pub async fn create(&self, name: &str, email: &str) -> Result<i64> {
        let result = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
            .bind(name)
            .bind(email)
            .execute(&self.pool)
            .await?;

        let id = result.last_insert_rowid();
        info!("[Users] Created: {} ({})", name, id);
        Ok(id)
    }

    /// Every known user except the caller, for contact discovery.
    pub async fn list_except(&self, user_id: i64) -> Result<Vec<UserSummary>> {
        let rows: Vec<(i64, String)> =
            sqlx::query_as("SELECT id, name FROM users WHERE id != ? ORDER BY name")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| UserSummary { id, name })
            .collect())
    }
}
