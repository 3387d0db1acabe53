use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;
use thiserror::Error;
use tokio::sync::RwLock;

use outfitter_core::{SessionId, SessionState};

use crate::DbPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("state codec error: {0}")]
    Codec(String),
}

/// Durable snapshot/resume of [`SessionState`], keyed by session id. This is
/// the only shared resource between runs; writes for one id serialize through
/// the single-row upsert.
#[async_trait]
pub trait CheckpointStore: Send + Sync {
    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionState>, StoreError>;
    async fn save(&self, state: &SessionState) -> Result<(), StoreError>;
    async fn clear(&self, session_id: &SessionId) -> Result<(), StoreError>;
}

pub struct SqlCheckpointStore {
    pool: DbPool,
}

impl SqlCheckpointStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckpointStore for SqlCheckpointStore {
    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        let row = sqlx::query("SELECT state FROM session_checkpoint WHERE session_id = ?")
            .bind(&session_id.0)
            .fetch_optional(&self.pool)
            .await?;

        match row {
            Some(row) => {
                let raw: String = row.try_get("state").map_err(|e| StoreError::Codec(e.to_string()))?;
                let state = serde_json::from_str(&raw)
                    .map_err(|e| StoreError::Codec(format!("invalid checkpoint state: {e}")))?;
                Ok(Some(state))
            }
            None => Ok(None),
        }
    }

    async fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        let raw = serde_json::to_string(state)
            .map_err(|e| StoreError::Codec(format!("unserializable state: {e}")))?;

        sqlx::query(
            "INSERT INTO session_checkpoint (session_id, state, updated_at)
             VALUES (?, ?, ?)
             ON CONFLICT(session_id) DO UPDATE SET
                 state = excluded.state,
                 updated_at = excluded.updated_at",
        )
        .bind(&state.session_id.0)
        .bind(&raw)
        .bind(Utc::now().to_rfc3339())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), StoreError> {
        sqlx::query("DELETE FROM session_checkpoint WHERE session_id = ?")
            .bind(&session_id.0)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryCheckpointStore {
    states: RwLock<HashMap<String, SessionState>>,
}

#[async_trait]
impl CheckpointStore for InMemoryCheckpointStore {
    async fn load(&self, session_id: &SessionId) -> Result<Option<SessionState>, StoreError> {
        let states = self.states.read().await;
        Ok(states.get(&session_id.0).cloned())
    }

    async fn save(&self, state: &SessionState) -> Result<(), StoreError> {
        let mut states = self.states.write().await;
        states.insert(state.session_id.0.clone(), state.clone());
        Ok(())
    }

    async fn clear(&self, session_id: &SessionId) -> Result<(), StoreError> {
        let mut states = self.states.write().await;
        states.remove(&session_id.0);
        Ok(())
    }
}
