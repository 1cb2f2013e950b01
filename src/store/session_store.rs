// src/store/session_store.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use sqlx::SqlitePool;
use tokio::sync::RwLock;

use crate::{error::AppError, models::test_session::TestSession};

/// Per-user holder for the in-progress test.
///
/// Both implementations drop entries idle for longer than the configured TTL.
/// Writes for the same user are not serialized: two concurrent submissions can
/// both read the same cursor and the later write wins.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn load(&self, user_id: i64) -> Result<Option<TestSession>, AppError>;

    /// Replaces whatever is stored for `session.user_id`.
    async fn save(&self, session: &TestSession) -> Result<(), AppError>;

    async fn clear(&self, user_id: i64) -> Result<(), AppError>;
}

fn is_expired(updated_at: DateTime<Utc>, ttl: Option<Duration>, now: DateTime<Utc>) -> bool {
    ttl.is_some_and(|ttl| now - updated_at > ttl)
}

/// Process-local store. Everything is lost on restart.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    sessions: RwLock<HashMap<i64, (TestSession, DateTime<Utc>)>>,
    ttl: Option<Duration>,
}

impl MemorySessionStore {
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            ttl,
        }
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    async fn load(&self, user_id: i64) -> Result<Option<TestSession>, AppError> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        if let Some((session, updated_at)) = sessions.get(&user_id) {
            if !is_expired(*updated_at, self.ttl, now) {
                return Ok(Some(session.clone()));
            }
            tracing::debug!("Session of user {} expired", user_id);
            sessions.remove(&user_id);
        }
        Ok(None)
    }

    async fn save(&self, session: &TestSession) -> Result<(), AppError> {
        self.sessions
            .write()
            .await
            .insert(session.user_id, (session.clone(), Utc::now()));
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> Result<(), AppError> {
        self.sessions.write().await.remove(&user_id);
        Ok(())
    }
}

/// Stores sessions as JSON in the `test_sessions` table so they outlive the process.
#[derive(Debug, Clone)]
pub struct SqlSessionStore {
    pool: SqlitePool,
    ttl: Option<Duration>,
}

impl SqlSessionStore {
    pub fn new(pool: SqlitePool, ttl: Option<Duration>) -> Self {
        Self { pool, ttl }
    }
}

#[derive(sqlx::FromRow)]
struct SessionRow {
    payload: String,
    updated_at: DateTime<Utc>,
}

#[async_trait]
impl SessionStore for SqlSessionStore {
    async fn load(&self, user_id: i64) -> Result<Option<TestSession>, AppError> {
        let row = sqlx::query_as::<_, SessionRow>(
            "SELECT payload, updated_at FROM test_sessions WHERE user_id = ?",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        if is_expired(row.updated_at, self.ttl, Utc::now()) {
            tracing::debug!("Session of user {} expired", user_id);
            self.clear(user_id).await?;
            return Ok(None);
        }

        match serde_json::from_str::<TestSession>(&row.payload) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!("Discarding unreadable session of user {}: {}", user_id, e);
                self.clear(user_id).await?;
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &TestSession) -> Result<(), AppError> {
        let payload = serde_json::to_string(session)
            .map_err(|e| AppError::InternalServerError(e.to_string()))?;

        sqlx::query(
            r#"
            INSERT INTO test_sessions (user_id, payload, updated_at)
            VALUES (?, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                payload = excluded.payload,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(session.user_id)
        .bind(payload)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save session of user {}: {:?}", session.user_id, e);
            AppError::from(e)
        })?;
        Ok(())
    }

    async fn clear(&self, user_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM test_sessions WHERE user_id = ?")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
