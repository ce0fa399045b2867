use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::models::message::Message;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("archive operation timed out after {0:?}")]
    Timeout(Duration),
}

/// Durable message archive: append plus ordered range-read for a user pair.
///
/// The archive is the sole source of truth for conversation history. A
/// message must land here before any live delivery is attempted.
#[async_trait]
pub trait MessageArchive: Send + Sync {
    async fn append(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Message, ArchiveError>;

    /// All messages exchanged between `a` and `b`, oldest first. Full
    /// snapshot per call; no pagination.
    async fn list_conversation(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, ArchiveError>;
}

/// Postgres-backed archive.
///
/// Every operation is bounded by `op_timeout`; a slow or unreachable
/// database surfaces as `ArchiveError::Timeout` instead of suspending the
/// caller indefinitely.
#[derive(Clone)]
pub struct PgMessageArchive {
    db: Pool<Postgres>,
    op_timeout: Duration,
}

impl PgMessageArchive {
    pub fn new(db: Pool<Postgres>, op_timeout: Duration) -> Self {
        Self { db, op_timeout }
    }

    async fn bounded<T, F>(&self, fut: F) -> Result<T, ArchiveError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        match tokio::time::timeout(self.op_timeout, fut).await {
            Ok(result) => result.map_err(ArchiveError::from),
            Err(_) => Err(ArchiveError::Timeout(self.op_timeout)),
        }
    }
}

#[async_trait]
impl MessageArchive for PgMessageArchive {
    async fn append(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Message, ArchiveError> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            body: body.to_string(),
            created_at,
        };

        self.bounded(
            sqlx::query(
                "INSERT INTO messages (id, sender_id, recipient_id, body, created_at) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(message.id)
            .bind(message.sender_id)
            .bind(message.recipient_id)
            .bind(&message.body)
            .bind(message.created_at)
            .execute(&self.db),
        )
        .await?;

        Ok(message)
    }

    async fn list_conversation(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, ArchiveError> {
        let rows = self
            .bounded(
                sqlx::query(
                    "SELECT id, sender_id, recipient_id, body, created_at FROM messages \
                     WHERE (sender_id = $1 AND recipient_id = $2) \
                        OR (sender_id = $2 AND recipient_id = $1) \
                     ORDER BY created_at ASC",
                )
                .bind(a)
                .bind(b)
                .fetch_all(&self.db),
            )
            .await?;

        Ok(rows
            .into_iter()
            .map(|row| Message {
                id: row.get("id"),
                sender_id: row.get("sender_id"),
                recipient_id: row.get("recipient_id"),
                body: row.get("body"),
                created_at: row.get("created_at"),
            })
            .collect())
    }
}

/// In-memory archive backing the test suite: same contract, no external
/// store, insertion order is creation order.
#[derive(Default)]
pub struct InMemoryMessageArchive {
    entries: Mutex<Vec<Message>>,
}

impl InMemoryMessageArchive {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}

#[async_trait]
impl MessageArchive for InMemoryMessageArchive {
    async fn append(
        &self,
        sender_id: Uuid,
        recipient_id: Uuid,
        body: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Message, ArchiveError> {
        let message = Message {
            id: Uuid::new_v4(),
            sender_id,
            recipient_id,
            body: body.to_string(),
            created_at,
        };
        self.entries.lock().await.push(message.clone());
        Ok(message)
    }

    async fn list_conversation(&self, a: Uuid, b: Uuid) -> Result<Vec<Message>, ArchiveError> {
        let guard = self.entries.lock().await;
        Ok(guard
            .iter()
            .filter(|m| {
                (m.sender_id == a && m.recipient_id == b)
                    || (m.sender_id == b && m.recipient_id == a)
            })
            .cloned()
            .collect())
    }
}
