//! Review record store adapter
//!
//! Writes are keyed by ticket ID. Ticket IDs are freshly generated, so every
//! put is an insert; replaying a put for the same ticket after a transient
//! failure is a no-op and never overwrites the first write.
//!
//! The store also tracks tickets whose notification dispatch failed
//! (`PARTIAL` outcomes) so they can be redispatched later.

use crate::error::PipelineError;
use async_trait::async_trait;
use revu_common::db::reviews;
use revu_common::{ReviewRecord, TicketId};
use sqlx::SqlitePool;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Key-value store for review records
#[async_trait]
pub trait ReviewStore: Send + Sync {
    /// Backend identifier for logs
    fn backend_name(&self) -> &'static str;

    /// Insert a record; a repeated put of an existing ticket succeeds without writing
    async fn put(&self, record: &ReviewRecord) -> Result<(), PipelineError>;

    /// Look up a record by ticket ID
    async fn get(&self, ticket_id: &TicketId) -> Result<Option<ReviewRecord>, PipelineError>;

    /// Remember that a stored record still needs its notification
    async fn flag_pending_dispatch(
        &self,
        ticket_id: &TicketId,
        last_error: &str,
    ) -> Result<(), PipelineError>;

    /// Tickets awaiting redispatch, oldest first
    async fn pending_dispatches(&self) -> Result<Vec<TicketId>, PipelineError>;

    /// Forget a pending redispatch
    async fn clear_pending_dispatch(&self, ticket_id: &TicketId) -> Result<(), PipelineError>;
}

/// Undecodable rows are permanent; everything else is treated as an outage
fn unavailable(err: revu_common::Error) -> PipelineError {
    match err {
        revu_common::Error::CorruptRecord { .. } => PipelineError::CorruptRecord(err.to_string()),
        other => PipelineError::StoreUnavailable(other.to_string()),
    }
}

/// SQLite-backed store
#[derive(Clone)]
pub struct SqliteReviewStore {
    pool: SqlitePool,
}

impl SqliteReviewStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl ReviewStore for SqliteReviewStore {
    fn backend_name(&self) -> &'static str {
        "sqlite"
    }

    async fn put(&self, record: &ReviewRecord) -> Result<(), PipelineError> {
        let inserted = reviews::insert_review(&self.pool, record)
            .await
            .map_err(unavailable)?;

        if !inserted {
            tracing::debug!(ticket_id = %record.ticket_id, "Record already stored, put is a no-op");
        }
        Ok(())
    }

    async fn get(&self, ticket_id: &TicketId) -> Result<Option<ReviewRecord>, PipelineError> {
        reviews::get_review(&self.pool, ticket_id)
            .await
            .map_err(unavailable)
    }

    async fn flag_pending_dispatch(
        &self,
        ticket_id: &TicketId,
        last_error: &str,
    ) -> Result<(), PipelineError> {
        reviews::flag_pending_dispatch(&self.pool, ticket_id, last_error)
            .await
            .map_err(unavailable)
    }

    async fn pending_dispatches(&self) -> Result<Vec<TicketId>, PipelineError> {
        reviews::list_pending_dispatches(&self.pool)
            .await
            .map_err(unavailable)
    }

    async fn clear_pending_dispatch(&self, ticket_id: &TicketId) -> Result<(), PipelineError> {
        reviews::clear_pending_dispatch(&self.pool, ticket_id)
            .await
            .map_err(unavailable)
    }
}

/// Process-local store, for tests and throwaway runs
#[derive(Default)]
pub struct InMemoryReviewStore {
    records: RwLock<HashMap<TicketId, ReviewRecord>>,
    pending: RwLock<Vec<TicketId>>,
}

impl InMemoryReviewStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

#[async_trait]
impl ReviewStore for InMemoryReviewStore {
    fn backend_name(&self) -> &'static str {
        "memory"
    }

    async fn put(&self, record: &ReviewRecord) -> Result<(), PipelineError> {
        self.records
            .write()
            .await
            .entry(record.ticket_id)
            .or_insert_with(|| record.clone());
        Ok(())
    }

    async fn get(&self, ticket_id: &TicketId) -> Result<Option<ReviewRecord>, PipelineError> {
        Ok(self.records.read().await.get(ticket_id).cloned())
    }

    async fn flag_pending_dispatch(
        &self,
        ticket_id: &TicketId,
        _last_error: &str,
    ) -> Result<(), PipelineError> {
        let mut pending = self.pending.write().await;
        if !pending.contains(ticket_id) {
            pending.push(*ticket_id);
        }
        Ok(())
    }

    async fn pending_dispatches(&self) -> Result<Vec<TicketId>, PipelineError> {
        Ok(self.pending.read().await.clone())
    }

    async fn clear_pending_dispatch(&self, ticket_id: &TicketId) -> Result<(), PipelineError> {
        self.pending.write().await.retain(|id| id != ticket_id);
        Ok(())
    }
}
