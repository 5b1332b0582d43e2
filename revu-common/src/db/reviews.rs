//! Review record queries

use crate::models::{ReviewRecord, SentimentLabel, TicketId};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

/// Insert a review record keyed by ticket ID
///
/// Returns `true` when a row was written and `false` when the ticket already
/// existed. An existing row is never overwritten, so replaying the same put
/// leaves exactly one record.
pub async fn insert_review(pool: &SqlitePool, record: &ReviewRecord) -> Result<bool> {
    let result = sqlx::query(
        r#"
        INSERT INTO review_records (ticket_id, text, sentiment, created_at)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(ticket_id) DO NOTHING
        "#,
    )
    .bind(record.ticket_id.to_string())
    .bind(&record.text)
    .bind(record.sentiment.as_str())
    .bind(record.created_at)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Load a review record by ticket ID
pub async fn get_review(pool: &SqlitePool, ticket_id: &TicketId) -> Result<Option<ReviewRecord>> {
    let row = sqlx::query_as::<_, (String, String, DateTime<Utc>)>(
        "SELECT text, sentiment, created_at FROM review_records WHERE ticket_id = ?",
    )
    .bind(ticket_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.map(|(text, sentiment, created_at)| {
        let sentiment = sentiment
            .parse::<SentimentLabel>()
            .map_err(|e| Error::CorruptRecord {
                ticket_id: ticket_id.to_string(),
                reason: e.to_string(),
            })?;
        Ok(ReviewRecord {
            ticket_id: *ticket_id,
            text,
            sentiment,
            created_at,
        })
    })
    .transpose()
}

/// Count stored review records
pub async fn count_reviews(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM review_records")
        .fetch_one(pool)
        .await?;
    Ok(count)
}

/// Flag a stored record whose notification could not be delivered
pub async fn flag_pending_dispatch(
    pool: &SqlitePool,
    ticket_id: &TicketId,
    last_error: &str,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO pending_dispatches (ticket_id, last_error, flagged_at)
        VALUES (?, ?, ?)
        ON CONFLICT(ticket_id) DO UPDATE SET last_error = excluded.last_error,
                                             flagged_at = excluded.flagged_at
        "#,
    )
    .bind(ticket_id.to_string())
    .bind(last_error)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    Ok(())
}

/// Ticket IDs awaiting redispatch, oldest first
pub async fn list_pending_dispatches(pool: &SqlitePool) -> Result<Vec<TicketId>> {
    let rows = sqlx::query_scalar::<_, String>(
        "SELECT ticket_id FROM pending_dispatches ORDER BY flagged_at ASC",
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(|raw| raw.parse::<TicketId>()).collect()
}

/// Remove a ticket from the redispatch set
pub async fn clear_pending_dispatch(pool: &SqlitePool, ticket_id: &TicketId) -> Result<()> {
    sqlx::query("DELETE FROM pending_dispatches WHERE ticket_id = ?")
        .bind(ticket_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}
