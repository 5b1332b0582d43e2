//! Tests for review database initialization and queries

use revu_common::db::{init_database, init_memory_database, reviews};
use revu_common::{ReviewRecord, SentimentLabel, TicketId};
use tempfile::TempDir;

#[tokio::test]
async fn test_database_creation_when_missing() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("nested").join("reviews.db");
    assert!(!db_path.exists());

    let pool = init_database(&db_path).await;
    assert!(pool.is_ok(), "Database initialization failed: {:?}", pool.err());
    assert!(db_path.exists(), "Database file was not created");
}

#[tokio::test]
async fn test_database_reopen_keeps_records() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("reviews.db");
    let record = ReviewRecord::new(TicketId::generate(), "Solid.", SentimentLabel::Positive);

    {
        let pool = init_database(&db_path).await.unwrap();
        assert!(reviews::insert_review(&pool, &record).await.unwrap());
        pool.close().await;
    }

    let pool = init_database(&db_path).await.unwrap();
    let loaded = reviews::get_review(&pool, &record.ticket_id).await.unwrap();
    assert_eq!(loaded.map(|r| r.text), Some("Solid.".to_string()));
}

#[tokio::test]
async fn test_insert_then_get_round_trips_fields() {
    let pool = init_memory_database().await.unwrap();
    let record = ReviewRecord::new(
        TicketId::generate(),
        "Worst experience ever. The service was horrible.",
        SentimentLabel::Negative,
    );

    reviews::insert_review(&pool, &record).await.unwrap();
    let loaded = reviews::get_review(&pool, &record.ticket_id)
        .await
        .unwrap()
        .expect("record should exist");

    assert_eq!(loaded.ticket_id, record.ticket_id);
    assert_eq!(loaded.text, record.text);
    assert_eq!(loaded.sentiment, SentimentLabel::Negative);
}

#[tokio::test]
async fn test_repeated_insert_is_single_record() {
    let pool = init_memory_database().await.unwrap();
    let record = ReviewRecord::new(TicketId::generate(), "Fine.", SentimentLabel::Neutral);

    assert!(reviews::insert_review(&pool, &record).await.unwrap());
    assert!(!reviews::insert_review(&pool, &record).await.unwrap());

    assert_eq!(reviews::count_reviews(&pool).await.unwrap(), 1);
}

#[tokio::test]
async fn test_repeated_insert_does_not_overwrite() {
    let pool = init_memory_database().await.unwrap();
    let ticket_id = TicketId::generate();
    let first = ReviewRecord::new(ticket_id, "first", SentimentLabel::Positive);
    let second = ReviewRecord::new(ticket_id, "second", SentimentLabel::Negative);

    reviews::insert_review(&pool, &first).await.unwrap();
    reviews::insert_review(&pool, &second).await.unwrap();

    let loaded = reviews::get_review(&pool, &ticket_id).await.unwrap().unwrap();
    assert_eq!(loaded.text, "first");
    assert_eq!(loaded.sentiment, SentimentLabel::Positive);
}

#[tokio::test]
async fn test_get_unknown_ticket_is_none() {
    let pool = init_memory_database().await.unwrap();
    let loaded = reviews::get_review(&pool, &TicketId::generate()).await.unwrap();
    assert!(loaded.is_none());
}

#[tokio::test]
async fn test_pending_dispatch_lifecycle() {
    let pool = init_memory_database().await.unwrap();
    let record = ReviewRecord::new(TicketId::generate(), "Broken on arrival.", SentimentLabel::Negative);
    reviews::insert_review(&pool, &record).await.unwrap();

    reviews::flag_pending_dispatch(&pool, &record.ticket_id, "sink down").await.unwrap();
    // Flagging twice keeps one entry
    reviews::flag_pending_dispatch(&pool, &record.ticket_id, "sink still down").await.unwrap();
    assert_eq!(
        reviews::list_pending_dispatches(&pool).await.unwrap(),
        vec![record.ticket_id]
    );

    reviews::clear_pending_dispatch(&pool, &record.ticket_id).await.unwrap();
    assert!(reviews::list_pending_dispatches(&pool).await.unwrap().is_empty());
}
