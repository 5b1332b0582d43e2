//! # Revu Common Library
//!
//! Shared code for the review intake services:
//! - Review domain model (sentiment labels, ticket IDs, records)
//! - Pipeline events and the EventBus
//! - Bootstrap configuration loading
//! - SQLite initialization for the review record table
//! - SSE helpers

pub mod config;
#[cfg(feature = "sqlx")]
pub mod db;
pub mod error;
pub mod events;
pub mod models;
pub mod sse;

pub use error::{Error, Result};
pub use models::{ReviewRecord, SentimentLabel, TicketId};
