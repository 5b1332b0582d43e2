//! Pipeline stage services
//!
//! One module per stage; the orchestrator in [`crate::pipeline`] sequences
//! them.

pub mod classifier;
pub mod dispatcher;
pub mod normalizer;
pub mod record_store;
pub mod retry;
pub mod ticket;

pub use classifier::{Classification, HttpClassifier, LexiconClassifier, SentimentClassifier};
pub use dispatcher::{
    compose_notification, LogSink, Notification, NotificationDispatcher, NotificationSink,
    WebhookSink, NOTIFICATION_SUBJECT,
};
pub use normalizer::{normalize, Submission};
pub use record_store::{InMemoryReviewStore, ReviewStore, SqliteReviewStore};
pub use retry::{retry_with_backoff, RetryPolicy};
pub use ticket::next_ticket_id;
