//! Common error types for revu

use thiserror::Error;

/// Common result type for revu operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across revu services
#[derive(Error, Debug)]
pub enum Error {
    /// Database operation error (wraps sqlx::Error)
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Classifier returned a label outside POSITIVE/NEGATIVE/NEUTRAL/MIXED
    #[error("Unrecognized sentiment label: {0:?}")]
    UnrecognizedLabel(String),

    /// Persisted row could not be decoded into a review record
    #[error("Corrupt record {ticket_id}: {reason}")]
    CorruptRecord { ticket_id: String, reason: String },
}
