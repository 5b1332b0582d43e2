//! Pipeline events and the EventBus
//!
//! The intake pipeline reports each terminal outcome on the bus. Events are
//! serializable for SSE transmission; nothing is persisted.

use crate::models::{SentimentLabel, TicketId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Events emitted by the review intake pipeline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PipelineEvent {
    /// Submission carried no usable review text
    SubmissionRejected {
        reason: String,
        timestamp: DateTime<Utc>,
    },

    /// Classification or storage failed after retries; nothing was persisted
    SubmissionFailed {
        error: String,
        timestamp: DateTime<Utc>,
    },

    /// Review record was durably stored
    ReviewRecorded {
        ticket_id: TicketId,
        sentiment: SentimentLabel,
        timestamp: DateTime<Utc>,
    },

    /// Negative-review notification was published
    NotificationDispatched {
        ticket_id: TicketId,
        timestamp: DateTime<Utc>,
    },

    /// Record is stored but its notification could not be published
    ///
    /// The ticket stays flagged for redispatch.
    DispatchFailed {
        ticket_id: TicketId,
        error: String,
        timestamp: DateTime<Utc>,
    },
}

impl PipelineEvent {
    /// SSE event name (matches the serde tag)
    pub fn event_type(&self) -> &'static str {
        match self {
            PipelineEvent::SubmissionRejected { .. } => "SubmissionRejected",
            PipelineEvent::SubmissionFailed { .. } => "SubmissionFailed",
            PipelineEvent::ReviewRecorded { .. } => "ReviewRecorded",
            PipelineEvent::NotificationDispatched { .. } => "NotificationDispatched",
            PipelineEvent::DispatchFailed { .. } => "DispatchFailed",
        }
    }
}

/// Central event distribution bus
///
/// Wraps `tokio::sync::broadcast`: publishing never blocks on slow
/// subscribers, and subscribers that fall behind observe a lag error
/// instead of stalling the pipeline.
#[derive(Clone)]
pub struct EventBus {
    tx: broadcast::Sender<PipelineEvent>,
    capacity: usize,
}

impl EventBus {
    /// Creates a new EventBus buffering up to `capacity` events per subscriber
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx, capacity }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PipelineEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PipelineEvent) {
        if self.tx.send(event).is_err() {
            tracing::trace!("No event subscribers");
        }
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Configured channel capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
