//! Review intake orchestrator
//!
//! Runs one submission through normalize → classify → ticket → store and,
//! for negative reviews, dispatch. Each external call is wrapped in the
//! bounded retry helper. Runs share no mutable state; concurrent
//! submissions only meet inside the store and the sink.
//!
//! The store write and the dispatch are not transactional. A dispatch that
//! still fails after retries leaves the record in place, ends the run in
//! `PARTIAL` and flags the ticket for redispatch.

mod state;

pub use state::{PipelineOutcome, PipelineState};

use crate::error::PipelineError;
use crate::services::{
    next_ticket_id, normalize, retry_with_backoff, NotificationDispatcher, NotificationSink,
    RetryPolicy, ReviewStore, SentimentClassifier, Submission,
};
use chrono::Utc;
use revu_common::events::{EventBus, PipelineEvent};
use revu_common::{ReviewRecord, TicketId};
use state::Run;
use std::sync::Arc;
use thiserror::Error;

/// Why a redispatch request could not be honoured
#[derive(Debug, Error)]
pub enum RedispatchError {
    #[error("No review record for ticket {0}")]
    NotFound(TicketId),

    #[error("Ticket {0} is not a negative review; nothing to dispatch")]
    NotNotifiable(TicketId),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Pipeline orchestrator
pub struct ReviewPipeline {
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<dyn ReviewStore>,
    dispatcher: NotificationDispatcher,
    retry: RetryPolicy,
    event_bus: EventBus,
}

impl ReviewPipeline {
    pub fn new(
        classifier: Arc<dyn SentimentClassifier>,
        store: Arc<dyn ReviewStore>,
        sink: Arc<dyn NotificationSink>,
        retry: RetryPolicy,
        event_bus: EventBus,
    ) -> Self {
        tracing::info!(
            classifier = classifier.provider_name(),
            store = store.backend_name(),
            sink = sink.sink_name(),
            max_attempts = retry.max_attempts,
            "Review pipeline assembled"
        );

        Self {
            classifier,
            store,
            dispatcher: NotificationDispatcher::new(sink),
            retry,
            event_bus,
        }
    }

    pub fn store(&self) -> &Arc<dyn ReviewStore> {
        &self.store
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Run a raw request body through the pipeline
    ///
    /// A body that is not a JSON object is rejected like a submission
    /// without review text.
    pub async fn process_json(&self, body: &[u8]) -> PipelineOutcome {
        match Submission::from_json_bytes(body) {
            Ok(submission) => self.process(&submission).await,
            Err(err) => self.reject(Run::start(), err),
        }
    }

    /// Run one submission to a terminal state
    pub async fn process(&self, submission: &Submission) -> PipelineOutcome {
        let mut run = Run::start();

        // RECEIVED → NORMALIZED
        let text = match normalize(submission) {
            Ok(text) => text,
            Err(err) => return self.reject(run, err),
        };
        run.advance(PipelineState::Normalized);

        // NORMALIZED → CLASSIFIED
        let classification = match retry_with_backoff("classify", &self.retry, || {
            self.classifier.classify(&text)
        })
        .await
        {
            Ok(classification) => classification,
            Err(err) => return self.fail(run, err),
        };
        run.advance(PipelineState::Classified);

        // CLASSIFIED → TICKETED
        let record = ReviewRecord::new(next_ticket_id(), text, classification.label);
        run.advance(PipelineState::Ticketed);

        // TICKETED → RECORDED
        if let Err(err) = retry_with_backoff("store put", &self.retry, || self.store.put(&record)).await {
            return self.fail(run, err);
        }
        run.advance(PipelineState::Recorded);

        tracing::info!(
            ticket_id = %record.ticket_id,
            sentiment = %record.sentiment,
            score = ?classification.score,
            "Review recorded"
        );
        self.event_bus.emit_lossy(PipelineEvent::ReviewRecorded {
            ticket_id: record.ticket_id,
            sentiment: record.sentiment,
            timestamp: Utc::now(),
        });

        // RECORDED → DONE | DISPATCHED | PARTIAL
        if !record.sentiment.triggers_notification() {
            run.advance(PipelineState::Done);
            return run.finish(Some(record), classification.score, None);
        }

        match self.dispatch_with_retry(&record).await {
            Ok(()) => {
                run.advance(PipelineState::Dispatched);
                run.finish(Some(record), classification.score, None)
            }
            Err(err) => {
                self.flag_partial(&record.ticket_id, &err).await;
                run.advance(PipelineState::Partial);
                run.finish(Some(record), classification.score, Some(err))
            }
        }
    }

    /// Retry the notification for a stored negative review
    ///
    /// Clears the pending-dispatch flag once the sink acknowledges.
    pub async fn redispatch(&self, ticket_id: &TicketId) -> Result<ReviewRecord, RedispatchError> {
        let record = retry_with_backoff("store get", &self.retry, || self.store.get(ticket_id))
            .await?
            .ok_or(RedispatchError::NotFound(*ticket_id))?;

        if !record.sentiment.triggers_notification() {
            return Err(RedispatchError::NotNotifiable(*ticket_id));
        }

        if let Err(err) = self.dispatch_with_retry(&record).await {
            self.flag_partial(ticket_id, &err).await;
            return Err(err.into());
        }

        if let Err(err) = self.store.clear_pending_dispatch(ticket_id).await {
            tracing::warn!(ticket_id = %ticket_id, error = %err, "Failed to clear redispatch flag");
        }
        tracing::info!(ticket_id = %ticket_id, "Redispatch succeeded");

        Ok(record)
    }

    async fn dispatch_with_retry(&self, record: &ReviewRecord) -> Result<(), PipelineError> {
        retry_with_backoff("dispatch", &self.retry, || self.dispatcher.dispatch(record)).await?;

        tracing::info!(
            ticket_id = %record.ticket_id,
            sink = self.dispatcher.sink_name(),
            "Negative review notification dispatched"
        );
        self.event_bus.emit_lossy(PipelineEvent::NotificationDispatched {
            ticket_id: record.ticket_id,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Record stays; flagging is best effort and never changes the outcome
    async fn flag_partial(&self, ticket_id: &TicketId, err: &PipelineError) {
        tracing::error!(
            ticket_id = %ticket_id,
            error = %err,
            "Notification dispatch failed; record kept and flagged for redispatch"
        );

        if let Err(flag_err) = self
            .store
            .flag_pending_dispatch(ticket_id, &err.to_string())
            .await
        {
            tracing::error!(
                ticket_id = %ticket_id,
                error = %flag_err,
                "Failed to flag ticket for redispatch"
            );
        }

        self.event_bus.emit_lossy(PipelineEvent::DispatchFailed {
            ticket_id: *ticket_id,
            error: err.to_string(),
            timestamp: Utc::now(),
        });
    }

    fn reject(&self, mut run: Run, err: PipelineError) -> PipelineOutcome {
        tracing::info!(reason = %err, "Submission rejected");
        self.event_bus.emit_lossy(PipelineEvent::SubmissionRejected {
            reason: err.to_string(),
            timestamp: Utc::now(),
        });
        run.advance(PipelineState::Rejected);
        run.finish(None, None, Some(err))
    }

    fn fail(&self, mut run: Run, err: PipelineError) -> PipelineOutcome {
        let stage = run.current();
        if matches!(err, PipelineError::UnrecognizedSentimentLabel(_)) {
            // Integration bug in the classifier provider, operators must look
            tracing::error!(stage = %stage, error = %err, "Classifier returned an unknown label");
        } else {
            tracing::error!(stage = %stage, error = %err, "Submission failed");
        }
        self.event_bus.emit_lossy(PipelineEvent::SubmissionFailed {
            error: err.to_string(),
            timestamp: Utc::now(),
        });
        run.advance(PipelineState::Failed);
        run.finish(None, None, Some(err))
    }
}
