//! Test doubles for the pipeline collaborators
//!
//! Each fake counts its calls and can be told to fail a number of times
//! before behaving.

#![allow(dead_code)]

use async_trait::async_trait;
use revu_common::events::EventBus;
use revu_common::{ReviewRecord, SentimentLabel, TicketId};
use revu_intake::services::{
    Classification, InMemoryReviewStore, NotificationSink, RetryPolicy, ReviewStore,
    SentimentClassifier,
};
use revu_intake::{PipelineError, ReviewPipeline};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Classifier answering with a fixed provider label
pub struct ScriptedClassifier {
    raw_label: String,
    failures_left: AtomicU32,
    delay: Duration,
    pub calls: AtomicU32,
}

impl ScriptedClassifier {
    pub fn returning(label: SentimentLabel) -> Arc<Self> {
        Self::raw(label.as_str())
    }

    /// Provider label passed through the adapter's mapping, e.g. "negative" or "LABEL_7"
    pub fn raw(raw_label: &str) -> Arc<Self> {
        Arc::new(Self {
            raw_label: raw_label.to_string(),
            failures_left: AtomicU32::new(0),
            delay: Duration::ZERO,
            calls: AtomicU32::new(0),
        })
    }

    /// Answers `label` only after sleeping for `delay`
    pub fn slow(label: SentimentLabel, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            raw_label: label.as_str().to_string(),
            failures_left: AtomicU32::new(0),
            delay,
            calls: AtomicU32::new(0),
        })
    }

    pub fn failing_first(label: SentimentLabel, failures: u32) -> Arc<Self> {
        let classifier = Self::returning(label);
        classifier.failures_left.store(failures, Ordering::SeqCst);
        classifier
    }

    pub fn call_count(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SentimentClassifier for ScriptedClassifier {
    fn provider_name(&self) -> &'static str {
        "scripted"
    }

    async fn classify(&self, _text: &str) -> Result<Classification, PipelineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if take_failure(&self.failures_left) {
            return Err(PipelineError::ClassifierUnavailable("scripted outage".to_string()));
        }
        let label = revu_intake::services::classifier::map_provider_label(&self.raw_label)?;
        Ok(Classification::new(label, Some(0.9)))
    }
}

/// In-memory store whose puts can fail transiently
pub struct FlakyStore {
    inner: InMemoryReviewStore,
    put_failures_left: AtomicU32,
    pub put_calls: AtomicU32,
}

impl FlakyStore {
    pub fn new() -> Arc<Self> {
        Self::failing_first(0)
    }

    pub fn failing_first(failures: u32) -> Arc<Self> {
        Arc::new(Self {
            inner: InMemoryReviewStore::new(),
            put_failures_left: AtomicU32::new(failures),
            put_calls: AtomicU32::new(0),
        })
    }

    pub fn put_count(&self) -> u32 {
        self.put_calls.load(Ordering::SeqCst)
    }

    pub async fn record_count(&self) -> usize {
        self.inner.len().await
    }
}

#[async_trait]
impl ReviewStore for FlakyStore {
    fn backend_name(&self) -> &'static str {
        "flaky"
    }

    async fn put(&self, record: &ReviewRecord) -> Result<(), PipelineError> {
        self.put_calls.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.put_failures_left) {
            return Err(PipelineError::StoreUnavailable("scripted outage".to_string()));
        }
        self.inner.put(record).await
    }

    async fn get(&self, ticket_id: &TicketId) -> Result<Option<ReviewRecord>, PipelineError> {
        self.inner.get(ticket_id).await
    }

    async fn flag_pending_dispatch(
        &self,
        ticket_id: &TicketId,
        last_error: &str,
    ) -> Result<(), PipelineError> {
        self.inner.flag_pending_dispatch(ticket_id, last_error).await
    }

    async fn pending_dispatches(&self) -> Result<Vec<TicketId>, PipelineError> {
        self.inner.pending_dispatches().await
    }

    async fn clear_pending_dispatch(&self, ticket_id: &TicketId) -> Result<(), PipelineError> {
        self.inner.clear_pending_dispatch(ticket_id).await
    }
}

/// Sink that keeps every acknowledged publish
#[derive(Default)]
pub struct RecordingSink {
    failures_left: AtomicU32,
    pub attempts: AtomicU32,
    published: Mutex<Vec<(String, String)>>,
}

impl RecordingSink {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing_first(failures: u32) -> Arc<Self> {
        let sink = Self::default();
        sink.failures_left.store(failures, Ordering::SeqCst);
        Arc::new(sink)
    }

    /// Make the next `failures` publishes fail
    pub fn fail_next(&self, failures: u32) {
        self.failures_left.store(failures, Ordering::SeqCst);
    }

    pub fn published(&self) -> Vec<(String, String)> {
        self.published.lock().unwrap().clone()
    }

    pub fn attempt_count(&self) -> u32 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl NotificationSink for RecordingSink {
    fn sink_name(&self) -> &'static str {
        "recording"
    }

    async fn publish(&self, subject: &str, body: &str) -> Result<(), PipelineError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if take_failure(&self.failures_left) {
            return Err(PipelineError::DispatchUnavailable("scripted outage".to_string()));
        }
        self.published
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string()));
        Ok(())
    }
}

fn take_failure(counter: &AtomicU32) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

/// Three attempts with millisecond backoff
pub fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 3,
        initial_backoff: Duration::from_millis(1),
        max_backoff: Duration::from_millis(4),
    }
}

pub fn pipeline(
    classifier: Arc<dyn SentimentClassifier>,
    store: Arc<dyn ReviewStore>,
    sink: Arc<dyn NotificationSink>,
) -> ReviewPipeline {
    ReviewPipeline::new(classifier, store, sink, fast_retry(), EventBus::new(64))
}
