//! Notification dispatcher
//!
//! Formats the negative-review notification and publishes it to a
//! [`NotificationSink`]. Delivery is at-least-once from the sink's point of
//! view: the dispatcher does not deduplicate, and a redispatch after a
//! partial failure may publish the same notification again.

use crate::error::PipelineError;
use async_trait::async_trait;
use revu_common::ReviewRecord;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Subject line of every negative-review notification
pub const NOTIFICATION_SUBJECT: &str = "Negative Customer Review Detected";

/// Composed notification, alive only for the duration of a publish
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub subject: String,
    pub body: String,
}

/// Render the fixed notification template for a record
pub fn compose_notification(record: &ReviewRecord) -> Notification {
    let body = format!(
        "{}\n\nTicket ID: {}\n\nReview Message: {}\n\nSentiment: {}",
        NOTIFICATION_SUBJECT, record.ticket_id, record.text, record.sentiment
    );

    Notification {
        subject: NOTIFICATION_SUBJECT.to_string(),
        body,
    }
}

/// Publish target fanning notifications out to its subscribers
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Sink identifier for logs
    fn sink_name(&self) -> &'static str;

    /// Publish one message; `Ok` means the sink acknowledged it
    async fn publish(&self, subject: &str, body: &str) -> Result<(), PipelineError>;
}

/// Composes and publishes notifications for negative reviews
#[derive(Clone)]
pub struct NotificationDispatcher {
    sink: Arc<dyn NotificationSink>,
}

impl NotificationDispatcher {
    pub fn new(sink: Arc<dyn NotificationSink>) -> Self {
        Self { sink }
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.sink_name()
    }

    /// Publish the notification for a record
    ///
    /// Callers only dispatch records whose sentiment triggers notification.
    pub async fn dispatch(&self, record: &ReviewRecord) -> Result<(), PipelineError> {
        let notification = compose_notification(record);
        self.sink
            .publish(&notification.subject, &notification.body)
            .await
    }
}

/// Sink that writes notifications to the service log
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl NotificationSink for LogSink {
    fn sink_name(&self) -> &'static str {
        "log"
    }

    async fn publish(&self, subject: &str, body: &str) -> Result<(), PipelineError> {
        tracing::warn!(subject, "Notification published:\n{}", body);
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct WebhookPayload<'a> {
    topic: &'a str,
    subject: &'a str,
    body: &'a str,
}

/// Sink that POSTs `{"topic", "subject", "body"}` to a webhook
pub struct WebhookSink {
    http_client: reqwest::Client,
    url: String,
    topic: String,
}

impl WebhookSink {
    pub fn new(
        url: impl Into<String>,
        topic: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, PipelineError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("revu-intake/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::DispatchUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            url: url.into(),
            topic: topic.into(),
        })
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    fn sink_name(&self) -> &'static str {
        "webhook"
    }

    async fn publish(&self, subject: &str, body: &str) -> Result<(), PipelineError> {
        let response = self
            .http_client
            .post(&self.url)
            .json(&WebhookPayload {
                topic: &self.topic,
                subject,
                body,
            })
            .send()
            .await
            .map_err(|e| PipelineError::DispatchUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::DispatchUnavailable(format!(
                "webhook returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        tracing::debug!(topic = %self.topic, "Webhook acknowledged notification");
        Ok(())
    }
}
