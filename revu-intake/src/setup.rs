//! Assemble the pipeline from bootstrap configuration

use crate::pipeline::ReviewPipeline;
use crate::services::{
    HttpClassifier, InMemoryReviewStore, LexiconClassifier, LogSink, NotificationSink,
    RetryPolicy, ReviewStore, SentimentClassifier, SqliteReviewStore, WebhookSink,
};
use anyhow::{Context, Result};
use revu_common::config::{
    ClassifierConfig, ClassifierProvider, NotificationConfig, SinkKind, StorageBackend,
    StorageConfig, TomlConfig,
};
use revu_common::events::EventBus;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Event bus capacity per subscriber
pub const EVENT_BUS_CAPACITY: usize = 256;

pub fn build_classifier(config: &ClassifierConfig) -> Result<Arc<dyn SentimentClassifier>> {
    match config.provider {
        ClassifierProvider::Lexicon => {
            info!("Using built-in lexicon sentiment classifier");
            Ok(Arc::new(LexiconClassifier::new()))
        }
        ClassifierProvider::Http => {
            let endpoint = config
                .endpoint
                .clone()
                .context("classifier.endpoint is required for the http provider")?;
            info!("Using HTTP sentiment classifier at {}", endpoint);
            let classifier =
                HttpClassifier::new(endpoint, Duration::from_secs(config.timeout_secs))?;
            Ok(Arc::new(classifier))
        }
    }
}

pub async fn build_store(config: &StorageConfig) -> Result<Arc<dyn ReviewStore>> {
    match config.backend {
        StorageBackend::Sqlite => {
            let db_path = config.resolved_database_path();
            info!("Database: {}", db_path.display());
            let pool = revu_common::db::init_database(&db_path)
                .await
                .with_context(|| format!("Failed to open database {}", db_path.display()))?;
            Ok(Arc::new(SqliteReviewStore::new(pool)))
        }
        StorageBackend::Memory => {
            info!("Using in-memory review store (records are lost on exit)");
            Ok(Arc::new(InMemoryReviewStore::new()))
        }
    }
}

pub fn build_sink(config: &NotificationConfig) -> Result<Arc<dyn NotificationSink>> {
    match config.sink {
        SinkKind::Log => Ok(Arc::new(LogSink)),
        SinkKind::Webhook => {
            let url = config
                .webhook_url
                .clone()
                .context("notifications.webhook_url is required for the webhook sink")?;
            info!("Publishing notifications to webhook {}", url);
            let sink = WebhookSink::new(
                url,
                config.topic.clone(),
                Duration::from_secs(config.timeout_secs),
            )?;
            Ok(Arc::new(sink))
        }
    }
}

/// Build the orchestrator and its collaborators
pub async fn build_pipeline(config: &TomlConfig) -> Result<ReviewPipeline> {
    let classifier = build_classifier(&config.classifier)?;
    let store = build_store(&config.storage).await?;
    let sink = build_sink(&config.notifications)?;

    Ok(ReviewPipeline::new(
        classifier,
        store,
        sink,
        RetryPolicy::from(&config.retry),
        EventBus::new(EVENT_BUS_CAPACITY),
    ))
}
