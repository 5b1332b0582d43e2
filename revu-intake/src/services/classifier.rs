//! Sentiment classifier adapter
//!
//! The sentiment model itself is external. [`SentimentClassifier`] is the
//! seam: any provider that turns text into a label (and optionally a
//! confidence score) can sit behind it. Every provider response is mapped
//! onto the fixed [`SentimentLabel`] set; a label outside the set is an
//! integration bug and surfaces as `UnrecognizedSentimentLabel`.

use crate::error::PipelineError;
use async_trait::async_trait;
use revu_common::SentimentLabel;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

/// Classifier verdict for one text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Classification {
    pub label: SentimentLabel,
    /// Provider confidence in `label` (0.0-1.0), when reported
    pub score: Option<f32>,
}

impl Classification {
    pub fn new(label: SentimentLabel, score: Option<f32>) -> Self {
        Self {
            label,
            score: score.map(|s| s.clamp(0.0, 1.0)),
        }
    }
}

/// External sentiment classification capability
#[async_trait]
pub trait SentimentClassifier: Send + Sync {
    /// Provider identifier for logs (e.g., "lexicon", "http")
    fn provider_name(&self) -> &'static str;

    /// Classify review text
    ///
    /// # Errors
    /// * `ClassifierUnavailable` - transport or provider failure (retryable)
    /// * `UnrecognizedSentimentLabel` - provider answered outside the label set
    async fn classify(&self, text: &str) -> Result<Classification, PipelineError>;
}

/// Map a raw provider label, reporting unknown labels as integration errors
pub fn map_provider_label(raw: &str) -> Result<SentimentLabel, PipelineError> {
    SentimentLabel::from_provider_label(raw)
        .map_err(|_| PipelineError::UnrecognizedSentimentLabel(raw.to_string()))
}

// ============================================================================
// HTTP provider
// ============================================================================

#[derive(Debug, Serialize)]
struct ClassifyRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct ClassifyResponse {
    label: String,
    #[serde(default)]
    score: Option<f32>,
}

/// Classifier backed by an HTTP endpoint
///
/// POSTs `{"text": ...}` and expects `{"label": ..., "score": ...}` back.
pub struct HttpClassifier {
    http_client: reqwest::Client,
    endpoint: String,
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PipelineError> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("revu-intake/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::ClassifierUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl SentimentClassifier for HttpClassifier {
    fn provider_name(&self) -> &'static str {
        "http"
    }

    async fn classify(&self, text: &str) -> Result<Classification, PipelineError> {
        tracing::debug!(endpoint = %self.endpoint, "Requesting sentiment classification");

        let response = self
            .http_client
            .post(&self.endpoint)
            .json(&ClassifyRequest { text })
            .send()
            .await
            .map_err(|e| PipelineError::ClassifierUnavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(PipelineError::ClassifierUnavailable(format!(
                "classifier returned {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let body: ClassifyResponse = response.json().await.map_err(|e| {
            PipelineError::ClassifierUnavailable(format!("undecodable classifier response: {}", e))
        })?;

        let label = map_provider_label(&body.label)?;
        Ok(Classification::new(label, body.score))
    }
}

// ============================================================================
// Built-in lexicon provider
// ============================================================================

const POSITIVE_CUES: &[&str] = &[
    "amazing", "awesome", "best", "excellent", "fantastic", "friendly", "glad", "good", "great",
    "happy", "helpful", "love", "loved", "nice", "perfect", "pleased", "recommend", "satisfied",
    "superb", "wonderful",
];

const NEGATIVE_CUES: &[&str] = &[
    "awful", "bad", "broken", "defective", "disappointed", "disappointing", "hate", "hated",
    "horrible", "poor", "refund", "rude", "terrible", "unacceptable", "useless", "waste", "worse",
    "worst",
];

/// Word-list classifier for standalone runs without an external model
///
/// Counts positive and negative cue words. A polarity wins when it has at
/// least twice the cues of the other; comparable counts are MIXED and no
/// cues at all is NEUTRAL. The score is the winning share of matched cues.
pub struct LexiconClassifier {
    positive: HashSet<&'static str>,
    negative: HashSet<&'static str>,
}

impl LexiconClassifier {
    pub fn new() -> Self {
        Self {
            positive: POSITIVE_CUES.iter().copied().collect(),
            negative: NEGATIVE_CUES.iter().copied().collect(),
        }
    }

    fn evaluate(&self, text: &str) -> Classification {
        let lowered = text.to_lowercase();
        let (mut pos, mut neg) = (0u32, 0u32);

        for word in lowered.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            if self.positive.contains(word) {
                pos += 1;
            } else if self.negative.contains(word) {
                neg += 1;
            }
        }

        let total = pos + neg;
        if total == 0 {
            return Classification::new(SentimentLabel::Neutral, None);
        }

        let share = |n: u32| Some(n as f32 / total as f32);
        if pos >= neg * 2 {
            Classification::new(SentimentLabel::Positive, share(pos))
        } else if neg >= pos * 2 {
            Classification::new(SentimentLabel::Negative, share(neg))
        } else {
            Classification::new(SentimentLabel::Mixed, share(pos.max(neg)))
        }
    }
}

impl Default for LexiconClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SentimentClassifier for LexiconClassifier {
    fn provider_name(&self) -> &'static str {
        "lexicon"
    }

    async fn classify(&self, text: &str) -> Result<Classification, PipelineError> {
        Ok(self.evaluate(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_lexicon_scenarios() {
        let classifier = LexiconClassifier::new();

        let cases = [
            ("Worst experience ever. The service was horrible.", SentimentLabel::Negative),
            ("Great product, highly recommend!", SentimentLabel::Positive),
            ("I received the product on time.", SentimentLabel::Neutral),
            ("Great screen but terrible battery.", SentimentLabel::Mixed),
        ];

        for (text, expected) in cases {
            let result = classifier.classify(text).await.unwrap();
            assert_eq!(result.label, expected, "{text}");
        }
    }

    #[tokio::test]
    async fn test_lexicon_score_is_dominant_share() {
        let result = LexiconClassifier::new()
            .classify("good good good bad")
            .await
            .unwrap();
        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.score, Some(0.75));
    }

    #[test]
    fn test_unknown_label_maps_to_integration_error() {
        assert_eq!(map_provider_label("negative").unwrap(), SentimentLabel::Negative);
        assert_eq!(
            map_provider_label("VERY_BAD"),
            Err(PipelineError::UnrecognizedSentimentLabel("VERY_BAD".to_string()))
        );
    }

    #[tokio::test]
    async fn test_http_classifier_maps_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/classify"))
            .and(body_json(json!({"text": "Great product"})))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"label": "positive", "score": 0.97})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let classifier =
            HttpClassifier::new(format!("{}/classify", server.uri()), Duration::from_secs(5))
                .unwrap();
        let result = classifier.classify("Great product").await.unwrap();

        assert_eq!(result.label, SentimentLabel::Positive);
        assert_eq!(result.score, Some(0.97));
    }

    #[tokio::test]
    async fn test_http_classifier_server_error_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let classifier = HttpClassifier::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = classifier.classify("anything").await.unwrap_err();

        assert!(matches!(err, PipelineError::ClassifierUnavailable(_)));
        assert!(err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_classifier_unknown_label_is_not_retryable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"label": "LABEL_1"})))
            .mount(&server)
            .await;

        let classifier = HttpClassifier::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = classifier.classify("anything").await.unwrap_err();

        assert_eq!(err, PipelineError::UnrecognizedSentimentLabel("LABEL_1".to_string()));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_http_classifier_garbage_body_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let classifier = HttpClassifier::new(server.uri(), Duration::from_secs(5)).unwrap();
        let err = classifier.classify("anything").await.unwrap_err();
        assert!(matches!(err, PipelineError::ClassifierUnavailable(_)));
    }
}
