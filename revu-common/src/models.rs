//! Review domain model
//!
//! Types shared by every stage of the intake pipeline and by the storage
//! layer: the fixed sentiment label set, ticket identifiers, and the
//! persisted review record.

use crate::{Error, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Sentiment label returned by the classification capability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SentimentLabel {
    Positive,
    Negative,
    Neutral,
    Mixed,
}

impl SentimentLabel {
    /// All labels, in declaration order
    pub const ALL: [SentimentLabel; 4] = [
        SentimentLabel::Positive,
        SentimentLabel::Negative,
        SentimentLabel::Neutral,
        SentimentLabel::Mixed,
    ];

    /// Canonical upper-case name, as stored and as rendered in notifications
    pub fn as_str(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "POSITIVE",
            SentimentLabel::Negative => "NEGATIVE",
            SentimentLabel::Neutral => "NEUTRAL",
            SentimentLabel::Mixed => "MIXED",
        }
    }

    /// Map a provider-specific label onto the fixed label set
    ///
    /// Matching ignores case and surrounding whitespace. Anything else is an
    /// integration bug and is reported, never defaulted.
    pub fn from_provider_label(raw: &str) -> Result<Self> {
        let trimmed = raw.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|label| label.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| Error::UnrecognizedLabel(raw.to_string()))
    }

    /// Only negative reviews produce a notification
    pub fn triggers_notification(&self) -> bool {
        matches!(self, SentimentLabel::Negative)
    }
}

impl fmt::Display for SentimentLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SentimentLabel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_provider_label(s)
    }
}

/// Unique identifier assigned to each accepted submission
///
/// Backed by a random (v4) UUID, so generation needs no coordination between
/// concurrent callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(Uuid);

impl TicketId {
    /// Generate a fresh ticket ID
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl From<Uuid> for TicketId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for TicketId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|e| Error::InvalidInput(format!("invalid ticket id {:?}: {}", s, e)))
    }
}

/// Persisted review record
///
/// Created once per accepted submission and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    /// Primary key
    pub ticket_id: TicketId,
    /// Normalized review text
    pub text: String,
    /// Classified sentiment
    pub sentiment: SentimentLabel,
    /// When the record was created
    pub created_at: DateTime<Utc>,
}

impl ReviewRecord {
    pub fn new(ticket_id: TicketId, text: impl Into<String>, sentiment: SentimentLabel) -> Self {
        Self {
            ticket_id,
            text: text.into(),
            sentiment,
            created_at: Utc::now(),
        }
    }
}
