//! Pipeline states and outcomes
//!
//! ```text
//! RECEIVED → NORMALIZED → CLASSIFIED → TICKETED → RECORDED → DISPATCHED
//!     │           │                        │           │
//!     ▼           ▼                        ▼           ├──→ DONE     (not NEGATIVE)
//!  REJECTED     FAILED                   FAILED        └──→ PARTIAL  (dispatch failed)
//! ```

use crate::error::PipelineError;
use revu_common::ReviewRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Position of one submission in the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PipelineState {
    Received,
    Normalized,
    Classified,
    Ticketed,
    Recorded,
    /// Negative review stored and notification published
    Dispatched,
    /// Non-negative review stored; nothing to publish
    Done,
    /// Submission carried no usable review text
    Rejected,
    /// Classification or storage failed; nothing persisted
    Failed,
    /// Record stored but notification not delivered
    Partial,
}

impl PipelineState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineState::Dispatched
                | PipelineState::Done
                | PipelineState::Rejected
                | PipelineState::Failed
                | PipelineState::Partial
        )
    }

    /// Whether a transition from `self` to `next` is part of the state machine
    pub fn can_transition_to(&self, next: PipelineState) -> bool {
        use PipelineState::*;
        matches!(
            (self, next),
            (Received, Normalized)
                | (Received, Rejected)
                | (Normalized, Classified)
                | (Normalized, Failed)
                | (Classified, Ticketed)
                | (Ticketed, Recorded)
                | (Ticketed, Failed)
                | (Recorded, Dispatched)
                | (Recorded, Done)
                | (Recorded, Partial)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineState::Received => "RECEIVED",
            PipelineState::Normalized => "NORMALIZED",
            PipelineState::Classified => "CLASSIFIED",
            PipelineState::Ticketed => "TICKETED",
            PipelineState::Recorded => "RECORDED",
            PipelineState::Dispatched => "DISPATCHED",
            PipelineState::Done => "DONE",
            PipelineState::Rejected => "REJECTED",
            PipelineState::Failed => "FAILED",
            PipelineState::Partial => "PARTIAL",
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of running one submission through the pipeline
#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    /// Every state visited, starting at RECEIVED and ending at a terminal state
    pub trail: Vec<PipelineState>,
    /// Stored record (present for DISPATCHED, DONE and PARTIAL)
    pub record: Option<ReviewRecord>,
    /// Classifier confidence, when the provider reported one
    pub score: Option<f32>,
    /// Cause of REJECTED, FAILED or PARTIAL
    pub error: Option<PipelineError>,
}

impl PipelineOutcome {
    /// Terminal state
    pub fn state(&self) -> PipelineState {
        self.trail
            .last()
            .copied()
            .unwrap_or(PipelineState::Received)
    }

    /// Whether the review text was durably stored
    pub fn is_recorded(&self) -> bool {
        self.record.is_some()
    }
}

/// Tracks state transitions for one run
#[derive(Debug)]
pub(crate) struct Run {
    trail: Vec<PipelineState>,
}

impl Run {
    pub(crate) fn start() -> Self {
        Self {
            trail: vec![PipelineState::Received],
        }
    }

    pub(crate) fn current(&self) -> PipelineState {
        self.trail
            .last()
            .copied()
            .unwrap_or(PipelineState::Received)
    }

    pub(crate) fn advance(&mut self, next: PipelineState) {
        debug_assert!(
            self.current().can_transition_to(next),
            "illegal transition {} -> {}",
            self.current(),
            next
        );
        tracing::trace!(from = %self.current(), to = %next, "Pipeline transition");
        self.trail.push(next);
    }

    pub(crate) fn finish(
        self,
        record: Option<ReviewRecord>,
        score: Option<f32>,
        error: Option<PipelineError>,
    ) -> PipelineOutcome {
        PipelineOutcome {
            trail: self.trail,
            record,
            score,
            error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_states() {
        use PipelineState::*;
        for state in [Dispatched, Done, Rejected, Failed, Partial] {
            assert!(state.is_terminal(), "{state}");
        }
        for state in [Received, Normalized, Classified, Ticketed, Recorded] {
            assert!(!state.is_terminal(), "{state}");
        }
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        use PipelineState::*;
        let all = [
            Received, Normalized, Classified, Ticketed, Recorded, Dispatched, Done, Rejected,
            Failed, Partial,
        ];
        for from in all.iter().filter(|s| s.is_terminal()) {
            for to in all {
                assert!(!from.can_transition_to(to), "{from} -> {to}");
            }
        }
    }

    #[test]
    fn test_ticketing_cannot_fail() {
        assert!(!PipelineState::Classified.can_transition_to(PipelineState::Failed));
        assert!(PipelineState::Classified.can_transition_to(PipelineState::Ticketed));
    }

    #[test]
    fn test_state_serializes_upper_case() {
        assert_eq!(
            serde_json::to_string(&PipelineState::Partial).unwrap(),
            "\"PARTIAL\""
        );
        assert_eq!(PipelineState::Dispatched.to_string(), "DISPATCHED");
    }
}
