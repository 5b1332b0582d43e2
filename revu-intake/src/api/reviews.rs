//! Review submission and lookup endpoints
//!
//! - POST /                                   submit a review
//! - GET  /api/reviews/:ticket_id             fetch a stored record
//! - POST /api/reviews/:ticket_id/redispatch  retry a failed notification
//! - GET  /api/dispatches/pending             tickets awaiting redispatch

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use revu_common::{ReviewRecord, SentimentLabel, TicketId};
use serde::Serialize;

use crate::error::{ApiError, ApiResult};
use crate::pipeline::{PipelineOutcome, PipelineState, RedispatchError};
use crate::AppState;

/// Body returned for an accepted submission
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResponse {
    pub ticket_id: TicketId,
    pub sentiment: SentimentLabel,
    pub text: String,
    /// Terminal pipeline state
    pub state: PipelineState,
    /// True only when the negative-review notification was published
    pub notified: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f32>,
    /// Dispatch failure of a PARTIAL run, in the shape `ApiError` uses
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: &'static str,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PendingDispatchesResponse {
    pub ticket_ids: Vec<TicketId>,
}

/// POST /
///
/// The pipeline runs on its own task: if the caller disconnects, the
/// store write and any dispatch still run to completion.
pub async fn submit_review(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let pipeline = state.pipeline.clone();
    let outcome = tokio::spawn(async move { pipeline.process_json(&body).await })
        .await
        .map_err(|e| ApiError::Internal(format!("pipeline task aborted: {}", e)))?;

    outcome_response(outcome)
}

fn outcome_response(outcome: PipelineOutcome) -> ApiResult<(StatusCode, Json<SubmissionResponse>)> {
    let state = outcome.state();
    let (status, error) = match state {
        PipelineState::Done | PipelineState::Dispatched => (StatusCode::CREATED, None),
        // Stored but the notification is still owed: the dispatch error's
        // status, with the durable ticket in the body
        PipelineState::Partial => match outcome.error {
            Some(err) => (
                err.status(),
                Some(ErrorBody {
                    code: err.code(),
                    message: err.to_string(),
                }),
            ),
            None => {
                return Err(ApiError::Internal(
                    "pipeline ended in PARTIAL without an error".to_string(),
                ))
            }
        },
        _ => {
            return Err(match outcome.error {
                Some(err) => ApiError::Pipeline(err),
                None => ApiError::Internal(format!("pipeline ended in {} without an error", state)),
            })
        }
    };

    let record = outcome
        .record
        .ok_or_else(|| ApiError::Internal(format!("pipeline ended in {} without a record", state)))?;

    Ok((
        status,
        Json(SubmissionResponse {
            ticket_id: record.ticket_id,
            sentiment: record.sentiment,
            text: record.text,
            state,
            notified: state == PipelineState::Dispatched,
            score: outcome.score,
            error,
        }),
    ))
}

fn parse_ticket_id(raw: &str) -> ApiResult<TicketId> {
    raw.parse::<TicketId>()
        .map_err(|e| ApiError::BadRequest(e.to_string()))
}

/// GET /api/reviews/:ticket_id
pub async fn get_review(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> ApiResult<Json<ReviewRecord>> {
    let ticket_id = parse_ticket_id(&ticket_id)?;

    state
        .pipeline
        .store()
        .get(&ticket_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("review {}", ticket_id)))
}

/// POST /api/reviews/:ticket_id/redispatch
pub async fn redispatch_review(
    State(state): State<AppState>,
    Path(ticket_id): Path<String>,
) -> ApiResult<Json<ReviewRecord>> {
    let ticket_id = parse_ticket_id(&ticket_id)?;

    match state.pipeline.redispatch(&ticket_id).await {
        Ok(record) => Ok(Json(record)),
        Err(RedispatchError::NotFound(id)) => Err(ApiError::NotFound(format!("review {}", id))),
        Err(err @ RedispatchError::NotNotifiable(_)) => Err(ApiError::Conflict(err.to_string())),
        Err(RedispatchError::Pipeline(err)) => Err(ApiError::Pipeline(err)),
    }
}

/// GET /api/dispatches/pending
pub async fn pending_dispatches(
    State(state): State<AppState>,
) -> ApiResult<Json<PendingDispatchesResponse>> {
    let ticket_ids = state
        .pipeline
        .store()
        .pending_dispatches()
        .await?;

    Ok(Json(PendingDispatchesResponse { ticket_ids }))
}

/// Build review lookup routes
pub fn review_routes() -> Router<AppState> {
    Router::new()
        .route("/api/reviews/:ticket_id", get(get_review))
        .route("/api/reviews/:ticket_id/redispatch", post(redispatch_review))
        .route("/api/dispatches/pending", get(pending_dispatches))
}
