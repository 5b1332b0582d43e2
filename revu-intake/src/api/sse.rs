//! Server-Sent Events endpoint for pipeline events

use axum::{
    extract::State,
    response::sse::{Event, Sse},
};
use futures::stream::Stream;
use std::convert::Infallible;

use crate::AppState;

/// GET /events
///
/// Streams every pipeline outcome (recorded, dispatched, rejected, failed,
/// dispatch failed) as it happens.
pub async fn event_stream(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    revu_common::sse::create_event_sse_stream("revu-intake", &state.event_bus)
}
