//! revu-intake library - Review intake service
//!
//! Accepts customer reviews over HTTP, classifies their sentiment, stores a
//! review record per submission and notifies on negative reviews.

pub mod api;
pub mod error;
pub mod pipeline;
pub mod services;
pub mod setup;

pub use crate::error::{ApiError, ApiResult, PipelineError};
pub use crate::pipeline::{PipelineOutcome, PipelineState, ReviewPipeline};

use axum::Router;
use revu_common::events::EventBus;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Orchestrator shared by all requests
    pub pipeline: Arc<ReviewPipeline>,
    /// Event bus for SSE broadcasting
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(pipeline: Arc<ReviewPipeline>) -> Self {
        let event_bus = pipeline.event_bus().clone();
        Self {
            pipeline,
            event_bus,
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    Router::new()
        .route("/", post(api::submit_review))
        .merge(api::review_routes())
        .route("/events", get(api::event_stream))
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
