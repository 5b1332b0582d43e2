//! HTTP API handlers for revu-intake

pub mod health;
pub mod reviews;
pub mod sse;

pub use health::health_routes;
pub use reviews::{review_routes, submit_review};
pub use sse::event_stream;
