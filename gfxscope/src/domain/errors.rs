//! Structured error types for gfxscope
//!
//! Using thiserror for automatic Display implementation and error chaining.

use super::types::Tid;
use thiserror::Error;

/// Errors raised while laying out or querying a timeline.
///
/// Both variants indicate a schema mismatch between the trace producer and
/// this viewer. Empty sequences and out-of-range queries are not errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("No render attributes registered for event type {code}")]
    UnknownEventType { code: u32 },

    #[error("Thread {0} is missing from the thread table")]
    UnknownThread(Tid),
}

/// Errors raised while loading a trace document.
#[derive(Error, Debug)]
pub enum TraceError {
    #[error("Invalid trace data: {0}")]
    InvalidTrace(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}
