//! Error types for the coordinator
//!
//! Centralized error handling using thiserror.

use std::collections::TryReserveError;

use thiserror::Error;

/// All error types that can occur while building or driving a coordinator
#[derive(Debug, Error)]
pub enum AwaitableError {
    /// Growing a task list, value store, or bridge failed
    #[error("Allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// The coordinator already finished its drive cycle
    #[error("cannot reuse already awaited coordinator")]
    Reuse,

    /// A registered sub-task exposes no suspension point
    #[error("{0} has no suspension point")]
    Capability(String),

    /// Operation not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// A sub-task raised while being drained
    #[error("Sub-task raised: {0}")]
    Raised(String),

    /// A completion callback reported failure
    #[error("Callback failed: {0}")]
    Callback(String),

    /// A sub-task kept yielding past the configured limit
    #[error("Step limit exceeded: {task} yielded more than {limit} steps")]
    StepLimit { task: String, limit: u64 },
}

impl AwaitableError {
    /// Shorthand for a state error
    pub fn state(msg: impl Into<String>) -> Self {
        Self::InvalidState(msg.into())
    }

    /// Shorthand for a sub-task failure
    pub fn raised(msg: impl Into<String>) -> Self {
        Self::Raised(msg.into())
    }

    /// Shorthand for a callback failure
    pub fn callback(msg: impl Into<String>) -> Self {
        Self::Callback(msg.into())
    }
}

/// Result type alias for coordinator operations
pub type Result<T> = std::result::Result<T, AwaitableError>;
