use std::time::Duration;
use thiserror::Error;

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Errors that can occur while building or running a pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration rejected before any thread was spawned
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// A stage thread panicked and could not return a result
    #[error("Thread join error: {0}")]
    ThreadError(String),

    /// A bounded wait expired with no message arriving (liveness failure)
    #[error("{stage} {id} stalled waiting on an empty queue for {timeout:?}")]
    Stalled {
        stage: &'static str,
        id: usize,
        timeout: Duration,
    },
}
