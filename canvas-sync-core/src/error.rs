use thiserror::Error;

/// Error type for one synchronization run.
///
/// Only two classes of failure abort a run: structural invariant violations
/// (a construction-order bug, not a data problem) and an interruption during
/// a payload write. Per-item failures are recorded in the run report instead
/// and never surface here.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("remote API request failed: {0}")]
    Api(String),

    #[error("filesystem operation failed")]
    Io(#[from] std::io::Error),

    #[error("synchronization interrupted")]
    Interrupted,

    #[error("hierarchy invariant violated: {0}")]
    Structure(String),
}

impl SyncError {
    /// Wrap a boxed API error for the cases where a failed call cannot be
    /// skipped locally.
    pub fn api(err: crate::contract::ApiError) -> Self {
        SyncError::Api(err.to_string())
    }
}
