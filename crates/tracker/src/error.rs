use serde::Serialize;
use studio_core::error::CoreError;

use crate::api::JobApiError;

/// Errors surfaced by the generation tracker.
///
/// Failures of a running job land in the snapshot's error slot as a
/// [`TrackerFailure`](crate::state::TrackerFailure), which keeps the
/// variant next to the display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum TrackerError {
    /// Malformed request, rejected before anything is sent.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A required credential or setting is absent.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Network or HTTP failure during submit or poll.
    #[error("{0}")]
    Transport(String),

    /// The provider reported FAILED, or COMPLETE without any assets.
    #[error("{0}")]
    ProviderFailure(String),

    /// The job outlived `TrackerConfig::max_job_duration`.
    #[error("Generation timed out after {limit_secs}s without a terminal status.")]
    TimedOut { limit_secs: u64 },

    /// `resume_polling` was called without a stalled, non-terminal job.
    #[error("No job is waiting to be resumed")]
    NothingToResume,
}

impl TrackerError {
    /// Whether a user-initiated retry (re-submit or resume) may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, TrackerError::Transport(_) | TrackerError::TimedOut { .. })
    }

    /// Text without the variant prefix, for composing error-slot messages.
    pub fn message(&self) -> String {
        match self {
            TrackerError::Validation(msg)
            | TrackerError::Configuration(msg)
            | TrackerError::Transport(msg)
            | TrackerError::ProviderFailure(msg) => msg.clone(),
            TrackerError::TimedOut { .. } | TrackerError::NothingToResume => self.to_string(),
        }
    }
}

impl From<JobApiError> for TrackerError {
    fn from(err: JobApiError) -> Self {
        match err {
            JobApiError::Configuration(msg) => TrackerError::Configuration(msg),
            other => TrackerError::Transport(other.user_message()),
        }
    }
}

impl From<CoreError> for TrackerError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(msg) => TrackerError::Validation(msg),
            CoreError::Configuration(msg) => TrackerError::Configuration(msg),
        }
    }
}
