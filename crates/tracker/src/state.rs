//! Tracker state and its transitions.
//!
//! [`TrackerState`] is a plain synchronous state machine. The async driver
//! in [`crate::tracker`] feeds it submission and poll results tagged with
//! the epoch (and job id) captured when the work was started; results whose
//! tags no longer match the active submission are discarded without any
//! mutation.
//!
//! ```text
//! Idle -> Submitting -> { Pending <-> Processing } -> Complete | Failed
//! Submitting -> Idle            (submission failed, error set)
//! ```

use std::time::Duration;

use serde::Serialize;
use studio_core::job::{GeneratedAsset, GenerationJob, JobStatus};
use studio_core::types::JobId;

use crate::error::TrackerError;
use crate::messages::JobSnapshot;

// ---------------------------------------------------------------------------
// User-visible messages
// ---------------------------------------------------------------------------

pub const SUBMIT_FAILED_PREFIX: &str = "Failed to start generation";
pub const FETCH_FAILED_PREFIX: &str = "Error fetching result";
pub const PROVIDER_FAILED_MESSAGE: &str = "Image generation failed (API reported failure).";
pub const COMPLETED_EMPTY_MESSAGE: &str = "Generation completed, but no images were returned.";

// ---------------------------------------------------------------------------
// Error slot
// ---------------------------------------------------------------------------

/// Content of the tracker's single error slot: what went wrong, and the
/// text shown for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackerFailure {
    pub kind: TrackerError,
    pub message: String,
}

impl TrackerFailure {
    pub fn new(kind: TrackerError, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// `kind` shown as-is.
    fn plain(kind: TrackerError) -> Self {
        let message = kind.message();
        Self { kind, message }
    }

    /// `kind` shown behind a context prefix, e.g. "Error fetching result".
    fn prefixed(prefix: &str, kind: TrackerError) -> Self {
        let message = format!("{prefix}: {}", kind.message());
        Self { kind, message }
    }
}

impl std::fmt::Display for TrackerFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// Lifecycle phase of the tracked submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TrackerPhase {
    Idle,
    Submitting,
    Pending,
    Processing,
    Complete,
    Failed,
}

impl From<JobStatus> for TrackerPhase {
    fn from(status: JobStatus) -> Self {
        match status {
            JobStatus::Pending => Self::Pending,
            JobStatus::Processing => Self::Processing,
            JobStatus::Complete => Self::Complete,
            JobStatus::Failed => Self::Failed,
        }
    }
}

/// Read-only view of the tracker handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrackerSnapshot {
    pub phase: TrackerPhase,
    /// The active (or last stalled) job, if a submission succeeded.
    pub job: Option<GenerationJob>,
    /// True while a submission is in flight or an armed job is unfinished.
    pub loading: bool,
    /// Whether a poll task is currently armed for `job`.
    pub polling: bool,
    /// The single user-visible error slot.
    pub error: Option<TrackerFailure>,
    /// Last known result set.
    pub assets: Vec<GeneratedAsset>,
}

impl Default for TrackerSnapshot {
    fn default() -> Self {
        Self {
            phase: TrackerPhase::Idle,
            job: None,
            loading: false,
            polling: false,
            error: None,
            assets: Vec::new(),
        }
    }
}

impl TrackerSnapshot {
    /// The error text, or `""` when there is none.
    pub fn error_message(&self) -> &str {
        self.error.as_ref().map_or("", |failure| failure.message.as_str())
    }

    /// What kind of failure the error slot holds, if any.
    pub fn error_kind(&self) -> Option<&TrackerError> {
        self.error.as_ref().map(|failure| &failure.kind)
    }

    pub fn job_id(&self) -> Option<&JobId> {
        self.job.as_ref().map(|job| &job.id)
    }

    /// A kept job that is unfinished but no longer polled, i.e. after a
    /// poll failure or timeout.
    pub fn can_resume(&self) -> bool {
        !self.polling && self.job.as_ref().is_some_and(|job| !job.is_terminal())
    }
}

// ---------------------------------------------------------------------------
// Transition outcomes
// ---------------------------------------------------------------------------

/// What the driver should do after a submission result was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The job was accepted; start polling it.
    StartPolling(JobId),
    /// The submission failed and the error slot was set.
    Failed,
    /// The result belonged to a superseded submission.
    Ignored,
}

/// What the poll loop should do after a poll result was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    /// Status is still non-terminal; poll again after the interval.
    Continue,
    /// Terminal status or poll failure; stop polling this job.
    Stop,
    /// The result belonged to an abandoned job; stop without changes.
    Ignored,
}

// ---------------------------------------------------------------------------
// TrackerState
// ---------------------------------------------------------------------------

/// Mutable tracker state. Owned by one tracker, never shared across
/// trackers.
#[derive(Debug, Default)]
pub struct TrackerState {
    /// Bumped by every submit, cancel and resume. Work tagged with an older
    /// epoch is stale.
    epoch: u64,
    /// Prompt of the current submission, used when assets omit theirs.
    prompt: String,
    snapshot: TrackerSnapshot,
}

impl TrackerState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> &TrackerSnapshot {
        &self.snapshot
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Start a fresh submission, abandoning whatever was tracked before.
    ///
    /// Clears the result set and the error slot immediately so stale
    /// results are never shown against the new request. Returns the epoch
    /// to tag the submission's result with.
    pub fn begin_submission(&mut self, prompt: &str) -> u64 {
        self.epoch += 1;
        self.prompt = prompt.to_string();
        self.snapshot = TrackerSnapshot {
            phase: TrackerPhase::Submitting,
            ..TrackerSnapshot::default()
        };
        self.refresh_loading();
        self.epoch
    }

    /// Apply the outcome of the submission started at `epoch`.
    pub fn apply_submit_result(
        &mut self,
        epoch: u64,
        result: Result<JobId, TrackerError>,
    ) -> SubmitOutcome {
        if epoch != self.epoch || self.snapshot.phase != TrackerPhase::Submitting {
            return SubmitOutcome::Ignored;
        }

        let outcome = match result {
            Ok(job_id) => {
                self.snapshot.job = Some(GenerationJob::new(job_id.clone()));
                self.snapshot.phase = TrackerPhase::Pending;
                self.snapshot.polling = true;
                SubmitOutcome::StartPolling(job_id)
            }
            Err(err) => {
                self.snapshot.job = None;
                self.snapshot.phase = TrackerPhase::Idle;
                self.snapshot.polling = false;
                self.snapshot.error = Some(TrackerFailure::prefixed(SUBMIT_FAILED_PREFIX, err));
                SubmitOutcome::Failed
            }
        };
        self.refresh_loading();
        outcome
    }

    /// Apply one poll observation for `job_id`, started at `epoch`.
    pub fn apply_poll_result(
        &mut self,
        epoch: u64,
        job_id: &JobId,
        result: Result<JobSnapshot, TrackerError>,
    ) -> PollOutcome {
        if !self.is_armed_for(epoch, job_id) {
            return PollOutcome::Ignored;
        }
        let Some(job) = self.snapshot.job.as_mut() else {
            return PollOutcome::Ignored;
        };
        if job.is_terminal() {
            // Repeated terminal responses never resurrect polling.
            self.snapshot.polling = false;
            self.refresh_loading();
            return PollOutcome::Stop;
        }

        let outcome = match result {
            Ok(observed) => {
                let status = observed.status;
                match status {
                    JobStatus::Pending | JobStatus::Processing => {
                        job.observe(status, Vec::new());
                        PollOutcome::Continue
                    }
                    JobStatus::Complete => {
                        let assets = observed.into_assets(&self.prompt);
                        job.observe(status, assets.clone());
                        if assets.is_empty() {
                            self.snapshot.error = Some(TrackerFailure::plain(
                                TrackerError::ProviderFailure(COMPLETED_EMPTY_MESSAGE.into()),
                            ));
                        } else {
                            self.snapshot.assets = assets;
                            self.snapshot.error = None;
                        }
                        PollOutcome::Stop
                    }
                    JobStatus::Failed => {
                        job.observe(status, Vec::new());
                        self.snapshot.error = Some(TrackerFailure::plain(
                            TrackerError::ProviderFailure(PROVIDER_FAILED_MESSAGE.into()),
                        ));
                        PollOutcome::Stop
                    }
                }
            }
            Err(err) => {
                // The stale job id is kept so the caller may resume polling.
                self.snapshot.error = Some(TrackerFailure::prefixed(FETCH_FAILED_PREFIX, err));
                PollOutcome::Stop
            }
        };

        if let Some(job) = &self.snapshot.job {
            self.snapshot.phase = job.status.into();
        }
        if outcome == PollOutcome::Stop {
            self.snapshot.polling = false;
        }
        self.refresh_loading();
        outcome
    }

    /// Give up on a job that exceeded `limit` without a terminal status.
    ///
    /// Returns `false` if the job was no longer armed.
    pub fn apply_timeout(&mut self, epoch: u64, job_id: &JobId, limit: Duration) -> bool {
        if !self.is_armed_for(epoch, job_id) {
            return false;
        }
        self.snapshot.polling = false;
        self.snapshot.error = Some(TrackerFailure::plain(TrackerError::TimedOut {
            limit_secs: limit.as_secs(),
        }));
        self.refresh_loading();
        true
    }

    /// Drop interest in the active job. Assets and error are left as they
    /// are. Returns whether anything was being tracked.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.snapshot.loading || self.snapshot.job.is_some();
        self.epoch += 1;
        self.snapshot.job = None;
        self.snapshot.polling = false;
        self.snapshot.phase = TrackerPhase::Idle;
        self.refresh_loading();
        was_active
    }

    /// Re-arm polling for a kept, non-terminal job whose polling stopped
    /// after a transport failure or timeout.
    pub fn begin_resume(&mut self) -> Result<(u64, JobId), TrackerError> {
        let job_id = match &self.snapshot.job {
            Some(job) if self.snapshot.can_resume() => job.id.clone(),
            _ => return Err(TrackerError::NothingToResume),
        };
        self.epoch += 1;
        self.snapshot.polling = true;
        self.snapshot.error = None;
        self.refresh_loading();
        Ok((self.epoch, job_id))
    }

    // ---- private helpers ----

    fn is_armed_for(&self, epoch: u64, job_id: &JobId) -> bool {
        epoch == self.epoch
            && self.snapshot.polling
            && self.snapshot.job_id() == Some(job_id)
    }

    /// `loading` is derived, never set directly: a submission without a job
    /// id yet, or an armed job that has not finished.
    fn refresh_loading(&mut self) {
        let submitting = self.snapshot.phase == TrackerPhase::Submitting;
        let armed_job = self.snapshot.polling
            && self
                .snapshot
                .job
                .as_ref()
                .is_some_and(|job| !job.is_terminal());
        self.snapshot.loading = submitting || armed_job;
    }
}
