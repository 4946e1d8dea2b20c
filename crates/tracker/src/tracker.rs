//! [`GenerationTracker`]: the async driver around [`TrackerState`].
//!
//! Each submission gets its own [`CancellationToken`] and a single spawned
//! task that submits, then polls. Submitting again or calling
//! [`cancel`](GenerationTracker::cancel) cancels the previous task; the
//! epoch check in [`TrackerState`] additionally discards anything the old
//! task manages to deliver late.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use studio_core::generation::GenerationRequest;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::api::JobApi;
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::poller::{self, PollTarget};
use crate::state::{SubmitOutcome, TrackerSnapshot, TrackerState};

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

/// State shared between the tracker handle and its background task.
pub(crate) struct Shared {
    state: Mutex<TrackerState>,
    snapshot_tx: watch::Sender<TrackerSnapshot>,
}

impl Shared {
    fn new() -> Self {
        let state = TrackerState::new();
        let (snapshot_tx, _) = watch::channel(state.snapshot().clone());
        Self {
            state: Mutex::new(state),
            snapshot_tx,
        }
    }

    /// Apply `f` to the state and publish the resulting snapshot.
    ///
    /// Publishing happens under the lock so subscribers see changes in the
    /// order they were made.
    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut TrackerState) -> R) -> R {
        let mut state = self.lock();
        let result = f(&mut state);
        self.snapshot_tx.send_replace(state.snapshot().clone());
        result
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        // Transitions never panic midway, so a poisoned lock still holds
        // consistent state.
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

// ---------------------------------------------------------------------------
// GenerationTracker
// ---------------------------------------------------------------------------

/// Tracks at most one generation job at a time.
///
/// Must be used from within a Tokio runtime: [`submit`](Self::submit) and
/// [`resume_polling`](Self::resume_polling) spawn tasks onto it.
pub struct GenerationTracker {
    api: Arc<dyn JobApi>,
    config: TrackerConfig,
    shared: Arc<Shared>,
    /// Token of the currently running submit/poll task.
    active: Mutex<CancellationToken>,
}

impl GenerationTracker {
    /// Fails with [`TrackerError::Configuration`] if `config` does not pass
    /// [`TrackerConfig::check`].
    pub fn new(api: Arc<dyn JobApi>, config: TrackerConfig) -> Result<Self, TrackerError> {
        config.check()?;
        Ok(Self {
            api,
            config,
            shared: Arc::new(Shared::new()),
            active: Mutex::new(CancellationToken::new()),
        })
    }

    /// The API this tracker submits through.
    pub fn api(&self) -> &Arc<dyn JobApi> {
        &self.api
    }

    /// Start a new generation, abandoning any job tracked so far.
    ///
    /// A blank prompt is rejected with [`TrackerError::Validation`] before
    /// anything changes. Otherwise the snapshot immediately shows
    /// `loading = true` with no error and no assets; the outcome of the
    /// submission arrives asynchronously through [`subscribe`](Self::subscribe).
    pub fn submit(&self, request: GenerationRequest) -> Result<(), TrackerError> {
        if !request.has_prompt() {
            return Err(TrackerError::Validation("Prompt is required.".to_string()));
        }

        let cancel = self.replace_token();
        let epoch = self
            .shared
            .update(|state| state.begin_submission(&request.prompt));

        tracing::info!(epoch, model_id = %request.model_id, "Submitting generation");

        let api = Arc::clone(&self.api);
        let shared = Arc::clone(&self.shared);
        let config = self.config.clone();
        tokio::spawn(async move {
            let result = tokio::select! {
                _ = cancel.cancelled() => {
                    tracing::debug!(epoch, "Submission abandoned");
                    return;
                }
                result = api.submit(&request) => result.map_err(TrackerError::from),
            };
            if let Err(e) = &result {
                tracing::warn!(epoch, error = %e, "Generation submission failed");
            }

            let outcome = shared.update(|state| state.apply_submit_result(epoch, result));
            match outcome {
                SubmitOutcome::StartPolling(job_id) => {
                    tracing::info!(epoch, job_id = %job_id, "Generation accepted");
                    let target = PollTarget { epoch, job_id };
                    poller::run(api, shared, target, config, cancel).await;
                }
                SubmitOutcome::Failed => {}
                SubmitOutcome::Ignored => {
                    tracing::debug!(epoch, "Discarded stale submission result");
                }
            }
        });

        Ok(())
    }

    /// Drop interest in the active job. The last assets and error stay
    /// visible.
    pub fn cancel(&self) {
        self.replace_token();
        if self.shared.update(TrackerState::cancel) {
            tracing::info!("Generation tracking cancelled");
        }
    }

    /// Re-arm polling for a job whose polling stopped after a transport
    /// failure or a timeout.
    pub fn resume_polling(&self) -> Result<(), TrackerError> {
        let (epoch, job_id) = self.shared.update(TrackerState::begin_resume)?;
        let cancel = self.replace_token();

        tracing::info!(epoch, job_id = %job_id, "Resuming polling");

        let target = PollTarget { epoch, job_id };
        tokio::spawn(poller::run(
            Arc::clone(&self.api),
            Arc::clone(&self.shared),
            target,
            self.config.clone(),
            cancel,
        ));
        Ok(())
    }

    /// Current state.
    pub fn snapshot(&self) -> TrackerSnapshot {
        self.shared.snapshot_tx.borrow().clone()
    }

    /// Receive every state change.
    pub fn subscribe(&self) -> watch::Receiver<TrackerSnapshot> {
        self.shared.snapshot_tx.subscribe()
    }

    /// Wait until nothing is loading and return the state at that point.
    pub async fn settled(&self) -> TrackerSnapshot {
        let mut rx = self.subscribe();
        let result = rx.wait_for(|snapshot| !snapshot.loading).await;
        match result {
            Ok(snapshot) => snapshot.clone(),
            // The sender lives in `self`, so this only happens on teardown.
            Err(_) => self.snapshot(),
        }
    }

    // ---- private helpers ----

    /// Cancel the running task and install a fresh token for the next one.
    fn replace_token(&self) -> CancellationToken {
        let mut active = self.active.lock().unwrap_or_else(PoisonError::into_inner);
        active.cancel();
        *active = CancellationToken::new();
        active.clone()
    }
}

impl Drop for GenerationTracker {
    fn drop(&mut self) {
        self.active
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}
