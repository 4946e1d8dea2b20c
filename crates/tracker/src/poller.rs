//! Status poll loop for a single job.
//!
//! Polls immediately, then every `poll_interval`, until the job reaches a
//! terminal status, a poll fails, the optional deadline passes, or the
//! cancellation token fires.

use std::sync::Arc;

use studio_core::types::JobId;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::api::JobApi;
use crate::config::TrackerConfig;
use crate::error::TrackerError;
use crate::state::PollOutcome;
use crate::tracker::Shared;

/// The job a poll task is bound to, and the epoch it was armed at.
#[derive(Debug, Clone)]
pub(crate) struct PollTarget {
    pub epoch: u64,
    pub job_id: JobId,
}

/// Run the poll loop until the job settles or `cancel` is triggered.
pub(crate) async fn run(
    api: Arc<dyn JobApi>,
    shared: Arc<Shared>,
    target: PollTarget,
    config: TrackerConfig,
    cancel: CancellationToken,
) {
    let PollTarget { epoch, job_id } = target;

    let mut ticker = tokio::time::interval(config.poll_interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let deadline = config.max_job_duration.map(|limit| (Instant::now() + limit, limit));
    let expired = async {
        match deadline {
            Some((at, _)) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    };
    tokio::pin!(expired);

    tracing::info!(
        job_id = %job_id,
        epoch,
        poll_interval_ms = config.poll_interval.as_millis() as u64,
        "Polling started",
    );

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %job_id, epoch, "Polling cancelled");
                break;
            }
            _ = &mut expired => {
                give_up(&shared, epoch, &job_id, deadline);
                break;
            }
            _ = ticker.tick() => {}
        }

        let result = tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(job_id = %job_id, epoch, "Polling cancelled mid-request");
                break;
            }
            _ = &mut expired => {
                give_up(&shared, epoch, &job_id, deadline);
                break;
            }
            result = api.poll(&job_id) => result.map_err(TrackerError::from),
        };

        match &result {
            Ok(snapshot) => {
                tracing::debug!(job_id = %job_id, status = %snapshot.status, "Poll response")
            }
            Err(e) => tracing::warn!(job_id = %job_id, error = %e, "Poll failed"),
        }

        let outcome = shared.update(|state| state.apply_poll_result(epoch, &job_id, result));
        match outcome {
            PollOutcome::Continue => {}
            PollOutcome::Stop => {
                tracing::info!(job_id = %job_id, epoch, "Polling stopped");
                break;
            }
            PollOutcome::Ignored => {
                tracing::debug!(job_id = %job_id, epoch, "Discarded stale poll result");
                break;
            }
        }
    }
}

fn give_up(
    shared: &Shared,
    epoch: u64,
    job_id: &JobId,
    deadline: Option<(Instant, std::time::Duration)>,
) {
    let Some((_, limit)) = deadline else {
        return;
    };
    if shared.update(|state| state.apply_timeout(epoch, job_id, limit)) {
        tracing::warn!(
            job_id = %job_id,
            limit_secs = limit.as_secs(),
            "Job exceeded its time limit, polling stopped",
        );
    }
}
