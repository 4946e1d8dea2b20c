//! End-to-end tracker behaviour against a scripted API on a paused clock.

mod common;

use std::sync::Arc;
use std::time::Duration;

use assert_matches::assert_matches;
use common::{Reply, ScriptedApi, POLL_INTERVAL};
use studio_core::generation::GenerationRequest;
use studio_core::job::JobStatus;
use studio_tracker::state::{COMPLETED_EMPTY_MESSAGE, PROVIDER_FAILED_MESSAGE};
use studio_tracker::{
    GenerationTracker, TrackerConfig, TrackerError, TrackerPhase, TrackerSnapshot,
};
use tokio::time::{sleep, Instant};

fn urls(snapshot: &TrackerSnapshot) -> Vec<&str> {
    snapshot.assets.iter().map(|a| a.url.as_str()).collect()
}

// ---------------------------------------------------------------------------
// Happy path and cadence
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn lion_pending_then_complete() {
    let api = Arc::new(
        ScriptedApi::new()
            .accept("g1")
            .status("g1", JobStatus::Pending)
            .complete("g1", &["http://x/1.png"]),
    );
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let snapshot = tracker.snapshot();
    assert!(snapshot.loading);
    assert_eq!(snapshot.error_message(), "");
    assert!(snapshot.assets.is_empty());

    let done = tracker.settled().await;
    assert!(!done.loading);
    assert_eq!(done.error_message(), "");
    assert_eq!(urls(&done), ["http://x/1.png"]);
    assert_eq!(done.assets[0].prompt, "lion");
    assert_eq!(done.phase, TrackerPhase::Complete);
    assert_eq!(api.poll_count("g1"), 2);
}

#[tokio::test(start_paused = true)]
async fn polls_immediately_then_every_interval_until_terminal() {
    let api = Arc::new(
        ScriptedApi::new()
            .accept("g1")
            .status("g1", JobStatus::Pending)
            .status("g1", JobStatus::Processing)
            .status("g1", JobStatus::Processing)
            .complete("g1", &["http://x/1.png", "http://x/2.png"]),
    );
    let tracker = common::tracker(api.clone());
    let start = Instant::now();

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let done = tracker.settled().await;
    assert_eq!(urls(&done), ["http://x/1.png", "http://x/2.png"]);

    let times = api.poll_times("g1");
    assert_eq!(times.len(), 4);
    assert!(times[0].duration_since(start) < Duration::from_millis(1));
    for pair in times.windows(2) {
        assert_eq!(pair[1].duration_since(pair[0]), POLL_INTERVAL);
    }

    // Nothing more is requested once the job is terminal.
    sleep(Duration::from_secs(60)).await;
    assert_eq!(api.poll_count("g1"), 4);
}

#[tokio::test(start_paused = true)]
async fn failed_status_stops_polling_with_error() {
    let api = Arc::new(
        ScriptedApi::new()
            .accept("g1")
            .status("g1", JobStatus::Processing)
            .status("g1", JobStatus::Failed),
    );
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let done = tracker.settled().await;

    assert_eq!(done.error_message(), PROVIDER_FAILED_MESSAGE);
    assert_eq!(done.phase, TrackerPhase::Failed);
    assert!(done.assets.is_empty());

    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.poll_count("g1"), 2);
}

#[tokio::test(start_paused = true)]
async fn complete_without_assets_reports_error() {
    let api = Arc::new(ScriptedApi::new().accept("g1").complete("g1", &[]));
    let tracker = common::tracker(api);

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let done = tracker.settled().await;

    assert_eq!(done.error_message(), COMPLETED_EMPTY_MESSAGE);
    assert!(done.assets.is_empty());
}

// ---------------------------------------------------------------------------
// Supersession and cancellation
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn second_submission_ignores_first_job() {
    // Each poll takes 2s; job "a" would complete on its second poll (t=5..7).
    let api = Arc::new(
        ScriptedApi::new()
            .with_poll_delay(Duration::from_secs(2))
            .accept("a")
            .accept("b")
            .status("a", JobStatus::Pending)
            .complete("a", &["http://x/a.png"])
            .complete("b", &["http://x/b.png"]),
    );
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("first")).unwrap();
    sleep(Duration::from_secs(6)).await;
    assert_eq!(api.poll_count("a"), 2);

    tracker.submit(GenerationRequest::new("second")).unwrap();
    let snapshot = tracker.snapshot();
    assert!(snapshot.loading);
    assert!(snapshot.job.is_none());
    assert!(snapshot.assets.is_empty());

    // Past the point where job "a" would have answered COMPLETE.
    sleep(Duration::from_millis(1500)).await;
    assert!(tracker.snapshot().assets.is_empty());

    let done = tracker.settled().await;
    assert_eq!(urls(&done), ["http://x/b.png"]);
    assert_eq!(done.job_id().map(|id| id.as_str()), Some("b"));
    assert_eq!(done.assets[0].prompt, "second");

    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.poll_count("a"), 2);
    assert_eq!(urls(&tracker.snapshot()), ["http://x/b.png"]);
}

#[tokio::test(start_paused = true)]
async fn cancel_stops_polling_and_keeps_last_results() {
    let api = Arc::new(
        ScriptedApi::new()
            .accept("g0")
            .complete("g0", &["http://x/0.png"])
            .accept("g1")
            .status("g1", JobStatus::Pending),
    );
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("warmup")).unwrap();
    tracker.settled().await;

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    sleep(Duration::from_secs(6)).await;
    assert_eq!(api.poll_count("g1"), 2);

    tracker.cancel();
    let snapshot = tracker.snapshot();
    assert!(!snapshot.loading);
    assert!(snapshot.job.is_none());
    assert_eq!(snapshot.phase, TrackerPhase::Idle);

    sleep(Duration::from_secs(60)).await;
    assert_eq!(api.poll_count("g1"), 2);
}

#[tokio::test(start_paused = true)]
async fn cancel_during_submission_discards_late_job_id() {
    let api = Arc::new(
        ScriptedApi::new()
            .with_submit_delay(Duration::from_secs(3))
            .accept("late")
            .status("late", JobStatus::Pending),
    );
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    sleep(Duration::from_secs(1)).await;
    tracker.cancel();

    sleep(Duration::from_secs(30)).await;
    let snapshot = tracker.snapshot();
    assert!(snapshot.job.is_none());
    assert!(!snapshot.loading);
    assert_eq!(api.poll_count("late"), 0);
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn blank_prompt_rejected_without_network_call() {
    let api = Arc::new(ScriptedApi::new().accept("g1"));
    let tracker = common::tracker(api.clone());

    let err = tracker
        .submit(GenerationRequest::new("   "))
        .unwrap_err();

    assert_matches!(err, TrackerError::Validation(_));
    assert_eq!(tracker.snapshot(), TrackerSnapshot::default());
    sleep(Duration::from_secs(10)).await;
    assert_eq!(api.submit_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn missing_credentials_fail_submission() {
    let api = Arc::new(ScriptedApi::new().push_submit(Reply::Unconfigured(
        "API key for Leonardo.ai is not configured.".into(),
    )));
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let done = tracker.settled().await;

    assert_eq!(
        done.error_message(),
        "Failed to start generation: API key for Leonardo.ai is not configured."
    );
    assert!(done.job.is_none());
    assert_eq!(done.phase, TrackerPhase::Idle);
    assert_eq!(api.submit_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn configuration_and_transport_failures_stay_distinct() {
    let api = Arc::new(
        ScriptedApi::new()
            .push_submit(Reply::Unconfigured(
                "API key for Leonardo.ai is not configured.".into(),
            ))
            .push_submit(Reply::Http(502, "Bad Gateway".into())),
    );
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let unconfigured = tracker.settled().await;
    assert_matches!(
        unconfigured.error_kind(),
        Some(TrackerError::Configuration(msg)) if msg.contains("API key")
    );
    assert!(!unconfigured.error_kind().is_some_and(TrackerError::is_retryable));

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let unreachable = tracker.settled().await;
    assert_eq!(
        unreachable.error_kind(),
        Some(&TrackerError::Transport("Bad Gateway".into()))
    );
    assert!(unreachable.error_kind().is_some_and(TrackerError::is_retryable));
    assert_eq!(api.submit_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn transport_failure_keeps_job_until_resumed() {
    let api = Arc::new(
        ScriptedApi::new()
            .accept("g1")
            .poll_reply("g1", Reply::Http(502, "Bad Gateway".into()))
            .complete("g1", &["http://x/1.png"]),
    );
    let tracker = common::tracker(api.clone());

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let stalled = tracker.settled().await;
    assert_eq!(stalled.error_message(), "Error fetching result: Bad Gateway");
    assert_matches!(stalled.error_kind(), Some(TrackerError::Transport(_)));
    assert_eq!(stalled.job_id().map(|id| id.as_str()), Some("g1"));

    // Never retried automatically.
    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.poll_count("g1"), 1);

    tracker.resume_polling().unwrap();
    assert!(tracker.snapshot().loading);
    let done = tracker.settled().await;
    assert_eq!(done.error_message(), "");
    assert_eq!(urls(&done), ["http://x/1.png"]);
    assert_eq!(api.poll_count("g1"), 2);
}

#[tokio::test(start_paused = true)]
async fn resume_without_stalled_job_is_refused() {
    let api = Arc::new(ScriptedApi::new().accept("g1").status("g1", JobStatus::Pending));
    let tracker = common::tracker(api.clone());

    assert_eq!(tracker.resume_polling(), Err(TrackerError::NothingToResume));

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(tracker.resume_polling(), Err(TrackerError::NothingToResume));

    // The refused resume left the running poll task alone.
    sleep(Duration::from_secs(5)).await;
    assert_eq!(api.poll_count("g1"), 2);
}

#[tokio::test(start_paused = true)]
async fn job_time_limit_stops_polling() {
    let api = Arc::new(ScriptedApi::new().accept("g1").status("g1", JobStatus::Pending));
    let config = TrackerConfig {
        poll_interval: POLL_INTERVAL,
        max_job_duration: Some(Duration::from_secs(12)),
    };
    let tracker = common::tracker_with(api.clone(), config);

    tracker.submit(GenerationRequest::new("lion")).unwrap();
    let done = tracker.settled().await;

    assert_eq!(
        done.error_message(),
        "Generation timed out after 12s without a terminal status."
    );
    assert_eq!(done.error_kind(), Some(&TrackerError::TimedOut { limit_secs: 12 }));
    assert_eq!(api.poll_count("g1"), 3);

    sleep(Duration::from_secs(30)).await;
    assert_eq!(api.poll_count("g1"), 3);
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_is_rejected_up_front() {
    let api = Arc::new(ScriptedApi::new().accept("g1").status("g1", JobStatus::Pending));
    let config = TrackerConfig {
        poll_interval: Duration::ZERO,
        max_job_duration: None,
    };

    let err = GenerationTracker::new(api.clone(), config).err();

    assert_matches!(err, Some(TrackerError::Configuration(_)));
    assert_eq!(api.submit_count(), 0);
}
