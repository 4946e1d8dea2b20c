use std::sync::Arc;

use anyhow::{bail, Context, Result};
use studio_tracker::{ClientConfig, GenerationTracker, HttpJobApi, TrackerError, TrackerSnapshot};

use crate::cli::GenerateArgs;
use crate::render::Renderer;

/// Submit one generation and follow it until it settles or Ctrl-C.
pub async fn run(config: ClientConfig, args: GenerateArgs) -> Result<()> {
    let request = args.to_request()?;
    let api = HttpJobApi::with_timeout(config.api_url.clone(), config.http_timeout)?;
    let tracker = GenerationTracker::new(Arc::new(api), config.tracker.clone())?;

    let mut updates = tracker.subscribe();
    let mut renderer = Renderer::new(std::io::stdout());
    let mut retries_left = args.poll_retries;

    tracker.submit(request)?;

    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    let settled = loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                tracker.cancel();
                bail!("Cancelled");
            }
            changed = updates.changed() => {
                changed.context("Tracker stopped unexpectedly")?;
                let snapshot = updates.borrow_and_update().clone();
                renderer.render(&snapshot)?;

                if snapshot.loading {
                    continue;
                }
                if retries_left > 0 && should_resume(&snapshot) {
                    retries_left -= 1;
                    tracing::info!(retries_left, "Resuming polling after failed status check");
                    tracker.resume_polling()?;
                    continue;
                }
                break snapshot;
            }
        }
    };

    outcome(&settled)
}

/// A stalled job is worth resuming only after a failure a retry can fix.
fn should_resume(snapshot: &TrackerSnapshot) -> bool {
    snapshot.can_resume() && snapshot.error_kind().is_some_and(TrackerError::is_retryable)
}

fn outcome(snapshot: &TrackerSnapshot) -> Result<()> {
    match &snapshot.error {
        None => Ok(()),
        Some(failure) => match failure.kind {
            TrackerError::Configuration(_) => bail!(
                "{failure}\nThe proxy has no provider credentials; \
                 set LEONARDO_API_KEY where studio-api runs."
            ),
            _ => bail!("{failure}"),
        },
    }
}
