//! Terminal rendering of tracker snapshots.

use std::io::{self, Write};

use studio_tracker::{TrackerFailure, TrackerPhase, TrackerSnapshot};

/// Writes one line per visible change of the tracker state.
pub struct Renderer<W: Write> {
    out: W,
    last: Option<(TrackerPhase, bool, Option<TrackerFailure>)>,
}

impl<W: Write> Renderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, last: None }
    }

    pub fn render(&mut self, snapshot: &TrackerSnapshot) -> io::Result<()> {
        let key = (snapshot.phase, snapshot.polling, snapshot.error.clone());
        if self.last.as_ref() == Some(&key) {
            return Ok(());
        }
        self.last = Some(key);

        match (snapshot.phase, &snapshot.job) {
            (TrackerPhase::Submitting, _) => writeln!(self.out, "Submitting generation...")?,
            (TrackerPhase::Pending | TrackerPhase::Processing, Some(job)) if snapshot.polling => {
                writeln!(self.out, "Job {}: {}", job.id, job.status)?
            }
            (TrackerPhase::Complete, Some(job)) => {
                writeln!(self.out, "Job {}: {}", job.id, job.status)?;
                for asset in &snapshot.assets {
                    writeln!(self.out, "  {}", asset.url)?;
                }
            }
            _ => {}
        }
        if let Some(failure) = &snapshot.error {
            writeln!(self.out, "Error: {failure}")?;
        }
        self.out.flush()
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }
}
