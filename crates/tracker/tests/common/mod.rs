//! Shared test doubles for the tracker integration tests.

#![allow(dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use studio_core::generation::GenerationRequest;
use studio_core::job::JobStatus;
use studio_core::story::StoryRequest;
use studio_core::types::JobId;
use studio_tracker::{GenerationTracker, JobApi, JobApiError, JobSnapshot, TrackerConfig};
use tokio::time::Instant;

/// A scripted reply for `submit` or `poll`.
#[derive(Debug, Clone)]
pub enum Reply<T> {
    Ok(T),
    /// Non-2xx from the proxy; surfaces as a transport error.
    Http(u16, String),
    /// Missing upstream credentials.
    Unconfigured(String),
}

impl<T> Reply<T> {
    fn into_result(self) -> Result<T, JobApiError> {
        match self {
            Reply::Ok(value) => Ok(value),
            Reply::Http(status, message) => Err(JobApiError::Api { status, message }),
            Reply::Unconfigured(message) => Err(JobApiError::Configuration(message)),
        }
    }
}

/// One recorded call against the mock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Submit(String),
    Poll(String),
}

/// In-memory [`JobApi`] that replays scripted responses.
///
/// Each job id has its own queue of poll replies; the last reply repeats
/// once the queue is down to one entry.
#[derive(Default)]
pub struct ScriptedApi {
    submits: Mutex<VecDeque<Reply<JobId>>>,
    polls: Mutex<HashMap<JobId, VecDeque<Reply<JobSnapshot>>>>,
    calls: Mutex<Vec<(Call, Instant)>>,
    submit_delay: Duration,
    poll_delay: Duration,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_submit_delay(mut self, delay: Duration) -> Self {
        self.submit_delay = delay;
        self
    }

    pub fn with_poll_delay(mut self, delay: Duration) -> Self {
        self.poll_delay = delay;
        self
    }

    pub fn accept(self, job_id: &str) -> Self {
        self.push_submit(Reply::Ok(JobId::from(job_id)))
    }

    pub fn push_submit(self, reply: Reply<JobId>) -> Self {
        self.submits.lock().unwrap().push_back(reply);
        self
    }

    pub fn poll_reply(self, job_id: &str, reply: Reply<JobSnapshot>) -> Self {
        self.polls
            .lock()
            .unwrap()
            .entry(JobId::from(job_id))
            .or_default()
            .push_back(reply);
        self
    }

    pub fn status(self, job_id: &str, status: JobStatus) -> Self {
        self.poll_reply(job_id, Reply::Ok(JobSnapshot::new(status)))
    }

    pub fn complete(self, job_id: &str, urls: &[&str]) -> Self {
        let snapshot = urls
            .iter()
            .fold(JobSnapshot::new(JobStatus::Complete), |s, url| s.with_asset(*url));
        self.poll_reply(job_id, Reply::Ok(snapshot))
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(c, _)| c.clone()).collect()
    }

    /// Instants at which `job_id` was polled.
    pub fn poll_times(&self, job_id: &str) -> Vec<Instant> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(call, _)| *call == Call::Poll(job_id.to_string()))
            .map(|(_, at)| *at)
            .collect()
    }

    pub fn poll_count(&self, job_id: &str) -> usize {
        self.poll_times(job_id).len()
    }

    pub fn submit_count(&self) -> usize {
        self.calls()
            .iter()
            .filter(|call| matches!(call, Call::Submit(_)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push((call, Instant::now()));
    }
}

#[async_trait]
impl JobApi for ScriptedApi {
    async fn submit(&self, request: &GenerationRequest) -> Result<JobId, JobApiError> {
        self.record(Call::Submit(request.prompt.clone()));
        tokio::time::sleep(self.submit_delay).await;
        let reply = self
            .submits
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Reply::Http(500, "no scripted submission".into()));
        reply.into_result()
    }

    async fn poll(&self, job_id: &JobId) -> Result<JobSnapshot, JobApiError> {
        self.record(Call::Poll(job_id.to_string()));
        tokio::time::sleep(self.poll_delay).await;
        let reply = {
            let mut polls = self.polls.lock().unwrap();
            match polls.get_mut(job_id) {
                Some(queue) if queue.len() > 1 => queue.pop_front(),
                Some(queue) => queue.front().cloned(),
                None => None,
            }
        };
        reply
            .unwrap_or_else(|| Reply::Http(404, format!("unknown job {job_id}")))
            .into_result()
    }

    async fn generate_story(&self, request: &StoryRequest) -> Result<String, JobApiError> {
        Ok(format!("A story about {}", request.prompt))
    }
}

pub const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Build a tracker over `api` with the production poll cadence.
pub fn tracker(api: Arc<ScriptedApi>) -> GenerationTracker {
    tracker_with(api, TrackerConfig::default())
}

pub fn tracker_with(api: Arc<ScriptedApi>, config: TrackerConfig) -> GenerationTracker {
    GenerationTracker::new(api, config).expect("test tracker config is valid")
}
