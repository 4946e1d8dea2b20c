//! Wire types for the generation proxy and their parsers.
//!
//! The proxy returns the image provider's JSON verbatim, so both the
//! provider's nested shape (`sdGenerationJob` / `generations_by_pk`) and the
//! flat `{ jobId }` / `{ status, assets }` shape are accepted.

use serde::Deserialize;
use studio_core::job::{GeneratedAsset, JobStatus};
use studio_core::types::JobId;

// ---------------------------------------------------------------------------
// Submit
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SubmitBody {
    Provider {
        #[serde(rename = "sdGenerationJob")]
        sd_generation_job: SdGenerationJob,
    },
    Flat {
        #[serde(rename = "jobId")]
        job_id: String,
    },
}

#[derive(Debug, Deserialize)]
struct SdGenerationJob {
    #[serde(rename = "generationId")]
    generation_id: String,
}

/// Extract the job id from a submission response body.
pub fn parse_submit_response(json: &str) -> Result<JobId, String> {
    let body: SubmitBody = serde_json::from_str(json)
        .map_err(|e| format!("Unrecognised submission response: {e}"))?;

    let id = match body {
        SubmitBody::Provider { sd_generation_job } => sd_generation_job.generation_id,
        SubmitBody::Flat { job_id } => job_id,
    };
    if id.is_empty() {
        return Err("Submission response carried an empty job id".to_string());
    }
    Ok(JobId::new(id))
}

// ---------------------------------------------------------------------------
// Poll
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PollBody {
    Provider { generations_by_pk: GenerationRecord },
    Flat(GenerationRecord),
}

#[derive(Debug, Deserialize)]
struct GenerationRecord {
    status: JobStatus,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default, alias = "generated_images")]
    assets: Option<Vec<AssetRef>>,
}

/// An asset as reported by the provider, before local ids and prompts are
/// filled in.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetRef {
    #[serde(default)]
    pub id: Option<String>,
    pub url: String,
    #[serde(default)]
    pub prompt: Option<String>,
}

/// One observation of a job's status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSnapshot {
    pub status: JobStatus,
    /// Generation-level prompt echoed by the provider, if any.
    pub prompt: Option<String>,
    pub assets: Vec<AssetRef>,
}

impl JobSnapshot {
    pub fn new(status: JobStatus) -> Self {
        Self {
            status,
            prompt: None,
            assets: Vec::new(),
        }
    }

    /// Append an asset with only a URL.
    pub fn with_asset(mut self, url: impl Into<String>) -> Self {
        self.assets.push(AssetRef {
            id: None,
            url: url.into(),
            prompt: None,
        });
        self
    }

    /// Resolve the reported assets, preserving order.
    ///
    /// Each asset's prompt is its own, else the generation's, else
    /// `submitted_prompt`.
    pub fn into_assets(self, submitted_prompt: &str) -> Vec<GeneratedAsset> {
        let generation_prompt = self.prompt;
        self.assets
            .into_iter()
            .map(|asset| {
                let prompt = asset
                    .prompt
                    .or_else(|| generation_prompt.clone())
                    .unwrap_or_else(|| submitted_prompt.to_string());
                GeneratedAsset::new(asset.id, asset.url, prompt)
            })
            .collect()
    }
}

/// Parse a job status response body.
pub fn parse_poll_response(json: &str) -> Result<JobSnapshot, String> {
    let body: PollBody =
        serde_json::from_str(json).map_err(|e| format!("Unrecognised status response: {e}"))?;

    let record = match body {
        PollBody::Provider { generations_by_pk } => generations_by_pk,
        PollBody::Flat(record) => record,
    };
    Ok(JobSnapshot {
        status: record.status,
        prompt: record.prompt,
        assets: record.assets.unwrap_or_default(),
    })
}

// ---------------------------------------------------------------------------
// Story
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct StoryBody {
    story: String,
}

pub fn parse_story_response(json: &str) -> Result<String, String> {
    let body: StoryBody =
        serde_json::from_str(json).map_err(|e| format!("Unrecognised story response: {e}"))?;
    Ok(body.story)
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// JSON error envelope returned by the proxy.
#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Error code the proxy uses for absent upstream credentials.
pub const CONFIGURATION_ERROR_CODE: &str = "CONFIGURATION_ERROR";

pub fn parse_error_body(json: &str) -> Option<ErrorBody> {
    serde_json::from_str(json).ok()
}
