//! Generation job status, generated assets, and the job record.

use serde::{Deserialize, Serialize};

use crate::types::{JobId, Timestamp};

// ---------------------------------------------------------------------------
// JobStatus
// ---------------------------------------------------------------------------

/// Status reported by the provider for a generation job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum JobStatus {
    Pending,
    Processing,
    Complete,
    Failed,
}

impl JobStatus {
    /// `Complete` and `Failed` end polling for a job.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Processing => "PROCESSING",
            Self::Complete => "COMPLETE",
            Self::Failed => "FAILED",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GeneratedAsset
// ---------------------------------------------------------------------------

/// One generated output (an image) of a completed job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedAsset {
    /// Provider id, or a locally generated UUID when the provider omits one.
    pub id: String,
    pub url: String,
    /// Prompt the asset was generated from.
    pub prompt: String,
}

impl GeneratedAsset {
    /// Build an asset, assigning a synthetic id when `id` is missing or empty.
    pub fn new(id: Option<String>, url: impl Into<String>, prompt: impl Into<String>) -> Self {
        let id = id
            .filter(|id| !id.is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        Self {
            id,
            url: url.into(),
            prompt: prompt.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// GenerationJob
// ---------------------------------------------------------------------------

/// The tracked record of one submitted generation.
///
/// Created only after a successful submission, mutated only by poll
/// responses, and frozen once its status is terminal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationJob {
    pub id: JobId,
    pub status: JobStatus,
    pub assets: Vec<GeneratedAsset>,
    pub submitted_at: Timestamp,
    pub updated_at: Timestamp,
}

impl GenerationJob {
    /// A freshly submitted job in `Pending`.
    pub fn new(id: JobId) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            status: JobStatus::Pending,
            assets: Vec::new(),
            submitted_at: now,
            updated_at: now,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Record a poll observation. Returns `false` (and changes nothing) when
    /// the job is already terminal.
    pub fn observe(&mut self, status: JobStatus, assets: Vec<GeneratedAsset>) -> bool {
        if self.is_terminal() {
            return false;
        }
        self.status = status;
        if status == JobStatus::Complete {
            self.assets = assets;
        }
        self.updated_at = chrono::Utc::now();
        true
    }
}
