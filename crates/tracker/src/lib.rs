//! Generation job tracking for Prompt Studio.
//!
//! Submits image generation requests through a [`JobApi`](api::JobApi),
//! polls the resulting job at a fixed cadence until the provider reports a
//! terminal status, and publishes every state change as a
//! [`TrackerSnapshot`](state::TrackerSnapshot) over a `watch` channel.

pub mod api;
pub mod config;
pub mod error;
pub mod messages;
pub mod poller;
pub mod state;
pub mod tracker;

pub use api::{HttpJobApi, JobApi, JobApiError};
pub use config::{ClientConfig, TrackerConfig};
pub use error::TrackerError;
pub use messages::{AssetRef, JobSnapshot};
pub use state::{TrackerFailure, TrackerPhase, TrackerSnapshot};
pub use tracker::GenerationTracker;
