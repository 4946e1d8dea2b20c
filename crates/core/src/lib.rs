//! Domain types shared by the Prompt Studio tracker, proxy server and CLI.
//!
//! Holds the generation request model and its form bounds, job status and
//! asset types, story requests, and the static option catalogs.

pub mod catalog;
pub mod error;
pub mod generation;
pub mod job;
pub mod story;
pub mod types;
