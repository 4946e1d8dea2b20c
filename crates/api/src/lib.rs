//! Prompt Studio proxy server library.
//!
//! Exposes the building blocks (config, state, error handling, providers,
//! routes) so integration tests and the binary entrypoint can both use them.

pub mod config;
pub mod error;
pub mod handlers;
pub mod providers;
pub mod router;
pub mod routes;
pub mod state;
