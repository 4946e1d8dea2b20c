use std::sync::Arc;

use crate::config::ServerConfig;
use crate::providers::leonardo::LeonardoClient;
use crate::providers::openai::OpenAiClient;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Image generation provider.
    pub leonardo: Arc<LeonardoClient>,
    /// Story provider.
    pub openai: Arc<OpenAiClient>,
}

impl AppState {
    /// Build provider clients from `config`, sharing one connection pool.
    pub fn new(config: ServerConfig) -> Self {
        let client = reqwest::Client::new();
        Self {
            leonardo: Arc::new(LeonardoClient::with_client(client.clone(), &config.leonardo)),
            openai: Arc::new(OpenAiClient::with_client(client, &config.openai)),
            config: Arc::new(config),
        }
    }
}
