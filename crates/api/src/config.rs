use studio_core::error::CoreError;

/// Default Leonardo.ai REST endpoint.
pub const DEFAULT_LEONARDO_API_URL: &str = "https://cloud.leonardo.ai/api/rest/v1";

/// Default OpenAI REST endpoint.
pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";

/// Base URL and credential for one upstream provider.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub api_url: String,
    /// `None` when the key variable is unset or blank.
    pub api_key: Option<String>,
}

impl ProviderConfig {
    pub fn new(api_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            api_url: api_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }
}

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development. Provider keys
/// have no default; the matching routes answer with a configuration error
/// until they are set.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3001`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Image generation provider.
    pub leonardo: ProviderConfig,
    /// Story (chat completion) provider.
    pub openai: ProviderConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                                  |
    /// |------------------------|------------------------------------------|
    /// | `HOST`                 | `0.0.0.0`                                |
    /// | `PORT`                 | `3001`                                   |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`                  |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                                     |
    /// | `LEONARDO_API_KEY`     | unset                                    |
    /// | `LEONARDO_API_URL`     | `https://cloud.leonardo.ai/api/rest/v1`  |
    /// | `OPENAI_API_KEY`       | unset                                    |
    /// | `OPENAI_API_URL`       | `https://api.openai.com/v1`              |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let host = lookup("HOST").unwrap_or_else(|| "0.0.0.0".into());

        let port: u16 = parse_var(&lookup, "PORT")?.unwrap_or(3001);

        let cors_origins: Vec<String> = lookup("CORS_ORIGINS")
            .unwrap_or_else(|| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = parse_var(&lookup, "REQUEST_TIMEOUT_SECS")?.unwrap_or(30);

        let leonardo = ProviderConfig::new(
            lookup("LEONARDO_API_URL").unwrap_or_else(|| DEFAULT_LEONARDO_API_URL.into()),
            lookup("LEONARDO_API_KEY"),
        );
        let openai = ProviderConfig::new(
            lookup("OPENAI_API_URL").unwrap_or_else(|| DEFAULT_OPENAI_API_URL.into()),
            lookup("OPENAI_API_KEY"),
        );

        Ok(Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            leonardo,
            openai,
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, CoreError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CoreError::Configuration(format!("{key} must be a valid number, got '{raw}'"))),
    }
}
