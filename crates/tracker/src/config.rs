use std::time::Duration;

use studio_core::error::CoreError;

/// Default cadence between status polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(5000);

/// Tuning for a [`GenerationTracker`](crate::tracker::GenerationTracker).
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Delay between consecutive polls of the active job.
    pub poll_interval: Duration,
    /// Give up on a job that has not reached a terminal status after this
    /// long. `None` waits for the provider indefinitely.
    pub max_job_duration: Option<Duration>,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            max_job_duration: None,
        }
    }
}

impl TrackerConfig {
    /// Reject settings the poll loop cannot run with.
    pub fn check(&self) -> Result<(), CoreError> {
        if self.poll_interval.is_zero() {
            return Err(CoreError::Configuration(
                "poll interval must be greater than zero".into(),
            ));
        }
        if self.max_job_duration.is_some_and(|limit| limit.is_zero()) {
            return Err(CoreError::Configuration(
                "job time limit must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// Client-side configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Proxy base URL including the `/api` prefix.
    pub api_url: String,
    pub tracker: TrackerConfig,
    /// Per-request HTTP timeout.
    pub http_timeout: Duration,
}

impl ClientConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                    | Default                     |
    /// |----------------------------|-----------------------------|
    /// | `STUDIO_API_URL`           | `http://localhost:3001/api` |
    /// | `STUDIO_POLL_INTERVAL_MS`  | `5000`                      |
    /// | `STUDIO_MAX_JOB_SECS`      | unset (no limit)            |
    /// | `STUDIO_HTTP_TIMEOUT_SECS` | `30`                        |
    pub fn from_env() -> Result<Self, CoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary variable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, CoreError> {
        let api_url = lookup("STUDIO_API_URL")
            .unwrap_or_else(|| "http://localhost:3001/api".into());

        let poll_interval_ms: u64 = parse_var(&lookup, "STUDIO_POLL_INTERVAL_MS")?.unwrap_or(5000);
        let max_job_secs: Option<u64> = parse_var(&lookup, "STUDIO_MAX_JOB_SECS")?;
        let http_timeout_secs: u64 = parse_var(&lookup, "STUDIO_HTTP_TIMEOUT_SECS")?.unwrap_or(30);

        let tracker = TrackerConfig {
            poll_interval: Duration::from_millis(poll_interval_ms),
            max_job_duration: max_job_secs.map(Duration::from_secs),
        };
        tracker.check()?;

        Ok(Self {
            api_url,
            tracker,
            http_timeout: Duration::from_secs(http_timeout_secs),
        })
    }
}

fn parse_var<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Result<Option<T>, CoreError> {
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw.trim().parse().map(Some).map_err(|_| {
            CoreError::Configuration(format!("{key} must be a valid number (got '{raw}')"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_unset() {
        let config = ClientConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.api_url, "http://localhost:3001/api");
        assert_eq!(config.tracker.poll_interval, Duration::from_secs(5));
        assert!(config.tracker.max_job_duration.is_none());
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn overrides_are_parsed() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("STUDIO_API_URL", "http://studio:8080/api"),
            ("STUDIO_POLL_INTERVAL_MS", "250"),
            ("STUDIO_MAX_JOB_SECS", "600"),
        ]))
        .unwrap();
        assert_eq!(config.api_url, "http://studio:8080/api");
        assert_eq!(config.tracker.poll_interval, Duration::from_millis(250));
        assert_eq!(config.tracker.max_job_duration, Some(Duration::from_secs(600)));
    }

    #[test]
    fn bad_numbers_are_configuration_errors() {
        let err = ClientConfig::from_lookup(lookup(&[("STUDIO_POLL_INTERVAL_MS", "soon")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));

        let err = ClientConfig::from_lookup(lookup(&[("STUDIO_POLL_INTERVAL_MS", "0")]))
            .unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));

        let err = ClientConfig::from_lookup(lookup(&[("STUDIO_MAX_JOB_SECS", "0")])).unwrap_err();
        assert!(matches!(err, CoreError::Configuration(_)));
    }

    #[test]
    fn zero_durations_fail_the_check() {
        assert!(TrackerConfig::default().check().is_ok());

        let config = TrackerConfig {
            poll_interval: Duration::ZERO,
            ..TrackerConfig::default()
        };
        assert!(matches!(config.check(), Err(CoreError::Configuration(_))));

        let config = TrackerConfig {
            max_job_duration: Some(Duration::ZERO),
            ..TrackerConfig::default()
        };
        assert!(matches!(config.check(), Err(CoreError::Configuration(_))));
    }
}
