use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const MAX_FETCH_CONCURRENCY: usize = 32;
/// Transient failures get at most one more attempt.
pub const MAX_FETCH_RETRIES: u32 = 1;

pub const ENV_FETCH_CONCURRENCY: &str = "CASEBUNDLE_FETCH_CONCURRENCY";
pub const ENV_FETCH_TIMEOUT_MS: &str = "CASEBUNDLE_FETCH_TIMEOUT_MS";
pub const ENV_FETCH_RETRY_BACKOFF_MS: &str = "CASEBUNDLE_FETCH_RETRY_BACKOFF_MS";

/// Limits applied to the fetches of one bundle request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Simultaneous in-flight fetches; excess requests queue
    pub max_concurrency: usize,

    /// Bound on a single attempt
    pub timeout_ms: u64,

    /// Pause before retrying a transient failure
    pub retry_backoff_ms: u64,

    /// Extra attempts for `timeout` / `upstream_unavailable` (0 or 1)
    pub max_retries: u32,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            timeout_ms: 30_000,
            retry_backoff_ms: 250,
            max_retries: 1,
        }
    }
}

fn parse_env_value<T: std::str::FromStr>(raw: Option<&str>, default_value: T) -> T {
    raw.map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| v.parse::<T>().ok())
        .unwrap_or(default_value)
}

impl FetchConfig {
    /// Defaults overlaid with `CASEBUNDLE_FETCH_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    pub fn with_env_overrides(self) -> Self {
        let concurrency = std::env::var(ENV_FETCH_CONCURRENCY).ok();
        let timeout = std::env::var(ENV_FETCH_TIMEOUT_MS).ok();
        let backoff = std::env::var(ENV_FETCH_RETRY_BACKOFF_MS).ok();
        self.with_overrides(concurrency.as_deref(), timeout.as_deref(), backoff.as_deref())
    }

    fn with_overrides(
        self,
        concurrency: Option<&str>,
        timeout_ms: Option<&str>,
        retry_backoff_ms: Option<&str>,
    ) -> Self {
        Self {
            max_concurrency: parse_env_value(concurrency, self.max_concurrency),
            timeout_ms: parse_env_value(timeout_ms, self.timeout_ms),
            retry_backoff_ms: parse_env_value(retry_backoff_ms, self.retry_backoff_ms),
            max_retries: self.max_retries,
        }
        .normalized()
    }

    /// Clamp every knob into its supported range.
    pub fn normalized(self) -> Self {
        Self {
            max_concurrency: self.max_concurrency.clamp(1, MAX_FETCH_CONCURRENCY),
            max_retries: self.max_retries.min(MAX_FETCH_RETRIES),
            ..self
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.timeout_ms == 0 {
            return Err("timeout_ms must be > 0".to_string());
        }
        if self.max_concurrency == 0 {
            return Err("max_concurrency must be > 0".to_string());
        }
        if self.max_concurrency > MAX_FETCH_CONCURRENCY {
            return Err(format!(
                "max_concurrency ({}) cannot exceed {MAX_FETCH_CONCURRENCY}",
                self.max_concurrency
            ));
        }
        if self.max_retries > MAX_FETCH_RETRIES {
            return Err(format!(
                "max_retries ({}) cannot exceed {MAX_FETCH_RETRIES}",
                self.max_retries
            ));
        }
        Ok(())
    }
}
