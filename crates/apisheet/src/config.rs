//! Dispatch configuration, resolved once at startup.

use std::time::Duration;

/// Default per-call timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default `Content-Type` header sent with every call.
pub const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// Default capacity of the shared worker pool.
pub const DEFAULT_MAX_WORKERS: usize = 10;

pub const ENV_TIMEOUT_SECS: &str = "APISHEET_TIMEOUT_SECS";
pub const ENV_CONTENT_TYPE: &str = "APISHEET_CONTENT_TYPE";
pub const ENV_MAX_WORKERS: &str = "APISHEET_MAX_WORKERS";

/// Read-only settings consumed by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchConfig {
    pub request_timeout: Duration,
    pub content_type: String,
    pub max_workers: usize,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            max_workers: DEFAULT_MAX_WORKERS,
        }
    }
}

impl DispatchConfig {
    /// Resolve from the process environment, falling back to defaults.
    pub fn from_env() -> Self {
        Self::resolve(|key| std::env::var(key).ok())
    }

    /// Resolve using `lookup` for overrides. Unparseable values are ignored.
    pub fn resolve(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            match raw.trim().parse::<u64>() {
                Ok(secs) => config.request_timeout = Duration::from_secs(secs),
                Err(_) => tracing::warn!("Ignoring invalid {ENV_TIMEOUT_SECS}: {raw:?}"),
            }
        }

        if let Some(raw) = lookup(ENV_CONTENT_TYPE) {
            if raw.trim().is_empty() {
                tracing::warn!("Ignoring empty {ENV_CONTENT_TYPE}");
            } else {
                config.content_type = raw.trim().to_string();
            }
        }

        if let Some(raw) = lookup(ENV_MAX_WORKERS) {
            match raw.trim().parse::<usize>() {
                Ok(n) => config.max_workers = n,
                Err(_) => tracing::warn!("Ignoring invalid {ENV_MAX_WORKERS}: {raw:?}"),
            }
        }

        config
    }

    /// Pool capacity actually used; never zero.
    pub fn effective_workers(&self) -> usize {
        self.max_workers.max(1)
    }
}
