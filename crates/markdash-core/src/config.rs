//! Configuration module
//!
//! Environment-driven configuration for the client pipeline: service
//! endpoint, polling behavior, accepted document types, and the shared
//! refresh signal slot.

use std::env;
use std::path::PathBuf;

// Named defaults
const DEFAULT_API_URL: &str = "http://localhost:5000";
const HTTP_TIMEOUT_SECS: u64 = 60;
const POLL_INTERVAL_MS: u64 = 2000;
const POLL_MAX_ATTEMPTS: u32 = 150;
const POLL_MAX_TRANSIENT_ERRORS: u32 = 5;
const BUS_FALLBACK_POLL_SECS: u64 = 5;

/// Client configuration.
#[derive(Clone, Debug)]
pub struct ClientConfig {
    /// Base URL of the marksheet service.
    pub api_url: String,
    pub http_timeout_seconds: u64,
    /// Fixed wait between processing status checks.
    pub poll_interval_ms: u64,
    /// Maximum status checks before the poll session times out.
    pub poll_max_attempts: u32,
    /// Consecutive status-query failures tolerated before giving up.
    pub poll_max_transient_errors: u32,
    /// Content types accepted into an upload batch.
    pub accepted_content_types: Vec<String>,
    /// Well-known path of the shared refresh signal slot.
    pub signal_path: PathBuf,
    /// Interval for the slow-poll fallback when watching the signal slot.
    pub bus_fallback_poll_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            http_timeout_seconds: HTTP_TIMEOUT_SECS,
            poll_interval_ms: POLL_INTERVAL_MS,
            poll_max_attempts: POLL_MAX_ATTEMPTS,
            poll_max_transient_errors: POLL_MAX_TRANSIENT_ERRORS,
            accepted_content_types: vec!["application/pdf".to_string()],
            signal_path: default_signal_path(),
            bus_fallback_poll_secs: BUS_FALLBACK_POLL_SECS,
        }
    }
}

fn default_signal_path() -> PathBuf {
    env::temp_dir().join("markdash").join("refresh-signal")
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let config = Self {
            api_url: env::var("MARKDASH_API_URL")
                .or_else(|_| env::var("API_URL"))
                .unwrap_or_else(|_| DEFAULT_API_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            http_timeout_seconds: env::var("MARKDASH_HTTP_TIMEOUT_SECS")
                .unwrap_or_else(|_| HTTP_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(HTTP_TIMEOUT_SECS),
            poll_interval_ms: env::var("MARKDASH_POLL_INTERVAL_MS")
                .unwrap_or_else(|_| POLL_INTERVAL_MS.to_string())
                .parse()
                .unwrap_or(POLL_INTERVAL_MS),
            poll_max_attempts: env::var("MARKDASH_POLL_MAX_ATTEMPTS")
                .unwrap_or_else(|_| POLL_MAX_ATTEMPTS.to_string())
                .parse()
                .unwrap_or(POLL_MAX_ATTEMPTS),
            poll_max_transient_errors: env::var("MARKDASH_POLL_MAX_TRANSIENT_ERRORS")
                .unwrap_or_else(|_| POLL_MAX_TRANSIENT_ERRORS.to_string())
                .parse()
                .unwrap_or(POLL_MAX_TRANSIENT_ERRORS),
            accepted_content_types: env::var("MARKDASH_ACCEPTED_CONTENT_TYPES")
                .unwrap_or_else(|_| "application/pdf".to_string())
                .split(',')
                .map(|s| s.trim().to_lowercase())
                .filter(|s| !s.is_empty())
                .collect(),
            signal_path: env::var("MARKDASH_SIGNAL_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_signal_path()),
            bus_fallback_poll_secs: env::var("MARKDASH_BUS_FALLBACK_POLL_SECS")
                .unwrap_or_else(|_| BUS_FALLBACK_POLL_SECS.to_string())
                .parse()
                .unwrap_or(BUS_FALLBACK_POLL_SECS),
        };

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.api_url.starts_with("http://") && !self.api_url.starts_with("https://") {
            return Err(anyhow::anyhow!(
                "MARKDASH_API_URL must be an http(s) URL, got '{}'",
                self.api_url
            ));
        }

        if self.poll_interval_ms == 0 {
            return Err(anyhow::anyhow!("MARKDASH_POLL_INTERVAL_MS must be positive"));
        }

        if self.poll_max_attempts == 0 {
            return Err(anyhow::anyhow!("MARKDASH_POLL_MAX_ATTEMPTS must be positive"));
        }

        if self.accepted_content_types.is_empty() {
            return Err(anyhow::anyhow!(
                "MARKDASH_ACCEPTED_CONTENT_TYPES must list at least one content type"
            ));
        }

        Ok(())
    }
}
