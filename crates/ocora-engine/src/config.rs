//! Gateway configuration.

use ocora_core::{OcoraError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use std::time::Duration;

/// What the gateway does when the backend fails: degrade to the demo
/// fixtures or propagate the error to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackMode {
    #[default]
    Lenient,
    Strict,
}

/// Runtime-configurable settings for the remote gateway.
///
/// The base URL is normally a tunnel address pasted in by the operator at
/// demo time; it is normalized (trimmed, trailing slash stripped) on every
/// assignment path.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default, deserialize_with = "deserialize_base_url")]
    base_url: String,

    #[serde(default)]
    pub mode: FallbackMode,

    /// Deadline applied to every backend call
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    /// Artificial latency before serving the extraction fixture, so the demo
    /// still shows a believable processing phase
    #[serde(default = "default_extraction_fallback_delay_ms")]
    pub extraction_fallback_delay_ms: u64,

    #[serde(default = "default_policy_fallback_delay_ms")]
    pub policy_fallback_delay_ms: u64,

    #[serde(default = "default_simulation_fallback_delay_ms")]
    pub simulation_fallback_delay_ms: u64,
}

fn default_request_timeout_ms() -> u64 {
    5_000
}

fn default_extraction_fallback_delay_ms() -> u64 {
    2_000
}

fn default_policy_fallback_delay_ms() -> u64 {
    1_000
}

fn default_simulation_fallback_delay_ms() -> u64 {
    800
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            mode: FallbackMode::default(),
            request_timeout_ms: default_request_timeout_ms(),
            extraction_fallback_delay_ms: default_extraction_fallback_delay_ms(),
            policy_fallback_delay_ms: default_policy_fallback_delay_ms(),
            simulation_fallback_delay_ms: default_simulation_fallback_delay_ms(),
        }
    }
}

impl GatewayConfig {
    pub fn new(base_url: &str) -> Self {
        let mut config = Self::default();
        config.set_base_url(base_url);
        config
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_base_url(&mut self, url: &str) {
        self.base_url = normalize_base_url(url);
    }

    pub fn endpoint_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Sanity-check the settings. An empty base URL is allowed: it simply
    /// makes the first call fail and take the fallback path.
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(OcoraError::config("request_timeout_ms must be positive"));
        }
        if !self.base_url.is_empty()
            && !self.base_url.starts_with("http://")
            && !self.base_url.starts_with("https://")
        {
            return Err(OcoraError::config(format!(
                "base URL {:?} must start with http:// or https://",
                self.base_url
            )));
        }
        Ok(())
    }
}

fn normalize_base_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

fn deserialize_base_url<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_base_url(&raw))
}
