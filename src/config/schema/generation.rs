use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Prediction API base URL (default: Replicate v1)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Model version hash sent with every prediction
    #[serde(default = "default_model_version")]
    pub model_version: String,
    /// API token; normally supplied through `REPLICATE_API_TOKEN`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Delay before each status poll (default: 2000ms)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Wall-clock bound on polling (default: 120s)
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

fn default_api_base_url() -> String {
    "https://api.replicate.com/v1".into()
}

fn default_model_version() -> String {
    "YOUR_REPLICATE_MODEL_VERSION_HERE".into()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_deadline_secs() -> u64 {
    120
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            model_version: default_model_version(),
            api_token: None,
            poll_interval_ms: default_poll_interval_ms(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

impl GenerationConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn deadline(&self) -> Duration {
        Duration::from_secs(self.deadline_secs)
    }

    pub fn validate(&self) -> Result<()> {
        if self.poll_interval_ms == 0 {
            bail!("generation.poll_interval_ms must be greater than 0");
        }
        if self.deadline_secs == 0 {
            bail!("generation.deadline_secs must be greater than 0");
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            bail!(
                "generation.api_base_url must be an http(s) URL, got '{}'",
                self.api_base_url
            );
        }
        Ok(())
    }
}
