use super::super::{GatewayConfig, GenerationConfig, PersistenceConfig};
use anyhow::Result;
use directories::UserDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

// ── Top-level config ──────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Data directory (local state files) - computed from home, not serialized
    #[serde(skip)]
    pub data_dir: PathBuf,
    /// Path to config.toml - computed from home, not serialized
    #[serde(skip)]
    pub config_path: PathBuf,

    #[serde(default)]
    pub generation: GenerationConfig,

    #[serde(default)]
    pub gateway: GatewayConfig,

    #[serde(default)]
    pub persistence: PersistenceConfig,
}

impl Default for Config {
    fn default() -> Self {
        let home =
            UserDirs::new().map_or_else(|| PathBuf::from("."), |u| u.home_dir().to_path_buf());
        let designsync_dir = home.join(".designsync");

        Self {
            data_dir: designsync_dir.join("state"),
            config_path: designsync_dir.join("config.toml"),
            generation: GenerationConfig::default(),
            gateway: GatewayConfig::default(),
            persistence: PersistenceConfig::default(),
        }
    }
}

impl Config {
    pub fn validate(&self) -> Result<()> {
        self.generation.validate()?;
        self.persistence.validate()?;
        Ok(())
    }

    /// Directory holding the local state files.
    ///
    /// `persistence.local_dir` wins over the computed data directory.
    pub fn local_state_dir(&self) -> PathBuf {
        self.persistence
            .local_dir
            .as_ref()
            .map_or_else(|| self.data_dir.clone(), PathBuf::from)
    }
}
