use super::Config;
use anyhow::{Context, Result};
use directories::UserDirs;
use std::fs;
use std::path::Path;

impl Config {
    pub fn load_or_init() -> Result<Self> {
        let home = UserDirs::new()
            .map(|u| u.home_dir().to_path_buf())
            .context("Could not find home directory")?;
        Self::load_or_init_in(&home.join(".designsync"))
    }

    /// Load `config.toml` from `designsync_dir`, writing defaults on first run.
    pub fn load_or_init_in(designsync_dir: &Path) -> Result<Self> {
        let config_path = designsync_dir.join("config.toml");

        if !designsync_dir.exists() {
            fs::create_dir_all(designsync_dir)
                .context("Failed to create .designsync directory")?;
        }

        let mut config = if config_path.exists() {
            let contents =
                fs::read_to_string(&config_path).context("Failed to read config file")?;
            let mut config: Config =
                toml::from_str(&contents).context("Failed to parse config file")?;
            config.config_path.clone_from(&config_path);
            config.data_dir = designsync_dir.join("state");
            config
        } else {
            let config = Self {
                config_path: config_path.clone(),
                data_dir: designsync_dir.join("state"),
                ..Self::default()
            };
            config.save()?;
            config
        };

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Persist the config. Secrets never land on disk: tokens picked up from
    /// the environment are stripped before writing.
    pub fn save(&self) -> Result<()> {
        let mut persisted = self.clone();
        persisted.generation.api_token = None;
        persisted.persistence.remote_key = None;
        let toml_str = toml::to_string_pretty(&persisted).context("Failed to serialize config")?;
        fs::write(&self.config_path, toml_str).context("Failed to write config file")?;
        Ok(())
    }
}
