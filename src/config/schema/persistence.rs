use anyhow::{Result, bail};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    /// Fixed application id; keys both the local file and the remote row
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Remote table holding `(app_id, state, updated_at)` rows
    #[serde(default = "default_table")]
    pub table: String,
    /// Quiet period before a remote write (default: 300ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Supabase project URL; unset means local-only
    #[serde(default)]
    pub remote_url: Option<String>,
    /// Supabase anon key; normally supplied through `SUPABASE_ANON_KEY`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remote_key: Option<String>,
    /// Override for the local state directory
    #[serde(default)]
    pub local_dir: Option<String>,
}

fn default_app_id() -> String {
    "designsync".into()
}

fn default_table() -> String {
    "app_state".into()
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self {
            app_id: default_app_id(),
            table: default_table(),
            debounce_ms: default_debounce_ms(),
            remote_url: None,
            remote_key: None,
            local_dir: None,
        }
    }
}

impl PersistenceConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Remote sync is enabled only when both URL and key are present.
    pub fn remote_enabled(&self) -> bool {
        self.remote_url.as_deref().is_some_and(|u| !u.is_empty())
            && self.remote_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn validate(&self) -> Result<()> {
        let app_id = self.app_id.trim();
        if app_id.is_empty() {
            bail!("persistence.app_id must not be empty");
        }
        // The id doubles as a file name for the local store.
        if app_id.contains(['/', '\\']) || app_id.starts_with('.') {
            bail!("persistence.app_id '{app_id}' is not a valid file name");
        }
        if self.table.trim().is_empty() {
            bail!("persistence.table must not be empty");
        }
        Ok(())
    }
}
