use super::local::{FileStore, LocalStore};
use super::observer::SyncObserver;
use super::remote::{PostgrestStore, RemoteStore, UnconfiguredStore};
use super::sync::{StateSync, SyncOptions};
use crate::config::{Config, PersistenceConfig};
use crate::error::{ConfigError, Result};

use std::sync::Arc;

pub fn create_remote_store(config: &PersistenceConfig) -> Arc<dyn RemoteStore> {
    match (config.remote_url.as_deref(), config.remote_key.as_deref()) {
        (Some(url), Some(key)) if config.remote_enabled() => {
            Arc::new(PostgrestStore::new(url, key, &config.table))
        }
        _ => {
            tracing::info!("remote state store not configured; state stays local");
            Arc::new(UnconfiguredStore)
        }
    }
}

/// File-backed local store plus whichever remote the config selects.
pub fn create_state_sync(
    config: &Config,
    observer: Option<Arc<dyn SyncObserver>>,
) -> Result<StateSync> {
    config
        .persistence
        .validate()
        .map_err(|err| ConfigError::Validation(err.to_string()))?;

    let local: Arc<dyn LocalStore> = Arc::new(FileStore::new(&config.local_state_dir()));
    let remote = create_remote_store(&config.persistence);

    Ok(StateSync::new(
        config.persistence.app_id.trim(),
        local,
        remote,
        SyncOptions {
            debounce: config.persistence.debounce(),
            observer,
        },
    ))
}
