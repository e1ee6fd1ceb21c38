use crate::error::StoreError;
use std::sync::Arc;

/// Outcome of a background persistence step. None of these reach the
/// caller of `save`/`load`; they exist for instrumentation.
#[derive(Debug, Clone)]
pub enum SyncEvent {
    LocalReadFailed { error: Arc<StoreError> },
    LocalWriteFailed { error: Arc<StoreError> },
    RemoteReadFailed { error: Arc<StoreError> },
    RemoteWriteSucceeded,
    RemoteWriteFailed { error: Arc<StoreError> },
    /// A local-only state was copied to the remote store during `load`.
    Migrated,
    MigrationFailed { error: Arc<StoreError> },
}

impl SyncEvent {
    pub fn error(&self) -> Option<&StoreError> {
        match self {
            Self::LocalReadFailed { error }
            | Self::LocalWriteFailed { error }
            | Self::RemoteReadFailed { error }
            | Self::RemoteWriteFailed { error }
            | Self::MigrationFailed { error } => Some(error),
            Self::RemoteWriteSucceeded | Self::Migrated => None,
        }
    }
}

pub trait SyncObserver: Send + Sync {
    fn on_event(&self, event: &SyncEvent);
}

impl<F> SyncObserver for F
where
    F: Fn(&SyncEvent) + Send + Sync,
{
    fn on_event(&self, event: &SyncEvent) {
        self(event);
    }
}
