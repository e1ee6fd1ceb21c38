use super::local::LocalStore;
use super::observer::{SyncEvent, SyncObserver};
use super::remote::RemoteStore;
use crate::error::StoreError;
use serde_json::Value;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::{Mutex as AsyncMutex, Notify, OwnedMutexGuard};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

#[derive(Clone)]
pub struct SyncOptions {
    pub debounce: Duration,
    pub observer: Option<Arc<dyn SyncObserver>>,
}

impl Default for SyncOptions {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            observer: None,
        }
    }
}

struct Shared {
    app_id: String,
    local: Arc<dyn LocalStore>,
    remote: Arc<dyn RemoteStore>,
    observer: Option<Arc<dyn SyncObserver>>,
    debounce: Duration,
    /// Latest unsaved snapshot. A newer `save` replaces it in place.
    pending: Mutex<Option<Value>>,
    wake: Notify,
    flushing: AtomicBool,
    /// Held for the duration of every remote write.
    write_lock: Arc<AsyncMutex<()>>,
}

impl Shared {
    fn pending(&self) -> MutexGuard<'_, Option<Value>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn emit(&self, event: SyncEvent) {
        if let Some(observer) = &self.observer {
            observer.on_event(&event);
        }
    }

    /// Caller must hold `write_lock`.
    async fn upsert_locked(&self, state: &Value) -> Result<(), StoreError> {
        self.flushing.store(true, Ordering::Release);
        let result = self.remote.upsert(&self.app_id, state).await;
        self.flushing.store(false, Ordering::Release);
        result
    }

    /// Write pending snapshots until none is left.
    async fn drain(&self) {
        loop {
            let _guard = self.write_lock.lock().await;
            let Some(state) = self.pending().take() else {
                break;
            };
            match self.upsert_locked(&state).await {
                Ok(()) => {
                    tracing::debug!(
                        app_id = %self.app_id,
                        remote = self.remote.name(),
                        "remote state written"
                    );
                    self.emit(SyncEvent::RemoteWriteSucceeded);
                }
                Err(error) => {
                    tracing::warn!(
                        app_id = %self.app_id,
                        remote = self.remote.name(),
                        error = %error,
                        "remote state write failed"
                    );
                    self.emit(SyncEvent::RemoteWriteFailed {
                        error: Arc::new(error),
                    });
                }
            }
        }
    }
}

/// Mirrors one application state to a local store and a remote store.
///
/// `save` writes locally right away and schedules a debounced remote write;
/// `load` prefers the remote copy and falls back to the local one. Remote
/// failures never reach the caller; they go to the optional observer.
///
/// Must be created inside a tokio runtime: construction spawns the flush
/// worker.
pub struct StateSync {
    shared: Arc<Shared>,
    cancel: CancellationToken,
    worker: Option<JoinHandle<()>>,
}

impl StateSync {
    pub fn new(
        app_id: impl Into<String>,
        local: Arc<dyn LocalStore>,
        remote: Arc<dyn RemoteStore>,
        options: SyncOptions,
    ) -> Self {
        let shared = Arc::new(Shared {
            app_id: app_id.into(),
            local,
            remote,
            observer: options.observer,
            debounce: options.debounce,
            pending: Mutex::new(None),
            wake: Notify::new(),
            flushing: AtomicBool::new(false),
            write_lock: Arc::new(AsyncMutex::new(())),
        });
        let cancel = CancellationToken::new();
        let worker = tokio::spawn(run_flush_worker(Arc::clone(&shared), cancel.clone()));

        Self {
            shared,
            cancel,
            worker: Some(worker),
        }
    }

    pub fn app_id(&self) -> &str {
        &self.shared.app_id
    }

    /// Remote first, then local. A remote hit warms the local store; a
    /// local-only hit is copied to the remote store in the background,
    /// unless a newer `save` is already waiting to be flushed.
    pub async fn load(&self) -> Option<Value> {
        let shared = &self.shared;

        match shared.remote.fetch(&shared.app_id).await {
            Ok(Some(state)) if !state.is_null() => {
                if let Err(error) = shared.local.set(&shared.app_id, &state) {
                    tracing::warn!(
                        app_id = %shared.app_id,
                        local = shared.local.name(),
                        error = %error,
                        "local cache warm failed"
                    );
                    shared.emit(SyncEvent::LocalWriteFailed {
                        error: Arc::new(error),
                    });
                }
                return Some(state);
            }
            Ok(_) => {
                tracing::debug!(app_id = %shared.app_id, "no remote state, trying local");
            }
            Err(error) => {
                tracing::warn!(app_id = %shared.app_id, error = %error, "remote state read failed");
                shared.emit(SyncEvent::RemoteReadFailed {
                    error: Arc::new(error),
                });
            }
        }

        let local = match shared.local.get(&shared.app_id) {
            Ok(state) => state.filter(|state| !state.is_null()),
            Err(error) => {
                tracing::warn!(
                    app_id = %shared.app_id,
                    local = shared.local.name(),
                    error = %error,
                    "local state read failed"
                );
                shared.emit(SyncEvent::LocalReadFailed {
                    error: Arc::new(error),
                });
                None
            }
        };

        if let Some(state) = &local {
            // Queue behind any write in flight; later flushes queue behind this one.
            let guard = Arc::clone(&shared.write_lock).lock_owned().await;
            if shared.pending().is_none() {
                spawn_migration(Arc::clone(shared), state.clone(), guard);
            }
        }
        local
    }

    /// Never blocks on the network and never fails.
    pub fn save(&self, state: Value) {
        let shared = &self.shared;
        if let Err(error) = shared.local.set(&shared.app_id, &state) {
            tracing::warn!(
                app_id = %shared.app_id,
                local = shared.local.name(),
                error = %error,
                "local state write failed"
            );
            shared.emit(SyncEvent::LocalWriteFailed {
                error: Arc::new(error),
            });
        }

        *shared.pending() = Some(state);
        shared.wake.notify_one();
    }

    /// True while a remote write is in flight.
    pub fn is_flushing(&self) -> bool {
        self.shared.flushing.load(Ordering::Acquire)
    }

    pub fn has_pending(&self) -> bool {
        self.shared.pending().is_some()
    }

    /// Flush any pending snapshot now, skipping the debounce, and stop the
    /// worker.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(worker) = self.worker.take()
            && let Err(error) = worker.await
        {
            tracing::error!(
                app_id = %self.shared.app_id,
                error = %error,
                "state flush worker panicked"
            );
        }
    }
}

impl Drop for StateSync {
    fn drop(&mut self) {
        // The worker still performs its final flush in the background.
        self.cancel.cancel();
    }
}

fn spawn_migration(shared: Arc<Shared>, state: Value, guard: OwnedMutexGuard<()>) {
    tokio::spawn(async move {
        let _guard = guard;
        match shared.upsert_locked(&state).await {
            Ok(()) => {
                tracing::info!(app_id = %shared.app_id, "local state migrated to remote");
                shared.emit(SyncEvent::Migrated);
            }
            Err(error) => {
                tracing::debug!(
                    app_id = %shared.app_id,
                    error = %error,
                    "local state migration failed"
                );
                shared.emit(SyncEvent::MigrationFailed {
                    error: Arc::new(error),
                });
            }
        }
    });
}

async fn run_flush_worker(shared: Arc<Shared>, cancel: CancellationToken) {
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            () = shared.wake.notified() => {}
        }

        // Stale wake-up from a save the last drain already wrote.
        if shared.pending().is_none() {
            continue;
        }

        // Quiet period; every further save restarts it.
        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                () = shared.wake.notified() => {}
                () = tokio::time::sleep(shared.debounce) => break,
            }
        }

        shared.drain().await;
    }

    shared.drain().await;
}
