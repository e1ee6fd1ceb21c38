//! Debounced dual-write state persistence.
//!
//! One opaque JSON state per application id, kept in a synchronous local
//! store and mirrored to a remote row store. Reads are cloud-first; writes
//! land locally at once and reach the remote after a quiet period.

pub mod factory;
pub mod local;
pub mod observer;
pub mod remote;
pub mod sync;

pub use factory::{create_remote_store, create_state_sync};
pub use local::{FileStore, LocalStore, MemoryStore};
pub use observer::{SyncEvent, SyncObserver};
pub use remote::{PostgrestStore, RemoteStore, StoreFuture, UnconfiguredStore};
pub use sync::{DEFAULT_DEBOUNCE, StateSync, SyncOptions};
