use thiserror::Error;

// ─── Top-level error hierarchy ───────────────────────────────────────────────

/// Structured error hierarchy for `designsync`.
///
/// Generation failures are not part of this tree: they are response values
/// (see [`crate::generation::GenerationFailure`]) because every one of them
/// has to reach the HTTP client. Application plumbing keeps using
/// `anyhow::Result` for ad-hoc context chains.
#[derive(Debug, Error)]
pub enum DesignSyncError {
    // ── Config ───────────────────────────────────────────────────────────
    #[error("config: {0}")]
    Config(#[from] ConfigError),

    // ── Persistence backends ────────────────────────────────────────────
    #[error("store: {0}")]
    Store(#[from] StoreError),

    // ── Generic fallthrough (wraps anyhow for interop) ──────────────────
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ─── Config errors ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("validation failed: {0}")]
    Validation(String),
}

// ─── Store errors ────────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("local store: {0}")]
    Local(#[from] std::io::Error),

    #[error("remote store request failed: {0}")]
    Remote(String),

    #[error("remote store returned HTTP {status}: {message}")]
    RemoteStatus { status: u16, message: String },

    #[error("stored state is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("remote store not configured")]
    NotConfigured,
}

impl From<reqwest::Error> for StoreError {
    fn from(err: reqwest::Error) -> Self {
        Self::Remote(err.to_string())
    }
}

// ─── Convenience re-exports ─────────────────────────────────────────────────

/// Shorthand result type for the crate.
pub type Result<T> = std::result::Result<T, DesignSyncError>;
