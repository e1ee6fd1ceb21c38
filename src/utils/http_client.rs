use reqwest::Client;
use std::time::Duration;

/// Per-call timeout for upstream requests. Polling is bounded separately.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub fn build_upstream_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(10))
        .pool_max_idle_per_host(4)
        .pool_idle_timeout(Duration::from_secs(90))
        .tcp_keepalive(Duration::from_secs(60))
        .build()
        .unwrap_or_else(|_| Client::new())
}
