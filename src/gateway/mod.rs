//! Axum-based HTTP gateway for the generation proxy.
//!
//! - `POST /api/generate`: restyle an image through the prediction API
//! - `OPTIONS /api/generate`: CORS preflight, empty 200
//! - any other method on `/api/generate`: 405 with `step: "method"`
//! - `GET /health`: liveness plus whether the upstream credential is set
//!
//! Body size and whole-request time are bounded by `[gateway]` config.

mod handlers;
mod server;

pub use server::{build_app, run_gateway, run_gateway_with_listener};

use crate::config::Config;
use crate::generation::Generator;
use std::sync::Arc;

/// Route serving the proxy.
pub const GENERATE_PATH: &str = "/api/generate";

/// Shared state for all axum handlers
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<Generator>,
}

impl AppState {
    pub fn from_config(config: &Config) -> Self {
        Self {
            generator: Arc::new(Generator::from_config(&config.generation)),
        }
    }
}
