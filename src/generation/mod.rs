//! Image restyling through an external prediction API.
//!
//! One call creates a prediction job, then polls it on a fixed interval
//! until it finishes or the deadline passes. Every outcome, including
//! local validation errors, is a [`GenerationResult`] value.

pub mod client;
pub mod output;
pub mod style;
pub mod types;

pub use client::{Generator, PredictionClient, normalize_image_payload};
pub use output::normalize_output;
pub use style::{PromptPair, StylePreset, preset_for};
pub use types::{
    FailureStep, GenerateRequest, GenerationFailure, GenerationResult, GenerationSuccess,
    PredictionStatus,
};
