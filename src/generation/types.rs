use serde::Deserialize;
use serde_json::{Value, json};
use strum::{Display, EnumString};

/// Inbound generation request, as posted by the design page.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenerateRequest {
    #[serde(rename = "imageBase64", default)]
    pub image_base64: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
}

impl GenerateRequest {
    /// Lenient decode: anything that is not a JSON object becomes an empty
    /// request and fails later at input validation.
    pub fn from_body(body: &[u8]) -> Self {
        serde_json::from_slice(body).unwrap_or_default()
    }
}

/// Lifecycle of an upstream prediction job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum PredictionStatus {
    Starting,
    Processing,
    Succeeded,
    Failed,
    Canceled,
}

impl PredictionStatus {
    /// Read the `status` field of a job document. Missing or unknown values
    /// yield `None` and keep the poll loop going.
    pub fn of(job: &Value) -> Option<Self> {
        job.get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse().ok())
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Canceled)
    }
}

/// Where a generation attempt stopped. The `Display` form is the wire value
/// of the `step` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FailureStep {
    #[strum(serialize = "method")]
    Method,
    #[strum(serialize = "env")]
    Credential,
    #[strum(serialize = "input")]
    Input,
    #[strum(serialize = "replicate_create_parse")]
    CreateParse,
    #[strum(serialize = "replicate_create")]
    CreateRejected,
    #[strum(serialize = "replicate_poll_parse")]
    PollParse,
    #[strum(serialize = "replicate_poll")]
    PollRejected,
    #[strum(serialize = "replicate_failed")]
    JobFailed,
    #[strum(serialize = "timeout")]
    Timeout,
    #[strum(serialize = "server")]
    Server,
}

impl FailureStep {
    pub const fn http_status(self) -> u16 {
        match self {
            Self::Method => 405,
            Self::Input => 400,
            Self::Timeout => 504,
            Self::Credential
            | Self::CreateParse
            | Self::CreateRejected
            | Self::PollParse
            | Self::PollRejected
            | Self::JobFailed
            | Self::Server => 500,
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{step}: {error}")]
pub struct GenerationFailure {
    pub step: FailureStep,
    pub error: String,
    pub raw: Option<Value>,
}

impl GenerationFailure {
    pub fn new(step: FailureStep, error: impl Into<String>) -> Self {
        Self {
            step,
            error: error.into(),
            raw: None,
        }
    }

    pub fn with_raw(mut self, raw: Value) -> Self {
        self.raw = Some(raw);
        self
    }

    pub fn method_not_allowed() -> Self {
        Self::new(FailureStep::Method, "Use POST")
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "ok": false,
            "step": self.step.to_string(),
            "error": self.error,
        });
        if let Some(raw) = &self.raw {
            body["raw"] = raw.clone();
        }
        body
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationSuccess {
    pub style: Option<String>,
    pub id: String,
    pub urls: Vec<String>,
    pub raw: Value,
}

impl GenerationSuccess {
    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "ok": true,
            "id": self.id,
            "urls": self.urls,
            "raw": self.raw,
        });
        if let Some(style) = &self.style {
            body["style"] = Value::String(style.clone());
        }
        body
    }
}

pub type GenerationResult = Result<GenerationSuccess, GenerationFailure>;
