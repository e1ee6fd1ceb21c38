use super::output::normalize_output;
use super::style::preset_for;
use super::types::{
    FailureStep, GenerateRequest, GenerationFailure, GenerationResult, GenerationSuccess,
    PredictionStatus,
};
use crate::config::GenerationConfig;
use crate::utils::http_client::build_upstream_client;
use crate::utils::text::truncate_with_ellipsis;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::borrow::Cow;
use std::time::Duration;
use tokio::time::Instant;

/// Upstream bodies that fail to parse are echoed back, cut to this length.
const MAX_RAW_ERROR_CHARS: usize = 300;

#[derive(Debug, Serialize)]
struct CreatePredictionRequest<'a> {
    version: &'a str,
    input: PredictionInput<'a>,
}

#[derive(Debug, Serialize)]
struct PredictionInput<'a> {
    image: Cow<'a, str>,
    prompt: &'a str,
    negative_prompt: &'a str,
}

/// Client for a Replicate-compatible predictions API.
pub struct PredictionClient {
    base_url: String,
    token: String,
    model_version: String,
    poll_interval: Duration,
    deadline: Duration,
    client: Client,
}

impl PredictionClient {
    pub fn new(config: &GenerationConfig, token: &str) -> Self {
        Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
            model_version: config.model_version.clone(),
            poll_interval: config.poll_interval(),
            deadline: config.deadline(),
            client: build_upstream_client(),
        }
    }

    fn auth_header(&self) -> String {
        format!("Token {}", self.token)
    }

    /// Submit one prediction and poll it to a terminal state.
    pub async fn generate(&self, image_base64: &str, style: Option<&str>) -> GenerationResult {
        let preset = preset_for(style);
        let body = CreatePredictionRequest {
            version: &self.model_version,
            input: PredictionInput {
                image: normalize_image_payload(image_base64),
                prompt: preset.prompt,
                negative_prompt: preset.negative,
            },
        };

        let created = self.create_prediction(&body).await?;
        let id = created
            .get("id")
            .and_then(Value::as_str)
            .filter(|id| !id.is_empty())
            .map(str::to_string)
            .ok_or_else(|| {
                GenerationFailure::new(FailureStep::CreateParse, "prediction id missing")
                    .with_raw(created.clone())
            })?;
        tracing::info!(prediction_id = %id, "prediction created");

        let deadline = Instant::now() + self.deadline;
        let mut polls = 0_u32;
        while Instant::now() < deadline {
            tokio::time::sleep(self.poll_interval).await;
            polls += 1;

            let job = self.fetch_prediction(&id).await?;
            match PredictionStatus::of(&job) {
                Some(PredictionStatus::Succeeded) => {
                    let urls = job.get("output").map(normalize_output).unwrap_or_default();
                    tracing::info!(
                        prediction_id = %id,
                        polls,
                        urls = urls.len(),
                        "prediction succeeded"
                    );
                    return Ok(GenerationSuccess {
                        style: style.map(str::to_string),
                        id,
                        urls,
                        raw: job,
                    });
                }
                Some(status) if status.is_terminal() => {
                    let error = upstream_message(&job, &["error"])
                        .unwrap_or_else(|| status.to_string());
                    tracing::warn!(
                        prediction_id = %id,
                        polls,
                        %status,
                        error = %error,
                        "prediction did not succeed"
                    );
                    return Err(
                        GenerationFailure::new(FailureStep::JobFailed, error).with_raw(job)
                    );
                }
                other => {
                    tracing::debug!(
                        prediction_id = %id,
                        polls,
                        status = ?other,
                        "prediction pending"
                    );
                }
            }
        }

        tracing::warn!(prediction_id = %id, polls, "prediction timed out");
        Err(GenerationFailure::new(FailureStep::Timeout, "Replicate timeout"))
    }

    async fn create_prediction(
        &self,
        body: &CreatePredictionRequest<'_>,
    ) -> Result<Value, GenerationFailure> {
        let url = format!("{}/predictions", self.base_url);
        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(body)
            .send()
            .await
            .map_err(transport_failure)?;

        read_upstream_json(
            response,
            FailureStep::CreateParse,
            FailureStep::CreateRejected,
        )
        .await
    }

    async fn fetch_prediction(&self, id: &str) -> Result<Value, GenerationFailure> {
        let url = format!("{}/predictions/{id}", self.base_url);
        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .send()
            .await
            .map_err(transport_failure)?;

        read_upstream_json(response, FailureStep::PollParse, FailureStep::PollRejected).await
    }
}

/// Front door shared by the gateway and the CLI: credential check, input
/// check, then the upstream round trip.
pub struct Generator {
    client: Option<PredictionClient>,
}

impl Generator {
    pub fn from_config(config: &GenerationConfig) -> Self {
        let client = config
            .api_token
            .as_deref()
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(|token| PredictionClient::new(config, token));
        Self { client }
    }

    pub fn credential_configured(&self) -> bool {
        self.client.is_some()
    }

    pub async fn run(&self, request: GenerateRequest) -> GenerationResult {
        let Some(client) = &self.client else {
            return Err(GenerationFailure::new(
                FailureStep::Credential,
                "Missing REPLICATE_API_TOKEN",
            ));
        };

        let image = request
            .image_base64
            .as_deref()
            .filter(|image| !image.is_empty())
            .ok_or_else(|| GenerationFailure::new(FailureStep::Input, "Missing imageBase64"))?;

        client.generate(image, request.style.as_deref()).await
    }
}

/// Bare base64 is assumed to be JPEG; data URIs pass through.
pub fn normalize_image_payload(image: &str) -> Cow<'_, str> {
    if image.starts_with("data:") {
        Cow::Borrowed(image)
    } else {
        Cow::Owned(format!("data:image/jpeg;base64,{image}"))
    }
}

fn transport_failure(err: reqwest::Error) -> GenerationFailure {
    GenerationFailure::new(FailureStep::Server, err.to_string())
}

async fn read_upstream_json(
    response: reqwest::Response,
    parse_step: FailureStep,
    rejected_step: FailureStep,
) -> Result<Value, GenerationFailure> {
    let status = response.status();
    let text = response.text().await.map_err(transport_failure)?;

    let json: Value = serde_json::from_str(&text).map_err(|_| {
        GenerationFailure::new(parse_step, truncate_with_ellipsis(&text, MAX_RAW_ERROR_CHARS))
    })?;

    if !status.is_success() {
        let error = upstream_message(&json, &["detail", "error"])
            .unwrap_or_else(|| http_status_label(status));
        return Err(GenerationFailure::new(rejected_step, error).with_raw(json));
    }

    Ok(json)
}

/// First present, non-empty field among `keys`, stringified.
fn upstream_message(json: &Value, keys: &[&str]) -> Option<String> {
    keys.iter()
        .filter_map(|key| json.get(*key))
        .find_map(|value| match value {
            Value::Null => None,
            Value::String(s) if s.is_empty() => None,
            Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        })
}

fn http_status_label(status: StatusCode) -> String {
    format!("HTTP {}", status.as_u16())
}
