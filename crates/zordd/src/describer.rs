//! Scene description: remote multimodal model plus identity lookup.

use crate::config::Config;
use crate::engine::EngineHandle;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use zord_core::{decoder, IdentityGallery};

/// Instruction sent alongside every image.
pub const DESCRIBE_PROMPT: &str = "Report what you see. Be brief and robotic.";
/// Text returned to the client whenever a description cannot be produced.
pub const FALLBACK_DESCRIPTION: &str = "Optical sensor failure. Try again.";

#[derive(Error, Debug)]
pub enum DescribeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    Status { status: reqwest::StatusCode, body: String },
    #[error("response contained no text")]
    EmptyResponse,
    #[error("payload could not be decoded: {0}")]
    Decode(#[from] decoder::DecodeError),
}

/// A remote service that turns one JPEG into a short description.
#[async_trait]
pub trait DescriptionService: Send + Sync {
    async fn describe(&self, image: &[u8]) -> Result<String, DescribeError>;
}

/// Gemini `generateContent` client.
pub struct GeminiClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: String, base_url: String, timeout: std::time::Duration) -> Result<Self, DescribeError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, DescribeError> {
        Self::new(
            config.api_key.clone(),
            config.describe_model.clone(),
            config.describe_endpoint.clone(),
            config.describe_timeout,
        )
    }

    fn request_body(image: &[u8]) -> Value {
        json!({
            "contents": [{
                "role": "user",
                "parts": [
                    { "text": DESCRIBE_PROMPT },
                    { "inlineData": { "mimeType": "image/jpeg", "data": BASE64.encode(image) } },
                ],
            }],
        })
    }
}

/// Concatenated text parts of the first candidate.
fn response_text(body: &Value) -> Option<String> {
    let parts = body["candidates"][0]["content"]["parts"].as_array()?;
    let text: String = parts
        .iter()
        .filter_map(|part| part.get("text").and_then(Value::as_str))
        .collect();
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[async_trait]
impl DescriptionService for GeminiClient {
    async fn describe(&self, image: &[u8]) -> Result<String, DescribeError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&Self::request_body(image))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DescribeError::Status { status, body });
        }

        let body: Value = response.json().await?;
        response_text(&body).ok_or(DescribeError::EmptyResponse)
    }
}

/// Outcome of one describe command.
#[derive(Debug, Clone, PartialEq)]
pub struct DescriptionResult {
    pub text: String,
    pub recognized: Option<String>,
}

impl DescriptionResult {
    pub fn fallback() -> Self {
        Self { text: FALLBACK_DESCRIPTION.to_string(), recognized: None }
    }
}

/// Runs the remote description and the gallery lookup side by side.
#[derive(Clone)]
pub struct SceneDescriber {
    service: Arc<dyn DescriptionService>,
    engine: EngineHandle,
    gallery: Arc<IdentityGallery>,
}

impl SceneDescriber {
    pub fn new(service: Arc<dyn DescriptionService>, engine: EngineHandle, gallery: Arc<IdentityGallery>) -> Self {
        Self { service, engine, gallery }
    }

    /// Decode a describe-command payload and describe it. Never fails.
    pub async fn describe_payload(&self, payload: &str) -> DescriptionResult {
        match decoder::decode_base64(decoder::describe_payload(payload)) {
            Ok(bytes) => self.describe(&bytes).await,
            Err(e) => {
                tracing::warn!(error = %DescribeError::from(e), "describe payload rejected");
                DescriptionResult::fallback()
            }
        }
    }

    /// Describe raw image bytes. Remote failures become the fallback text.
    pub async fn describe(&self, image: &[u8]) -> DescriptionResult {
        let (description, recognized) = tokio::join!(self.service.describe(image), self.identify(image));

        match description {
            Ok(text) => {
                tracing::info!(text = %text, recognized = ?recognized, "scene described");
                DescriptionResult { text, recognized }
            }
            Err(e) => {
                tracing::warn!(error = %e, "description service failed");
                DescriptionResult::fallback()
            }
        }
    }

    /// Best gallery match for the primary face in `image`, if any.
    async fn identify(&self, image: &[u8]) -> Option<String> {
        if self.gallery.is_empty() {
            return None;
        }
        let raster = match decoder::decode_raster(image) {
            Ok(raster) => raster,
            Err(e) => {
                tracing::debug!(error = %e, "describe image not decodable; skipping identity match");
                return None;
            }
        };
        match self.engine.encode(raster).await {
            Ok(Some(embedding)) => self.gallery.match_name(&embedding),
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(error = %e, "identity match failed");
                None
            }
        }
    }
}
