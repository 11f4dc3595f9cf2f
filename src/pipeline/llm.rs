//! Summary request: build the vision chat message and make the one call.
//!
//! The request body follows the OpenAI chat-completions shape, which most
//! hosted and self-hosted vision models accept: one `user` message whose
//! content is a text part (the instruction) followed by an `image_url` part
//! carrying the JPEG data URI.
//!
//! ## No retries
//!
//! Exactly one round trip is made per call. Any failure is returned to the
//! caller unchanged; asking again means calling again.
//!
//! ## Transport seam
//!
//! The network call sits behind [`ChatTransport`]. [`OpenAiTransport`] is the
//! production implementation and owns the [`Credential`]; tests and embedders
//! can supply their own through [`crate::config::SummaryConfig::transport`].

use crate::config::SummaryConfig;
use crate::credential::Credential;
use crate::error::SummaryError;
use crate::pipeline::encode::EncodedPayload;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};
use tracing::{debug, warn};

// ── Wire types ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageUrl {
    pub url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub usage: Option<Usage>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Usage {
    #[serde(default)]
    pub prompt_tokens: u64,
    #[serde(default)]
    pub completion_tokens: u64,
}

// ── Transport ────────────────────────────────────────────────────────────

/// Sends one chat request and returns the decoded response.
///
/// Implementations must not retry: one call, one round trip.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, SummaryError>;
}

/// OpenAI-compatible chat-completions client.
pub struct OpenAiTransport {
    client: Client,
    credential: Credential,
    endpoint: String,
}

impl OpenAiTransport {
    /// Build a client for `config.base_url` that authenticates with `credential`.
    pub fn new(credential: Credential, config: &SummaryConfig) -> Result<Self, SummaryError> {
        let mut builder = Client::builder();
        if let Some(secs) = config.api_timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| SummaryError::Internal(format!("HTTP client: {e}")))?;

        Ok(Self {
            client,
            credential,
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatTransport for OpenAiTransport {
    async fn send(&self, request: &ChatRequest) -> Result<ChatResponse, SummaryError> {
        debug!(model = %request.model, endpoint = %self.endpoint, "Sending summary request");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.credential.expose())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(SummaryError::from_status(status.as_u16(), &body));
        }

        serde_json::from_str(&body).map_err(|e| SummaryError::Response {
            detail: format!("body is not a chat completion: {e}"),
        })
    }
}

// ── Request / response handling ──────────────────────────────────────────

/// The text of a successful call plus what the service reported about it.
#[derive(Debug, Clone)]
pub struct SummaryReply {
    pub summary: String,
    pub model: Option<String>,
    pub input_tokens: u64,
    pub output_tokens: u64,
    pub duration_ms: u64,
}

/// Build the single user message: instruction text, then the image.
pub fn build_request(payload: &EncodedPayload, config: &SummaryConfig) -> ChatRequest {
    ChatRequest {
        model: config.model.clone(),
        messages: vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    text: config.prompt.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: payload.data_uri(),
                    },
                },
            ],
        }],
        max_tokens: config.max_tokens,
        temperature: config.temperature,
    }
}

/// Take the first choice's text as the summary.
pub fn extract_summary(
    response: ChatResponse,
) -> Result<(String, Option<Usage>, Option<String>), SummaryError> {
    let ChatResponse {
        model,
        choices,
        usage,
    } = response;

    let first = choices.into_iter().next().ok_or_else(|| SummaryError::Response {
        detail: "no choices in response".into(),
    })?;
    let text = first.message.content.ok_or_else(|| SummaryError::Response {
        detail: "first choice has no text content".into(),
    })?;
    Ok((text, usage, model))
}

/// Send `payload` to the service once and return the summary text.
pub async fn request_summary(
    transport: &dyn ChatTransport,
    payload: &EncodedPayload,
    config: &SummaryConfig,
) -> Result<SummaryReply, SummaryError> {
    let start = Instant::now();
    let request = build_request(payload, config);

    let response = transport.send(&request).await.inspect_err(|e| {
        warn!("Summary request failed: {}", e);
    })?;

    let (summary, usage, model) = extract_summary(response).inspect_err(|e| {
        warn!("Summary response unusable: {}", e);
    })?;
    let usage = usage.unwrap_or_default();
    let duration_ms = start.elapsed().as_millis() as u64;

    debug!(
        "Summary: {} chars, {} input tokens, {} output tokens, {}ms",
        summary.len(),
        usage.prompt_tokens,
        usage.completion_tokens,
        duration_ms
    );

    Ok(SummaryReply {
        summary,
        model,
        input_tokens: usage.prompt_tokens,
        output_tokens: usage.completion_tokens,
        duration_ms,
    })
}
