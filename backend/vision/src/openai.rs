//! Chat-completion client for OpenAI-compatible vision models.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use shipcheck_core::{InspectionError, VisionClient};

use crate::prompt::{IMAGE_MIME_TYPE, SYSTEM_PROMPT, TEMPERATURE, USER_INSTRUCTION};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
/// Upper bound for a single upstream call.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// Vision client speaking the `/chat/completions` protocol.
pub struct OpenAiVisionClient {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
    timeout: Duration,
}

impl OpenAiVisionClient {
    /// Client bounded by [`REQUEST_TIMEOUT`] per call.
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self> {
        Self::with_timeout(api_key, model, REQUEST_TIMEOUT)
    }

    pub fn with_timeout(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: &'static str,
    content: MessageContent,
}

#[derive(Serialize)]
#[serde(untagged)]
enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Chat Completions user-content parts (`text`, `image_url: {url}`). The
/// Responses API shapes (`input_text`, `input_image`) are not accepted by
/// `/chat/completions`.
#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Serialize)]
struct ImageUrl {
    url: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

fn build_request<'a>(model: &'a str, image: &[u8]) -> ChatRequest<'a> {
    let data_uri = format!("data:{};base64,{}", IMAGE_MIME_TYPE, STANDARD.encode(image));
    ChatRequest {
        model,
        messages: vec![
            ChatMessage {
                role: "system",
                content: MessageContent::Text(SYSTEM_PROMPT.to_string()),
            },
            ChatMessage {
                role: "user",
                content: MessageContent::Parts(vec![
                    ContentPart::Text {
                        text: USER_INSTRUCTION.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl { url: data_uri },
                    },
                ]),
            },
        ],
        temperature: TEMPERATURE,
    }
}

#[async_trait]
impl VisionClient for OpenAiVisionClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn analyze(&self, image: &[u8]) -> Result<String> {
        let start = Instant::now();
        let body = build_request(&self.model, image);

        debug!(model = %self.model, image_bytes = image.len(), "Sending image to vision API");

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("vision API request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(status = status.as_u16(), "vision API returned an error status");
            return Err(InspectionError::UpstreamStatus {
                status: status.as_u16(),
                body,
            }
            .into());
        }

        let chat: ChatResponse = response
            .json()
            .await
            .context("failed to parse vision API response")?;

        let content = chat
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or(InspectionError::EmptyReply)?;

        debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            reply_chars = content.len(),
            "Vision API replied"
        );
        Ok(content)
    }
}
