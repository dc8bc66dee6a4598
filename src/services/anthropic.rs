use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when calling the reasoning service
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unexpected response type: {0}")]
    NonTextContent(String),

    #[error("Response contained no content blocks")]
    EmptyContent,
}

/// Connection settings for the Anthropic Messages API
#[derive(Debug, Clone)]
pub struct AnthropicOptions {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub api_version: String,
    pub timeout_secs: u64,
}

/// Client for the Anthropic Messages API
///
/// Sends single-turn prompts and returns the text of the first content block.
/// Every call is a single attempt; callers decide what a failure means.
pub struct AnthropicClient {
    base_url: String,
    api_key: String,
    model: String,
    api_version: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [Message<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: MessageContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum MessageContent<'a> {
    Text(&'a str),
    Blocks(Vec<RequestBlock<'a>>),
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum RequestBlock<'a> {
    Text { text: &'a str },
    Image { source: Base64Source<'a> },
    Document { source: Base64Source<'a> },
}

#[derive(Debug, Serialize)]
struct Base64Source<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    media_type: &'static str,
    data: &'a str,
}

/// File types the reasoning service can read directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttachmentKind {
    Pdf,
    Jpeg,
    Png,
    Webp,
    Gif,
}

impl AttachmentKind {
    /// Map an upload's content type onto a supported kind
    pub fn from_mime(mime: &str) -> Option<Self> {
        match mime.trim().to_ascii_lowercase().as_str() {
            "application/pdf" => Some(Self::Pdf),
            "image/jpeg" | "image/jpg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/webp" => Some(Self::Webp),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn media_type(self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Gif => "image/gif",
        }
    }
}

/// An uploaded file sent alongside a prompt
#[derive(Debug, Clone)]
pub struct Attachment {
    pub kind: AttachmentKind,
    pub bytes: Vec<u8>,
}

impl Attachment {
    fn block<'a>(&self, encoded: &'a str) -> RequestBlock<'a> {
        let source = Base64Source {
            kind: "base64",
            media_type: self.kind.media_type(),
            data: encoded,
        };

        match self.kind {
            AttachmentKind::Pdf => RequestBlock::Document { source },
            _ => RequestBlock::Image { source },
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text { text: String },
    #[serde(other)]
    Other,
}

impl AnthropicClient {
    /// Create a new client
    pub fn new(options: AnthropicOptions) -> Result<Self, ReasoningError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(options.timeout_secs))
            .build()?;

        Ok(Self {
            base_url: options.base_url,
            api_key: options.api_key,
            model: options.model,
            api_version: options.api_version,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send a single user prompt and return the text of the first content block
    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, ReasoningError> {
        tracing::debug!("Sending {} prompt chars ({})", prompt.len(), self.model);
        self.send(MessageContent::Text(prompt), max_tokens).await
    }

    /// Send a file followed by a prompt and return the text of the first content block
    pub async fn complete_with_attachment(
        &self,
        attachment: &Attachment,
        prompt: &str,
        max_tokens: u32,
    ) -> Result<String, ReasoningError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&attachment.bytes);

        tracing::debug!(
            "Sending {} byte {} attachment ({})",
            attachment.bytes.len(),
            attachment.kind.media_type(),
            self.model
        );

        let content = MessageContent::Blocks(vec![
            attachment.block(&encoded),
            RequestBlock::Text { text: prompt },
        ]);
        self.send(content, max_tokens).await
    }

    async fn send(&self, content: MessageContent<'_>, max_tokens: u32) -> Result<String, ReasoningError> {
        let url = format!("{}/v1/messages", self.base_url.trim_end_matches('/'));

        let body = MessagesRequest {
            model: &self.model,
            max_tokens,
            messages: [Message {
                role: "user",
                content,
            }],
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", &self.api_version)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Reasoning service returned {}: {}", status, body);
            return Err(ReasoningError::ApiError(format!(
                "Messages request failed: {}",
                status
            )));
        }

        let parsed: MessagesResponse = response.json().await?;

        match parsed.content.into_iter().next() {
            Some(ContentBlock::Text { text }) => Ok(text),
            Some(ContentBlock::Other) => Err(ReasoningError::NonTextContent("non-text block".into())),
            None => Err(ReasoningError::EmptyContent),
        }
    }
}
