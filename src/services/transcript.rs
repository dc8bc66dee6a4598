use crate::models::Course;
use crate::services::anthropic::{AnthropicClient, Attachment, ReasoningError};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Token budget for a transcript extraction response
pub const PARSE_MAX_TOKENS: u32 = 2048;

const PARSE_PROMPT: &str = r#"You are a transcript parser. Extract EVERY course from the transcript and return ONLY a JSON array.

Each item must include:
- courseCode (string, e.g. "MATH& 151")
- courseTitle (string)
- credits (number)
- grade (string; use "In Progress" if missing)
- institution (string; use "Unknown" if not present)

Rules:
- Do not drop courses.
- Credits must be numbers (no strings like "5 credits").
- Return raw JSON array, no markdown or prose."#;

/// Errors that can occur while extracting courses
#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("Failed to read sample transcript: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid course data: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Reasoning service failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Parsed content is not an array")]
    NotArray,
}

#[derive(Debug, Deserialize)]
struct SampleFile {
    courses: Vec<Course>,
}

/// Load the demo transcript from a JSON file of the form `{"courses": [...]}`
pub fn load_sample_transcript<P: AsRef<Path>>(path: P) -> Result<Vec<Course>, TranscriptError> {
    let raw = std::fs::read_to_string(path.as_ref())?;
    let file: SampleFile = serde_json::from_str(&raw)?;
    Ok(file.courses)
}

/// Turns pasted transcript text or uploaded transcript files into course records
///
/// Without a reasoning service, or when extraction fails, the demo transcript is
/// returned so the rest of the flow can still be exercised.
#[derive(Clone)]
pub struct TranscriptParser {
    client: Option<Arc<AnthropicClient>>,
    sample: Arc<Vec<Course>>,
}

impl TranscriptParser {
    pub fn new(client: Option<Arc<AnthropicClient>>, sample: Vec<Course>) -> Self {
        Self {
            client,
            sample: Arc::new(sample),
        }
    }

    /// Extract courses from transcript text, falling back to the demo transcript
    pub async fn parse_text(&self, transcript_text: &str) -> Vec<Course> {
        let Some(client) = &self.client else {
            tracing::info!("No reasoning service configured, returning demo transcript");
            return self.sample.to_vec();
        };

        match extract_with(client, transcript_text).await {
            Ok(courses) => {
                tracing::info!("Extracted {} courses from transcript", courses.len());
                courses
            }
            Err(e) => {
                tracing::warn!("Transcript extraction failed, returning demo transcript: {}", e);
                self.sample.to_vec()
            }
        }
    }

    /// Extract courses from an uploaded PDF or image, falling back to the demo transcript
    pub async fn parse_file(&self, attachment: &Attachment) -> Vec<Course> {
        let Some(client) = &self.client else {
            tracing::info!("No reasoning service configured, returning demo transcript");
            return self.sample.to_vec();
        };

        let extracted = client
            .complete_with_attachment(attachment, PARSE_PROMPT, PARSE_MAX_TOKENS)
            .await
            .map_err(TranscriptError::from)
            .and_then(|reply| extract_course_array(&reply));

        match extracted {
            Ok(courses) => {
                tracing::info!(
                    "Extracted {} courses from {} upload",
                    courses.len(),
                    attachment.kind.media_type()
                );
                courses
            }
            Err(e) => {
                tracing::warn!("Transcript file extraction failed, returning demo transcript: {}", e);
                self.sample.to_vec()
            }
        }
    }
}

async fn extract_with(client: &AnthropicClient, transcript_text: &str) -> Result<Vec<Course>, TranscriptError> {
    let prompt = format!("{}\n\nTranscript:\n{}", PARSE_PROMPT, transcript_text);
    let reply = client.complete(&prompt, PARSE_MAX_TOKENS).await?;
    extract_course_array(&reply)
}

/// Pull a JSON array of courses out of free-form model output
///
/// Prefers the contents of the first fenced block, then narrows to the span
/// between the first `[` and the last `]`.
pub fn extract_course_array(raw_text: &str) -> Result<Vec<Course>, TranscriptError> {
    let mut text = raw_text.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        if let Some(end) = after.find("```") {
            let block = &after[..end];
            let block = block.strip_prefix("json").unwrap_or(block);
            text = block.trim();
        }
    }

    if let (Some(open), Some(close)) = (text.find('['), text.rfind(']')) {
        if open < close {
            text = &text[open..=close];
        }
    }

    let parsed: Value = serde_json::from_str(text)?;
    if !parsed.is_array() {
        return Err(TranscriptError::NotArray);
    }

    Ok(serde_json::from_value(parsed)?)
}
