use crate::models::{AdvisorRequest, MatchRecord};
use crate::services::{AnthropicClient, ReasoningError};
use std::sync::Arc;
use thiserror::Error;

/// Token budget for an advisor email
pub const ADVISOR_MAX_TOKENS: u32 = 2048;

/// Errors that can occur while drafting an advisor email
#[derive(Debug, Error)]
pub enum AdvisorError {
    #[error("Reasoning service is not configured")]
    ServiceUnavailable,

    #[error("Reasoning service failed: {0}")]
    Reasoning(#[from] ReasoningError),

    #[error("Failed to build prompt: {0}")]
    Prompt(#[from] serde_json::Error),
}

/// Drafts an email asking a UW advisor to review uncertain transfer credits
#[derive(Clone)]
pub struct AdvisorDrafter {
    client: Option<Arc<AnthropicClient>>,
}

impl AdvisorDrafter {
    pub fn new(client: Option<Arc<AnthropicClient>>) -> Self {
        Self { client }
    }

    pub async fn draft(&self, request: &AdvisorRequest) -> Result<String, AdvisorError> {
        let client = self.client.as_ref().ok_or(AdvisorError::ServiceUnavailable)?;

        let flagged = courses_needing_review(&request.matches);
        tracing::info!("Drafting advisor email for {} flagged courses", flagged.len());

        let prompt = build_advisor_prompt(
            request.student_name.as_deref(),
            request.major.as_deref(),
            &flagged,
        )?;

        Ok(client.complete(&prompt, ADVISOR_MAX_TOKENS).await?)
    }
}

/// Records an advisor should confirm: review items and electives
pub fn courses_needing_review(matches: &[MatchRecord]) -> Vec<&MatchRecord> {
    matches
        .iter()
        .filter(|m| m.match_type.needs_advisor())
        .collect()
}

pub fn build_advisor_prompt(
    student_name: Option<&str>,
    major: Option<&str>,
    flagged: &[&MatchRecord],
) -> Result<String, serde_json::Error> {
    let courses = serde_json::to_string_pretty(flagged)?;

    Ok(format!(
        r#"Generate a professional email to a UW academic advisor requesting review of transfer credits.

Student Name: {student}
Intended Major: {major}

Courses needing review:
{courses}

Write a concise, professional email that:
1. Introduces the student and their transfer institution
2. Lists courses that need evaluation
3. Requests clarification on how these credits will transfer
4. Thanks the advisor for their time

Return only the email body text, ready to send."#,
        student = student_name.filter(|s| !s.trim().is_empty()).unwrap_or("Student"),
        major = major.filter(|m| !m.trim().is_empty()).unwrap_or("Undeclared"),
    ))
}
