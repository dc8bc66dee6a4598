use serde::{Deserialize, Serialize};
use crate::models::domain::Course;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    /// `enabled` when a reasoning service key is configured
    pub inference: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

/// Courses extracted from a transcript
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseTranscriptResponse {
    pub courses: Vec<Course>,
}

/// Drafted advisor email
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorResponse {
    #[serde(rename = "emailBody")]
    pub email_body: String,
}
