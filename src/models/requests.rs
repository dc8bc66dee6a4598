use actix_multipart::form::{bytes::Bytes, MultipartForm};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use validator::Validate;
use crate::models::domain::{Course, MatchRecord};

/// Request to match a transcript against the equivalency guide
///
/// `courses` is kept as raw JSON so a non-array payload can be rejected with a
/// specific error instead of a generic deserialization failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchCoursesRequest {
    #[serde(default)]
    pub courses: Value,
    #[serde(default)]
    pub major: Option<String>,
}

impl MatchCoursesRequest {
    /// Decode and validate the course list
    pub fn parse_courses(&self) -> Result<Vec<Course>, String> {
        if !self.courses.is_array() {
            return Err("Invalid courses payload".to_string());
        }

        let courses: Vec<Course> = serde_json::from_value(self.courses.clone())
            .map_err(|e| format!("Invalid course record: {}", e))?;

        for course in &courses {
            course
                .validate()
                .map_err(|e| format!("Invalid course {}: {}", course.course_code, e))?;
        }

        Ok(courses)
    }

    /// Major with surrounding whitespace removed, `None` when blank
    pub fn major(&self) -> Option<&str> {
        self.major
            .as_deref()
            .map(str::trim)
            .filter(|m| !m.is_empty())
    }
}

/// Request to extract courses from pasted transcript text
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ParseTranscriptRequest {
    #[validate(length(min = 1))]
    #[serde(rename = "transcriptText", default)]
    pub transcript_text: String,
}

/// Multipart upload of a transcript PDF or image under the `file` field
#[derive(MultipartForm)]
pub struct TranscriptUploadForm {
    pub file: Option<Bytes>,
}

/// Request to draft an email to a UW advisor
///
/// `matches` is lenient: a non-array is treated as no matches, and entries that
/// are not complete match records are skipped.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvisorRequest {
    #[serde(default, deserialize_with = "lenient_matches")]
    pub matches: Vec<MatchRecord>,
    #[serde(rename = "studentName", default)]
    pub student_name: Option<String>,
    #[serde(default)]
    pub major: Option<String>,
}

fn lenient_matches<'de, D>(deserializer: D) -> Result<Vec<MatchRecord>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(items) = value else {
        return Ok(Vec::new());
    };

    Ok(items
        .into_iter()
        .filter_map(|item| serde_json::from_value(item).ok())
        .collect())
}
