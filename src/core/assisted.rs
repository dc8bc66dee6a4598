use crate::models::{Course, EquivalencyEntry, MatchRecord};
use crate::services::{AnthropicClient, ReasoningError};
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;

/// Token budget for a matching response
pub const MATCH_MAX_TOKENS: u32 = 4096;

const UNDECLARED: &str = "Undeclared";

/// Reasons a reasoning-service reply cannot be used as a match result
#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("Response is not valid JSON: {0}")]
    NotJson(#[source] serde_json::Error),

    #[error("Response has no matches array")]
    MissingMatches,

    #[error("Match {index} has an invalid shape: {source}")]
    InvalidMatch {
        index: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Match {index} has invalid transfer credits")]
    InvalidCredits { index: usize },

    #[error("Expected {expected} matches, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("No match returned for course {0}")]
    MissingCourse(String),
}

/// Any failure on the assisted path; all of them trigger the deterministic fallback
#[derive(Debug, Error)]
pub enum AssistError {
    #[error("Transport failure: {0}")]
    Transport(#[from] ReasoningError),

    #[error("Malformed response: {0}")]
    Malformed(#[from] ResponseError),

    #[error("Failed to build prompt: {0}")]
    Prompt(#[source] serde_json::Error),
}

/// Match records proposed by the reasoning service
#[derive(Debug, Clone, PartialEq)]
pub struct Proposal {
    pub matches: Vec<MatchRecord>,
    /// The service's own transferred-credit total, used only as a reconciliation hint
    pub transferred_hint: Option<f64>,
}

/// Matcher that asks the reasoning service to resolve courses, including by title similarity
#[derive(Clone)]
pub struct AssistedMatcher {
    client: Arc<AnthropicClient>,
}

impl AssistedMatcher {
    pub fn new(client: Arc<AnthropicClient>) -> Self {
        Self { client }
    }

    pub fn model(&self) -> &str {
        self.client.model()
    }

    /// One request, no retries
    pub async fn propose(
        &self,
        courses: &[Course],
        entries: &[&EquivalencyEntry],
        major: Option<&str>,
    ) -> Result<Proposal, AssistError> {
        let prompt = build_match_prompt(courses, entries, major).map_err(AssistError::Prompt)?;
        let reply = self.client.complete(&prompt, MATCH_MAX_TOKENS).await?;
        Ok(parse_proposal(&reply, courses)?)
    }
}

/// Build the matching prompt for the reasoning service
pub fn build_match_prompt(
    courses: &[Course],
    entries: &[&EquivalencyEntry],
    major: Option<&str>,
) -> Result<String, serde_json::Error> {
    let equivalencies = serde_json::to_string_pretty(entries)?;
    let student_courses = serde_json::to_string_pretty(courses)?;

    Ok(format!(
        r#"You are a UW transfer credit evaluator. Match each student course to its UW equivalent.

Student's intended major: {major}

UW transfer equivalencies for the courses this student took:
{equivalencies}

Student's courses:
{student_courses}

For each student course:
1. Look for an exact match in the equivalencies by course code
2. If there is no exact match, use semantic similarity of course titles to pick the best UW equivalent
3. If there is still no match, mark it for advisor review

Return only a JSON object with this structure:
{{
  "matches": [
    {{
      "studentCourse": {{"courseCode", "courseTitle", "credits", "grade"}},
      "uwEquivalent": "COURSE CODE" or "Elective Credit" or "Requires Review",
      "uwTitle": "Course Title" or "General Elective" or "Needs Evaluation",
      "transferCredits": number,
      "category": "category name",
      "matchType": "exact" | "semantic" | "elective" | "review",
      "reasoning": "brief explanation"
    }}
  ],
  "summary": {{
    "totalCreditsAttempted": number,
    "totalCreditsTransferred": number,
    "directTransfers": number,
    "electiveCredits": number,
    "needsReview": number
  }}
}}"#,
        major = major.unwrap_or(UNDECLARED),
    ))
}

/// Remove a surrounding markdown code fence, with or without a language tag
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // drop a language tag whether or not a newline follows it
    let tag_len = rest
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let after_tag = &rest[tag_len..];
    let tag_ends = after_tag.is_empty()
        || after_tag.starts_with(|c: char| c.is_whitespace() || c == '{' || c == '[');
    let body = if tag_len > 0 && tag_ends {
        after_tag
    } else {
        rest
    };

    match body.find("```") {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Parse and repair a matching reply
///
/// Records are aligned back onto `courses` by course code so each input course
/// keeps exactly one record and its original fields. Anything that does not fit
/// that shape is rejected.
pub fn parse_proposal(reply: &str, courses: &[Course]) -> Result<Proposal, ResponseError> {
    let value: Value = serde_json::from_str(strip_code_fences(reply)).map_err(ResponseError::NotJson)?;

    let raw_matches = value
        .get("matches")
        .and_then(Value::as_array)
        .ok_or(ResponseError::MissingMatches)?;

    if raw_matches.len() != courses.len() {
        return Err(ResponseError::CountMismatch {
            expected: courses.len(),
            actual: raw_matches.len(),
        });
    }

    let mut pool = Vec::with_capacity(raw_matches.len());
    for (index, raw) in raw_matches.iter().enumerate() {
        let record: MatchRecord = serde_json::from_value(raw.clone())
            .map_err(|source| ResponseError::InvalidMatch { index, source })?;

        if !record.transfer_credits.is_finite() || record.transfer_credits < 0.0 {
            return Err(ResponseError::InvalidCredits { index });
        }
        pool.push(Some(record));
    }

    let matches = courses
        .iter()
        .map(|course| {
            let record = pool
                .iter_mut()
                .find(|slot| {
                    slot.as_ref()
                        .is_some_and(|r| r.student_course.course_code == course.course_code)
                })
                .and_then(Option::take)
                .ok_or_else(|| ResponseError::MissingCourse(course.course_code.clone()))?;

            Ok(MatchRecord {
                student_course: course.clone(),
                ..record
            })
        })
        .collect::<Result<Vec<_>, ResponseError>>()?;

    let transferred_hint = value
        .get("summary")
        .and_then(|summary| summary.get("totalCreditsTransferred"))
        .and_then(Value::as_f64);

    Ok(Proposal {
        matches,
        transferred_hint,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::MatchType;
    use serde_json::json;

    fn course(code: &str, title: &str, credits: f64) -> Course {
        Course {
            course_code: code.to_string(),
            course_title: title.to_string(),
            credits,
            grade: "A-".to_string(),
            institution: None,
        }
    }

    fn reply_record(code: &str, match_type: &str, credits: f64) -> Value {
        json!({
            "studentCourse": { "courseCode": code, "courseTitle": "whatever", "credits": credits, "grade": "A" },
            "uwEquivalent": "CSE 121",
            "uwTitle": "Introduction to Computer Programming I",
            "transferCredits": credits,
            "category": "Natural Sciences",
            "matchType": match_type,
            "reasoning": "Titles describe the same course."
        })
    }

    #[test]
    fn test_strip_code_fences() {
        assert_eq!(strip_code_fences("  {\"a\": 1}  "), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```\n"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```{\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json\n[1, 2]\n```\nLet me know!"), "[1, 2]");
        assert_eq!(strip_code_fences("```json {\"a\": 1}```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```JSON\t{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```json{\"a\": 1}```"), "{\"a\": 1}");
    }

    #[test]
    fn test_parse_single_line_fenced_reply() {
        let courses = vec![course("CS 210", "Fundamentals of Computer Science I", 5.0)];
        let body = json!({ "matches": [reply_record("CS 210", "semantic", 4.0)] });
        let reply = format!("```json {}```", body);

        let proposal = parse_proposal(&reply, &courses).unwrap();

        assert_eq!(proposal.matches[0].match_type, MatchType::Semantic);
        assert_eq!(proposal.matches[0].transfer_credits, 4.0);
    }

    #[test]
    fn test_prompt_contains_inputs() {
        let courses = vec![course("CS 210", "Fundamentals of Computer Science I", 5.0)];
        let entry = EquivalencyEntry {
            source_course: Some("CS 210".to_string()),
            uw_equivalent: Some("CSE 121".to_string()),
            uw_title: None,
            uw_credits: Some(4.0),
            category: None,
            direct_transfer: true,
        };

        let prompt = build_match_prompt(&courses, &[&entry], Some("Computer Science")).unwrap();
        assert!(prompt.contains("Student's intended major: Computer Science"));
        assert!(prompt.contains("\"sourceCourse\": \"CS 210\""));
        assert!(prompt.contains("Fundamentals of Computer Science I"));

        let undeclared = build_match_prompt(&courses, &[], None).unwrap();
        assert!(undeclared.contains("Student's intended major: Undeclared"));
    }

    #[test]
    fn test_parse_fenced_reply_with_hint() {
        let courses = vec![course("CS 210", "Fundamentals of Computer Science I", 5.0)];
        let body = json!({
            "matches": [reply_record("CS 210", "semantic", 4.0)],
            "summary": { "totalCreditsAttempted": 999, "totalCreditsTransferred": 4 }
        });
        let reply = format!("```json\n{}\n```", body);

        let proposal = parse_proposal(&reply, &courses).unwrap();

        assert_eq!(proposal.matches.len(), 1);
        assert_eq!(proposal.matches[0].match_type, MatchType::Semantic);
        assert_eq!(proposal.matches[0].student_course, courses[0]);
        assert_eq!(proposal.transferred_hint, Some(4.0));
    }

    #[test]
    fn test_parse_realigns_reordered_records() {
        let courses = vec![course("MATH& 151", "Calculus I", 5.0), course("XYZ 1", "Unknown", 3.0)];
        let body = json!({
            "matches": [reply_record("XYZ 1", "review", 3.0), reply_record("MATH& 151", "exact", 5.0)]
        });

        let proposal = parse_proposal(&body.to_string(), &courses).unwrap();

        assert_eq!(proposal.matches[0].student_course.course_code, "MATH& 151");
        assert_eq!(proposal.matches[0].match_type, MatchType::Exact);
        assert_eq!(proposal.matches[1].match_type, MatchType::Review);
        assert_eq!(proposal.transferred_hint, None);
    }

    #[test]
    fn test_non_numeric_hint_is_dropped() {
        let courses = vec![course("CS 210", "Intro", 5.0)];
        let body = json!({
            "matches": [reply_record("CS 210", "exact", 5.0)],
            "summary": { "totalCreditsTransferred": "five" }
        });

        assert_eq!(parse_proposal(&body.to_string(), &courses).unwrap().transferred_hint, None);
    }

    #[test]
    fn test_rejects_prose() {
        let err = parse_proposal("I could not find any matches.", &[]).unwrap_err();
        assert!(matches!(err, ResponseError::NotJson(_)));
    }

    #[test]
    fn test_rejects_missing_matches() {
        let err = parse_proposal(r#"{"summary": {}}"#, &[]).unwrap_err();
        assert!(matches!(err, ResponseError::MissingMatches));
    }

    #[test]
    fn test_rejects_record_without_transfer_credits() {
        let courses = vec![course("CS 210", "Intro", 5.0)];
        let mut record = reply_record("CS 210", "semantic", 5.0);
        if let Some(fields) = record.as_object_mut() {
            fields.remove("transferCredits");
        }
        let body = json!({ "matches": [record] });

        let err = parse_proposal(&body.to_string(), &courses).unwrap_err();
        assert!(matches!(err, ResponseError::InvalidMatch { index: 0, .. }));
    }

    #[test]
    fn test_rejects_unknown_match_type() {
        let courses = vec![course("CS 210", "Intro", 5.0)];
        let body = json!({ "matches": [reply_record("CS 210", "probable", 5.0)] });

        let err = parse_proposal(&body.to_string(), &courses).unwrap_err();
        assert!(matches!(err, ResponseError::InvalidMatch { index: 0, .. }));
    }

    #[test]
    fn test_rejects_wrong_count() {
        let courses = vec![course("CS 210", "Intro", 5.0), course("CS 211", "Intro II", 5.0)];
        let body = json!({ "matches": [reply_record("CS 210", "exact", 5.0)] });

        let err = parse_proposal(&body.to_string(), &courses).unwrap_err();
        assert!(matches!(err, ResponseError::CountMismatch { expected: 2, actual: 1 }));
    }

    #[test]
    fn test_rejects_invented_course() {
        let courses = vec![course("CS 210", "Intro", 5.0)];
        let body = json!({ "matches": [reply_record("CS 999", "exact", 5.0)] });

        let err = parse_proposal(&body.to_string(), &courses).unwrap_err();
        assert!(matches!(err, ResponseError::MissingCourse(code) if code == "CS 210"));
    }

    #[test]
    fn test_rejects_negative_credits() {
        let courses = vec![course("CS 210", "Intro", 5.0)];
        let body = json!({ "matches": [reply_record("CS 210", "exact", -5.0)] });

        let err = parse_proposal(&body.to_string(), &courses).unwrap_err();
        assert!(matches!(err, ResponseError::InvalidCredits { index: 0 }));
    }
}
