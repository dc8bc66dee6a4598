use crate::models::{Course, EquivalencyEntry, MatchRecord, MatchType};
use thiserror::Error;

pub const ELECTIVE_CREDIT: &str = "Elective Credit";
pub const GENERAL_ELECTIVE: &str = "General Elective";
pub const REQUIRES_REVIEW: &str = "Requires Review";
pub const NEEDS_EVALUATION: &str = "Needs Evaluation";

const ELECTIVE_REASON: &str = "Maps to UW elective per equivalency guide.";
const EXACT_REASON: &str = "Direct equivalency found in Bellevue → UW guide.";
const REVIEW_REASON: &str = "No direct equivalency found; flag for advisor review.";

/// Errors from the deterministic matcher
///
/// These only arise from a corrupt equivalency guide, never from student input.
#[derive(Debug, Error)]
pub enum MatchError {
    #[error("Equivalency entry for {code} has invalid credits: {credits}")]
    InvalidEntryCredits { code: String, credits: f64 },
}

/// Match every course against the guide by exact course code
///
/// Produces exactly one record per course, in input order. The guide is usually
/// the subset returned by [`EquivalencyTable::relevant_to`](super::table::EquivalencyTable::relevant_to).
/// Never produces [`MatchType::Semantic`]; that needs the reasoning service.
pub fn match_courses(
    courses: &[Course],
    entries: &[&EquivalencyEntry],
) -> Result<Vec<MatchRecord>, MatchError> {
    courses
        .iter()
        .map(|course| match_course(course, entries))
        .collect()
}

/// Resolve a single course
pub fn match_course(
    course: &Course,
    entries: &[&EquivalencyEntry],
) -> Result<MatchRecord, MatchError> {
    let found = entries
        .iter()
        .find(|entry| entry.source_code() == Some(course.course_code.as_str()));

    let Some(entry) = found else {
        return Ok(review_record(course));
    };

    let transfer_credits = resolve_credits(course, entry)?;
    let (match_type, reasoning) = if entry.is_elective() {
        (MatchType::Elective, ELECTIVE_REASON)
    } else {
        (MatchType::Exact, EXACT_REASON)
    };

    Ok(MatchRecord {
        student_course: course.clone(),
        uw_equivalent: entry
            .uw_equivalent
            .clone()
            .unwrap_or_else(|| ELECTIVE_CREDIT.to_string()),
        uw_title: entry
            .uw_title
            .clone()
            .unwrap_or_else(|| GENERAL_ELECTIVE.to_string()),
        transfer_credits,
        category: entry.category.clone().unwrap_or_default(),
        match_type,
        reasoning: reasoning.to_string(),
    })
}

/// Record for a course with no entry in the guide
pub fn review_record(course: &Course) -> MatchRecord {
    MatchRecord {
        student_course: course.clone(),
        uw_equivalent: REQUIRES_REVIEW.to_string(),
        uw_title: NEEDS_EVALUATION.to_string(),
        transfer_credits: course.credits,
        category: String::new(),
        match_type: MatchType::Review,
        reasoning: REVIEW_REASON.to_string(),
    }
}

/// UW credits from the guide when it lists a positive value, otherwise the course's own credits
#[inline]
fn resolve_credits(course: &Course, entry: &EquivalencyEntry) -> Result<f64, MatchError> {
    match entry.uw_credits {
        Some(credits) if !credits.is_finite() || credits < 0.0 => {
            Err(MatchError::InvalidEntryCredits {
                code: course.course_code.clone(),
                credits,
            })
        }
        Some(credits) if credits > 0.0 => Ok(credits),
        _ => Ok(course.credits),
    }
}
