use serde::{Deserialize, Serialize};
use validator::Validate;

/// Placeholder grade for courses still in progress or with no recorded grade
pub const IN_PROGRESS_GRADE: &str = "In Progress";

/// A course taken at the prior institution, as produced by transcript extraction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Course {
    #[serde(rename = "courseCode", default)]
    pub course_code: String,
    #[serde(rename = "courseTitle", default)]
    pub course_title: String,
    #[validate(range(min = 0.0))]
    #[serde(default)]
    pub credits: f64,
    #[serde(default = "default_grade")]
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
}

fn default_grade() -> String {
    IN_PROGRESS_GRADE.to_string()
}

fn default_true() -> bool { true }

/// One row of the static source → UW equivalency guide
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EquivalencyEntry {
    #[serde(rename = "sourceCourse", alias = "bellevueCourse", alias = "bcCourse", default)]
    pub source_course: Option<String>,
    #[serde(rename = "uwEquivalent", default)]
    pub uw_equivalent: Option<String>,
    #[serde(rename = "uwTitle", default)]
    pub uw_title: Option<String>,
    #[serde(rename = "uwCredits", default)]
    pub uw_credits: Option<f64>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(rename = "directTransfer", default = "default_true")]
    pub direct_transfer: bool,
}

impl EquivalencyEntry {
    /// Source course code, if the row has one
    pub fn source_code(&self) -> Option<&str> {
        self.source_course.as_deref()
    }

    /// Elective rows either opt out of direct transfer or map to a wildcard code like `HIST 1XX`
    pub fn is_elective(&self) -> bool {
        !self.direct_transfer
            || self
                .uw_equivalent
                .as_deref()
                .is_some_and(|code| code.contains(ELECTIVE_WILDCARD))
    }
}

/// Marker used in UW codes for generic departmental elective credit
pub const ELECTIVE_WILDCARD: &str = "XX";

/// How a course was resolved against the equivalency guide
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Semantic,
    Elective,
    Review,
}

impl MatchType {
    pub fn needs_review(&self) -> bool {
        matches!(self, MatchType::Review)
    }

    /// Whether an advisor should look at this course before credit is final
    pub fn needs_advisor(&self) -> bool {
        matches!(self, MatchType::Review | MatchType::Elective)
    }
}

/// Resolution of a single student course
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(rename = "studentCourse")]
    pub student_course: Course,
    #[serde(rename = "uwEquivalent")]
    pub uw_equivalent: String,
    #[serde(rename = "uwTitle")]
    pub uw_title: String,
    #[serde(rename = "transferCredits")]
    pub transfer_credits: f64,
    #[serde(default)]
    pub category: String,
    #[serde(rename = "matchType")]
    pub match_type: MatchType,
    #[serde(default)]
    pub reasoning: String,
}

/// Aggregate credit figures for one evaluation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SummaryStats {
    #[serde(rename = "totalCreditsAttempted")]
    pub total_credits_attempted: f64,
    #[serde(rename = "totalCreditsTransferred")]
    pub total_credits_transferred: f64,
    #[serde(rename = "directTransfers")]
    pub direct_transfers: usize,
    #[serde(rename = "electiveCredits")]
    pub elective_credits: f64,
    #[serde(rename = "needsReview")]
    pub needs_review: usize,
    #[serde(rename = "degreeApplicable")]
    pub degree_applicable: f64,
    #[serde(rename = "unappliedCredits")]
    pub unapplied_credits: f64,
}

/// Final result of matching a transcript, whichever matcher produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub matches: Vec<MatchRecord>,
    pub summary: SummaryStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_course_defaults() {
        let course: Course = serde_json::from_value(serde_json::json!({
            "courseCode": "ENGL& 101",
            "courseTitle": "English Composition I",
            "credits": 5
        }))
        .unwrap();

        assert_eq!(course.grade, IN_PROGRESS_GRADE);
        assert_eq!(course.credits, 5.0);
        assert!(course.institution.is_none());
    }

    #[test]
    fn test_entry_accepts_legacy_code_fields() {
        let entry: EquivalencyEntry = serde_json::from_value(serde_json::json!({
            "bcCourse": "CHEM& 161",
            "uwEquivalent": "CHEM 142",
            "uwCredits": 5
        }))
        .unwrap();

        assert_eq!(entry.source_code(), Some("CHEM& 161"));
        assert!(entry.direct_transfer);
        assert!(!entry.is_elective());
    }

    #[test]
    fn test_wildcard_is_elective() {
        let entry = EquivalencyEntry {
            source_course: Some("ART& 100".to_string()),
            uw_equivalent: Some("ART 1XX".to_string()),
            uw_title: None,
            uw_credits: Some(5.0),
            category: None,
            direct_transfer: true,
        };

        assert!(entry.is_elective());
    }

    #[test]
    fn test_match_type_wire_format() {
        assert_eq!(serde_json::to_string(&MatchType::Semantic).unwrap(), "\"semantic\"");
        let parsed: MatchType = serde_json::from_str("\"review\"").unwrap();
        assert!(parsed.needs_review());
        assert!(MatchType::Elective.needs_advisor());
        assert!(!MatchType::Exact.needs_advisor());
    }
}
