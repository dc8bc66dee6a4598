use crate::models::{Course, MatchRecord, MatchType, SummaryStats};

/// Maximum transfer credits that apply toward a UW degree
pub const TRANSFER_CREDIT_CAP: f64 = 90.0;

/// Build the final summary for a set of match records
///
/// Attempted credits always come from the student's own courses. Transferred
/// credits come from `transferred_hint` when the reasoning service reported a
/// usable figure, otherwise from the non-review records. The 90-credit cap is
/// applied last, so both matcher paths produce identical arithmetic.
pub fn reconcile(
    courses: &[Course],
    matches: &[MatchRecord],
    transferred_hint: Option<f64>,
) -> SummaryStats {
    // fold from +0.0; an empty f64 sum is -0.0
    let total_credits_attempted = courses.iter().fold(0.0, |acc, c| acc + c.credits);

    let mut direct_transfers = 0;
    let mut elective_credits = 0.0;
    let mut needs_review = 0;
    let mut matched_credits = 0.0;

    for record in matches {
        match record.match_type {
            MatchType::Review => needs_review += 1,
            MatchType::Elective => {
                elective_credits += record.transfer_credits;
                matched_credits += record.transfer_credits;
            }
            MatchType::Exact | MatchType::Semantic => {
                direct_transfers += 1;
                matched_credits += record.transfer_credits;
            }
        }
    }

    let raw_transferred = transferred_hint
        .filter(|hint| hint.is_finite() && *hint >= 0.0)
        .unwrap_or(matched_credits);

    let (transferred, unapplied) = apply_cap(raw_transferred);

    SummaryStats {
        total_credits_attempted,
        total_credits_transferred: transferred,
        direct_transfers,
        elective_credits,
        needs_review,
        degree_applicable: transferred,
        unapplied_credits: unapplied,
    }
}

/// Split raw transferred credits into (applicable, unapplied) around the cap
#[inline]
pub fn apply_cap(raw_transferred: f64) -> (f64, f64) {
    (
        raw_transferred.min(TRANSFER_CREDIT_CAP),
        (raw_transferred - TRANSFER_CREDIT_CAP).max(0.0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn course(credits: f64) -> Course {
        Course {
            course_code: "CS 101".to_string(),
            course_title: "Intro".to_string(),
            credits,
            grade: "B+".to_string(),
            institution: None,
        }
    }

    fn record(credits: f64, match_type: MatchType) -> MatchRecord {
        MatchRecord {
            student_course: course(credits),
            uw_equivalent: "CSE 121".to_string(),
            uw_title: "Intro to Programming".to_string(),
            transfer_credits: credits,
            category: String::new(),
            match_type,
            reasoning: String::new(),
        }
    }

    #[test]
    fn test_empty_summary_is_zero() {
        let summary = reconcile(&[], &[], None);
        assert_eq!(summary, SummaryStats::default());
        assert!(summary.total_credits_attempted.is_sign_positive());
        assert!(summary.total_credits_transferred.is_sign_positive());
    }

    #[test]
    fn test_review_credits_do_not_transfer() {
        let courses = vec![course(5.0), course(5.0), course(3.0)];
        let matches = vec![
            record(5.0, MatchType::Exact),
            record(5.0, MatchType::Review),
            record(3.0, MatchType::Elective),
        ];

        let summary = reconcile(&courses, &matches, None);

        assert_eq!(summary.total_credits_attempted, 13.0);
        assert_eq!(summary.total_credits_transferred, 8.0);
        assert_eq!(summary.direct_transfers, 1);
        assert_eq!(summary.elective_credits, 3.0);
        assert_eq!(summary.needs_review, 1);
        assert_eq!(summary.degree_applicable, 8.0);
        assert_eq!(summary.unapplied_credits, 0.0);
    }

    #[test]
    fn test_semantic_counts_as_direct_transfer() {
        let courses = vec![course(5.0)];
        let summary = reconcile(&courses, &[record(5.0, MatchType::Semantic)], None);
        assert_eq!(summary.direct_transfers, 1);
        assert_eq!(summary.total_credits_transferred, 5.0);
    }

    #[test]
    fn test_cap_applies_to_hint() {
        let courses = vec![course(5.0)];
        let summary = reconcile(&courses, &[record(5.0, MatchType::Exact)], Some(100.0));

        assert_eq!(summary.total_credits_attempted, 5.0);
        assert_eq!(summary.total_credits_transferred, 90.0);
        assert_eq!(summary.degree_applicable, 90.0);
        assert_eq!(summary.unapplied_credits, 10.0);
    }

    #[test]
    fn test_unusable_hint_is_ignored() {
        let courses = vec![course(5.0)];
        let matches = vec![record(5.0, MatchType::Exact)];

        assert_eq!(reconcile(&courses, &matches, Some(f64::NAN)).total_credits_transferred, 5.0);
        assert_eq!(reconcile(&courses, &matches, Some(-1.0)).total_credits_transferred, 5.0);
    }

    #[test]
    fn test_apply_cap() {
        assert_eq!(apply_cap(0.0), (0.0, 0.0));
        assert_eq!(apply_cap(90.0), (90.0, 0.0));
        assert_eq!(apply_cap(95.0), (90.0, 5.0));
    }
}
