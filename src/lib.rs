//! Transfer Eval - transfer credit evaluation service
//!
//! Maps courses from a prior institution onto University of Washington
//! equivalents. Exact-code matching against a static equivalency guide always
//! works; when a reasoning service is configured it is asked first so courses
//! without a listed code can still be matched by title.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{Evaluator, MatchStrategy, EquivalencyTable, reconcile, TRANSFER_CREDIT_CAP};
pub use crate::models::{Course, EquivalencyEntry, MatchRecord, MatchType, SummaryStats, Evaluation, MatchCoursesRequest};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_library_exports() {
        let summary = reconcile(&[], &[], Some(120.0));
        assert_eq!(summary.degree_applicable, TRANSFER_CREDIT_CAP);
    }
}
