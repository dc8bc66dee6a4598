use crate::core::{
    assisted::AssistedMatcher,
    matcher::{match_courses, MatchError},
    reconcile::reconcile,
    table::EquivalencyTable,
};
use crate::models::{Course, EquivalencyEntry, Evaluation, MatchCoursesRequest, MatchRecord};
use std::sync::Arc;
use thiserror::Error;
use tracing::Instrument;

/// Errors surfaced to callers of [`Evaluator::evaluate`]
///
/// Reasoning-service failures never appear here; they are absorbed by the fallback.
#[derive(Debug, Error)]
pub enum EvaluationError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Deterministic matching failed: {0}")]
    Fatal(#[from] MatchError),
}

/// Which matcher runs first, decided once from configuration
#[derive(Clone)]
pub enum MatchStrategy {
    /// No reasoning service configured: exact-code matching only
    Deterministic,
    /// Ask the reasoning service first, fall back to exact-code matching on any failure
    Assisted(AssistedMatcher),
}

impl MatchStrategy {
    pub fn is_assisted(&self) -> bool {
        matches!(self, MatchStrategy::Assisted(_))
    }
}

/// Transcript evaluation entry point
///
/// Holds only read-only state, so one instance is shared by all requests.
#[derive(Clone)]
pub struct Evaluator {
    table: Arc<EquivalencyTable>,
    strategy: MatchStrategy,
}

impl Evaluator {
    pub fn new(table: Arc<EquivalencyTable>, strategy: MatchStrategy) -> Self {
        Self { table, strategy }
    }

    pub fn deterministic(table: Arc<EquivalencyTable>) -> Self {
        Self::new(table, MatchStrategy::Deterministic)
    }

    pub fn strategy(&self) -> &MatchStrategy {
        &self.strategy
    }

    /// Validate a raw match request, then evaluate it
    pub async fn evaluate_request(
        &self,
        request: &MatchCoursesRequest,
    ) -> Result<Evaluation, EvaluationError> {
        let courses = request
            .parse_courses()
            .map_err(EvaluationError::InvalidInput)?;

        let span = tracing::info_span!(
            "evaluation",
            id = %uuid::Uuid::new_v4(),
            courses = courses.len()
        );

        self.evaluate(&courses, request.major())
            .instrument(span)
            .await
    }

    /// Match a transcript and summarize the outcome
    ///
    /// # Pipeline Stages
    /// 1. Narrow the equivalency guide to the codes on the transcript
    /// 2. Propose matches via the reasoning service, when configured and the transcript is non-empty
    /// 3. Fall back to exact-code matching if that fails or is unavailable
    /// 4. Reconcile the summary from the final records
    pub async fn evaluate(
        &self,
        courses: &[Course],
        major: Option<&str>,
    ) -> Result<Evaluation, EvaluationError> {
        let relevant = self.table.relevant_to(courses);

        tracing::debug!(
            "Evaluating {} courses against {} relevant equivalencies",
            courses.len(),
            relevant.len()
        );

        let (matches, transferred_hint) = match &self.strategy {
            MatchStrategy::Deterministic => (self.match_locally(courses, &relevant)?, None),
            // empty transcript: no service call and no hint
            MatchStrategy::Assisted(_) if courses.is_empty() => (Vec::new(), None),
            MatchStrategy::Assisted(assistant) => {
                match assistant.propose(courses, &relevant, major).await {
                    Ok(proposal) => {
                        tracing::info!(
                            "Reasoning service ({}) matched {} courses",
                            assistant.model(),
                            proposal.matches.len()
                        );
                        (proposal.matches, proposal.transferred_hint)
                    }
                    Err(e) => {
                        tracing::warn!("Assisted matching failed, falling back to exact-code matching: {}", e);
                        (self.match_locally(courses, &relevant)?, None)
                    }
                }
            }
        };

        let summary = reconcile(courses, &matches, transferred_hint);

        tracing::info!(
            "Evaluated {} courses: attempted={}, transferred={}, review={}, unapplied={}",
            matches.len(),
            summary.total_credits_attempted,
            summary.total_credits_transferred,
            summary.needs_review,
            summary.unapplied_credits
        );

        Ok(Evaluation { matches, summary })
    }

    fn match_locally(
        &self,
        courses: &[Course],
        relevant: &[&EquivalencyEntry],
    ) -> Result<Vec<MatchRecord>, EvaluationError> {
        match_courses(courses, relevant).map_err(|e| {
            tracing::error!("Equivalency guide is corrupt: {}", e);
            EvaluationError::from(e)
        })
    }
}
