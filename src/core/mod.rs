// Core algorithm exports
pub mod assisted;
pub mod evaluator;
pub mod matcher;
pub mod reconcile;
pub mod table;

pub use assisted::{AssistedMatcher, AssistError, Proposal, ResponseError, build_match_prompt, parse_proposal, strip_code_fences};
pub use evaluator::{Evaluator, EvaluationError, MatchStrategy};
pub use matcher::{match_course, match_courses, MatchError};
pub use reconcile::{apply_cap, reconcile, TRANSFER_CREDIT_CAP};
pub use table::{EquivalencyTable, TableError};
