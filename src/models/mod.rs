// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{Course, EquivalencyEntry, MatchType, MatchRecord, SummaryStats, Evaluation, IN_PROGRESS_GRADE, ELECTIVE_WILDCARD};
pub use requests::{MatchCoursesRequest, ParseTranscriptRequest, AdvisorRequest, TranscriptUploadForm};
pub use responses::{HealthResponse, ErrorResponse, ParseTranscriptResponse, AdvisorResponse};
