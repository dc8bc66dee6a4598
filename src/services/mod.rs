// Service exports
pub mod advisor;
pub mod anthropic;
pub mod transcript;

pub use advisor::{AdvisorDrafter, AdvisorError};
pub use anthropic::{AnthropicClient, AnthropicOptions, Attachment, AttachmentKind, ReasoningError};
pub use transcript::{TranscriptParser, TranscriptError, load_sample_transcript, extract_course_array};
