// Matching engine: semantic matcher → score calculator → rankers.
// Only `handlers` knows about HTTP; everything else is callable in-process.

pub mod engine;
pub mod handlers;
pub mod job_source;
pub mod matcher;
pub mod models;
pub mod ranking;

pub use engine::{MatchEngine, MatchError, SkillScorer, DEFAULT_SIMILARITY_THRESHOLD};
pub use job_source::JobSkillSource;
pub use models::{CoverageLabel, MatchResult, MatchedPair, RejectionReason};
pub use ranking::{CandidateEntry, JobEntry, RankedCandidate, RankedJob};
