// Canonical Skill Aligner: maps free-text skill strings onto the fixed skill
// vocabulary by nearest-embedding search, so the matcher sees clean tokens.

pub mod aligner;
pub mod handlers;

pub use aligner::{CanonicalMatch, SkillAligner, DEFAULT_ALIGN_LIMIT, DEFAULT_MIN_SIMILARITY};
