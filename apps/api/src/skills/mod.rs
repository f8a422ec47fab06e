// Leaf layer of the matching engine.
// Everything here is pure: token normalization, evidence levels, and the
// float32 vector codec plus cosine similarity.

pub mod evidence;
pub mod normalize;
pub mod vector;

pub use evidence::{evidence, filter_validated, merge_candidate_skills, CandidateSkillRecord, ValidatedSkill};
pub use normalize::{normalize, normalize_set};
pub use vector::{cosine_similarity, SkillVector};
