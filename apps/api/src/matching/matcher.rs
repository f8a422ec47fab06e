//! Semantic Skill Matcher: finds the best validated candidate skill for one
//! job skill: exact token first, then cosine similarity above a threshold.
//!
//! Semantic fallback needs vectors on both sides. A job skill without a stored
//! vector can only match exactly.

use futures::future::join_all;
use tokio::sync::OnceCell;

use crate::embeddings::VectorLookup;
use crate::skills::{cosine_similarity, SkillVector, ValidatedSkill};

#[derive(Debug, Clone, PartialEq)]
pub struct SkillMatch {
    pub candidate_skill: String,
    pub similarity: f64,
    pub evidence: u8,
}

/// Validated candidate skills for one `compute` call. Candidate vectors are fetched at most
/// once, and only if some job skill needs the semantic path.
pub struct CandidatePool {
    skills: Vec<ValidatedSkill>,
    vectors: OnceCell<Vec<Option<SkillVector>>>,
}

impl CandidatePool {
    pub fn new(skills: Vec<ValidatedSkill>) -> Self {
        Self {
            skills,
            vectors: OnceCell::new(),
        }
    }

    pub fn breadth(&self) -> usize {
        self.skills.len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.is_empty()
    }

    async fn vectors(&self, lookup: &dyn VectorLookup) -> &[Option<SkillVector>] {
        self.vectors
            .get_or_init(|| async {
                join_all(self.skills.iter().map(|s| lookup.vector_of(&s.skill))).await
            })
            .await
    }
}

/// Best match for `job_skill` (already normalized) or `None`.
///
/// Ties on similarity keep the first candidate in pool order, so the winner
/// depends on the order candidates were supplied in.
pub async fn best_match(
    lookup: &dyn VectorLookup,
    job_skill: &str,
    pool: &CandidatePool,
    threshold: f64,
) -> Option<SkillMatch> {
    if let Some(exact) = pool.skills.iter().find(|s| s.skill == job_skill) {
        return Some(SkillMatch {
            candidate_skill: exact.skill.clone(),
            similarity: 1.0,
            evidence: exact.evidence,
        });
    }

    if pool.is_empty() {
        return None;
    }

    let job_vector = lookup.vector_of(job_skill).await?;
    let candidate_vectors = pool.vectors(lookup).await;

    let mut best: Option<(usize, f64)> = None;
    for (i, vector) in candidate_vectors.iter().enumerate() {
        let Some(vector) = vector else { continue };
        let similarity = cosine_similarity(&job_vector, vector);
        if best.map_or(true, |(_, top)| similarity > top) {
            best = Some((i, similarity));
        }
    }

    let (index, similarity) = best?;
    if similarity < threshold {
        return None;
    }

    let skill = &pool.skills[index];
    Some(SkillMatch {
        candidate_skill: skill.skill.clone(),
        similarity,
        evidence: skill.evidence,
    })
}
