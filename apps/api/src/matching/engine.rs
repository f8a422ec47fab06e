//! Match Score Calculator: orchestrates normalization, evidence, and the
//! semantic matcher into one `MatchResult` per (job skills, candidate skills).
//!
//! `MatchEngine` is stateless across calls; the only shared state is the
//! read-only vector lookup behind `Arc<dyn VectorLookup>`.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::embeddings::VectorLookup;
use crate::matching::matcher::{best_match, CandidatePool};
use crate::matching::models::{round_to, CoverageLabel, MatchResult, MatchedPair};
use crate::matching::ranking::{self, CandidateEntry, JobEntry, RankedCandidate, RankedJob};
use crate::skills::{filter_validated, normalize_set, CandidateSkillRecord};

pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.75;
const DEFAULT_RANKING_CONCURRENCY: usize = 16;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MatchError {
    #[error("Invalid input: job skills must not be empty after normalization")]
    EmptyJobSkillSet,
}

/// Scores one (job skills, candidate skills) pair. The rankers only need this.
#[async_trait]
pub trait SkillScorer: Send + Sync {
    async fn compute(
        &self,
        job_skills: &[String],
        candidate_skills: &[CandidateSkillRecord],
        similarity_threshold: f64,
    ) -> Result<MatchResult, MatchError>;
}

pub struct MatchEngine {
    vectors: Arc<dyn VectorLookup>,
    ranking_concurrency: usize,
}

impl MatchEngine {
    pub fn new(vectors: Arc<dyn VectorLookup>) -> Self {
        Self {
            vectors,
            ranking_concurrency: DEFAULT_RANKING_CONCURRENCY,
        }
    }

    /// Max number of `compute` calls in flight while ranking.
    pub fn with_ranking_concurrency(mut self, concurrency: usize) -> Self {
        self.ranking_concurrency = concurrency.max(1);
        self
    }

    /// Ranks many candidates against one job. Fails only when the job skills
    /// are empty after normalization.
    pub async fn rank_candidates(
        &self,
        job_skills: &[String],
        candidates: Vec<CandidateEntry>,
        similarity_threshold: f64,
    ) -> Result<Vec<RankedCandidate>, MatchError> {
        ranking::rank_candidates(
            self,
            job_skills,
            candidates,
            similarity_threshold,
            self.ranking_concurrency,
        )
        .await
    }

    /// Ranks many job postings against one candidate. Never fails: jobs
    /// without usable skills sink to the bottom.
    pub async fn rank_jobs(
        &self,
        candidate_skills: &[CandidateSkillRecord],
        jobs: Vec<JobEntry>,
        similarity_threshold: f64,
    ) -> Vec<RankedJob> {
        ranking::rank_jobs(
            self,
            candidate_skills,
            jobs,
            similarity_threshold,
            self.ranking_concurrency,
        )
        .await
    }
}

/// Thresholds outside [0, 1] are clamped; NaN falls back to the default.
fn effective_threshold(threshold: f64) -> f64 {
    if threshold.is_nan() {
        DEFAULT_SIMILARITY_THRESHOLD
    } else {
        threshold.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl SkillScorer for MatchEngine {
    async fn compute(
        &self,
        job_skills: &[String],
        candidate_skills: &[CandidateSkillRecord],
        similarity_threshold: f64,
    ) -> Result<MatchResult, MatchError> {
        let job_set = normalize_set(job_skills);
        if job_set.is_empty() {
            return Err(MatchError::EmptyJobSkillSet);
        }

        let threshold = effective_threshold(similarity_threshold);
        let pool = CandidatePool::new(filter_validated(candidate_skills));
        let breadth = pool.breadth();

        let mut matched_skills = Vec::new();
        let mut missing_skills = Vec::new();
        let mut matched_pairs = BTreeMap::new();
        let mut evidence_sum = 0u32;

        for job_skill in job_set.iter() {
            match best_match(self.vectors.as_ref(), job_skill, &pool, threshold).await {
                Some(m) => {
                    evidence_sum += u32::from(m.evidence);
                    matched_pairs.insert(
                        job_skill.clone(),
                        MatchedPair {
                            candidate_skill: m.candidate_skill,
                            similarity: m.similarity,
                            evidence: m.evidence,
                        },
                    );
                    matched_skills.push(job_skill.clone());
                }
                None => missing_skills.push(job_skill.clone()),
            }
        }

        if matched_skills.is_empty() {
            debug!(
                "No validated overlap: {} job skills, breadth {}",
                job_set.len(),
                breadth
            );
            return Ok(MatchResult::no_overlap(job_set, breadth));
        }

        let score_raw = matched_skills.len();
        let coverage = score_raw as f64 / job_set.len() as f64;

        Ok(MatchResult {
            rejected: false,
            rejection_reason: None,
            missing_skills,
            matched_skills,
            matched_pairs,
            score_raw,
            score: round_to(coverage * 100.0, 2),
            coverage: round_to(coverage, 4),
            coverage_label: CoverageLabel::from_coverage(coverage),
            evidence_sum,
            breadth,
        })
    }
}
