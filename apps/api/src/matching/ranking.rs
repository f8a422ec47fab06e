//! Candidate Ranker and Job Ranker.
//!
//! Both call `compute` once per entry (up to `concurrency` in flight), then
//! sort with the same four keys: score desc → evidence_sum desc →
//! breadth desc → stringified id asc.

use std::cmp::Ordering;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::matching::engine::{MatchError, SkillScorer};
use crate::matching::job_source::JobSkillSource;
use crate::matching::models::MatchResult;
use crate::skills::CandidateSkillRecord;

/// One candidate in a ranking batch.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateEntry {
    pub id: Value,
    pub skills: Vec<CandidateSkillRecord>,
}

impl CandidateEntry {
    /// Requires an object with a string or integer `id`. Missing or non-list
    /// `candidate_skills` become an empty list rather than dropping the entry.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id")?;
        let valid_id = match id {
            Value::String(_) => true,
            Value::Number(n) => n.is_i64() || n.is_u64(),
            _ => false,
        };
        if !valid_id {
            return None;
        }
        Some(Self {
            id: id.clone(),
            skills: CandidateSkillRecord::list_from_value(obj.get("candidate_skills")),
        })
    }

    /// Decodes a raw batch, dropping malformed entries individually.
    pub fn decode_batch(values: &[Value]) -> Vec<Self> {
        values.iter().filter_map(Self::from_value).collect()
    }
}

/// One job posting in a ranking batch. `job` is echoed back to the caller.
#[derive(Debug, Clone, PartialEq)]
pub struct JobEntry {
    pub id: Value,
    pub job: Value,
    pub skills: Vec<String>,
}

impl JobEntry {
    /// Requires an object; `id` defaults to null.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let id = obj.get("id").cloned().unwrap_or(Value::Null);
        let source = JobSkillSource::from_job(value);
        debug!("Job {} skills decoded as {}", id_sort_key(&id), source.kind());
        Some(Self {
            id,
            job: value.clone(),
            skills: source.into_skills(),
        })
    }

    /// Decodes a raw batch, dropping non-object entries individually.
    pub fn decode_batch(values: &[Value]) -> Vec<Self> {
        values.iter().filter_map(Self::from_value).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedCandidate {
    pub id: Value,
    pub result: MatchResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedJob {
    pub id: Value,
    pub job: Value,
    pub result: MatchResult,
}

/// Stringified id used as the final tie-breaker. Null (absent) is "".
pub fn id_sort_key(id: &Value) -> String {
    match id {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_ranked(a: &MatchResult, a_key: &str, b: &MatchResult, b_key: &str) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| b.evidence_sum.cmp(&a.evidence_sum))
        .then_with(|| b.breadth.cmp(&a.breadth))
        .then_with(|| a_key.cmp(b_key))
}

fn sort_by_rank<T>(
    items: Vec<T>,
    result: impl Fn(&T) -> &MatchResult,
    id: impl Fn(&T) -> &Value,
) -> Vec<T> {
    let mut keyed: Vec<(String, T)> = items
        .into_iter()
        .map(|item| (id_sort_key(id(&item)), item))
        .collect();
    keyed.sort_by(|(ka, a), (kb, b)| compare_ranked(result(a), ka, result(b), kb));
    keyed.into_iter().map(|(_, item)| item).collect()
}

pub async fn rank_candidates(
    scorer: &dyn SkillScorer,
    job_skills: &[String],
    candidates: Vec<CandidateEntry>,
    similarity_threshold: f64,
    concurrency: usize,
) -> Result<Vec<RankedCandidate>, MatchError> {
    let scored: Vec<Result<RankedCandidate, MatchError>> = stream::iter(candidates)
        .map(|candidate| async move {
            let result = scorer
                .compute(job_skills, &candidate.skills, similarity_threshold)
                .await?;
            Ok::<_, MatchError>(RankedCandidate {
                id: candidate.id,
                result,
            })
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let ranked = scored.into_iter().collect::<Result<Vec<_>, _>>()?;
    let ranked = sort_by_rank(ranked, |r| &r.result, |r| &r.id);

    debug!("Ranked {} candidates", ranked.len());
    Ok(ranked)
}

pub async fn rank_jobs(
    scorer: &dyn SkillScorer,
    candidate_skills: &[CandidateSkillRecord],
    jobs: Vec<JobEntry>,
    similarity_threshold: f64,
    concurrency: usize,
) -> Vec<RankedJob> {
    let scored: Vec<RankedJob> = stream::iter(jobs)
        .map(|job| async move {
            let result = match scorer
                .compute(&job.skills, candidate_skills, similarity_threshold)
                .await
            {
                Ok(result) => result,
                Err(e) => {
                    warn!("Job {} has no usable skills: {e}", id_sort_key(&job.id));
                    MatchResult::invalid_job_skills()
                }
            };
            RankedJob {
                id: job.id,
                job: job.job,
                result,
            }
        })
        .buffered(concurrency.max(1))
        .collect()
        .await;

    let ranked = sort_by_rank(scored, |r| &r.result, |r| &r.id);

    debug!("Ranked {} jobs", ranked.len());
    ranked
}
