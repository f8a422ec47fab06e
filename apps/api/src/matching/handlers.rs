use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::matching::{CandidateEntry, JobEntry, MatchResult, RankedCandidate, RankedJob, SkillScorer};
use crate::skills::CandidateSkillRecord;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub job_skills: Vec<String>,
    #[serde(default)]
    pub candidate_skills: Vec<CandidateSkillRecord>,
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub canonicalize: bool,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub result: MatchResult,
}

#[derive(Debug, Deserialize)]
pub struct RankCandidatesRequest {
    pub job_skills: Vec<String>,
    #[serde(default)]
    pub candidates: Vec<Value>,
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub canonicalize: bool,
}

#[derive(Debug, Deserialize)]
pub struct RankJobsRequest {
    #[serde(default)]
    pub candidate_skills: Vec<CandidateSkillRecord>,
    #[serde(default)]
    pub jobs: Vec<Value>,
    pub similarity_threshold: Option<f64>,
    #[serde(default)]
    pub canonicalize: bool,
}

#[derive(Debug, Serialize)]
pub struct RankedResponse<T> {
    pub ranked: Vec<T>,
}

/// POST /api/v1/match/score
pub async fn handle_score(
    State(state): State<AppState>,
    Json(req): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    validate_job_skills(&req.job_skills)?;
    validate_candidate_skills(&req.candidate_skills)?;
    let threshold = resolve_threshold(req.similarity_threshold, &state)?;

    let (job_skills, candidate_skills) = if req.canonicalize {
        (
            state.aligner.canonicalize_job_skills(&req.job_skills).await,
            state
                .aligner
                .canonicalize_candidate_skills(req.candidate_skills)
                .await,
        )
    } else {
        (req.job_skills, req.candidate_skills)
    };

    let result = state
        .engine
        .compute(&job_skills, &candidate_skills, threshold)
        .await?;
    Ok(Json(ScoreResponse { result }))
}

/// POST /api/v1/match/rank-candidates
pub async fn handle_rank_candidates(
    State(state): State<AppState>,
    Json(req): Json<RankCandidatesRequest>,
) -> Result<Json<RankedResponse<RankedCandidate>>, AppError> {
    validate_job_skills(&req.job_skills)?;
    let threshold = resolve_threshold(req.similarity_threshold, &state)?;

    let mut entries = CandidateEntry::decode_batch(&req.candidates);
    let mut job_skills = req.job_skills;

    if req.canonicalize {
        job_skills = state.aligner.canonicalize_job_skills(&job_skills).await;
        for entry in &mut entries {
            let skills = std::mem::take(&mut entry.skills);
            entry.skills = state.aligner.canonicalize_candidate_skills(skills).await;
        }
    }

    let ranked = state
        .engine
        .rank_candidates(&job_skills, entries, threshold)
        .await?;
    Ok(Json(RankedResponse { ranked }))
}

/// POST /api/v1/match/rank-jobs
pub async fn handle_rank_jobs(
    State(state): State<AppState>,
    Json(req): Json<RankJobsRequest>,
) -> Result<Json<RankedResponse<RankedJob>>, AppError> {
    validate_candidate_skills(&req.candidate_skills)?;
    let threshold = resolve_threshold(req.similarity_threshold, &state)?;

    let mut entries = JobEntry::decode_batch(&req.jobs);
    let mut candidate_skills = req.candidate_skills;

    if req.canonicalize {
        candidate_skills = state
            .aligner
            .canonicalize_candidate_skills(candidate_skills)
            .await;
        for entry in &mut entries {
            entry.skills = state.aligner.canonicalize_job_skills(&entry.skills).await;
        }
    }

    let ranked = state
        .engine
        .rank_jobs(&candidate_skills, entries, threshold)
        .await;
    Ok(Json(RankedResponse { ranked }))
}

fn validate_job_skills(job_skills: &[String]) -> Result<(), AppError> {
    if job_skills.is_empty() {
        return Err(AppError::Validation("job_skills must not be empty".into()));
    }
    Ok(())
}

fn validate_candidate_skills(records: &[CandidateSkillRecord]) -> Result<(), AppError> {
    for record in records {
        if record.skill.trim().is_empty() {
            return Err(AppError::Validation(
                "candidate skill names must not be empty".into(),
            ));
        }
        if record.credential_count < 0 || record.experience_count < 0 {
            return Err(AppError::Validation(format!(
                "counts for '{}' must be non-negative",
                record.skill
            )));
        }
    }
    Ok(())
}

fn resolve_threshold(requested: Option<f64>, state: &AppState) -> Result<f64, AppError> {
    match requested {
        None => Ok(state.config.similarity_threshold),
        Some(t) if (0.0..=1.0).contains(&t) => Ok(t),
        Some(t) => Err(AppError::Validation(format!(
            "similarity_threshold must be within [0, 1], got {t}"
        ))),
    }
}
