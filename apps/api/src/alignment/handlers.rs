use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::alignment::aligner::required_skill_weights;
use crate::alignment::{CanonicalMatch, DEFAULT_ALIGN_LIMIT};
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AlignRequest {
    pub skills: Vec<String>,
    pub max: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct AlignResponse {
    pub aligned: Vec<CanonicalMatch>,
    pub required_skills: Map<String, Value>,
}

/// POST /api/v1/skills/align
/// Maps free-text skills onto the canonical vocabulary. Always succeeds; with
/// no text embedder configured every skill maps to itself.
pub async fn handle_align(
    State(state): State<AppState>,
    Json(req): Json<AlignRequest>,
) -> Result<Json<AlignResponse>, AppError> {
    let max = req.max.unwrap_or(DEFAULT_ALIGN_LIMIT);
    if max == 0 {
        return Err(AppError::Validation("max must be at least 1".into()));
    }

    let aligned = state.aligner.align_to_canonical_skills(&req.skills, max).await;
    let required_skills = required_skill_weights(&aligned);
    Ok(Json(AlignResponse {
        aligned,
        required_skills,
    }))
}
