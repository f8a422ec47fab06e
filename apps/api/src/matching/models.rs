use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NoOverlap,
    InvalidJobSkills,
}

/// Human-readable coverage band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CoverageLabel {
    #[serde(rename = "No validated skills")]
    NoValidatedSkills,
    #[serde(rename = "Some skills, but large gaps")]
    LargeGaps,
    #[serde(rename = "Most skills covered")]
    MostCovered,
    #[serde(rename = "Fully covered")]
    FullyCovered,
    #[serde(rename = "Invalid job skills")]
    InvalidJobSkills,
}

impl CoverageLabel {
    /// 0 → none; (0, 0.5) → large gaps; [0.5, 1) → most; 1 → full.
    pub fn from_coverage(coverage: f64) -> Self {
        if coverage <= 0.0 {
            CoverageLabel::NoValidatedSkills
        } else if coverage < 0.5 {
            CoverageLabel::LargeGaps
        } else if coverage < 1.0 {
            CoverageLabel::MostCovered
        } else {
            CoverageLabel::FullyCovered
        }
    }
}

/// The validated candidate skill a job skill was matched to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchedPair {
    pub candidate_skill: String,
    pub similarity: f64, // 1.0 for exact token equality
    pub evidence: u8,
}

/// Full outcome of scoring one (job skills, candidate skills) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub rejected: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    pub missing_skills: Vec<String>,
    pub matched_skills: Vec<String>,
    pub matched_pairs: BTreeMap<String, MatchedPair>,
    pub score_raw: usize,
    pub score: f64,    // 0 – 100, two decimals
    pub coverage: f64, // 0 – 1, four decimals
    pub coverage_label: CoverageLabel,
    pub evidence_sum: u32,
    pub breadth: usize, // validated candidate skills
}

impl MatchResult {
    /// No job skill found a validated match.
    pub fn no_overlap(job_skills: Vec<String>, breadth: usize) -> Self {
        Self {
            rejected: true,
            rejection_reason: Some(RejectionReason::NoOverlap),
            missing_skills: job_skills,
            matched_skills: Vec::new(),
            matched_pairs: BTreeMap::new(),
            score_raw: 0,
            score: 0.0,
            coverage: 0.0,
            coverage_label: CoverageLabel::NoValidatedSkills,
            evidence_sum: 0,
            breadth,
        }
    }

    /// Bottom-ranked stand-in for a job posting whose skills could not be scored.
    pub fn invalid_job_skills() -> Self {
        Self {
            rejected: true,
            rejection_reason: Some(RejectionReason::InvalidJobSkills),
            missing_skills: Vec::new(),
            matched_skills: Vec::new(),
            matched_pairs: BTreeMap::new(),
            score_raw: 0,
            score: 0.0,
            coverage: 0.0,
            coverage_label: CoverageLabel::InvalidJobSkills,
            evidence_sum: 0,
            breadth: 0,
        }
    }
}

pub(crate) fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}
