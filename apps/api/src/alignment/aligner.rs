//! Canonical Skill Aligner.
//!
//! Raw skills that already equal a vocabulary name map to themselves at 1.0.
//! The rest are embedded through the [`TextEmbedder`] and mapped to the
//! vocabulary entry with the highest cosine similarity (strict `>`, so ties
//! keep the earlier vocabulary entry).
//!
//! If the text embedder is disabled or fails, every pending name maps to
//! itself at 1.0 ("identity mode"). Canonicalization only accepts a mapping at
//! or above `min_similarity`; anything weaker keeps the normalized raw name.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::embeddings::{CanonicalSkill, SkillEmbeddings, TextEmbedder, VectorLookup};
use crate::skills::{cosine_similarity, normalize, normalize_set, CandidateSkillRecord, SkillVector};

pub const DEFAULT_MIN_SIMILARITY: f64 = 0.55;
pub const DEFAULT_ALIGN_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanonicalMatch {
    pub name: String,
    pub similarity: f64,
}

pub struct SkillAligner {
    embeddings: Arc<SkillEmbeddings>,
    text: Arc<dyn TextEmbedder>,
    min_similarity: f64,
}

impl SkillAligner {
    pub fn new(embeddings: Arc<SkillEmbeddings>, text: Arc<dyn TextEmbedder>) -> Self {
        Self {
            embeddings,
            text,
            min_similarity: DEFAULT_MIN_SIMILARITY,
        }
    }

    pub fn with_min_similarity(mut self, min_similarity: f64) -> Self {
        self.min_similarity = min_similarity;
        self
    }

    /// `normalized_raw → best canonical match` for every non-blank input.
    /// With an empty vocabulary and a working embedder, only exact names map.
    pub async fn map_raw_to_canonical(&self, raw: &[String]) -> HashMap<String, CanonicalMatch> {
        let norms = normalize_set(raw);
        let mut out = HashMap::with_capacity(norms.len());
        if norms.is_empty() {
            return out;
        }

        let vocabulary = self.embeddings.canonical_skills().await;
        let known: HashSet<&str> = vocabulary.iter().map(|c| c.name.as_str()).collect();

        let mut pending = Vec::new();
        for norm in norms {
            if known.contains(norm.as_str()) {
                out.insert(norm.clone(), identity(&norm));
            } else {
                pending.push(norm);
            }
        }
        if pending.is_empty() {
            return out;
        }

        let vectors = match self.text.embed_texts(&pending).await {
            Ok(vectors) => vectors,
            Err(e) => {
                warn!("Skill alignment falling back to identity mapping: {e}");
                for norm in pending {
                    out.insert(norm.clone(), identity(&norm));
                }
                return out;
            }
        };

        for (norm, vector) in pending.into_iter().zip(vectors.iter()) {
            if let Some(best) = nearest_canonical(vector, &vocabulary) {
                debug!(
                    "Aligned '{norm}' → '{}' ({:.3})",
                    best.name, best.similarity
                );
                out.insert(norm, best);
            }
        }

        out
    }

    /// Up to `max` distinct canonical names, each with its best similarity
    /// across the inputs, ordered by similarity desc (stable on ties).
    pub async fn align_to_canonical_skills(&self, raw: &[String], max: usize) -> Vec<CanonicalMatch> {
        let norms = normalize_set(raw);
        let mapping = self.map_raw_to_canonical(&norms).await;

        let mut best: Vec<CanonicalMatch> = Vec::new();
        for norm in &norms {
            let Some(m) = mapping.get(norm) else { continue };
            match best.iter_mut().find(|b| b.name == m.name) {
                Some(existing) if m.similarity > existing.similarity => {
                    existing.similarity = m.similarity;
                }
                Some(_) => {}
                None => best.push(m.clone()),
            }
        }

        best.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
        best.truncate(max);
        best
    }

    /// `{canonical: weight}` with weight = round(similarity · 100), usable as
    /// a job posting's `requiredSkills` map.
    pub async fn required_skills_for(&self, raw: &[String], max: usize) -> Map<String, Value> {
        required_skill_weights(&self.align_to_canonical_skills(raw, max).await)
    }

    /// Rewrites each record's skill name to its canonical form. Counts are untouched.
    pub async fn canonicalize_candidate_skills(
        &self,
        records: Vec<CandidateSkillRecord>,
    ) -> Vec<CandidateSkillRecord> {
        let raw: Vec<String> = records.iter().map(|r| r.skill.clone()).collect();
        let mapping = self.map_raw_to_canonical(&raw).await;

        let mut out = Vec::with_capacity(records.len());
        for mut record in records {
            let norm = normalize(&record.skill);
            if !norm.is_empty() {
                record.skill = self.canonical_name(norm, &mapping).await;
            }
            out.push(record);
        }
        out
    }

    /// Same rule as [`Self::canonicalize_candidate_skills`] for a job-skill list.
    pub async fn canonicalize_job_skills(&self, skills: &[String]) -> Vec<String> {
        let mapping = self.map_raw_to_canonical(skills).await;

        let mut out = Vec::with_capacity(skills.len());
        for skill in skills {
            let norm = normalize(skill);
            if norm.is_empty() {
                continue;
            }
            out.push(self.canonical_name(norm, &mapping).await);
        }
        out
    }

    async fn canonical_name(&self, norm: String, mapping: &HashMap<String, CanonicalMatch>) -> String {
        if self.embeddings.vector_of(&norm).await.is_some() {
            return norm;
        }
        match mapping.get(&norm) {
            Some(m) if m.similarity >= self.min_similarity => m.name.clone(),
            _ => norm,
        }
    }
}

fn identity(norm: &str) -> CanonicalMatch {
    CanonicalMatch {
        name: norm.to_string(),
        similarity: 1.0,
    }
}

fn nearest_canonical(vector: &SkillVector, vocabulary: &[CanonicalSkill]) -> Option<CanonicalMatch> {
    if vector.norm() <= 0.0 {
        return None;
    }

    let mut best: Option<(&CanonicalSkill, f64)> = None;
    for candidate in vocabulary {
        let similarity = cosine_similarity(vector, &candidate.vector);
        if best.map_or(true, |(_, top)| similarity > top) {
            best = Some((candidate, similarity));
        }
    }

    best.map(|(c, similarity)| CanonicalMatch {
        name: c.name.clone(),
        similarity,
    })
}

pub fn required_skill_weights(aligned: &[CanonicalMatch]) -> Map<String, Value> {
    aligned
        .iter()
        .map(|m| {
            let weight = (m.similarity.clamp(0.0, 1.0) * 100.0).round() as u64;
            (m.name.clone(), Value::from(weight))
        })
        .collect()
}
