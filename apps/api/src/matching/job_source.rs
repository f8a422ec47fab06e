//! Decodes the several shapes a job posting may carry its required skills in
//! into one list, once, at the boundary.

use serde_json::{Map, Value};

/// Where a job posting's required skills came from.
#[derive(Debug, Clone, PartialEq)]
pub enum JobSkillSource {
    /// `job_skills` or `required_skills`: an explicit list of names.
    Listed(Vec<String>),
    /// `requiredSkills`: a `{skill: weight}` map, kept in key order.
    Weighted(Vec<(String, Value)>),
    /// Nothing usable.
    Missing,
}

impl JobSkillSource {
    /// Tries `job_skills`, `required_skills`, then `requiredSkills` and takes
    /// the first that yields at least one non-blank name.
    pub fn from_job(job: &Value) -> Self {
        let Some(obj) = job.as_object() else {
            return JobSkillSource::Missing;
        };

        for field in ["job_skills", "required_skills"] {
            let listed = listed_names(obj, field);
            if !listed.is_empty() {
                return JobSkillSource::Listed(listed);
            }
        }

        let weighted: Vec<(String, Value)> = obj
            .get("requiredSkills")
            .and_then(Value::as_object)
            .map(|weights| {
                weights
                    .iter()
                    .filter(|(k, _)| !k.trim().is_empty())
                    .map(|(k, w)| (k.clone(), w.clone()))
                    .collect()
            })
            .unwrap_or_default();
        if !weighted.is_empty() {
            return JobSkillSource::Weighted(weighted);
        }

        JobSkillSource::Missing
    }

    /// Short label of the decoded shape, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            JobSkillSource::Listed(_) => "listed",
            JobSkillSource::Weighted(_) => "weighted",
            JobSkillSource::Missing => "missing",
        }
    }

    /// The canonical name list. Weights are dropped; key order is kept.
    pub fn into_skills(self) -> Vec<String> {
        match self {
            JobSkillSource::Listed(names) => names,
            JobSkillSource::Weighted(weights) => weights.into_iter().map(|(name, _)| name).collect(),
            JobSkillSource::Missing => Vec::new(),
        }
    }
}

fn listed_names(obj: &Map<String, Value>, field: &str) -> Vec<String> {
    obj.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .filter(|s| !s.trim().is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}
