//! Evidence Scorer: derives a 0/1/2 evidence level from credential and
//! experience counts, and builds the validated candidate skill set.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::skills::normalize::normalize;

/// One candidate skill as supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateSkillRecord {
    pub skill: String,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub credential_count: i64,
    #[serde(default, deserialize_with = "null_as_zero")]
    pub experience_count: i64,
}

/// Counts are nullable on the wire; null reads as 0.
fn null_as_zero<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    Ok(Option::<i64>::deserialize(deserializer)?.unwrap_or(0))
}

impl CandidateSkillRecord {
    pub fn new(skill: impl Into<String>, credential_count: i64, experience_count: i64) -> Self {
        Self {
            skill: skill.into(),
            credential_count,
            experience_count,
        }
    }

    /// Lenient decode used for batch payloads. Entries that are not objects or
    /// lack a string `skill` are dropped; non-integer counts read as 0.
    pub fn from_value(value: &Value) -> Option<Self> {
        let obj = value.as_object()?;
        let skill = obj.get("skill")?.as_str()?;
        Some(Self {
            skill: skill.to_string(),
            credential_count: count_field(obj.get("credential_count")),
            experience_count: count_field(obj.get("experience_count")),
        })
    }

    /// Decodes a JSON list of candidate skills. Anything that isn't a list
    /// is treated as an empty list.
    pub fn list_from_value(value: Option<&Value>) -> Vec<Self> {
        value
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Self::from_value).collect())
            .unwrap_or_default()
    }
}

fn count_field(value: Option<&Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
            .unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse::<i64>().unwrap_or(0),
        _ => 0,
    }
}

/// A candidate skill with evidence ≥ 1, carrying its evidence forward.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedSkill {
    pub skill: String,
    pub evidence: u8,
}

/// 0 = no evidence, 1 = credential OR experience, 2 = both.
pub fn evidence(credential_count: i64, experience_count: i64) -> u8 {
    u8::from(credential_count > 0) + u8::from(experience_count > 0)
}

/// Normalizes names and merges duplicates by taking the max of each count.
/// Negative counts clamp to 0. Order is first-seen.
pub fn merge_candidate_skills(records: &[CandidateSkillRecord]) -> Vec<CandidateSkillRecord> {
    let mut merged: Vec<CandidateSkillRecord> = Vec::with_capacity(records.len());
    let mut index = std::collections::HashMap::new();

    for record in records {
        let skill = normalize(&record.skill);
        if skill.is_empty() {
            continue;
        }
        let credential_count = record.credential_count.max(0);
        let experience_count = record.experience_count.max(0);

        match index.get(&skill) {
            Some(&i) => {
                let existing: &mut CandidateSkillRecord = &mut merged[i];
                existing.credential_count = existing.credential_count.max(credential_count);
                existing.experience_count = existing.experience_count.max(experience_count);
            }
            None => {
                index.insert(skill.clone(), merged.len());
                merged.push(CandidateSkillRecord {
                    skill,
                    credential_count,
                    experience_count,
                });
            }
        }
    }

    merged
}

/// Validated skill set: keeps only merged records with evidence ≥ 1.
pub fn filter_validated(records: &[CandidateSkillRecord]) -> Vec<ValidatedSkill> {
    merge_candidate_skills(records)
        .into_iter()
        .filter_map(|r| {
            let level = evidence(r.credential_count, r.experience_count);
            (level >= 1).then_some(ValidatedSkill {
                skill: r.skill,
                evidence: level,
            })
        })
        .collect()
}
