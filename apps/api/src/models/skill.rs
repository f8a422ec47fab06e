use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Row of the canonical `skills` vocabulary table.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SkillRow {
    pub name: String,
    pub embedding: Option<Vec<u8>>,
}
