use async_trait::async_trait;
use sqlx::PgPool;

use crate::embeddings::{EmbeddingError, SkillVectorStore};
use crate::models::skill::SkillRow;

/// Postgres-backed vector store over `skills(id, name, embedding bytea)`.
#[derive(Clone)]
pub struct PgSkillStore {
    pool: PgPool,
}

impl PgSkillStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SkillVectorStore for PgSkillStore {
    async fn embedding_blob(&self, name: &str) -> Result<Option<Vec<u8>>, EmbeddingError> {
        let blob: Option<Option<Vec<u8>>> =
            sqlx::query_scalar("SELECT embedding FROM skills WHERE lower(name) = $1 LIMIT 1")
                .bind(name)
                .fetch_optional(&self.pool)
                .await?;

        Ok(blob.flatten().filter(|b| !b.is_empty()))
    }

    async fn canonical_skills(&self) -> Result<Vec<SkillRow>, EmbeddingError> {
        let rows = sqlx::query_as::<_, SkillRow>(
            "SELECT name, embedding FROM skills WHERE embedding IS NOT NULL ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}
