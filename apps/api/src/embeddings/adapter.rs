//! `SkillEmbeddings`: cache-then-store vector lookup with a bounded timeout.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use moka::sync::Cache;
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::embeddings::{EmbeddingError, SkillVectorStore, VectorCache, VectorLookup};
use crate::skills::{normalize, SkillVector};

const VOCABULARY_LOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// A vocabulary entry with a usable (non-empty, non-zero-norm) vector.
#[derive(Debug, Clone)]
pub struct CanonicalSkill {
    pub name: String,
    pub vector: SkillVector,
}

pub struct SkillEmbeddings {
    store: Arc<dyn SkillVectorStore>,
    cache: Arc<dyn VectorCache>,
    lookup_timeout: Duration,
    vocabulary: Cache<(), Arc<Vec<CanonicalSkill>>>,
}

impl SkillEmbeddings {
    pub fn new(
        store: Arc<dyn SkillVectorStore>,
        cache: Arc<dyn VectorCache>,
        lookup_timeout: Duration,
    ) -> Self {
        let vocabulary = Cache::builder()
            .max_capacity(1)
            .time_to_live(cache.ttl())
            .build();
        Self {
            store,
            cache,
            lookup_timeout,
            vocabulary,
        }
    }

    /// The canonical vocabulary in store order. Cached for the cache TTL once
    /// loaded; a failed or empty load is not cached so the next call retries.
    pub async fn canonical_skills(&self) -> Arc<Vec<CanonicalSkill>> {
        if let Some(cached) = self.vocabulary.get(&()) {
            return cached;
        }

        let rows = match timeout(VOCABULARY_LOAD_TIMEOUT, self.store.canonical_skills()).await {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                warn!("Canonical skill vocabulary unavailable: {e}");
                return Arc::new(Vec::new());
            }
            Err(_) => {
                warn!("Canonical skill vocabulary load timed out after {VOCABULARY_LOAD_TIMEOUT:?}");
                return Arc::new(Vec::new());
            }
        };

        let total = rows.len();
        let skills: Vec<CanonicalSkill> = rows
            .into_iter()
            .filter_map(|row| {
                let name = normalize(&row.name);
                let vector = SkillVector::from_le_bytes(row.embedding.as_deref()?)?;
                (!name.is_empty() && vector.norm() > 0.0).then_some(CanonicalSkill { name, vector })
            })
            .collect();

        debug!(
            "Loaded canonical vocabulary: {} usable of {} rows",
            skills.len(),
            total
        );

        let skills = Arc::new(skills);
        if !skills.is_empty() {
            self.vocabulary.insert((), Arc::clone(&skills));
        }
        skills
    }

    async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>, EmbeddingError> {
        match timeout(self.lookup_timeout, self.store.embedding_blob(key)).await {
            Ok(result) => result,
            Err(_) => Err(EmbeddingError::Timeout(self.lookup_timeout)),
        }
    }
}

#[async_trait]
impl VectorLookup for SkillEmbeddings {
    async fn vector_of(&self, token: &str) -> Option<SkillVector> {
        let key = normalize(token);
        if key.is_empty() {
            return None;
        }

        if let Ok(Some(hit)) = timeout(self.lookup_timeout, self.cache.get(&key)).await {
            debug!("Vector cache hit for '{key}'");
            return Some(hit);
        }

        let blob = match self.fetch(&key).await {
            Ok(Some(blob)) => blob,
            Ok(None) => {
                debug!("No stored vector for '{key}'");
                return None;
            }
            Err(e) => {
                warn!("Vector lookup for '{key}' failed, treating as absent: {e}");
                return None;
            }
        };

        let Some(vector) = SkillVector::from_le_bytes(&blob) else {
            warn!(
                "Stored vector for '{key}' is malformed ({} bytes), treating as absent",
                blob.len()
            );
            return None;
        };

        if timeout(self.lookup_timeout, self.cache.put(&key, &vector))
            .await
            .is_err()
        {
            warn!(
                "Vector cache write for '{key}' timed out after {:?}",
                self.lookup_timeout
            );
        }
        Some(vector)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::{InMemorySkillStore, MokaVectorCache};
    use crate::models::skill::SkillRow;

    fn embeddings(store: Arc<InMemorySkillStore>) -> SkillEmbeddings {
        SkillEmbeddings::new(
            store,
            Arc::new(MokaVectorCache::new(Duration::from_secs(3600))),
            Duration::from_millis(500),
        )
    }

    struct FailingStore;

    #[async_trait]
    impl SkillVectorStore for FailingStore {
        async fn embedding_blob(&self, _name: &str) -> Result<Option<Vec<u8>>, EmbeddingError> {
            Err(EmbeddingError::Database(sqlx::Error::PoolTimedOut))
        }
        async fn canonical_skills(&self) -> Result<Vec<SkillRow>, EmbeddingError> {
            Err(EmbeddingError::Database(sqlx::Error::PoolTimedOut))
        }
    }

    struct HangingStore;

    #[async_trait]
    impl SkillVectorStore for HangingStore {
        async fn embedding_blob(&self, _name: &str) -> Result<Option<Vec<u8>>, EmbeddingError> {
            std::future::pending().await
        }
        async fn canonical_skills(&self) -> Result<Vec<SkillRow>, EmbeddingError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_lookup_normalizes_and_decodes() {
        let store = Arc::new(InMemorySkillStore::new().with_vector("Machine Learning", &[1.0, 2.0]));
        let emb = embeddings(store);
        let v = emb.vector_of("  machine   LEARNING ").await.unwrap();
        assert_eq!(v.values(), &[1.0, 2.0]);
    }

    #[tokio::test]
    async fn test_second_lookup_is_served_from_cache() {
        let store = Arc::new(InMemorySkillStore::new().with_vector("rust", &[1.0]));
        let emb = embeddings(Arc::clone(&store));
        assert!(emb.vector_of("rust").await.is_some());
        assert!(emb.vector_of("Rust").await.is_some());
        assert_eq!(store.lookup_count(), 1);
    }

    #[tokio::test]
    async fn test_missing_row_and_malformed_blob_are_absent() {
        let store = Arc::new(InMemorySkillStore::new().with_blob("cobol", vec![1, 2, 3]));
        let emb = embeddings(store);
        assert!(emb.vector_of("cobol").await.is_none());
        assert!(emb.vector_of("fortran").await.is_none());
        assert!(emb.vector_of("   ").await.is_none());
    }

    #[tokio::test]
    async fn test_store_failure_degrades_to_absent() {
        let emb = SkillEmbeddings::new(
            Arc::new(FailingStore),
            Arc::new(MokaVectorCache::new(Duration::from_secs(60))),
            Duration::from_millis(100),
        );
        assert!(emb.vector_of("rust").await.is_none());
        assert!(emb.canonical_skills().await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_store_times_out_to_absent() {
        let emb = SkillEmbeddings::new(
            Arc::new(HangingStore),
            Arc::new(MokaVectorCache::new(Duration::from_secs(60))),
            Duration::from_millis(100),
        );
        assert!(emb.vector_of("rust").await.is_none());
    }

    #[tokio::test]
    async fn test_vocabulary_skips_unusable_rows_and_keeps_order() {
        let store = Arc::new(
            InMemorySkillStore::new()
                .with_vector("Python", &[1.0, 0.0])
                .with_vector("zero", &[0.0, 0.0])
                .with_blob("broken", vec![9, 9])
                .with_vector("Go", &[0.0, 1.0]),
        );
        let emb = embeddings(store);
        let names: Vec<String> = emb
            .canonical_skills()
            .await
            .iter()
            .map(|c| c.name.clone())
            .collect();
        assert_eq!(names, vec!["python", "go"]);
    }

    /// Cache whose reads always miss and whose writes never complete.
    struct HangingPutCache;

    #[async_trait]
    impl VectorCache for HangingPutCache {
        async fn get(&self, _key: &str) -> Option<SkillVector> {
            None
        }
        async fn put(&self, _key: &str, _vector: &SkillVector) {
            std::future::pending::<()>().await
        }
        fn ttl(&self) -> Duration {
            Duration::from_secs(60)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stalled_cache_write_does_not_block_lookup() {
        let emb = SkillEmbeddings::new(
            Arc::new(InMemorySkillStore::new().with_vector("rust", &[1.0, 0.0])),
            Arc::new(HangingPutCache),
            Duration::from_millis(100),
        );
        let v = timeout(Duration::from_secs(3600), emb.vector_of("rust"))
            .await
            .expect("lookup should finish within the write timeout");
        assert_eq!(v.map(|v| v.values().to_vec()), Some(vec![1.0, 0.0]));
    }
}
